//! Request and response shapes for the pharmacist API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and decoded body of a response, for operations whose callers
/// need more than the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub status: u16,
    /// Decoded body; `Value::Null` when the server sent none.
    pub data: T,
}

/// Changes to the signed-in pharmacist's profile and pharmacy.
///
/// Blank and missing fields are left unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacistUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub location_name: Option<String>,
    pub fax: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAddress<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    address_line1: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_line2: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    province: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePharmacy<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    location_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fax: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<UpdateAddress<'a>>,
}

/// Wire body of `PUT /pharmacist`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    firstname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lastname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pharmacy: Option<UpdatePharmacy<'a>>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl PharmacistUpdate {
    /// Nest the flat fields the way the API expects, dropping blanks and
    /// empty groups.
    pub(crate) fn payload(&self) -> UpdatePayload<'_> {
        let address = UpdateAddress {
            address_line1: present(self.address1.as_ref()),
            address_line2: present(self.address2.as_ref()),
            city: present(self.city.as_ref()),
            province: present(self.province.as_ref()),
            postal_code: present(self.zip.as_ref()),
        };
        let has_address = address.address_line1.is_some()
            || address.address_line2.is_some()
            || address.city.is_some()
            || address.province.is_some()
            || address.postal_code.is_some();

        let pharmacy = UpdatePharmacy {
            location_name: present(self.location_name.as_ref()),
            fax: present(self.fax.as_ref()),
            address: has_address.then_some(address),
        };
        let has_pharmacy =
            pharmacy.location_name.is_some() || pharmacy.fax.is_some() || pharmacy.address.is_some();

        UpdatePayload {
            firstname: present(self.first_name.as_ref()),
            lastname: present(self.last_name.as_ref()),
            email: present(self.email.as_ref()),
            phone_number: present(self.phone_number.as_ref()),
            pharmacy: has_pharmacy.then_some(pharmacy),
        }
    }
}
