//! Patient health records.
//!
//! The API stores each list as one newline-joined string. Blank entries are
//! dropped in both directions.

use carebridge_core::ProfileId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::client::PharmacistClient;
use crate::error::PharmacistError;

const SEPARATOR: &str = "\n";

/// Medication and allergy history of a patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub current_medications: Vec<String>,
    pub past_medications: Vec<String>,
    pub allergies: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthPayload {
    current_medications: String,
    past_medications: String,
    allergies: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHealth {
    #[serde(default)]
    current_medications: Option<String>,
    #[serde(default)]
    past_medications: Option<String>,
    #[serde(default)]
    allergies: Option<String>,
}

fn join(items: &[String]) -> String {
    items
        .iter()
        .map(String::as_str)
        .filter(|item| !item.trim().is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn split(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(SEPARATOR)
        .filter(|item| !item.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl HealthRecord {
    fn payload(&self) -> HealthPayload {
        HealthPayload {
            current_medications: join(&self.current_medications),
            past_medications: join(&self.past_medications),
            allergies: join(&self.allergies),
        }
    }

    /// Decode a stored record; `None` for an empty response.
    fn from_stored(data: Value) -> Result<Option<Self>, PharmacistError> {
        let empty = match &data {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        };
        if empty {
            return Ok(None);
        }

        let stored: StoredHealth = serde_json::from_value(data)
            .map_err(|e| PharmacistError::Parse(format!("Failed to parse health record: {e}")))?;
        Ok(Some(Self {
            current_medications: split(stored.current_medications.as_deref()),
            past_medications: split(stored.past_medications.as_deref()),
            allergies: split(stored.allergies.as_deref()),
        }))
    }
}

impl PharmacistClient {
    /// Replace a patient's health record.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, record), fields(profile_id = %profile_id))]
    pub async fn put_health_record(
        &self,
        record: &HealthRecord,
        profile_id: &ProfileId,
    ) -> Result<Value, PharmacistError> {
        self.write_health_record(Method::PUT, record, profile_id).await
    }

    /// Create a patient's health record.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, record), fields(profile_id = %profile_id))]
    pub async fn post_health_record(
        &self,
        record: &HealthRecord,
        profile_id: &ProfileId,
    ) -> Result<Value, PharmacistError> {
        self.write_health_record(Method::POST, record, profile_id).await
    }

    /// Fetch a patient's health record; `None` if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended,
    /// `PharmacistError::Parse` if the record is malformed, or the upstream
    /// error.
    #[instrument(skip(self), fields(profile_id = %profile_id))]
    pub async fn get_health_record(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<HealthRecord>, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "profiles", profile_id.as_str(), "health"])?;
                let request = self.request(Method::GET, url).await?;
                HealthRecord::from_stored(self.send(request).await?.data)
            })
            .await
    }

    async fn write_health_record(
        &self,
        method: Method,
        record: &HealthRecord,
        profile_id: &ProfileId,
    ) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "profiles", profile_id.as_str(), "health"])?;
                let request = self.request(method, url).await?.json(&record.payload());
                self.send_data(request).await
            })
            .await
    }
}
