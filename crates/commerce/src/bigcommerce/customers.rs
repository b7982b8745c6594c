//! Customer endpoints (`/v3/customers`).

use async_trait::async_trait;
use carebridge_core::Email;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{BigCommerceClient, BigCommerceError, CustomerApi};
use crate::types::{Customer, Profile};

#[derive(Debug, Serialize)]
struct NewCustomer<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

#[async_trait]
impl CustomerApi for BigCommerceClient {
    #[instrument(skip(self), fields(email = %email))]
    async fn get_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, BigCommerceError> {
        let mut url = self.endpoint("/v3/customers")?;
        url.query_pairs_mut().append_pair("email:in", email.as_str());

        let customers: Vec<Customer> = self.get_v3(url).await?;
        Ok(customers.into_iter().next())
    }

    #[instrument(skip(self, profile), fields(profile_id = %profile.profile_id))]
    async fn create_customer(&self, profile: &Profile) -> Result<Customer, BigCommerceError> {
        let body = [NewCustomer {
            email: profile.email.as_str(),
            first_name: profile.first_name.as_deref().unwrap_or_default(),
            last_name: profile.last_name.as_deref().unwrap_or_default(),
        }];

        let created: Vec<Customer> = self.post_v3(self.endpoint("/v3/customers")?, &body).await?;
        let customer = created.into_iter().next().ok_or_else(|| {
            BigCommerceError::Parse("Customer create returned no records".to_string())
        })?;

        debug!(customer_id = %customer.id, "BigCommerce customer created");
        Ok(customer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use carebridge_core::CustomerId;
    use mockito::Matcher;
    use serde_json::json;

    use super::super::client::tests::client_for;
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_email_returns_first_match() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stores/store1/v3/customers")
            .match_query(Matcher::UrlEncoded(
                "email:in".into(),
                "jane@example.com".into(),
            ))
            .with_status(200)
            .with_body(r#"{"data":[{"id":81,"email":"jane@example.com"}],"meta":{}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let email = Email::parse("jane@example.com").unwrap();
        let customer = client.get_customer_by_email(&email).await.unwrap().unwrap();
        assert_eq!(customer.id, CustomerId::new(81));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_by_email_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stores/store1/v3/customers")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data":[],"meta":{}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let email = Email::parse("nobody@example.com").unwrap();
        assert!(client.get_customer_by_email(&email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_customer_from_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/stores/store1/v3/customers")
            .match_body(Matcher::Json(json!([
                { "email": "jane@example.com", "first_name": "Jane", "last_name": "Doe" }
            ])))
            .with_status(200)
            .with_body(r#"{"data":[{"id":82,"email":"jane@example.com"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut profile = Profile::new("p-1".into(), Email::parse("jane@example.com").unwrap());
        profile.first_name = Some("Jane".to_string());
        profile.last_name = Some("Doe".to_string());

        let customer = client.create_customer(&profile).await.unwrap();
        assert_eq!(customer.id, CustomerId::new(82));
        mock.assert_async().await;
    }
}
