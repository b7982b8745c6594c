//! Pharmacist API client.
//!
//! Every request carries the signed-in user's tokens in the `jwtaccesstoken`
//! and `jwtidtoken` headers, fetched fresh from the [`Authenticator`] per
//! call, and runs under the [`AuthGuard`] session policy.

use std::sync::Arc;

use carebridge_core::{MedicationId, PharmacyOrderId, PrescriptionId, ProfileId};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::auth::{AuthGuard, Authenticator, SessionStore};
use crate::config::PharmacistConfig;
use crate::error::{DEFAULT_SERVER_ERR_MSG, PharmacistError};
use crate::types::{ApiResponse, PharmacistUpdate};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const DEFAULT_ORDER_COUNT: u32 = 10_000;

/// Pharmacist API client.
///
/// Cheap to clone; all clones share one connection pool and session guard.
#[derive(Clone)]
pub struct PharmacistClient {
    inner: Arc<PharmacistClientInner>,
}

struct PharmacistClientInner {
    client: reqwest::Client,
    api_root: Url,
    guard: AuthGuard,
}

/// Error body shapes the API uses (`{"error": "..."}` or `{"message": "..."}`).
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PharmacistClient {
    /// Create a new pharmacist API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &PharmacistConfig,
        authenticator: Arc<dyn Authenticator>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, PharmacistError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let guard = AuthGuard::new(
            authenticator,
            sessions,
            config.session_ttl,
            config.login_path.clone(),
        );

        Ok(Self {
            inner: Arc::new(PharmacistClientInner {
                client,
                api_root: config.api_root.clone(),
                guard,
            }),
        })
    }

    /// The session guard wrapping every call.
    #[must_use]
    pub fn guard(&self) -> &AuthGuard {
        &self.inner.guard
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Build an endpoint URL under the API root, percent-encoding each segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, PharmacistError> {
        let mut url = self.inner.api_root.clone();
        url.path_segments_mut()
            .map_err(|()| PharmacistError::Config("API root cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying the current tokens.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder, PharmacistError> {
        let authenticator = self.inner.guard.authenticator();
        let access_token = authenticator.access_token().await?;
        let id_token = authenticator.id_token().await?;

        Ok(self
            .inner
            .client
            .request(method, url)
            .header("jwtaccesstoken", token_header(&access_token)?)
            .header("jwtidtoken", token_header(&id_token)?))
    }

    /// Send a request and decode a successful response.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse, PharmacistError> {
        let response = request.send().await?;
        Self::into_api_response(response).await
    }

    /// Send a request and decode the body of a successful response.
    pub(crate) async fn send_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PharmacistError> {
        let response = self.send(request).await?;
        serde_json::from_value(response.data)
            .map_err(|e| PharmacistError::Parse(format!("Failed to parse response: {e}")))
    }

    async fn into_api_response(response: reqwest::Response) -> Result<ApiResponse, PharmacistError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            let data = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text)
                    .map_err(|e| PharmacistError::Parse(format!("Failed to parse response: {e}")))?
            };
            return Ok(ApiResponse {
                status: status.as_u16(),
                data,
            });
        }

        Err(Self::parse_error(response).await)
    }

    async fn parse_error(response: reqwest::Response) -> PharmacistError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return PharmacistError::Unauthorized;
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.or(body.message))
            .or_else(|| (!text.trim().is_empty()).then_some(text))
            .unwrap_or_else(|| DEFAULT_SERVER_ERR_MSG.to_string());

        PharmacistError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PharmacistError> {
        let request = self.request(Method::GET, url).await?;
        self.send_data(request).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<ApiResponse, PharmacistError> {
        let request = self.request(method, url).await?.json(body);
        self.send(request).await
    }

    // =========================================================================
    // Pharmacist
    // =========================================================================

    /// The signed-in pharmacist's profile.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self))]
    pub async fn get_pharmacist(&self) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async { self.get_json(self.url(&["pharmacist"])?).await })
            .await
    }

    /// Update the signed-in pharmacist's profile and pharmacy details.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, update))]
    pub async fn update(&self, update: &PharmacistUpdate) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                self.send_json(Method::PUT, self.url(&["pharmacist"])?, &update.payload())
                    .await
            })
            .await
    }

    /// Search patients by name, email or phone.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self), fields(term = %term))]
    pub async fn search_patients(&self, term: &str) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let mut url = self.url(&["pharmacist", "profiles", "search"])?;
                url.query_pairs_mut().append_pair("q", term);
                self.get_json(url).await
            })
            .await
    }

    /// Care-relationship report.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self))]
    pub async fn get_crm_report(&self) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                self.get_json(self.url(&["pharmacist", "reports", "CRM"])?)
                    .await
            })
            .await
    }

    // =========================================================================
    // Patients
    // =========================================================================

    /// Create a patient account.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::Conflict` carrying the server's `error`
    /// message (or [`DEFAULT_SERVER_ERR_MSG`]) if the patient already exists,
    /// `PharmacistError::SignedOut` if the session ended, or the upstream
    /// error.
    #[instrument(skip(self, patient))]
    pub async fn create_patient(&self, patient: &Value) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                let request = self
                    .request(Method::POST, self.url(&["pharmacist", "user"])?)
                    .await?
                    .json(patient);
                let response = request.send().await?;

                if response.status() == StatusCode::CONFLICT {
                    let text = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ErrorBody>(&text)
                        .ok()
                        .and_then(|body| body.error)
                        .filter(|message| !message.is_empty())
                        .unwrap_or_else(|| DEFAULT_SERVER_ERR_MSG.to_string());
                    debug!(message = %message, "Patient already exists");
                    return Err(PharmacistError::Conflict(message));
                }

                Self::into_api_response(response).await
            })
            .await
    }

    /// Update a patient's reminder settings.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, settings), fields(profile_id = %patient_profile_id))]
    pub async fn update_reminder(
        &self,
        settings: &Value,
        patient_profile_id: &ProfileId,
    ) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "profiles", patient_profile_id.as_str()])?;
                self.send_json(Method::PUT, url, settings).await
            })
            .await
    }

    // =========================================================================
    // Orders and prescriptions
    // =========================================================================

    /// Open a prescription order for a patient.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self), fields(profile_id = %profile_id))]
    pub async fn create_order(&self, profile_id: &ProfileId) -> Result<Value, PharmacistError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct NewOrder<'a> {
            profile_id: &'a ProfileId,
        }

        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "prescription"])?;
                let response = self
                    .send_json(Method::POST, url, &NewOrder { profile_id })
                    .await?;
                Ok(response.data)
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &PharmacyOrderId) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "orders", order_id.as_str()])?;
                let request = self.request(Method::GET, url).await?;
                self.send(request).await
            })
            .await
    }

    /// Recent orders, newest first; `count` defaults to 10000.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, count: Option<u32>) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let mut url = self.url(&["pharmacist", "orders"])?;
                url.query_pairs_mut().append_pair(
                    "count",
                    &count.unwrap_or(DEFAULT_ORDER_COUNT).to_string(),
                );
                let request = self
                    .request(Method::GET, url)
                    .await?
                    .header(CONTENT_TYPE, FORM_URLENCODED);
                self.send_data(request).await
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, values), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        values: &Value,
        order_id: &PharmacyOrderId,
    ) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "orders", order_id.as_str()])?;
                self.send_json(Method::PUT, url, values).await
            })
            .await
    }

    /// Save the medication list of a prescription.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, medications), fields(prescription_id = %prescription_id))]
    pub async fn save_medications(
        &self,
        medications: &Value,
        prescription_id: &PrescriptionId,
    ) -> Result<ApiResponse, PharmacistError> {
        self.put_prescription(medications, prescription_id).await
    }

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, values), fields(prescription_id = %prescription_id))]
    pub async fn update_prescription(
        &self,
        values: &Value,
        prescription_id: &PrescriptionId,
    ) -> Result<ApiResponse, PharmacistError> {
        self.put_prescription(values, prescription_id).await
    }

    async fn put_prescription(
        &self,
        values: &Value,
        prescription_id: &PrescriptionId,
    ) -> Result<ApiResponse, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "prescription", prescription_id.as_str()])?;
                self.send_json(Method::PUT, url, values).await
            })
            .await
    }

    // =========================================================================
    // Medication reminders
    // =========================================================================

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self), fields(medication_id = %medication_id))]
    pub async fn get_medication_reminder(
        &self,
        medication_id: &MedicationId,
    ) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.url(&["pharmacist", "medications", medication_id.as_str(), "reminders"])?;
                let request = self
                    .request(Method::GET, url)
                    .await?
                    .header(CONTENT_TYPE, FORM_URLENCODED);
                self.send_data(request).await
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, values), fields(medication_id = %medication_id, reminder_type = %reminder_type))]
    pub async fn create_medication_reminder(
        &self,
        medication_id: &MedicationId,
        reminder_type: &str,
        values: &Value,
    ) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.reminder_url(medication_id, reminder_type)?;
                Ok(self.send_json(Method::POST, url, values).await?.data)
            })
            .await
    }

    /// Update a reminder; the reminder type is read from `values["type"]`.
    ///
    /// # Errors
    ///
    /// Returns `PharmacistError::InvalidArgument` if `values` has no string
    /// `type`, `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self, values), fields(medication_id = %medication_id))]
    pub async fn update_medication_reminder(
        &self,
        medication_id: &MedicationId,
        values: &Value,
    ) -> Result<Value, PharmacistError> {
        let reminder_type = values
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PharmacistError::InvalidArgument("reminder values must include a type".to_string())
            })?;

        self.guard()
            .run(|| async {
                let url = self.reminder_url(medication_id, reminder_type)?;
                Ok(self.send_json(Method::PUT, url, values).await?.data)
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `PharmacistError::SignedOut` if the session ended, or the
    /// upstream error.
    #[instrument(skip(self), fields(medication_id = %medication_id, reminder_type = %reminder_type))]
    pub async fn delete_medication_reminder(
        &self,
        medication_id: &MedicationId,
        reminder_type: &str,
    ) -> Result<Value, PharmacistError> {
        self.guard()
            .run(|| async {
                let url = self.reminder_url(medication_id, reminder_type)?;
                let request = self
                    .request(Method::DELETE, url)
                    .await?
                    .header(CONTENT_TYPE, FORM_URLENCODED);
                Ok(self.send(request).await?.data)
            })
            .await
    }

    fn reminder_url(
        &self,
        medication_id: &MedicationId,
        reminder_type: &str,
    ) -> Result<Url, PharmacistError> {
        self.url(&[
            "pharmacist",
            "medications",
            medication_id.as_str(),
            "reminders",
            reminder_type,
        ])
    }
}

fn token_header(token: &SecretString) -> Result<HeaderValue, PharmacistError> {
    let mut value = HeaderValue::from_str(token.expose_secret())
        .map_err(|e| PharmacistError::Config(format!("Invalid token format: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

impl std::fmt::Debug for PharmacistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PharmacistClient")
            .field("api_root", &self.inner.api_root.as_str())
            .field("guard", &self.inner.guard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::time::Duration;

    use chrono::{TimeDelta, Utc};
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::auth::{MemorySessionStore, StaticAuthenticator};
    use crate::error::SignOutReason;

    pub(crate) struct Harness {
        pub client: PharmacistClient,
        pub auth: Arc<StaticAuthenticator>,
        pub sessions: Arc<MemorySessionStore>,
    }

    /// Client pointed at a mock server with a freshly logged-in user.
    pub(crate) async fn logged_in(server: &mockito::ServerGuard) -> Harness {
        let harness = harness(server);
        harness.client.guard().record_login().await.unwrap();
        harness
    }

    pub(crate) fn harness(server: &mockito::ServerGuard) -> Harness {
        let auth = Arc::new(StaticAuthenticator::new(
            Some("pharm1".to_string()),
            SecretString::from("access-jwt"),
            SecretString::from("id-jwt"),
        ));
        let sessions = Arc::new(MemorySessionStore::new());
        let config = PharmacistConfig::new(Url::parse(&server.url()).unwrap())
            .with_session_ttl(Duration::from_secs(3600));
        let client = PharmacistClient::new(&config, auth.clone(), sessions.clone()).unwrap();
        Harness {
            client,
            auth,
            sessions,
        }
    }

    #[tokio::test]
    async fn test_sends_both_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pharmacist")
            .match_header("jwtaccesstoken", "access-jwt")
            .match_header("jwtidtoken", "id-jwt")
            .with_status(200)
            .with_body(r#"{"id":"ph-1","firstname":"Ada"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let pharmacist = h.client.get_pharmacist().await.unwrap();
        assert_eq!(pharmacist["firstname"], "Ada");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_session_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pharmacist")
            .expect(0)
            .create_async()
            .await;

        let h = harness(&server);
        h.sessions
            .set_login_time("pharm1", Utc::now() - TimeDelta::hours(2))
            .await;

        let result = h.client.get_pharmacist().await;
        assert!(matches!(
            result,
            Err(PharmacistError::SignedOut(SignOutReason::SessionExpired))
        ));
        assert!(h.auth.was_signed_out());
        assert_eq!(h.auth.redirects().await, vec!["/login".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_signs_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pharmacist/orders")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"jwt expired"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let result = h.client.get_orders(None).await;

        assert!(matches!(
            result,
            Err(PharmacistError::SignedOut(SignOutReason::Unauthorized))
        ));
        assert!(h.auth.was_signed_out());
        assert!(h.sessions.login_time("pharm1").await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pharmacist/reports/CRM")
            .with_status(500)
            .with_body(r#"{"error":"report generation failed"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        match h.client.get_crm_report().await {
            Err(PharmacistError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "report generation failed");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!h.auth.was_signed_out());
    }

    #[tokio::test]
    async fn test_orders_default_count_and_form_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pharmacist/orders")
            .match_query(Matcher::UrlEncoded("count".into(), "10000".into()))
            .match_header("content-type", FORM_URLENCODED)
            .with_status(200)
            .with_body(r#"[{"id":"o-1"}]"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let orders = h.client.get_orders(None).await.unwrap();
        assert_eq!(orders, json!([{ "id": "o-1" }]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_encodes_term() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pharmacist/profiles/search")
            .match_query(Matcher::UrlEncoded("q".into(), "smith & co".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let h = logged_in(&server).await;
        h.client.search_patients("smith & co").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_patient_conflict_uses_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/pharmacist/user")
            .with_status(409)
            .with_body(r#"{"error":"A patient with this email already exists"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let err = h
            .client
            .create_patient(&json!({ "email": "p@example.com" }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "A patient with this email already exists");
    }

    #[tokio::test]
    async fn test_create_patient_conflict_default_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/pharmacist/user")
            .with_status(409)
            .with_body("{}")
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let err = h.client.create_patient(&json!({})).await.unwrap_err();
        assert!(matches!(&err, PharmacistError::Conflict(m) if m == DEFAULT_SERVER_ERR_MSG));
    }

    #[tokio::test]
    async fn test_create_patient_other_errors_rethrown() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/pharmacist/user")
            .with_status(400)
            .with_body(r#"{"message":"email is required"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let err = h.client.create_patient(&json!({})).await.unwrap_err();
        assert!(matches!(err, PharmacistError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_create_patient_returns_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/pharmacist/user")
            .match_body(Matcher::Json(json!({ "email": "p@example.com" })))
            .with_status(201)
            .with_body(r#"{"profileId":"p-9"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let response = h
            .client
            .create_patient(&json!({ "email": "p@example.com" }))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.data["profileId"], "p-9");
    }

    #[tokio::test]
    async fn test_update_propagates_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/pharmacist")
            .match_body(Matcher::Json(json!({ "firstname": "Ada" })))
            .with_status(503)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let update = PharmacistUpdate {
            first_name: Some("Ada".to_string()),
            ..PharmacistUpdate::default()
        };
        let err = h.client.update(&update).await.unwrap_err();
        assert!(matches!(err, PharmacistError::Api { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_order_posts_profile_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pharmacist/prescription")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "profileId": "p-1" })))
            .with_status(200)
            .with_body(r#"{"prescriptionId":"rx-1"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let created = h.client.create_order(&"p-1".into()).await.unwrap();
        assert_eq!(created["prescriptionId"], "rx-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_prescription_and_order_updates() {
        let mut server = mockito::Server::new_async().await;
        let prescription = server
            .mock("PUT", "/pharmacist/prescription/rx-1")
            .match_body(Matcher::Json(json!({ "medications": [] })))
            .with_status(204)
            .expect(2)
            .create_async()
            .await;
        let order = server
            .mock("PUT", "/pharmacist/orders/o-1")
            .match_body(Matcher::Json(json!({ "status": "FILLED" })))
            .with_status(200)
            .with_body(r#"{"id":"o-1","status":"FILLED"}"#)
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let saved = h
            .client
            .save_medications(&json!({ "medications": [] }), &"rx-1".into())
            .await
            .unwrap();
        assert_eq!(saved.status, 204);
        assert_eq!(saved.data, Value::Null);
        h.client
            .update_prescription(&json!({ "medications": [] }), &"rx-1".into())
            .await
            .unwrap();
        let updated = h
            .client
            .update_order(&json!({ "status": "FILLED" }), &"o-1".into())
            .await
            .unwrap();
        assert_eq!(updated.data["status"], "FILLED");

        prescription.assert_async().await;
        order.assert_async().await;
    }

    #[tokio::test]
    async fn test_reminder_routes() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/pharmacist/medications/m-1/reminders")
            .match_header("content-type", FORM_URLENCODED)
            .with_status(200)
            .with_body(r#"[{"type":"DAILY"}]"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/pharmacist/medications/m-1/reminders/DAILY")
            .with_status(200)
            .with_body(r#"{"type":"DAILY","time":"08:00"}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/pharmacist/medications/m-1/reminders/DAILY")
            .match_body(Matcher::Json(json!({ "type": "DAILY", "time": "09:00" })))
            .with_status(200)
            .with_body(r#"{"type":"DAILY","time":"09:00"}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/pharmacist/medications/m-1/reminders/DAILY")
            .match_header("content-type", FORM_URLENCODED)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let h = logged_in(&server).await;
        let medication = MedicationId::from("m-1");
        h.client.get_medication_reminder(&medication).await.unwrap();
        h.client
            .create_medication_reminder(&medication, "DAILY", &json!({ "time": "08:00" }))
            .await
            .unwrap();
        let updated = h
            .client
            .update_medication_reminder(&medication, &json!({ "type": "DAILY", "time": "09:00" }))
            .await
            .unwrap();
        assert_eq!(updated["time"], "09:00");
        h.client
            .delete_medication_reminder(&medication, "DAILY")
            .await
            .unwrap();

        get.assert_async().await;
        create.assert_async().await;
        update.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_reminder_without_type_is_rejected() {
        let server = mockito::Server::new_async().await;
        let h = logged_in(&server).await;
        let result = h
            .client
            .update_medication_reminder(&"m-1".into(), &json!({ "time": "09:00" }))
            .await;
        assert!(matches!(result, Err(PharmacistError::InvalidArgument(_))));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let auth = Arc::new(StaticAuthenticator::new(
            None,
            SecretString::from("very-secret"),
            SecretString::from("also-secret"),
        ));
        let config = PharmacistConfig::new(Url::parse("https://api.example.com").unwrap());
        let client =
            PharmacistClient::new(&config, auth, Arc::new(MemorySessionStore::new())).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("api.example.com"));
        assert!(!debug.contains("very-secret"));
    }
}
