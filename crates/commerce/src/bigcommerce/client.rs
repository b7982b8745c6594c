//! HTTP plumbing shared by the BigCommerce resource clients.

use std::sync::Arc;

use carebridge_core::ChannelId;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use super::BigCommerceError;
use crate::config::{BigCommerceConfig, CustomerLoginConfig};

/// BigCommerce API client.
///
/// Cheap to clone; all clones share one connection pool. Implements
/// [`CustomerApi`](super::CustomerApi), [`CartApi`](super::CartApi) and
/// [`OrderApi`](super::OrderApi).
#[derive(Clone)]
pub struct BigCommerceClient {
    inner: Arc<BigCommerceClientInner>,
}

struct BigCommerceClientInner {
    client: reqwest::Client,
    /// `{api_url}/stores/{store_hash}` without a trailing slash
    base_url: String,
    store_hash: String,
    channel_id: ChannelId,
    customer_login: Option<CustomerLoginConfig>,
}

/// v3 response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// v3 error body (`{"status":422,"title":"...","errors":{...}}`).
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl BigCommerceClient {
    /// Create a new BigCommerce API client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &BigCommerceConfig) -> Result<Self, BigCommerceError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| BigCommerceError::Config(format!("Invalid access token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert("X-Auth-Token", token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = format!(
            "{}/stores/{}",
            config.api_url.as_str().trim_end_matches('/'),
            config.store_hash
        );

        Ok(Self {
            inner: Arc::new(BigCommerceClientInner {
                client,
                base_url,
                store_hash: config.store_hash.clone(),
                channel_id: config.channel_id,
                customer_login: config.customer_login.clone(),
            }),
        })
    }

    pub(crate) fn store_hash(&self) -> &str {
        &self.inner.store_hash
    }

    pub(crate) fn channel_id(&self) -> ChannelId {
        self.inner.channel_id
    }

    pub(crate) fn customer_login(&self) -> Option<&CustomerLoginConfig> {
        self.inner.customer_login.as_ref()
    }

    /// Build an absolute endpoint URL from a store-relative path.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, BigCommerceError> {
        Url::parse(&format!("{}{path}", self.inner.base_url))
            .map_err(|e| BigCommerceError::Config(format!("Invalid endpoint {path}: {e}")))
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    pub(crate) fn endpoint_segments(&self, segments: &[&str]) -> Result<Url, BigCommerceError> {
        let mut url = self.endpoint("")?;
        url.path_segments_mut()
            .map_err(|()| BigCommerceError::Config("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a v3 resource and unwrap its envelope.
    pub(crate) async fn get_v3<T: DeserializeOwned>(&self, url: Url) -> Result<T, BigCommerceError> {
        let response = self.inner.client.get(url).send().await?;
        let envelope: Envelope<T> = self.handle_response(response).await?;
        Ok(envelope.data)
    }

    /// GET a v3 resource, mapping 404 to `None`.
    pub(crate) async fn get_v3_optional<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, BigCommerceError> {
        let response = self.inner.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: Envelope<T> = self.handle_response(response).await?;
        Ok(Some(envelope.data))
    }

    /// POST to a v3 endpoint and unwrap the envelope.
    pub(crate) async fn post_v3<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, BigCommerceError> {
        let response = self.inner.client.post(url).json(body).send().await?;
        let envelope: Envelope<T> = self.handle_response(response).await?;
        Ok(envelope.data)
    }

    /// PUT to a v3 endpoint and unwrap the envelope.
    pub(crate) async fn put_v3<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, BigCommerceError> {
        let response = self.inner.client.put(url).json(body).send().await?;
        let envelope: Envelope<T> = self.handle_response(response).await?;
        Ok(envelope.data)
    }

    /// DELETE a v3 resource that answers with the parent document.
    pub(crate) async fn delete_v3<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, BigCommerceError> {
        let response = self.inner.client.delete(url).send().await?;
        let envelope: Envelope<T> = self.handle_response(response).await?;
        Ok(envelope.data)
    }

    /// DELETE a resource, ignoring any body.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), BigCommerceError> {
        let response = self.inner.client.delete(url).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    /// GET a single v2 resource.
    pub(crate) async fn get_v2<T: DeserializeOwned>(&self, url: Url) -> Result<T, BigCommerceError> {
        let response = self.inner.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// GET a v2 list, treating `204 No Content` as an empty list.
    pub(crate) async fn get_v2_list<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Vec<T>, BigCommerceError> {
        let response = self.inner.client.get(url).send().await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        self.handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BigCommerceError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| BigCommerceError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse error response from BigCommerce.
    async fn parse_error(response: reqwest::Response) -> BigCommerceError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("X-Rate-Limit-Time-Reset-Ms")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map_or(1, |ms| ms.div_ceil(1000));
            return BigCommerceError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return BigCommerceError::Unauthorized;
        }

        let url = response.url().path().to_string();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == 404 {
            return BigCommerceError::NotFound(url);
        }

        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.title.or(body.detail))
            .unwrap_or(text);

        BigCommerceError::Api { status, message }
    }
}

impl std::fmt::Debug for BigCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigCommerceClient")
            .field("base_url", &self.inner.base_url)
            .field("channel_id", &self.inner.channel_id)
            .finish_non_exhaustive()
    }
}
