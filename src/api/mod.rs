//! Authenticated access to the ZEEF REST API.
//!
//! [`ApiClient`] carries the base URL, the token and the transport. Every
//! resource gets a clone of it on construction, so there is no global
//! endpoint state.

pub mod envelope;
pub mod transport;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::error::{Result, ZeefError};

pub use envelope::{normalize_response, Content, Envelope};
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport};

/// Default API origin
pub const DEFAULT_API_URL: &str = "https://zeef.io/api";

/// Clonable handle used by the session and every resource
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: Arc<str>,
    token: Arc<str>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client over an explicit transport
    pub fn with_transport(
        base_url: impl Into<String>,
        token: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let base_url: String = base_url.into();
        let token: String = token.into();
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').into(),
            token: token.into(),
        }
    }

    /// Create a client using the `reqwest` transport
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(timeout)?;
        Ok(Self::with_transport(base_url, token, Arc::new(transport)))
    }

    /// Create from resolved configuration; a token is required
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let token = config.token.clone().ok_or_else(|| {
            ZeefError::InvalidArguments("no API token configured (set ZEEF_TOKEN)".to_string())
        })?;
        Self::new(
            config.api_url.clone(),
            token,
            config.timeout_seconds.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value of the `Authorization` header
    pub fn auth_header(&self) -> String {
        format!("OmniLogin auth={}", self.token)
    }

    /// Build `<base>/<path>`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        form: Option<Vec<(String, String)>>,
    ) -> Result<Envelope> {
        let request = ApiRequest {
            method,
            url: self.url(path),
            headers: vec![("Authorization".to_string(), self.auth_header())],
            form,
        };
        debug!(method = method.as_str(), url = %request.url, "Sending request");

        let response = self.transport.send(request).await?;
        debug!(status = response.status, "Received response");

        Ok(normalize_response(response))
    }

    /// GET a path and normalize the response (any status)
    pub async fn get(&self, path: &str) -> Result<Envelope> {
        self.send(Method::Get, path, None).await
    }

    /// POST a form body and normalize the response (any status)
    pub async fn post_form(&self, path: &str, form: Vec<(String, String)>) -> Result<Envelope> {
        self.send(Method::Post, path, Some(form)).await
    }

    /// DELETE a path and normalize the response (any status)
    pub async fn delete(&self, path: &str) -> Result<Envelope> {
        self.send(Method::Delete, path, None).await
    }
}

/// Render a JSON value as a form field; `None` for null
pub fn form_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::transport::mock::MockTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_building() {
        let api = ApiClient::with_transport("https://zeef.io/api/", "t", Arc::new(MockTransport::new()));
        assert_eq!(api.base_url(), "https://zeef.io/api");
        assert_eq!(api.url("pages/mine"), "https://zeef.io/api/pages/mine");
        assert_eq!(api.url("/block/3"), "https://zeef.io/api/block/3");
    }

    #[test]
    fn test_auth_header() {
        let api = ApiClient::with_transport(DEFAULT_API_URL, "abc", Arc::new(MockTransport::new()));
        assert_eq!(api.auth_header(), "OmniLogin auth=abc");
        assert_eq!(api.token(), "abc");
    }

    #[test]
    fn test_form_value() {
        assert_eq!(form_value(&json!("x")), Some("x".to_string()));
        assert_eq!(form_value(&json!(true)), Some("true".to_string()));
        assert_eq!(form_value(&json!(12)), Some("12".to_string()));
        assert_eq!(form_value(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_requests_carry_auth_header() {
        let transport = Arc::new(MockTransport::new().respond(200, "{}"));
        let api = ApiClient::with_transport(DEFAULT_API_URL, "tok", transport.clone());

        let envelope = api
            .post_form("page/create", vec![("displayName".into(), "x".into())])
            .await
            .unwrap();
        assert_eq!(envelope.status, 200);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, "https://zeef.io/api/page/create");
        assert_eq!(
            requests[0].headers,
            vec![("Authorization".to_string(), "OmniLogin auth=tok".to_string())]
        );
        assert_eq!(
            requests[0].form,
            Some(vec![("displayName".to_string(), "x".to_string())])
        );
    }
}
