//! The personal scratchpad of saved links.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::resource::{FieldError, Payload, Resource};
use crate::api::{ApiClient, Envelope};
use crate::error::{Result, ZeefError};

const LINKS_KEY: &str = "scratchPadLinks";

/// One saved link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScratchpadLink {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Scratchpad {
    api: ApiClient,
    payload: Payload,
}

impl Scratchpad {
    /// Path of the current user's scratchpad
    pub const PATH: &'static str = "scratchPad/mine/";

    pub fn new(api: ApiClient, payload: Payload) -> Self {
        Self { api, payload }
    }

    /// Saved links, parsed from `scratchPadLinks`
    pub fn links(&self) -> Result<Vec<ScratchpadLink>> {
        let raw = self.get(LINKS_KEY)?;
        serde_json::from_value(raw.clone())
            .map_err(|_| FieldError::malformed(Self::KIND, LINKS_KEY, "list of links").into())
    }

    /// Save a URL; the link list is replaced with the server's copy
    pub async fn add_link(&mut self, url: &str) -> Result<Envelope> {
        if url.trim().is_empty() {
            return Err(ZeefError::InvalidArguments("url must not be empty".to_string()));
        }

        let path = format!("{}addLink", Self::PATH);
        let envelope = self
            .api
            .post_form(&path, vec![("url".to_string(), url.to_string())])
            .await?
            .into_result()?;

        let links = envelope
            .content
            .as_object()
            .and_then(|obj| obj.get(LINKS_KEY))
            .cloned()
            .ok_or_else(|| {
                ZeefError::UnexpectedContent(format!("response has no {} list", LINKS_KEY))
            })?;
        self.payload.insert(LINKS_KEY.to_string(), links);
        info!(url, "Scratchpad link added");

        Ok(envelope)
    }

    /// Remove a saved link. The endpoint answers with an empty body, so the
    /// link is dropped from the local list by id.
    pub async fn delete_link(&mut self, link_id: u64) -> Result<Envelope> {
        let path = format!("scratchPadLink/{}", link_id);
        let envelope = self.api.delete(&path).await?.into_result()?;

        if let Some(Value::Array(links)) = self.payload.get_mut(LINKS_KEY) {
            links.retain(|link| link.get("id").and_then(Value::as_u64) != Some(link_id));
        }
        info!(link_id, "Scratchpad link deleted");

        Ok(envelope)
    }
}

impl Resource for Scratchpad {
    const KIND: &'static str = "Scratchpad";

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Display for Scratchpad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload.get("id") {
            Some(Value::Number(id)) => write!(f, "Scratchpad {}", id),
            _ => write!(f, "Scratchpad ?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::transport::mock::MockTransport;
    use crate::api::Method;
    use serde_json::json;

    fn scratchpad(transport: Arc<MockTransport>) -> Scratchpad {
        let api = ApiClient::with_transport("https://zeef.io/api", "t", transport);
        let payload = json!({
            "id": 0,
            "owner": "APIUser",
            "scratchPadLinks": [
                {"id": 1, "scratchPadId": 0, "title": "one", "url": "https://one.example"},
                {"id": 2, "scratchPadId": 0, "title": "two", "url": "https://two.example"}
            ]
        });
        Scratchpad::new(api, payload.as_object().cloned().unwrap())
    }

    #[test]
    fn test_links() {
        let pad = scratchpad(Arc::new(MockTransport::new()));
        let links = pad.links().unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url.as_deref(), Some("https://one.example"));
        assert_eq!(links[1].title.as_deref(), Some("two"));
        assert_eq!(pad.get("owner").unwrap(), &json!("APIUser"));
        assert_eq!(pad.to_string(), "Scratchpad 0");
    }

    #[test]
    fn test_links_without_url() {
        let api = ApiClient::with_transport("https://zeef.io/api", "t", Arc::new(MockTransport::new()));
        let payload = json!({
            "id": 0,
            "scratchPadLinks": [
                {"id": 1, "scratchPadId": 0, "title": "no url"},
                {"id": 2, "scratchPadId": 0, "url": null, "title": null},
                {"id": 3, "url": "https://three.example"}
            ]
        });
        let pad = Scratchpad::new(api, payload.as_object().cloned().unwrap());

        let links = pad.links().unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].url, None);
        assert_eq!(links[0].title.as_deref(), Some("no url"));
        assert_eq!(links[1].url, None);
        assert_eq!(links[1].title, None);
        assert_eq!(links[2].url.as_deref(), Some("https://three.example"));
    }

    #[tokio::test]
    async fn test_add_link_resyncs_list() {
        let body = r#"{"id": 0, "scratchPadLinks": [
            {"id": 3, "url": "https://three.example", "title": "three"}
        ]}"#;
        let transport = Arc::new(MockTransport::new().respond(200, body));
        let mut pad = scratchpad(transport.clone());

        pad.add_link("https://three.example").await.unwrap();

        let links = pad.links().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, 3);

        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://zeef.io/api/scratchPad/mine/addLink");
        assert_eq!(
            request.form,
            Some(vec![("url".to_string(), "https://three.example".to_string())])
        );
    }

    #[tokio::test]
    async fn test_delete_link_removes_locally() {
        let transport = Arc::new(MockTransport::new().respond(204, ""));
        let mut pad = scratchpad(transport.clone());

        pad.delete_link(1).await.unwrap();

        let ids: Vec<u64> = pad.links().unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2]);
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.url, "https://zeef.io/api/scratchPadLink/1");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let transport = Arc::new(MockTransport::new().respond(404, "missing"));
        let mut pad = scratchpad(transport);

        assert!(pad.delete_link(1).await.is_err());
        assert_eq!(pad.links().unwrap().len(), 2);
    }
}
