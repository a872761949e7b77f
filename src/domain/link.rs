//! Links: a URL with a title, curated inside a block.

use std::fmt;

use tracing::info;

use super::resource::{allowlist, to_form, Allowed, Payload, Resource};
use crate::api::{ApiClient, Envelope};
use crate::error::{Result, ZeefError};

const UPDATABLE: &[Allowed] = &[
    Allowed { key: "url", field: "url" },
    Allowed { key: "title", field: "title" },
    Allowed { key: "description", field: "description" },
];

/// A single curated link (`url`, `title`, `hostname`, ...)
#[derive(Debug, Clone)]
pub struct Link {
    api: ApiClient,
    payload: Payload,
}

impl Link {
    pub fn new(api: ApiClient, payload: Payload) -> Self {
        Self { api, payload }
    }

    pub fn url(&self) -> Result<&str> {
        Ok(self.get_str("url")?)
    }

    pub fn title(&self) -> Result<&str> {
        Ok(self.get_str("title")?)
    }

    pub fn hostname(&self) -> Result<&str> {
        Ok(self.get_str("hostname")?)
    }

    fn path(&self) -> Result<String> {
        Ok(format!("link/{}", self.id()?))
    }

    /// Update `url`, `title` and/or `description`.
    ///
    /// On success every field of the server's response object is copied
    /// into the local payload.
    pub async fn update(&mut self, data: &Payload) -> Result<Envelope> {
        let fields = allowlist(data, UPDATABLE);
        if fields.is_empty() {
            return Err(ZeefError::InvalidArguments(
                "link update needs at least one of url, title, description".to_string(),
            ));
        }

        let path = self.path()?;
        let envelope = self.api.post_form(&path, to_form(&fields)).await?.into_result()?;

        match envelope.content.as_object() {
            Some(updated) => {
                for (key, value) in updated {
                    self.payload.insert(key.clone(), value.clone());
                }
            }
            None => {
                for (key, value) in fields {
                    self.payload.insert(key, value);
                }
            }
        }
        info!(link = %self, "Link updated");

        Ok(envelope)
    }

    /// Delete the link on the server. The local value stays usable.
    pub async fn delete(&self) -> Result<Envelope> {
        let path = self.path()?;
        let envelope = self.api.delete(&path).await?.into_result()?;
        info!(link = %self, "Link deleted");
        Ok(envelope)
    }
}

impl Resource for Link {
    const KIND: &'static str = "Link";

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload.get("url").and_then(|v| v.as_str()) {
            Some(url) => write!(f, "Link {}", url),
            None => write!(f, "Link ?"),
        }
    }
}
