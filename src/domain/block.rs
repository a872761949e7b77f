//! Blocks: the sections of a page.
//!
//! The payload `@type` is `"<kind>Block"` (`linkBlock`, `textBlock`,
//! `imageBlock`, ...). What `links` means depends on the kind.

use std::fmt;

use serde_json::Value;
use tracing::info;

use super::link::Link;
use super::resource::{allowlist, patch_fields, to_form, Allowed, FieldError, Payload, Resource};
use crate::api::{ApiClient, Envelope};
use crate::error::{Result, ZeefError};

const UPDATABLE: &[Allowed] = &[
    Allowed { key: "title", field: "title" },
    Allowed { key: "promoted", field: "promoted" },
    Allowed { key: "publicly_visible", field: "publiclyVisible" },
];
const TEXT_UPDATABLE: &[Allowed] = &[Allowed { key: "markdown_text", field: "markdownText" }];
const LINK_UPDATABLE: &[Allowed] = &[Allowed {
    key: "markdown_description",
    field: "markdownDescription",
}];

/// Content of a block, by kind
#[derive(Debug, Clone)]
pub enum BlockLinks {
    /// `link`, `feed` and `latestPages` blocks
    Links(Vec<Link>),
    /// `image` blocks: the image URL
    Image(String),
    /// `text` blocks: the HTML text
    Text(String),
    /// Any other kind
    Empty,
}

impl BlockLinks {
    /// Link instances, empty for non-link kinds
    pub fn links(&self) -> &[Link] {
        match self {
            BlockLinks::Links(links) => links,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    api: ApiClient,
    payload: Payload,
}

impl Block {
    pub fn new(api: ApiClient, payload: Payload) -> Self {
        Self { api, payload }
    }

    /// Kind from `@type` with the `Block` suffix stripped
    pub fn kind(&self) -> Result<&str> {
        let raw = self.get_str("@type")?;
        Ok(raw.find("Block").map(|i| &raw[..i]).unwrap_or(raw))
    }

    pub fn title(&self) -> Result<&str> {
        Ok(self.get_str("title")?)
    }

    /// Links, image URL or HTML text depending on the kind.
    ///
    /// Link instances are rebuilt from the payload on every call.
    pub fn links(&self) -> Result<BlockLinks> {
        match self.kind()? {
            "link" | "feed" | "latestPages" => {
                let raw = self
                    .get("links")?
                    .as_array()
                    .ok_or_else(|| FieldError::malformed(Self::KIND, "links", "array"))?;
                let mut links = Vec::with_capacity(raw.len());
                for item in raw {
                    let payload = item
                        .as_object()
                        .cloned()
                        .ok_or_else(|| FieldError::malformed(Self::KIND, "links", "array of objects"))?;
                    links.push(Link::new(self.api.clone(), payload));
                }
                Ok(BlockLinks::Links(links))
            }
            "image" => Ok(BlockLinks::Image(self.get_str("imageURL")?.to_string())),
            "text" => Ok(BlockLinks::Text(self.get_str("htmlText")?.to_string())),
            _ => Ok(BlockLinks::Empty),
        }
    }

    /// Markdown description for `link` and `feed` blocks, otherwise empty
    pub fn description(&self) -> Result<&str> {
        match self.kind()? {
            "link" | "feed" => Ok(self.get_str("markdownDescription")?),
            _ => Ok(""),
        }
    }

    fn path(&self) -> Result<String> {
        Ok(format!("block/{}", self.id()?))
    }

    /// Update `title`, `promoted`, `publicly_visible`, plus `markdown_text`
    /// on text blocks and `markdown_description` on link blocks.
    ///
    /// Keys are sent under their camelCase server names; the forwarded
    /// fields are patched into the payload on success.
    pub async fn update(&mut self, data: &Payload) -> Result<Envelope> {
        let mut fields = allowlist(data, UPDATABLE);
        match self.kind()? {
            "text" => fields.extend(allowlist(data, TEXT_UPDATABLE)),
            "link" => fields.extend(allowlist(data, LINK_UPDATABLE)),
            _ => {}
        }
        if fields.is_empty() {
            return Err(ZeefError::InvalidArguments(
                "block update has no recognized fields".to_string(),
            ));
        }

        let path = self.path()?;
        let envelope = self.api.post_form(&path, to_form(&fields)).await?.into_result()?;
        patch_fields(&mut self.payload, &fields, &envelope.content);
        info!(block = %self, fields = fields.len(), "Block updated");

        Ok(envelope)
    }

    /// Delete the block on the server. The local value stays usable.
    pub async fn delete(&self) -> Result<Envelope> {
        let path = self.path()?;
        let envelope = self.api.delete(&path).await?.into_result()?;
        info!(block = %self, "Block deleted");
        Ok(envelope)
    }
}

impl Resource for Block {
    const KIND: &'static str = "Block";

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload.get("id") {
            Some(Value::Number(id)) => write!(f, "Block {}", id),
            _ => write!(f, "Block ?"),
        }
    }
}
