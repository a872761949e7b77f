//! Pages, page summaries and page types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::block::Block;
use super::resource::{patch_fields, to_form, FieldError, Payload, Resource};
use crate::api::{ApiClient, Envelope};
use crate::error::{Result, ZeefError};
use crate::render::{DocumentRenderer, MarkdownRenderer};

/// Kind of page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    Subject,
    Company,
    Personal,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Subject => "SUBJECT",
            PageType::Company => "COMPANY",
            PageType::Personal => "PERSONAL",
        }
    }
}

impl FromStr for PageType {
    type Err = ZeefError;

    /// Case-insensitive parse of `SUBJECT`, `COMPANY` or `PERSONAL`
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SUBJECT" => Ok(PageType::Subject),
            "COMPANY" => Ok(PageType::Company),
            "PERSONAL" => Ok(PageType::Personal),
            _ => Err(ZeefError::InvalidValue(format!(
                "page type should be SUBJECT, COMPANY or PERSONAL, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight page summary from `pages/mine`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOverview {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub curator: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page_type: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One subject alias of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub default_alias: bool,
}

/// A fully hydrated page
#[derive(Debug, Clone)]
pub struct Page {
    api: ApiClient,
    payload: Payload,
}

impl Page {
    pub fn new(api: ApiClient, payload: Payload) -> Self {
        Self { api, payload }
    }

    fn raw_aliases(&self) -> Result<&Vec<Value>> {
        let aliases = self
            .get("subject")?
            .get("aliases")
            .ok_or_else(|| FieldError::not_found(Self::KIND, "subject.aliases"))?;
        Ok(aliases
            .as_array()
            .ok_or_else(|| FieldError::malformed(Self::KIND, "subject.aliases", "array"))?)
    }

    /// Aliases under `subject.aliases`
    pub fn aliases(&self) -> Result<Vec<Alias>> {
        let aliases = self.raw_aliases()?;
        serde_json::from_value(Value::Array(aliases.clone()))
            .map_err(|_| FieldError::malformed(Self::KIND, "subject.aliases", "list of aliases").into())
    }

    /// Display name of the default alias, `Ok(None)` if no alias is the
    /// default. Only the default alias has to be well-formed.
    pub fn title(&self) -> Result<Option<String>> {
        let default = self
            .raw_aliases()?
            .iter()
            .find(|alias| alias.get("defaultAlias").and_then(Value::as_bool) == Some(true));

        match default {
            Some(alias) => {
                let name = alias
                    .get("displayName")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        FieldError::malformed(Self::KIND, "subject.aliases.displayName", "string")
                    })?;
                Ok(Some(name.to_string()))
            }
            None => Ok(None),
        }
    }

    /// Owner's full name
    pub fn owner(&self) -> Result<&str> {
        self.owner_field("fullName")
    }

    pub fn owner_username(&self) -> Result<&str> {
        self.owner_field("username")
    }

    fn owner_field(&self, key: &str) -> Result<&str> {
        let path = format!("owner.{}", key);
        self.get("owner")?
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| FieldError::not_found(Self::KIND, path).into())
    }

    /// Blocks built from the raw payload; rebuilt on every call
    pub fn blocks(&self) -> Result<Vec<Block>> {
        let raw = self
            .get("blocks")?
            .as_array()
            .ok_or_else(|| FieldError::malformed(Self::KIND, "blocks", "array"))?;
        raw.iter()
            .map(|item| {
                item.as_object()
                    .cloned()
                    .map(|payload| Block::new(self.api.clone(), payload))
                    .ok_or_else(|| FieldError::malformed(Self::KIND, "blocks", "array of objects").into())
            })
            .collect()
    }

    /// Markdown description, empty when absent
    pub fn description(&self) -> &str {
        self.payload
            .get("markdownDescription")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// `pageType`, if present
    pub fn page_type(&self) -> Option<&str> {
        self.payload.get("pageType").and_then(Value::as_str)
    }

    fn path(&self) -> Result<String> {
        Ok(format!("page/{}", self.id()?))
    }

    /// Update `type` (SUBJECT or COMPANY) and/or `description`.
    ///
    /// On success `pageType` and `markdownDescription` are patched from the
    /// response.
    pub async fn update(&mut self, data: &Payload) -> Result<Envelope> {
        let mut fields = Vec::new();

        if let Some(value) = data.get("type").filter(|v| !v.is_null()) {
            let page_type = value
                .as_str()
                .ok_or_else(|| ZeefError::InvalidValue("type must be a string".to_string()))?
                .parse::<PageType>()?;
            if page_type == PageType::Personal {
                return Err(ZeefError::InvalidValue(
                    "type must be SUBJECT or COMPANY".to_string(),
                ));
            }
            fields.push(("pageType".to_string(), Value::from(page_type.as_str())));
        }
        if let Some(description) = data.get("description").filter(|v| !v.is_null()) {
            fields.push(("markdownDescription".to_string(), description.clone()));
        }
        if fields.is_empty() {
            return Err(ZeefError::InvalidArguments(
                "page update needs a type or a description".to_string(),
            ));
        }

        // The server takes `type` but answers with `pageType`.
        let form = to_form(&fields)
            .into_iter()
            .map(|(k, v)| if k == "pageType" { ("type".to_string(), v) } else { (k, v) })
            .collect();

        let path = self.path()?;
        let envelope = self.api.post_form(&path, form).await?.into_result()?;
        patch_fields(&mut self.payload, &fields, &envelope.content);
        info!(page = %self, "Page updated");

        Ok(envelope)
    }

    /// Delete the page on the server. The local value stays usable.
    pub async fn delete(&self) -> Result<Envelope> {
        let path = self.path()?;
        let envelope = self.api.delete(&path).await?.into_result()?;
        info!(page = %self, "Page deleted");
        Ok(envelope)
    }

    /// Render with the default Markdown renderer
    pub fn to_markdown(&self) -> Result<String> {
        MarkdownRenderer::new().render(self)
    }
}

impl Resource for Page {
    const KIND: &'static str = "Page";

    fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload.get("id") {
            Some(Value::Number(id)) => write!(f, "Page {}", id),
            _ => write!(f, "Page ?"),
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

    fn page_body() -> Value {
        json!({
            "id": 1,
            "htmlDescription": "Testing Description",
            "links": [],
            "markdownDescription": "Testing Description",
            "owner": {"fullName": "Test Owner", "username": "test.owner"},
            "pageType": "SUBJECT",
            "subject": {
                "id": 777,
                "aliases": [
                    {"defaultAlias": false, "displayName": "Other Name", "id": 3832, "name": "other"},
                    {"defaultAlias": true, "displayName": "Test Page", "id": 3833, "name": "test-page"}
                ]
            },
            "blocks": [
                {"id": 10, "@type": "linkBlock", "title": "Block 1", "markdownDescription": "", "links": []},
                {"id": 11, "@type": "textBlock", "title": "Block 2", "htmlText": "<p>x</p>"}
            ]
        })
    }

    fn page_with(transport: Arc<MockTransport>, value: Value) -> Page {
        let api = ApiClient::with_transport("https://zeef.io/api", "t", transport);
        Page::new(api, value.as_object().cloned().unwrap())
    }

    fn page(value: Value) -> Page {
        page_with(Arc::new(MockTransport::new()), value)
    }

    #[test]
    fn test_derived_attributes() {
        let p = page(page_body());
        assert_eq!(p.title().unwrap().as_deref(), Some("Test Page"));
        assert_eq!(p.owner().unwrap(), "Test Owner");
        assert_eq!(p.owner_username().unwrap(), "test.owner");
        assert_eq!(p.description(), "Testing Description");
        assert_eq!(p.page_type(), Some("SUBJECT"));
        assert_eq!(p.aliases().unwrap().len(), 2);
        assert_eq!(p.to_string(), "Page 1");
    }

    #[test]
    fn test_title_without_default_alias() {
        let p = page(json!({"subject": {"aliases": [{"defaultAlias": false, "displayName": "X"}]}}));
        assert_eq!(p.title().unwrap(), None);
    }

    #[test]
    fn test_title_ignores_malformed_other_aliases() {
        let p = page(json!({"subject": {"aliases": [
            {"defaultAlias": false, "displayName": null, "id": "x"},
            {"name": "no-display-name"},
            {"defaultAlias": true, "displayName": "Real Title"}
        ]}}));
        assert_eq!(p.title().unwrap().as_deref(), Some("Real Title"));
    }

    #[test]
    fn test_title_reports_missing_subject() {
        let p = page(json!({"id": 1}));
        assert!(matches!(
            p.title(),
            Err(ZeefError::Field(FieldError::NotFound { key, .. })) if key == "subject"
        ));

        let p = page(json!({"subject": {"id": 7}}));
        assert!(matches!(
            p.title(),
            Err(ZeefError::Field(FieldError::NotFound { key, .. })) if key == "subject.aliases"
        ));

        let p = page(json!({"subject": {"aliases": "Test Page"}}));
        assert!(matches!(p.title(), Err(ZeefError::Field(FieldError::Malformed { .. }))));

        let p = page(json!({"subject": {"aliases": [{"defaultAlias": true, "displayName": 3}]}}));
        assert!(matches!(p.title(), Err(ZeefError::Field(FieldError::Malformed { .. }))));
    }

    #[test]
    fn test_missing_description_and_type() {
        let p = page(json!({"id": 2}));
        assert_eq!(p.description(), "");
        assert_eq!(p.page_type(), None);
        assert!(matches!(p.owner(), Err(ZeefError::Field(_))));
    }

    #[test]
    fn test_blocks_are_rebuilt_in_order() {
        let p = page(page_body());
        let blocks = p.blocks().unwrap();
        let titles: Vec<&str> = blocks.iter().map(|b| b.title().unwrap()).collect();
        assert_eq!(titles, vec!["Block 1", "Block 2"]);
        assert_eq!(blocks[1].kind().unwrap(), "text");
        assert_eq!(p.blocks().unwrap().len(), 2);
    }

    #[test]
    fn test_raw_keys_round_trip() {
        let body = page_body();
        let p = page(body.clone());
        for (key, value) in body.as_object().unwrap() {
            assert_eq!(p.get(key).unwrap(), value, "key {}", key);
        }
        assert!(p.get("notAKey").is_err());
    }

    #[test]
    fn test_page_type_parse() {
        assert_eq!("subject".parse::<PageType>().unwrap(), PageType::Subject);
        assert_eq!("COMPANY".parse::<PageType>().unwrap(), PageType::Company);
        assert_eq!("Personal".parse::<PageType>().unwrap(), PageType::Personal);
        assert!(matches!(
            "BLOG".parse::<PageType>(),
            Err(ZeefError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_overview_deserialize() {
        let overview: PageOverview = serde_json::from_value(json!({
            "id": 1,
            "url": "https://test.zeef.com/user",
            "subjectName": "test page",
            "curator": "user",
            "languageCode": null,
            "status": "published",
            "pageType": null,
            "imageUrl": "https://zeef.io/image/2635/100/s?1419350138591"
        }))
        .unwrap();
        assert_eq!(overview.id, 1);
        assert_eq!(overview.subject_name.as_deref(), Some("test page"));
        assert_eq!(overview.language_code, None);
    }

    #[tokio::test]
    async fn test_update_patches_from_response() {
        let transport = Arc::new(MockTransport::new().respond(
            200,
            r#"{"id": 1, "pageType": "COMPANY", "markdownDescription": "New"}"#,
        ));
        let mut p = page_with(transport.clone(), page_body());
        let data = json!({"type": "company", "description": "New", "ignored": true});

        p.update(data.as_object().unwrap()).await.unwrap();

        assert_eq!(p.page_type(), Some("COMPANY"));
        assert_eq!(p.description(), "New");
        assert_eq!(
            transport.requests()[0].form,
            Some(vec![
                ("type".to_string(), "COMPANY".to_string()),
                ("markdownDescription".to_string(), "New".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_failed_update_does_not_patch() {
        let transport = Arc::new(MockTransport::new().respond(400, r#"{"error": "bad type"}"#));
        let mut p = page_with(transport.clone(), page_body());
        let data = json!({"type": "COMPANY", "description": "Changed"});

        let err = p.update(data.as_object().unwrap()).await.unwrap_err();
        assert_eq!(err.envelope().map(|e| e.status), Some(400));
        assert_eq!(p.page_type(), Some("SUBJECT"));
        assert_eq!(p.description(), "Testing Description");
        assert_eq!(transport.requests()[0].url, "https://zeef.io/api/page/1");
    }

    #[tokio::test]
    async fn test_delete() {
        let transport = Arc::new(MockTransport::new().respond(204, ""));
        let p = page_with(transport.clone(), page_body());

        let envelope = p.delete().await.unwrap();
        assert_eq!(envelope.status, 204);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].url, "https://zeef.io/api/page/1");
        assert_eq!(requests[0].form, None);
        // The local value is still readable after deletion
        assert_eq!(p.title().unwrap().as_deref(), Some("Test Page"));
    }

    #[tokio::test]
    async fn test_failed_delete_surfaces_envelope() {
        let transport = Arc::new(MockTransport::new().respond(404, "missing"));
        let p = page_with(transport, page_body());

        let err = p.delete().await.unwrap_err();
        assert_eq!(err.envelope().map(|e| e.status), Some(404));
    }

    #[tokio::test]
    async fn test_update_rejects_personal_before_request() {
        let transport = Arc::new(MockTransport::new());
        let mut p = page_with(transport.clone(), page_body());
        let data = json!({"type": "PERSONAL"});

        assert!(matches!(
            p.update(data.as_object().unwrap()).await,
            Err(ZeefError::InvalidValue(_))
        ));
        assert!(transport.requests().is_empty());
    }
}
