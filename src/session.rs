//! The entry point: an authenticated ZEEF session.
//!
//! A [`Zeef`] starts unauthenticated. [`Zeef::authenticate`] lists the
//! caller's pages and, depending on the [`Hydration`] policy, fetches each
//! one in full.

use std::fmt;

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiClient, Content, Envelope, DEFAULT_API_URL};
use crate::config::ResolvedConfig;
use crate::domain::{Block, Link, Page, PageOverview, PageType, Scratchpad};
use crate::error::{Result, ZeefError};

/// What `authenticate` does with the listed pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hydration {
    /// Keep the summaries only
    #[default]
    Overviews,
    /// Fetch every page; failed fetches are reported, not fatal
    BestEffort,
    /// Fetch every page; the first failure aborts authentication
    FailFast,
}

/// A page that could not be hydrated
#[derive(Debug)]
pub struct HydrationFailure {
    pub page_id: u64,
    pub error: ZeefError,
}

/// Outcome of a successful `authenticate`
#[derive(Debug)]
pub struct AuthReport {
    /// The `pages/mine` response
    pub envelope: Envelope,
    /// Pages skipped under [`Hydration::BestEffort`]
    pub failures: Vec<HydrationFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Identifies a page by id, or by alias and username
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page_id: Option<u64>,
    pub alias: Option<String>,
    pub username: Option<String>,
}

impl PageQuery {
    pub fn by_id(page_id: u64) -> Self {
        Self {
            page_id: Some(page_id),
            ..Default::default()
        }
    }

    pub fn by_alias(alias: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            username: Some(username.into()),
            ..Default::default()
        }
    }

    /// Request path; the id wins when both forms are given
    fn path(&self) -> Result<String> {
        if let Some(id) = self.page_id {
            return Ok(format!("page/{}", id));
        }
        match (non_empty(&self.alias), non_empty(&self.username)) {
            (Some(alias), Some(username)) => Ok(format!(
                "page/{}/{}",
                urlencoding::encode(alias),
                urlencoding::encode(username)
            )),
            _ => Err(ZeefError::InvalidArguments(
                "pass a page_id, or an alias and a username, to fetch a page".to_string(),
            )),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// ZEEF API session
pub struct Zeef {
    api: ApiClient,
    state: SessionState,
    overviews: Vec<PageOverview>,
    pages: Vec<Page>,
}

impl fmt::Debug for Zeef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zeef")
            .field("base_url", &self.api.base_url())
            .field("state", &self.state)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl Zeef {
    /// Session against the default API origin
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_api(ApiClient::new(DEFAULT_API_URL, token, None)?))
    }

    /// Session from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Ok(Self::with_api(ApiClient::from_config(config)?))
    }

    /// Session over an existing API handle
    pub fn with_api(api: ApiClient) -> Self {
        Self {
            api,
            state: SessionState::Unauthenticated,
            overviews: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn token(&self) -> &str {
        self.api.token()
    }

    pub fn auth_header(&self) -> String {
        self.api.auth_header()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Page summaries from the last successful `authenticate`
    pub fn overviews(&self) -> &[PageOverview] {
        &self.overviews
    }

    /// Hydrated pages; empty unless authentication hydrated them
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Verify the token by listing the caller's pages.
    ///
    /// A rejected token returns `ZeefError::Api` carrying the response
    /// envelope and leaves the session unauthenticated and empty.
    pub async fn authenticate(&mut self, hydration: Hydration) -> Result<AuthReport> {
        self.state = SessionState::Unauthenticated;
        self.overviews.clear();
        self.pages.clear();

        let envelope = self.api.get("pages/mine").await?;
        if !envelope.is_success() {
            warn!(status = envelope.status, "Authentication rejected");
            return Err(ZeefError::Api(envelope));
        }

        let overviews = match &envelope.content {
            Content::Json(value) => parse_overviews(value)?,
            Content::Text(_) => {
                return Err(ZeefError::UnexpectedContent(
                    "pages/mine answered with a non-JSON body".to_string(),
                ))
            }
        };

        let mut failures = Vec::new();
        let mut pages = Vec::new();
        if hydration != Hydration::Overviews {
            for overview in &overviews {
                match self.fetch_page(&PageQuery::by_id(overview.id)).await {
                    Ok(page) => pages.push(page),
                    Err(error) if hydration == Hydration::BestEffort => {
                        warn!(page_id = overview.id, error = %error, "Skipping page that failed to load");
                        failures.push(HydrationFailure {
                            page_id: overview.id,
                            error,
                        });
                    }
                    Err(error) => return Err(error),
                }
            }
        }

        info!(
            pages = overviews.len(),
            hydrated = pages.len(),
            failed = failures.len(),
            "Authenticated"
        );
        self.overviews = overviews;
        self.pages = pages;
        self.state = SessionState::Authenticated;

        Ok(AuthReport { envelope, failures })
    }

    /// Fetch one page by id, or by alias and username
    pub async fn fetch_page(&self, query: &PageQuery) -> Result<Page> {
        let path = query.path()?;
        let payload = self.api.get(&path).await?.into_result()?.into_payload()?;
        Ok(Page::new(self.api.clone(), payload))
    }

    pub async fn fetch_block(&self, block_id: u64) -> Result<Block> {
        let path = format!("block/{}", block_id);
        let payload = self.api.get(&path).await?.into_result()?.into_payload()?;
        Ok(Block::new(self.api.clone(), payload))
    }

    pub async fn fetch_link(&self, link_id: u64) -> Result<Link> {
        let path = format!("link/{}", link_id);
        let payload = self.api.get(&path).await?.into_result()?.into_payload()?;
        Ok(Link::new(self.api.clone(), payload))
    }

    /// The caller's scratchpad
    pub async fn fetch_scratchpad(&self) -> Result<Scratchpad> {
        let payload = self
            .api
            .get(Scratchpad::PATH)
            .await?
            .into_result()?
            .into_payload()?;
        Ok(Scratchpad::new(self.api.clone(), payload))
    }

    /// Create a page; `page_type` must be SUBJECT, COMPANY or PERSONAL
    pub async fn create_page(&self, name: &str, language: &str, page_type: &str) -> Result<Page> {
        let page_type: PageType = page_type.parse()?;
        if name.trim().is_empty() {
            return Err(ZeefError::InvalidArguments("page name must not be empty".to_string()));
        }

        let form = vec![
            ("displayName".to_string(), name.to_string()),
            ("languageCode".to_string(), language.to_string()),
            ("type".to_string(), page_type.as_str().to_string()),
        ];
        let payload = self
            .api
            .post_form("page/create", form)
            .await?
            .into_result()?
            .into_payload()?;
        let page = Page::new(self.api.clone(), payload);
        info!(page = %page, name, page_type = %page_type, "Page created");

        Ok(page)
    }
}

fn parse_overviews(value: &Value) -> Result<Vec<PageOverview>> {
    let list = value.get("pageOverviews").ok_or_else(|| {
        ZeefError::UnexpectedContent("response has no pageOverviews".to_string())
    })?;
    Ok(serde_json::from_value(list.clone())?)
}
