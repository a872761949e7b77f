//! zeef - client for the ZEEF content-curation API
//!
//! Fetches pages, blocks, links and the personal scratchpad over HTTPS,
//! wraps each JSON payload in a typed resource, and renders pages as
//! Markdown documents.
//!
//! # Architecture
//!
//! - Every request goes through an [`api::ApiClient`], which carries the
//!   base URL and token and is handed to each resource it creates
//! - Resources keep the raw payload; derived attributes (`title`, `owner`,
//!   `blocks`, ...) are computed from it on each call
//! - Non-2xx responses surface as `ZeefError::Api` with the
//!   `{status, content}` envelope attached
//!
//! # Modules
//!
//! - `api`: Transport, envelope and authenticated API handle
//! - `domain`: Resources (Page, Block, Link, Scratchpad)
//! - `session`: The `Zeef` entry point
//! - `render`: Page-to-document rendering
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```no_run
//! use zeef::{Hydration, PageQuery, Zeef};
//!
//! # async fn example() -> zeef::Result<()> {
//! let mut zeef = Zeef::new("my-token")?;
//! zeef.authenticate(Hydration::BestEffort).await?;
//! for page in zeef.pages() {
//!     println!("{}", page.to_markdown()?);
//! }
//!
//! let page = zeef.fetch_page(&PageQuery::by_alias("rust", "alice")).await?;
//! println!("{:?}", page.title()?);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod session;

// Re-export main types at crate root for convenience
pub use api::{ApiClient, Content, Envelope};
pub use domain::{
    Block, BlockLinks, FieldError, Link, Page, PageOverview, PageType, Payload, Resource,
    Scratchpad, ScratchpadLink,
};
pub use error::{Result, ZeefError};
pub use render::{DocumentRenderer, MarkdownRenderer};
pub use session::{AuthReport, Hydration, HydrationFailure, PageQuery, Zeef};
