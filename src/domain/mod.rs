//! API resources.
//!
//! Every resource wraps the raw payload of one API response:
//! - Page: a curated page with aliases, owner and blocks
//! - Block: a section of a page (links, text, image, ...)
//! - Link: a single curated URL
//! - Scratchpad: the user's saved links

pub mod block;
pub mod link;
pub mod page;
pub mod resource;
pub mod scratchpad;

// Re-export commonly used types
pub use block::{Block, BlockLinks};
pub use link::Link;
pub use page::{Alias, Page, PageOverview, PageType};
pub use resource::{FieldError, Payload, Resource};
pub use scratchpad::{Scratchpad, ScratchpadLink};
