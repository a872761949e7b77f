//! Page-to-document rendering.
//!
//! [`DocumentRenderer`] is the seam; [`MarkdownRenderer`] is the built-in
//! implementation, a minijinja template with a `slugify` filter.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::domain::Page;
use crate::error::Result;

const PAGE_TEMPLATE: &str = "\
# {{ title }}

## Contents

{% for block in blocks %}
- [{{ block.title }}](#{{ block.title | slugify }})
{% endfor %}
{% for block in blocks %}

## {{ block.title }}
{% endfor %}
";

const UNTITLED_PAGE: &str = "Untitled page";
const UNTITLED_BLOCK: &str = "Untitled block";

/// Turns a page into a textual document
pub trait DocumentRenderer {
    fn render(&self, page: &Page) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct BlockContext {
    title: String,
}

/// Markdown output: title, table of contents, one section per block
pub struct MarkdownRenderer {
    env: Environment<'static>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_filter("slugify", slugify);
        Self { env }
    }
}

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, page: &Page) -> Result<String> {
        let title = page.title()?.unwrap_or_else(|| UNTITLED_PAGE.to_string());
        let blocks: Vec<BlockContext> = page
            .blocks()?
            .iter()
            .map(|block| BlockContext {
                title: block.title().unwrap_or(UNTITLED_BLOCK).to_string(),
            })
            .collect();

        let template = self.env.template_from_str(PAGE_TEMPLATE)?;
        Ok(template.render(context! { title => title, blocks => blocks })?)
    }
}

/// Anchor slug: lowercase, runs of other characters collapse to `-`
pub fn slugify(value: String) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
