//! Command-line interface for zeef.
//!
//! Provides commands for listing and inspecting pages, blocks and links,
//! creating pages, rendering a page as Markdown, and managing the
//! scratchpad.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::ApiClient;
use crate::config::{load_config, ResolvedConfig};
use crate::domain::{BlockLinks, Page, Resource};
use crate::session::{Hydration, PageQuery, Zeef};

/// zeef - ZEEF content-curation API client
#[derive(Parser, Debug)]
#[command(name = "zeef")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API token (OmniLogin)
    #[arg(long, global = true, env = "ZEEF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API origin
    #[arg(long, global = true, env = "ZEEF_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List your pages
    Pages {
        /// Fetch every page in full
        #[arg(long)]
        hydrate: bool,
    },

    /// Show a page by id, or by alias and username
    Page {
        /// Page ID
        id: Option<u64>,

        /// Page alias (with --username)
        #[arg(long)]
        alias: Option<String>,

        /// Page owner username (with --alias)
        #[arg(long)]
        username: Option<String>,

        /// Print the page as a Markdown document
        #[arg(short, long)]
        markdown: bool,
    },

    /// Show a block
    Block {
        /// Block ID
        id: u64,
    },

    /// Show a link
    Link {
        /// Link ID
        id: u64,
    },

    /// Create a page
    CreatePage {
        /// Display name
        name: String,

        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,

        /// SUBJECT, COMPANY or PERSONAL
        #[arg(short = 't', long = "type", default_value = "SUBJECT")]
        page_type: String,
    },

    /// Manage the scratchpad
    Scratchpad {
        #[command(subcommand)]
        command: ScratchpadCommands,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Subcommand, Debug)]
pub enum ScratchpadCommands {
    /// List saved links
    List,

    /// Save a URL
    Add {
        url: String,
    },

    /// Remove a saved link
    Delete {
        id: u64,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut config = load_config()?;
        if let Some(token) = self.token {
            config.token = Some(token);
        }
        if let Some(url) = self.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        match self.command {
            Commands::Config => show_config(&config),
            Commands::Pages { hydrate } => list_pages(&config, hydrate).await,
            Commands::Page {
                id,
                alias,
                username,
                markdown,
            } => {
                let query = PageQuery {
                    page_id: id,
                    alias,
                    username,
                };
                show_page(&config, &query, markdown).await
            }
            Commands::Block { id } => show_block(&config, id).await,
            Commands::Link { id } => show_link(&config, id).await,
            Commands::CreatePage {
                name,
                language,
                page_type,
            } => create_page(&config, &name, &language, &page_type).await,
            Commands::Scratchpad { command } => scratchpad(&config, command).await,
        }
    }
}

fn session(config: &ResolvedConfig) -> Result<Zeef> {
    let api = ApiClient::from_config(config).context("Failed to set up API client")?;
    Ok(Zeef::with_api(api))
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("api_url: {}", config.api_url);
    println!(
        "token: {}",
        if config.token.is_some() { "(set)" } else { "(not set)" }
    );
    match config.timeout_seconds {
        Some(secs) => println!("timeout: {}s", secs),
        None => println!("timeout: (transport default)"),
    }
    match &config.config_file {
        Some(path) => println!("config_file: {}", path.display()),
        None => println!("config_file: (none)"),
    }
    Ok(())
}

async fn list_pages(config: &ResolvedConfig, hydrate: bool) -> Result<()> {
    let mut zeef = session(config)?;
    let hydration = if hydrate {
        Hydration::BestEffort
    } else {
        Hydration::Overviews
    };
    let report = zeef
        .authenticate(hydration)
        .await
        .context("Authentication failed")?;

    if hydrate {
        for page in zeef.pages() {
            print_page_line(page);
        }
        for failure in &report.failures {
            eprintln!("page {} failed to load: {}", failure.page_id, failure.error);
        }
    } else {
        for overview in zeef.overviews() {
            println!(
                "{:>8}  {:<40}  {}",
                overview.id,
                overview.subject_name.as_deref().unwrap_or("-"),
                overview.url.as_deref().unwrap_or("-")
            );
        }
    }

    if zeef.overviews().is_empty() {
        println!("No pages.");
    }
    Ok(())
}

fn print_page_line(page: &Page) {
    let id = page.id().map(|id| id.to_string()).unwrap_or_else(|_| "?".into());
    println!(
        "{:>8}  {:<40}  {}",
        id,
        page.title().ok().flatten().unwrap_or_else(|| "-".into()),
        page.page_type().unwrap_or("-")
    );
}

async fn show_page(config: &ResolvedConfig, query: &PageQuery, markdown: bool) -> Result<()> {
    let zeef = session(config)?;
    let page = zeef.fetch_page(query).await.context("Failed to fetch page")?;

    if markdown {
        println!("{}", page.to_markdown()?);
        return Ok(());
    }

    println!("{}", page);
    println!("  title: {}", page.title()?.unwrap_or_else(|| "-".into()));
    println!("  owner: {}", page.owner().unwrap_or("-"));
    println!("  type: {}", page.page_type().unwrap_or("-"));
    if !page.description().is_empty() {
        println!("  description: {}", page.description());
    }
    for block in page.blocks()? {
        println!(
            "  - {} [{}] {}",
            block,
            block.kind().unwrap_or("?"),
            block.title().unwrap_or("-")
        );
    }
    Ok(())
}

async fn show_block(config: &ResolvedConfig, id: u64) -> Result<()> {
    let zeef = session(config)?;
    let block = zeef.fetch_block(id).await.context("Failed to fetch block")?;

    println!("{} [{}] {}", block, block.kind()?, block.title().unwrap_or("-"));
    match block.links()? {
        BlockLinks::Links(links) => {
            for link in links {
                println!("  - {} {}", link.title().unwrap_or("-"), link.url().unwrap_or("-"));
            }
        }
        BlockLinks::Image(url) => println!("  image: {}", url),
        BlockLinks::Text(html) => println!("{}", html),
        BlockLinks::Empty => {}
    }
    Ok(())
}

async fn show_link(config: &ResolvedConfig, id: u64) -> Result<()> {
    let zeef = session(config)?;
    let link = zeef.fetch_link(id).await.context("Failed to fetch link")?;

    println!("{}", link);
    println!("  title: {}", link.title().unwrap_or("-"));
    println!("  hostname: {}", link.hostname().unwrap_or("-"));
    Ok(())
}

async fn create_page(
    config: &ResolvedConfig,
    name: &str,
    language: &str,
    page_type: &str,
) -> Result<()> {
    let zeef = session(config)?;
    let page = zeef
        .create_page(name, language, page_type)
        .await
        .context("Failed to create page")?;
    println!("Created {}", page);
    Ok(())
}

async fn scratchpad(config: &ResolvedConfig, command: ScratchpadCommands) -> Result<()> {
    let zeef = session(config)?;
    let mut pad = zeef
        .fetch_scratchpad()
        .await
        .context("Failed to fetch scratchpad")?;

    match command {
        ScratchpadCommands::List => {}
        ScratchpadCommands::Add { url } => {
            pad.add_link(&url).await.context("Failed to add link")?;
        }
        ScratchpadCommands::Delete { id } => {
            pad.delete_link(id).await.context("Failed to delete link")?;
        }
    }

    for link in pad.links()? {
        println!(
            "{:>8}  {}  {}",
            link.id,
            link.url.as_deref().unwrap_or("-"),
            link.title.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
