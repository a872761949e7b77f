//! Configuration for the ZEEF client.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ZEEF_API_URL, ZEEF_TOKEN, ZEEF_TIMEOUT)
//! 2. Config file (.zeef/config.yaml)
//! 3. Defaults (https://zeef.io/api, no token, no timeout)
//!
//! Config file discovery:
//! - Searches current directory and parents for .zeef/config.yaml
//! - Falls back to ~/.zeef/config.yaml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::DEFAULT_API_URL;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// API origin, e.g. https://zeef.io/api
    pub url: Option<String>,
    /// OmniLogin token
    pub token: Option<String>,
    /// Request timeout; unset keeps the transport default
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_seconds: None,
            config_file: None,
        }
    }
}

/// Find config file by searching `start` and its parents, then the home directory
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".zeef").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".zeef").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file values and environment lookups over the defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig::default();

    if let Some((path, file)) = file {
        if let Some(url) = file.api.url {
            config.api_url = url;
        }
        config.token = file.api.token;
        config.timeout_seconds = file.api.timeout_seconds;
        config.config_file = Some(path);
    }

    if let Some(url) = env("ZEEF_API_URL") {
        config.api_url = url;
    }
    if let Some(token) = env("ZEEF_TOKEN") {
        config.token = Some(token);
    }
    if let Some(timeout) = env("ZEEF_TIMEOUT") {
        let secs = timeout
            .parse()
            .with_context(|| format!("ZEEF_TIMEOUT is not a number of seconds: {}", timeout))?;
        config.timeout_seconds = Some(secs);
    }

    config.api_url = config.api_url.trim_end_matches('/').to_string();
    Ok(config)
}

/// Load configuration from all sources, searching from `start`
pub fn load_config_from(start: &Path) -> Result<ResolvedConfig> {
    let file = match find_config_file(start) {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    resolve(file, |key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

/// Load configuration from all sources, searching from the current directory
pub fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd)
}
