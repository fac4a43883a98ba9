//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/mirror.sqlite"
//!
//! [source]
//! base_url = "https://rickandmortyapi.com/api"
//! timeout_secs = 30
//! max_pages = 200
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! ```
//!
//! The `[source]` table is optional; every field in it has a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Upstream catalog settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout for the upstream fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on `info.next` hops before the fetch is abandoned.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_base_url() -> String {
    "https://rickandmortyapi.com/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_pages() -> usize {
    200
}

impl SourceConfig {
    /// Full URL of the first character page.
    pub fn character_url(&self) -> String {
        format!("{}/character", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs must be > 0");
    }

    if config.source.max_pages == 0 {
        anyhow::bail!("source.max_pages must be >= 1");
    }

    let base = config.source.base_url.as_str();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!(
            "source.base_url must start with http:// or https://, got '{}'",
            base
        );
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(config)
}
