//! Runtime configuration for champ-stats-cache.
//!
//! Configuration is loaded from a JSON file or constructed programmatically.
//! Credentials may also come from the environment so they stay out of the file.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::keys::{RANKS, REGIONS};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "champ-stats-cache", about = "Champion statistics cache and bulk collector")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides `server.listen`).
    #[arg(long)]
    pub listen: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the HTTP API (default).
    Serve,

    /// Run one bulk collection, print the resulting job as JSON and exit.
    Collect {
        /// Patch to collect (repeatable). Defaults to the most recent versions.
        #[arg(long = "patch")]
        patches: Vec<String>,

        /// Rank to collect (repeatable). Defaults to every rank.
        #[arg(long = "rank")]
        ranks: Vec<String>,

        /// Region to collect (repeatable). Defaults to every region.
        #[arg(long = "region")]
        regions: Vec<String>,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Upstream statistics provider.
    pub upstream: UpstreamConfig,

    /// Optional persistent store (primary cache tier).
    pub store: StoreConfig,

    /// TTLs per data class.
    pub cache: CacheConfig,

    /// Bulk collection settings.
    pub collection: CollectionConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "https://api.example.com/v1".
    pub base_url: String,

    /// API key sent with every request. Required for bulk collection.
    pub api_key: Option<String>,

    /// Header carrying the API key.
    pub api_key_header: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            api_key: None,
            api_key_header: "X-Api-Key".to_string(),
            timeout_secs: 10,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Persistent key-value store settings. The store is optional: with no URL
/// the service runs on the in-process tier alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the REST endpoint in front of the table.
    pub url: Option<String>,

    /// Service key for the store. Required whenever `url` is set.
    pub api_key: Option<String>,

    /// Table holding cache rows.
    pub table: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: "stats_cache".to_string(),
            timeout_secs: 3,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Time-to-live per data class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for rank/region statistics, in seconds.
    pub stats_ttl_secs: u64,

    /// TTL for derived and meta data (version lists), in seconds.
    pub meta_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stats_ttl_secs: 6 * 60 * 60,
            meta_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Bulk collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Fixed delay between successive dispatches, in milliseconds.
    pub dispatch_interval_ms: u64,

    /// How many recent versions to collect when no patches are given.
    pub default_patch_count: usize,

    /// Ranks collected when none are given.
    pub ranks: Vec<String>,

    /// Regions collected when none are given.
    pub regions: Vec<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_ms: 1000,
            default_patch_count: 5,
            ranks: RANKS.iter().map(|r| r.to_string()).collect(),
            regions: REGIONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl CollectionConfig {
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing
    /// fields, then apply environment overrides.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            serde_json::from_str(&data)?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Credentials from the environment take precedence over the file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("UPSTREAM_API_KEY") {
            self.upstream.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("STORE_URL") {
            self.store.url = Some(url);
        }
        if let Ok(key) = std::env::var("STORE_API_KEY") {
            self.store.api_key = Some(key);
        }
    }

    /// Check the settings the persistent store depends on. A missing URL is
    /// fine (no primary tier); a URL without a key is not.
    pub fn check_store(&self) -> Result<(), StatsError> {
        match (&self.store.url, &self.store.api_key) {
            (Some(url), _) if url.trim().is_empty() => Err(StatsError::Configuration(
                "store.url is set but empty".to_string(),
            )),
            (Some(_), None) => Err(StatsError::Configuration(
                "store.url is set but store.api_key is missing".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Check everything a bulk collection needs before it dispatches work.
    pub fn check_collection_ready(&self) -> Result<(), StatsError> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(StatsError::Configuration(
                "upstream.base_url is missing".to_string(),
            ));
        }
        match self.upstream.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(StatsError::Configuration(
                    "upstream.api_key is missing".to_string(),
                ))
            }
        }
        self.check_store()
    }
}
