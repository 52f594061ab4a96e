//! Persistent store (primary cache tier).
//!
//! The store is a key-value table keyed by a single string column plus a
//! timestamp, reached over HTTP. It is optional: [`HttpKvStore::from_config`]
//! decides once at startup whether the capability exists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::entry::{CacheEntry, CachePayload};
use crate::config::StoreConfig;
use crate::error::{CacheStoreError, StatsError};

/// One row of the cache table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRow {
    pub cache_key: String,
    pub data: serde_json::Value,
    pub stored_at: DateTime<Utc>,
}

impl StoreRow {
    pub fn from_entry(key: &str, entry: &CacheEntry) -> Result<Self, CacheStoreError> {
        let data = serde_json::to_value(&entry.payload)
            .map_err(|e| CacheStoreError::Malformed(e.to_string()))?;
        Ok(Self {
            cache_key: key.to_string(),
            data,
            stored_at: entry.stored_at,
        })
    }

    pub fn into_entry(self) -> Result<CacheEntry, CacheStoreError> {
        let payload: CachePayload = serde_json::from_value(self.data)
            .map_err(|e| CacheStoreError::Malformed(format!("{}: {e}", self.cache_key)))?;
        Ok(CacheEntry::stored_at(payload, self.stored_at))
    }
}

#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<StoreRow>, CacheStoreError>;

    async fn upsert(&self, row: StoreRow) -> Result<(), CacheStoreError>;
}

/// Key-value table behind a PostgREST-style HTTP endpoint.
pub struct HttpKvStore {
    client: Client,
    table_url: String,
    api_key: String,
}

impl HttpKvStore {
    /// Build the store if one is configured.
    ///
    /// No URL means no primary tier (`Ok(None)`); a URL without a credential
    /// is a configuration error.
    pub fn from_config(config: &StoreConfig) -> Result<Option<Self>, StatsError> {
        let Some(url) = config.url.as_deref() else {
            info!("Persistent store not configured, using in-process tier only");
            return Ok(None);
        };
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(StatsError::Configuration("store.url is set but empty".to_string()));
        }
        let api_key = config.api_key.clone().ok_or_else(|| {
            StatsError::Configuration("store.url is set but store.api_key is missing".to_string())
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StatsError::Configuration(format!("failed to build HTTP client: {e}")))?;

        info!(url, table = %config.table, "Persistent store configured");
        Ok(Some(Self {
            client,
            table_url: format!("{url}/rest/v1/{}", config.table),
            api_key,
        }))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl PersistentStore for HttpKvStore {
    fn name(&self) -> &'static str {
        "http-kv"
    }

    async fn get(&self, key: &str) -> Result<Option<StoreRow>, CacheStoreError> {
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&[
                ("cache_key", format!("eq.{key}")),
                ("select", "cache_key,data,stored_at".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheStoreError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let mut rows: Vec<StoreRow> =
            serde_json::from_str(&body).map_err(|e| CacheStoreError::Malformed(e.to_string()))?;
        debug!(key, found = !rows.is_empty(), "Persistent store lookup");
        Ok(rows.pop())
    }

    async fn upsert(&self, row: StoreRow) -> Result<(), CacheStoreError> {
        let response = self
            .authorized(self.client.post(&self.table_url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheStoreError::Status(status.as_u16()));
        }
        Ok(())
    }
}
