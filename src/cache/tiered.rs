//! Two-tier cache: optional persistent store in front of the in-process tier.
//!
//! Lookup order is primary, then local. A value from either tier is only
//! returned while fresh under its data class TTL. Store failures of any kind
//! are logged, counted and treated as a miss; they never reach the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::entry::{CacheEntry, TtlPolicy};
use crate::cache::local::LocalTier;
use crate::cache::store::{PersistentStore, StoreRow};
use crate::metrics::Metrics;

/// Which tier served a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Primary,
    Local,
}

/// Snapshot of cache counters for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub primary_configured: bool,
    pub local_entries: usize,
    pub primary_hits: u64,
    pub local_hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub store_get_errors: u64,
    pub store_upsert_errors: u64,
}

pub struct TieredCache {
    primary: Option<Arc<dyn PersistentStore>>,
    local: LocalTier,
    ttl: TtlPolicy,
    metrics: Arc<Metrics>,
}

impl TieredCache {
    pub fn new(
        primary: Option<Arc<dyn PersistentStore>>,
        ttl: TtlPolicy,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            primary,
            local: LocalTier::new(),
            ttl,
            metrics,
        }
    }

    /// A cache backed by the in-process tier only.
    pub fn local_only(ttl: TtlPolicy, metrics: Arc<Metrics>) -> Self {
        Self::new(None, ttl, metrics)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Fresh entry for `key`, if either tier holds one.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lookup(key).await.map(|(entry, _)| entry)
    }

    /// Like [`get`](Self::get), also reporting which tier answered.
    pub async fn lookup(&self, key: &str) -> Option<(CacheEntry, CacheTier)> {
        let now = Utc::now();
        let mut saw_stale = false;

        if let Some(entry) = self.primary_get(key).await {
            if self.ttl.is_fresh(&entry, now) {
                self.metrics.record_lookup("primary_hit");
                debug!(key, "Cache hit (primary)");
                if self.local.insert(key, entry.clone()).await {
                    self.refresh_local_gauge().await;
                }
                return Some((entry, CacheTier::Primary));
            }
            saw_stale = true;
        }

        if let Some(entry) = self.local.get(key).await {
            if self.ttl.is_fresh(&entry, now) {
                self.metrics.record_lookup("local_hit");
                debug!(key, "Cache hit (local)");
                return Some((entry, CacheTier::Local));
            }
            saw_stale = true;
        }

        if saw_stale {
            self.metrics.record_lookup("stale");
            debug!(key, "Cache entry stale");
        } else {
            self.metrics.record_lookup("miss");
            debug!(key, "Cache miss");
        }
        None
    }

    /// Write the entry locally, then best-effort to the primary store.
    /// The local entry is visible before the upsert starts.
    pub async fn set(&self, key: &str, entry: CacheEntry) {
        let row = self.primary.as_ref().map(|_| StoreRow::from_entry(key, &entry));

        self.local.insert(key, entry).await;
        self.refresh_local_gauge().await;

        if let (Some(store), Some(row)) = (&self.primary, row) {
            match row {
                Ok(row) => {
                    if let Err(e) = store.upsert(row).await {
                        self.metrics.record_store_error("upsert");
                        warn!(key, store = store.name(), error = %e, "Persistent store write failed");
                    }
                }
                Err(e) => {
                    self.metrics.record_store_error("upsert");
                    warn!(key, error = %e, "Could not encode cache row");
                }
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            primary_configured: self.has_primary(),
            local_entries: self.local.len().await,
            primary_hits: self.metrics.lookups("primary_hit"),
            local_hits: self.metrics.lookups("local_hit"),
            misses: self.metrics.lookups("miss"),
            stale: self.metrics.lookups("stale"),
            store_get_errors: self.metrics.store_errors("get"),
            store_upsert_errors: self.metrics.store_errors("upsert"),
        }
    }

    async fn primary_get(&self, key: &str) -> Option<CacheEntry> {
        let store = self.primary.as_ref()?;
        let row = match store.get(key).await {
            Ok(row) => row?,
            Err(e) => {
                self.metrics.record_store_error("get");
                warn!(key, store = store.name(), error = %e, "Persistent store read failed, treating as miss");
                return None;
            }
        };

        match row.into_entry() {
            Ok(entry) => Some(entry),
            Err(e) => {
                self.metrics.record_store_error("get");
                warn!(key, store = store.name(), error = %e, "Discarding unreadable store row");
                None
            }
        }
    }

    async fn refresh_local_gauge(&self) {
        self.metrics.local_entries.set(self.local.len().await as i64);
    }
}
