//! In-process cache tier.
//!
//! Always available, lost on restart. Concurrent writers to distinct keys
//! never interfere; for the same key the last write wins, except that a write
//! older than the held entry is dropped so `stored_at` never goes backwards.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::entry::CacheEntry;

#[derive(Debug, Default)]
pub struct LocalTier {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl LocalTier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Insert or replace an entry. Returns `false` if the write was dropped
    /// because the held entry is newer.
    pub async fn insert(&self, key: &str, entry: CacheEntry) -> bool {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries.get(key) {
            if existing.stored_at > entry.stored_at {
                debug!(
                    key,
                    held = %existing.stored_at,
                    incoming = %entry.stored_at,
                    "Dropped out-of-order local write"
                );
                return false;
            }
        }
        entries.insert(key.to_string(), entry);
        true
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
