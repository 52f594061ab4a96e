//! Cache entries and staleness rules.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::stats::payload::StatsPayload;

/// Data class of a cached value. Each class has its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataClass {
    /// Rank/region statistics.
    Stats,
    /// Derived and meta data such as the version list.
    Meta,
}

impl fmt::Display for DataClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataClass::Stats => write!(f, "stats"),
            DataClass::Meta => write!(f, "meta"),
        }
    }
}

/// What a cache entry holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CachePayload {
    Stats(StatsPayload),
    Versions(Vec<String>),
}

impl CachePayload {
    pub fn class(&self) -> DataClass {
        match self {
            CachePayload::Stats(_) => DataClass::Stats,
            CachePayload::Versions(_) => DataClass::Meta,
        }
    }
}

/// An immutable cached value and the instant it was produced.
/// Refreshing a key replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: CachePayload,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// A new entry stamped with the current time.
    pub fn new(payload: CachePayload) -> Self {
        Self::stored_at(payload, Utc::now())
    }

    pub fn stored_at(payload: CachePayload, stored_at: DateTime<Utc>) -> Self {
        Self { payload, stored_at }
    }

    pub fn class(&self) -> DataClass {
        self.payload.class()
    }

    /// Age relative to `now`. Entries stamped in the future have age zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// TTL per data class.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub stats: Duration,
    pub meta: Duration,
}

impl TtlPolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            stats: Duration::from_secs(config.stats_ttl_secs),
            meta: Duration::from_secs(config.meta_ttl_secs),
        }
    }

    pub fn ttl(&self, class: DataClass) -> Duration {
        match class {
            DataClass::Stats => self.stats,
            DataClass::Meta => self.meta,
        }
    }

    /// An entry is fresh while `now - stored_at < ttl`.
    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.age(now) < self.ttl(entry.class())
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_boundary() {
        let policy = TtlPolicy::default();
        let now = Utc::now();
        let ttl = chrono::Duration::hours(6);

        let fresh = CacheEntry::stored_at(
            CachePayload::Stats(StatsPayload::default()),
            now - ttl + chrono::Duration::seconds(1),
        );
        assert!(policy.is_fresh(&fresh, now));

        let exactly = CacheEntry::stored_at(CachePayload::Stats(StatsPayload::default()), now - ttl);
        assert!(!policy.is_fresh(&exactly, now));

        let stale = CacheEntry::stored_at(
            CachePayload::Stats(StatsPayload::default()),
            now - ttl - chrono::Duration::seconds(1),
        );
        assert!(!policy.is_fresh(&stale, now));
    }

    #[test]
    fn test_meta_ttl_is_longer() {
        let policy = TtlPolicy::default();
        let now = Utc::now();
        let ten_hours_ago = now - chrono::Duration::hours(10);

        let versions = CacheEntry::stored_at(CachePayload::Versions(vec!["14.1.1".into()]), ten_hours_ago);
        let stats = CacheEntry::stored_at(CachePayload::Stats(StatsPayload::default()), ten_hours_ago);
        assert!(policy.is_fresh(&versions, now));
        assert!(!policy.is_fresh(&stats, now));
    }

    #[test]
    fn test_payload_serde_tagging() {
        let payload = CachePayload::Versions(vec!["14.2.1".into(), "14.1.1".into()]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "versions");
        let back: CachePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
