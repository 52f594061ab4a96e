//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use champ_stats_cache::cache::{PersistentStore, StoreRow, TieredCache, TtlPolicy};
use champ_stats_cache::config::Config;
use champ_stats_cache::error::{CacheStoreError, StatsError};
use champ_stats_cache::metrics::Metrics;
use champ_stats_cache::stats::StatsFetcher;
use champ_stats_cache::upstream::{RawChampionStats, RawStatsResponse, StatsProvider, UpstreamQuery};

pub fn raw(games: u64, wins: u64, pick_rate: f64, role: &str) -> RawChampionStats {
    RawChampionStats {
        games: Some(games),
        wins: Some(wins),
        kda: Some(2.4),
        win_rate: None,
        pick_rate: Some(pick_rate),
        ban_rate: Some(1.5),
        role: Some(role.to_string()),
        tier: None,
    }
}

/// Three champions with inconsistent upstream spelling.
pub fn sample_response() -> RawStatsResponse {
    let mut response = RawStatsResponse::new();
    response.insert("ahri".into(), raw(1000, 535, 7.0, "mid"));
    response.insert("Jinx".into(), raw(800, 400, 9.0, "bottom"));
    response.insert("KhaZix".into(), raw(600, 290, 4.0, "jungle"));
    response
}

/// Upstream double recording every call and its (tokio) timestamp.
pub struct MockProvider {
    pub stats_calls: AtomicUsize,
    pub version_calls: AtomicUsize,
    calls: Mutex<Vec<(UpstreamQuery, Instant)>>,
    failing: Mutex<HashSet<(String, String)>>,
    versions: Mutex<Option<Vec<String>>>,
    latency: Duration,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            stats_calls: AtomicUsize::new(0),
            version_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            versions: Mutex::new(Some(
                ["14.6.1", "14.5.1", "14.4.1", "14.3.1", "14.2.1", "14.1.1", "13.24.1"]
                    .iter()
                    .map(|v| v.to_string())
                    .collect(),
            )),
            latency,
        }
    }

    /// Make every stats call for (rank, region) fail with an upstream error.
    pub fn fail_for(&self, rank: &str, region: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert((rank.to_string(), region.to_string()));
    }

    /// Make the version endpoint fail.
    pub fn fail_versions(&self) {
        *self.versions.lock().unwrap() = None;
    }

    pub fn stats_call_count(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(UpstreamQuery, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsProvider for MockProvider {
    async fn fetch_stats(&self, query: &UpstreamQuery) -> Result<RawStatsResponse, StatsError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((query.clone(), Instant::now()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let should_fail = self
            .failing
            .lock()
            .unwrap()
            .contains(&(query.rank.clone(), query.region.clone()));
        if should_fail {
            return Err(StatsError::Upstream(format!(
                "status 503 for {}/{}",
                query.rank, query.region
            )));
        }
        Ok(sample_response())
    }

    async fn fetch_versions(&self) -> Result<Vec<String>, StatsError> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        self.versions
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| StatsError::Upstream("versions unavailable".to_string()))
    }
}

/// In-memory persistent store that can be switched into a failing mode.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, StoreRow>>,
    failing: AtomicBool,
    upsert_delay: Duration,
    pub gets: AtomicUsize,
    pub upserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that errors on every call.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    /// A store whose every upsert takes `delay` to complete.
    pub fn with_upsert_delay(delay: Duration) -> Self {
        Self {
            upsert_delay: delay,
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn put_row(&self, row: StoreRow) {
        self.rows.lock().unwrap().insert(row.cache_key.clone(), row);
    }

    pub fn row(&self, key: &str) -> Option<StoreRow> {
        self.rows.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<StoreRow>, CacheStoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheStoreError::Status(503));
        }
        Ok(self.row(key))
    }

    async fn upsert(&self, row: StoreRow) -> Result<(), CacheStoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if !self.upsert_delay.is_zero() {
            tokio::time::sleep(self.upsert_delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheStoreError::Status(503));
        }
        self.put_row(row);
        Ok(())
    }
}

/// A fetcher over the given provider and optional store, with its metrics.
pub fn fetcher_with(
    provider: Arc<MockProvider>,
    store: Option<Arc<MemoryStore>>,
) -> (Arc<StatsFetcher>, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().unwrap());
    let primary = store.map(|s| s as Arc<dyn PersistentStore>);
    let cache = Arc::new(TieredCache::new(primary, TtlPolicy::default(), metrics.clone()));
    let fetcher = Arc::new(StatsFetcher::new(cache, provider, metrics.clone()));
    (fetcher, metrics)
}

/// Configuration accepted by the bulk collector, with the given dispatch interval.
pub fn ready_config(interval: Duration) -> Arc<Config> {
    let mut config = Config::default();
    config.upstream.api_key = Some("test-key".to_string());
    config.collection.dispatch_interval_ms = interval.as_millis() as u64;
    Arc::new(config)
}
