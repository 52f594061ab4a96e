//! Prometheus metrics.
//!
//! Each [`Metrics`] owns its own registry so independent instances (one per
//! test, one per process) never collide on registration.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Container for all service metrics.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    /// Cache lookups - labels: result (primary_hit, local_hit, miss, stale)
    pub cache_lookups_total: IntCounterVec,

    /// Persistent store failures - labels: op (get, upsert)
    pub store_errors_total: IntCounterVec,

    /// Entries held by the in-process tier.
    pub local_entries: IntGauge,

    /// Upstream calls - labels: endpoint (stats, versions), outcome (ok, error)
    pub upstream_requests_total: IntCounterVec,

    /// Bulk units of work - labels: outcome (completed, failed)
    pub collection_units_total: IntCounterVec,

    /// Bulk collection runs - labels: outcome (finished, rejected)
    pub collection_runs_total: IntCounterVec,
}

impl Metrics {
    /// Create and register all metrics.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let cache_lookups_total = IntCounterVec::new(
            Opts::new("stats_cache_lookups_total", "Cache lookups by result"),
            &["result"],
        )?;
        let store_errors_total = IntCounterVec::new(
            Opts::new(
                "stats_store_errors_total",
                "Persistent store failures downgraded to cache misses",
            ),
            &["op"],
        )?;
        let local_entries = IntGauge::new(
            "stats_cache_local_entries",
            "Entries held by the in-process cache tier",
        )?;
        let upstream_requests_total = IntCounterVec::new(
            Opts::new("stats_upstream_requests_total", "Upstream provider calls"),
            &["endpoint", "outcome"],
        )?;
        let collection_units_total = IntCounterVec::new(
            Opts::new(
                "stats_collection_units_total",
                "Bulk collection units of work by outcome",
            ),
            &["outcome"],
        )?;
        let collection_runs_total = IntCounterVec::new(
            Opts::new("stats_collection_runs_total", "Bulk collection runs"),
            &["outcome"],
        )?;

        registry.register(Box::new(cache_lookups_total.clone()))?;
        registry.register(Box::new(store_errors_total.clone()))?;
        registry.register(Box::new(local_entries.clone()))?;
        registry.register(Box::new(upstream_requests_total.clone()))?;
        registry.register(Box::new(collection_units_total.clone()))?;
        registry.register(Box::new(collection_runs_total.clone()))?;

        Ok(Self {
            registry,
            cache_lookups_total,
            store_errors_total,
            local_entries,
            upstream_requests_total,
            collection_units_total,
            collection_runs_total,
        })
    }

    pub fn record_lookup(&self, result: &str) {
        self.cache_lookups_total.with_label_values(&[result]).inc();
    }

    pub fn record_store_error(&self, op: &str) {
        self.store_errors_total.with_label_values(&[op]).inc();
    }

    pub fn record_upstream(&self, endpoint: &str, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.upstream_requests_total
            .with_label_values(&[endpoint, outcome])
            .inc();
    }

    pub fn record_unit(&self, success: bool) {
        let outcome = if success { "completed" } else { "failed" };
        self.collection_units_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn record_run(&self, outcome: &str) {
        self.collection_runs_total.with_label_values(&[outcome]).inc();
    }

    /// Current value of a lookup counter.
    pub fn lookups(&self, result: &str) -> u64 {
        self.cache_lookups_total.with_label_values(&[result]).get()
    }

    /// Current value of a store error counter.
    pub fn store_errors(&self, op: &str) -> u64 {
        self.store_errors_total.with_label_values(&[op]).get()
    }

    /// Number of upstream calls to `endpoint`, both outcomes.
    pub fn upstream_calls(&self, endpoint: &str) -> u64 {
        ["ok", "error"]
            .iter()
            .map(|outcome| {
                self.upstream_requests_total
                    .with_label_values(&[endpoint, *outcome])
                    .get()
            })
            .sum()
    }

    /// Encode the registry in the Prometheus text format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_registries() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_lookup("miss");
        assert_eq!(a.lookups("miss"), 1);
        assert_eq!(b.lookups("miss"), 0);
    }

    #[test]
    fn test_encode() {
        let metrics = Metrics::new().unwrap();
        metrics.record_upstream("stats", true);
        metrics.record_upstream("stats", false);
        assert_eq!(metrics.upstream_calls("stats"), 2);

        let text = metrics.encode().unwrap();
        assert!(text.contains("stats_upstream_requests_total"));
    }
}
