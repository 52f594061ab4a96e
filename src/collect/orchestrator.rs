//! Bulk collection orchestrator.
//!
//! Expands patches × ranks × regions into single-combination fetches,
//! dispatches them in a fixed order through a [`FixedIntervalGate`], and
//! folds every settled unit into a [`CollectionJob`]. Units run as
//! independent tasks; a failed unit is recorded and never affects the others.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::collect::job::{CollectionJob, CollectionTuple};
use crate::collect::throttle::FixedIntervalGate;
use crate::config::Config;
use crate::error::StatsError;
use crate::keys::{normalize_rank, normalize_region};
use crate::metrics::Metrics;
use crate::stats::{StatsFetcher, StatsRequest};

/// A `runBulkCollection` request. Omitted or empty lists fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionRequest {
    pub patches: Option<Vec<String>>,
    pub ranks: Option<Vec<String>>,
    pub regions: Option<Vec<String>>,
}

type UnitResult = (CollectionTuple, Result<usize, StatsError>);

pub struct BulkOrchestrator {
    fetcher: Arc<StatsFetcher>,
    config: Arc<Config>,
    gate: FixedIntervalGate,
    metrics: Arc<Metrics>,
}

impl BulkOrchestrator {
    pub fn new(fetcher: Arc<StatsFetcher>, config: Arc<Config>, metrics: Arc<Metrics>) -> Self {
        let gate = FixedIntervalGate::new(config.collection.dispatch_interval());
        Self {
            fetcher,
            config,
            gate,
            metrics,
        }
    }

    /// Run one bulk collection and return once every dispatched unit has settled.
    ///
    /// Fails only with [`StatsError::Configuration`], checked before anything
    /// is dispatched. All later failures are recorded in the returned job.
    pub async fn run(&self, request: CollectionRequest) -> Result<CollectionJob, StatsError> {
        if let Err(e) = self.config.check_collection_ready() {
            self.metrics.record_run("rejected");
            warn!(error = %e, "Bulk collection rejected");
            return Err(e);
        }

        let ranks = resolve(request.ranks, &self.config.collection.ranks, normalize_rank);
        let regions = resolve(request.regions, &self.config.collection.regions, normalize_region);
        let patches = match non_empty(request.patches) {
            Some(patches) => dedup(patches.into_iter().map(|p| p.trim().to_string())),
            None => {
                let count = self.config.collection.default_patch_count;
                match self.fetcher.latest_versions(count).await {
                    Ok(versions) => versions,
                    Err(e) => {
                        warn!(error = %e, "Could not resolve default patches");
                        let mut job = CollectionJob::new(Vec::new(), 0);
                        job.record_error(format!("version lookup failed: {e}"));
                        job.finish();
                        self.metrics.record_run("finished");
                        return Ok(job);
                    }
                }
            }
        };

        let tuples = cartesian(&patches, &ranks, &regions);
        let mut job = CollectionJob::new(patches, tuples.len());
        info!(
            job_id = %job.job_id,
            total = job.total,
            patches = job.patches.len(),
            ranks = ranks.len(),
            regions = regions.len(),
            interval_ms = self.gate.interval().as_millis() as u64,
            "Bulk collection started"
        );

        let mut units: JoinSet<UnitResult> = JoinSet::new();
        for tuple in tuples {
            self.gate.ready().await;
            debug!(job_id = %job.job_id, tuple = %tuple, "Dispatching unit");

            let fetcher = self.fetcher.clone();
            units.spawn(async move {
                let request = StatsRequest::new(tuple.rank.clone(), tuple.region.clone())
                    .with_patch(tuple.patch.clone());
                let result = fetcher.fetch_stats(&request).await.map(|payload| payload.len());
                (tuple, result)
            });
            job.mark_dispatched();

            while let Some(settled) = units.try_join_next() {
                self.settle(&mut job, settled);
            }
        }

        while let Some(settled) = units.join_next().await {
            self.settle(&mut job, settled);
        }

        job.finish();
        self.metrics.record_run("finished");
        info!(
            job_id = %job.job_id,
            total = job.total,
            completed = job.completed,
            failed = job.failed,
            "Bulk collection finished"
        );
        Ok(job)
    }

    fn settle(&self, job: &mut CollectionJob, settled: Result<UnitResult, JoinError>) {
        match settled {
            Ok((tuple, Ok(champions))) => {
                debug!(job_id = %job.job_id, tuple = %tuple, champions, "Unit completed");
                self.metrics.record_unit(true);
                job.mark_completed();
            }
            Ok((tuple, Err(e))) => {
                warn!(job_id = %job.job_id, tuple = %tuple, error = %e, "Unit failed");
                self.metrics.record_unit(false);
                job.mark_failed(format!("{tuple}: {e}"));
            }
            Err(e) => {
                warn!(job_id = %job.job_id, error = %e, "Unit task aborted");
                self.metrics.record_unit(false);
                job.mark_failed(format!("unit task aborted: {e}"));
            }
        }
    }
}

fn non_empty(list: Option<Vec<String>>) -> Option<Vec<String>> {
    list.filter(|items| items.iter().any(|i| !i.trim().is_empty()))
}

/// Requested values (or the defaults), normalized and de-duplicated in order.
fn resolve(requested: Option<Vec<String>>, defaults: &[String], normalize: fn(&str) -> String) -> Vec<String> {
    let source = non_empty(requested).unwrap_or_else(|| defaults.to_vec());
    dedup(source.iter().map(|value| normalize(value)))
}

fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Tuples in dispatch order: patch-major, then rank, then region.
fn cartesian(patches: &[String], ranks: &[String], regions: &[String]) -> Vec<CollectionTuple> {
    let mut tuples = Vec::with_capacity(patches.len() * ranks.len() * regions.len());
    for patch in patches {
        for rank in ranks {
            for region in regions {
                tuples.push(CollectionTuple {
                    patch: patch.clone(),
                    rank: rank.clone(),
                    region: region.clone(),
                });
            }
        }
    }
    tuples
}
