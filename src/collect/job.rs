//! Collection job aggregate.
//!
//! A [`CollectionJob`] lives for one bulk call. It is owned by the
//! orchestrator's task and mutated only there, as units settle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One (patch, rank, region) unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CollectionTuple {
    pub patch: String,
    pub rank: String,
    pub region: String,
}

impl fmt::Display for CollectionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.patch, self.rank, self.region)
    }
}

/// Progress and outcome of one bulk collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionJob {
    pub job_id: Uuid,
    pub patches: Vec<String>,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub in_progress: usize,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CollectionJob {
    pub fn new(patches: Vec<String>, total: usize) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            patches,
            total,
            completed: 0,
            failed: 0,
            in_progress: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn mark_dispatched(&mut self) {
        self.in_progress += 1;
    }

    pub fn mark_completed(&mut self) {
        self.in_progress = self.in_progress.saturating_sub(1);
        self.completed += 1;
    }

    pub fn mark_failed(&mut self, message: String) {
        self.in_progress = self.in_progress.saturating_sub(1);
        self.failed += 1;
        self.errors.push(message);
    }

    /// Record a failure that happened before any unit was dispatched.
    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Units that have settled either way.
    pub fn settled(&self) -> usize {
        self.completed + self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}
