//! Bulk statistics collection.
//!
//! - [`throttle`]: fixed-interval gate pacing dispatches
//! - [`job`]: the CollectionJob aggregate
//! - [`orchestrator`]: cartesian fan-out with partial-failure tolerance

pub mod job;
pub mod orchestrator;
pub mod throttle;

pub use job::{CollectionJob, CollectionTuple};
pub use orchestrator::{BulkOrchestrator, CollectionRequest};
pub use throttle::FixedIntervalGate;
