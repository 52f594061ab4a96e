//! champ-stats-cache: caching and bulk collection of champion statistics.
//!
//! Sits between a heavily rate-limited upstream statistics provider and the
//! read endpoints of a display application:
//!   persistent store (primary) → in-process tier (fallback) → upstream
//!
//! Bulk collection fans out over patches × ranks × regions at a fixed
//! dispatch rate and tolerates partial failure.

pub mod cache;
pub mod collect;
pub mod config;
pub mod error;
pub mod keys;
pub mod metrics;
pub mod server;
pub mod stats;
pub mod upstream;

pub use error::{CacheStoreError, StatsError};
