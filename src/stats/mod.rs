//! Statistics payloads and the single-combination fetcher.
//!
//! - [`payload`]: StatsPayload, per-champion aggregates, tier derivation
//! - [`fetcher`]: cache-through fetch of one combination

pub mod fetcher;
pub mod payload;

pub use fetcher::{StatsFetcher, StatsRequest};
pub use payload::{ChampionStats, StatsPayload, Tier};
