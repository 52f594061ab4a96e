//! Upstream statistics provider.
//!
//! - [`types`]: wire types returned by the provider
//! - [`client`]: the [`StatsProvider`] trait and its HTTP implementation

pub mod client;
pub mod types;

pub use client::{HttpStatsProvider, StatsProvider};
pub use types::{RawChampionStats, RawStatsResponse, UpstreamQuery};
