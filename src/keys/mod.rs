//! Key-space normalization.
//!
//! Upstream identifiers arrive with inconsistent casing and spelling. This
//! module maps them onto one canonical form so that every request for the
//! same combination lands on the same cache entry.
//!
//! - [`normalizer`]: champion, rank, region and role canonicalization
//! - [`stats_key`]: the [`StatsKey`] cache key built from a normalized request

pub mod normalizer;
pub mod stats_key;

pub use normalizer::{normalize_champion_id, normalize_rank, normalize_region, normalize_role};
pub use stats_key::{StatsKey, VERSIONS_KEY};

/// Every rank the bulk collector covers by default, lowest first.
pub const RANKS: [&str; 10] = [
    "IRON",
    "BRONZE",
    "SILVER",
    "GOLD",
    "PLATINUM",
    "EMERALD",
    "DIAMOND",
    "MASTER",
    "GRANDMASTER",
    "CHALLENGER",
];

/// Every region the bulk collector covers by default.
pub const REGIONS: [&str; 11] = [
    "na", "euw", "eune", "kr", "br", "jp", "lan", "las", "oce", "tr", "ru",
];

/// Canonical role names.
pub const ROLES: [&str; 5] = ["top", "jungle", "mid", "adc", "support"];
