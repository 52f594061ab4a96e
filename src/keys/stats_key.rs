//! Cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keys::normalizer::{
    normalize_champion_id, normalize_rank, normalize_region, normalize_role,
};

/// Key under which the upstream version list is cached.
pub const VERSIONS_KEY: &str = "meta:versions";

const CURRENT_PATCH: &str = "current";
const ALL_ROLES: &str = "all";
const ALL_CHAMPIONS: &str = "*";

/// Canonical cache key for one statistics combination.
///
/// Format: `stats:{patch|current}:{RANK}:{region}:{role|all}:{Champion|*}`.
/// Every component is normalized, so differently-cased requests for the same
/// combination produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatsKey(String);

impl StatsKey {
    /// Build a key for a (possibly filtered) view.
    pub fn new(
        patch: Option<&str>,
        rank: &str,
        region: &str,
        role: Option<&str>,
        champion: Option<&str>,
    ) -> Self {
        let patch = patch
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(CURRENT_PATCH);
        let role = role
            .map(normalize_role)
            .filter(|r| !r.is_empty() && r != "*")
            .unwrap_or_else(|| ALL_ROLES.to_string());
        let champion = champion
            .map(normalize_champion_id)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| ALL_CHAMPIONS.to_string());

        Self(format!(
            "stats:{patch}:{}:{}:{role}:{champion}",
            normalize_rank(rank),
            normalize_region(region),
        ))
    }

    /// Key of the full, unfiltered payload for a (patch, rank, region) combination.
    /// This is the key payloads are stored under.
    pub fn unfiltered(patch: Option<&str>, rank: &str, region: &str) -> Self {
        Self::new(patch, rank, region, None, None)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StatsKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
