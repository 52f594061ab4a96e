//! Wire types for the upstream provider.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `GET /stats`: champion id (as the provider spells it) → aggregate.
pub type RawStatsResponse = HashMap<String, RawChampionStats>;

/// One champion's aggregate as returned upstream.
///
/// Every field is optional; whatever is missing is derived or defaulted when
/// the payload is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChampionStats {
    #[serde(default)]
    pub games: Option<u64>,
    #[serde(default)]
    pub wins: Option<u64>,
    #[serde(default)]
    pub kda: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub pick_rate: Option<f64>,
    #[serde(default)]
    pub ban_rate: Option<f64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
}

/// Parameters of one upstream statistics call. Always unfiltered: role and
/// champion selection happen locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub patch: Option<String>,
    pub rank: String,
    pub region: String,
}

impl UpstreamQuery {
    /// Query-string pairs in the order the provider documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("rank", self.rank.clone()), ("region", self.region.clone())];
        if let Some(patch) = &self.patch {
            params.push(("patch", patch.clone()));
        }
        params
    }
}
