//! Statistics payloads and field derivation.
//!
//! A [`StatsPayload`] is built once from an upstream response, with champion
//! ids normalized and missing fields derived, and is read-only afterwards.
//! Role and champion filters are projections over it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keys::{normalize_champion_id, normalize_role};
use crate::upstream::types::{RawChampionStats, RawStatsResponse};

/// Strength bucket derived from win and pick rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    /// Derive a tier from rates expressed in percent.
    ///
    /// ```text
    /// S+ : win >= 53.0 and pick >= 3.0
    /// S  : win >= 52.0 and pick >= 1.0
    /// A  : win >= 51.0
    /// B  : win >= 49.5
    /// C  : win >= 48.0
    /// D  : otherwise
    /// ```
    pub fn from_rates(win_rate: f64, pick_rate: f64) -> Self {
        if win_rate >= 53.0 && pick_rate >= 3.0 {
            Tier::SPlus
        } else if win_rate >= 52.0 && pick_rate >= 1.0 {
            Tier::S
        } else if win_rate >= 51.0 {
            Tier::A
        } else if win_rate >= 49.5 {
            Tier::B
        } else if win_rate >= 48.0 {
            Tier::C
        } else {
            Tier::D
        }
    }

    /// Parse an upstream-supplied tier label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "S+" | "SPLUS" => Some(Tier::SPlus),
            "S" => Some(Tier::S),
            "A" => Some(Tier::A),
            "B" => Some(Tier::B),
            "C" => Some(Tier::C),
            "D" => Some(Tier::D),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::SPlus => write!(f, "S+"),
            Tier::S => write!(f, "S"),
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
            Tier::D => write!(f, "D"),
        }
    }
}

/// Aggregate for one champion in its role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub games: u64,
    pub wins: u64,
    pub kda: f64,
    pub win_rate: f64,
    pub pick_rate: f64,
    pub ban_rate: f64,
    pub tier: Tier,
}

impl ChampionStats {
    /// Build from an upstream record, deriving what is missing.
    ///
    /// `win_rate` falls back to `wins / games`; `tier` falls back to
    /// [`Tier::from_rates`] when absent or unrecognized.
    pub fn from_raw(raw: &RawChampionStats) -> Self {
        let games = raw.games.unwrap_or(0);
        let wins = raw.wins.unwrap_or(0);
        let win_rate = raw.win_rate.unwrap_or_else(|| {
            if games == 0 {
                0.0
            } else {
                wins as f64 / games as f64 * 100.0
            }
        });
        let pick_rate = raw.pick_rate.unwrap_or(0.0);
        let tier = raw
            .tier
            .as_deref()
            .and_then(Tier::parse)
            .unwrap_or_else(|| Tier::from_rates(win_rate, pick_rate));

        Self {
            role: raw.role.as_deref().map(normalize_role),
            games,
            wins,
            kda: raw.kda.unwrap_or(0.0),
            win_rate,
            pick_rate,
            ban_rate: raw.ban_rate.unwrap_or(0.0),
            tier,
        }
    }
}

/// Champion id → aggregate. Serialized as the bare JSON map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsPayload {
    pub champions: BTreeMap<String, ChampionStats>,
}

impl StatsPayload {
    /// Build the full payload from an upstream response.
    ///
    /// Champion ids are normalized; if two upstream spellings collapse onto
    /// one id, the one with more games wins.
    pub fn from_upstream(raw: &RawStatsResponse) -> Self {
        let mut champions: BTreeMap<String, ChampionStats> = BTreeMap::new();
        for (raw_id, raw_stats) in raw {
            let id = normalize_champion_id(raw_id);
            if id.is_empty() {
                continue;
            }
            let stats = ChampionStats::from_raw(raw_stats);
            match champions.get(&id) {
                Some(existing) if existing.games >= stats.games => {}
                _ => {
                    champions.insert(id, stats);
                }
            }
        }
        Self { champions }
    }

    /// Sub-select by role and/or champion. Both filters are normalized first;
    /// `None`, `"*"` or the role `"all"` keeps everything along that axis.
    pub fn project(&self, role: Option<&str>, champion: Option<&str>) -> StatsPayload {
        let role = role
            .map(normalize_role)
            .filter(|r| !r.is_empty() && r != "all" && r != "*");
        let champion = champion
            .map(normalize_champion_id)
            .filter(|c| !c.is_empty() && c != "*");

        if role.is_none() && champion.is_none() {
            return self.clone();
        }

        let champions = self
            .champions
            .iter()
            .filter(|(id, _)| champion.as_deref().map_or(true, |c| id.as_str() == c))
            .filter(|(_, stats)| {
                role.as_deref()
                    .map_or(true, |r| stats.role.as_deref() == Some(r))
            })
            .map(|(id, stats)| (id.clone(), stats.clone()))
            .collect();

        StatsPayload { champions }
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }

    pub fn get(&self, champion: &str) -> Option<&ChampionStats> {
        self.champions.get(&normalize_champion_id(champion))
    }
}
