//! Single-combination fetcher.
//!
//! Serves one (patch, rank, region) combination through the tiered cache,
//! calling upstream at most once per miss. Role and champion filters are
//! applied to the cached full payload, so every filtered view of a
//! combination shares one cache entry and one upstream call.
//!
//! A request without a patch is pinned to the newest upstream version, the
//! same key space bulk collection writes into. Only when the version list is
//! unavailable does it fall back to the unpinned `current` key.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CachePayload, TieredCache};
use crate::error::StatsError;
use crate::keys::{normalize_rank, normalize_region, StatsKey, VERSIONS_KEY};
use crate::metrics::Metrics;
use crate::stats::payload::StatsPayload;
use crate::upstream::{StatsProvider, UpstreamQuery};

/// A `getStats` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    pub rank: String,
    pub region: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "champion")]
    pub champion_id: Option<String>,
    #[serde(default)]
    pub patch: Option<String>,
}

impl StatsRequest {
    pub fn new(rank: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            rank: rank.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_champion(mut self, champion: impl Into<String>) -> Self {
        self.champion_id = Some(champion.into());
        self
    }

    pub fn with_patch(mut self, patch: impl Into<String>) -> Self {
        self.patch = Some(patch.into());
        self
    }

    pub fn has_patch(&self) -> bool {
        self.patch.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    /// Key of the (possibly filtered) view this request asks for.
    pub fn key(&self) -> StatsKey {
        StatsKey::new(
            self.patch.as_deref(),
            &self.rank,
            &self.region,
            self.role.as_deref(),
            self.champion_id.as_deref(),
        )
    }

    /// Key the full payload for this combination is stored under.
    pub fn storage_key(&self) -> StatsKey {
        StatsKey::unfiltered(self.patch.as_deref(), &self.rank, &self.region)
    }

    fn upstream_query(&self) -> UpstreamQuery {
        UpstreamQuery {
            patch: self
                .patch
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            rank: normalize_rank(&self.rank),
            region: normalize_region(&self.region),
        }
    }
}

pub struct StatsFetcher {
    cache: Arc<TieredCache>,
    provider: Arc<dyn StatsProvider>,
    metrics: Arc<Metrics>,
}

impl StatsFetcher {
    pub fn new(
        cache: Arc<TieredCache>,
        provider: Arc<dyn StatsProvider>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            cache,
            provider,
            metrics,
        }
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    /// Statistics for one combination, projected by the request's role and
    /// champion filters.
    ///
    /// One cache read, at most one upstream call, at most one cache write.
    pub async fn fetch_stats(&self, request: &StatsRequest) -> Result<StatsPayload, StatsError> {
        let request = &self.pin_patch(request).await;
        let view_key = request.key();
        let storage_key = request.storage_key();

        if let Some(entry) = self.cache.get(storage_key.as_str()).await {
            match entry.payload {
                CachePayload::Stats(payload) => {
                    debug!(key = %view_key, "Serving stats from cache");
                    return Ok(payload.project(request.role.as_deref(), request.champion_id.as_deref()));
                }
                CachePayload::Versions(_) => {
                    warn!(key = %storage_key, "Unexpected payload kind under stats key, refetching");
                }
            }
        }

        let query = request.upstream_query();
        let raw = self.provider.fetch_stats(&query).await;
        self.metrics.record_upstream("stats", raw.is_ok());
        let raw = raw?;

        let payload = StatsPayload::from_upstream(&raw);
        info!(
            key = %storage_key,
            champions = payload.len(),
            "Fetched stats from upstream"
        );

        let view = payload.project(request.role.as_deref(), request.champion_id.as_deref());
        self.cache
            .set(storage_key.as_str(), CacheEntry::new(CachePayload::Stats(payload)))
            .await;

        Ok(view)
    }

    /// `request` with an explicit patch, defaulting to the newest version.
    async fn pin_patch(&self, request: &StatsRequest) -> StatsRequest {
        if request.has_patch() {
            return request.clone();
        }
        match self.latest_versions(1).await {
            Ok(versions) => match versions.into_iter().next() {
                Some(latest) => request.clone().with_patch(latest),
                None => request.clone(),
            },
            Err(e) => {
                warn!(error = %e, "Could not resolve newest patch, using the current key");
                request.clone()
            }
        }
    }

    /// The `count` most recent upstream versions, newest first. The full list
    /// is cached as meta data.
    pub async fn latest_versions(&self, count: usize) -> Result<Vec<String>, StatsError> {
        if let Some(entry) = self.cache.get(VERSIONS_KEY).await {
            if let CachePayload::Versions(versions) = entry.payload {
                return Ok(versions.into_iter().take(count).collect());
            }
        }

        let versions = self.provider.fetch_versions().await;
        self.metrics.record_upstream("versions", versions.is_ok());
        let versions: Vec<String> = versions?
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        info!(count = versions.len(), "Fetched version list from upstream");
        self.cache
            .set(VERSIONS_KEY, CacheEntry::new(CachePayload::Versions(versions.clone())))
            .await;

        Ok(versions.into_iter().take(count).collect())
    }
}
