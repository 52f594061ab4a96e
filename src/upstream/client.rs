//! Upstream provider client.
//!
//! [`StatsProvider`] is the seam the fetcher talks to; [`HttpStatsProvider`]
//! implements it over `reqwest`. Every call is bounded by the client's
//! per-request timeout and nothing else.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::error::StatsError;
use crate::upstream::types::{RawStatsResponse, UpstreamQuery};

#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// `GET /stats` for one unfiltered (patch, rank, region) combination.
    async fn fetch_stats(&self, query: &UpstreamQuery) -> Result<RawStatsResponse, StatsError>;

    /// `GET /versions`, newest first.
    async fn fetch_versions(&self) -> Result<Vec<String>, StatsError>;
}

/// HTTP implementation of [`StatsProvider`].
pub struct HttpStatsProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    api_key_header: String,
}

impl HttpStatsProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, StatsError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StatsError::Configuration(
                "upstream.base_url is missing".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StatsError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        })
    }

    /// Issue a GET and return the body text of a successful response.
    async fn get_text(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<String, StatsError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), key.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| StatsError::Upstream(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Upstream returned non-success status");
            return Err(StatsError::Upstream(format!(
                "{url} returned status {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| StatsError::Upstream(format!("reading body from {url} failed: {e}")))
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn fetch_stats(&self, query: &UpstreamQuery) -> Result<RawStatsResponse, StatsError> {
        let body = self.get_text("/stats", &query.params()).await?;
        let parsed: RawStatsResponse = serde_json::from_str(&body)
            .map_err(|e| StatsError::Parse(format!("/stats body: {e}")))?;

        debug!(
            rank = %query.rank,
            region = %query.region,
            champions = parsed.len(),
            "Fetched upstream stats"
        );
        Ok(parsed)
    }

    async fn fetch_versions(&self) -> Result<Vec<String>, StatsError> {
        let body = self.get_text("/versions", &[]).await?;
        serde_json::from_str(&body).map_err(|e| StatsError::Parse(format!("/versions body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_base_url() {
        let config = UpstreamConfig {
            base_url: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            HttpStatsProvider::new(&config),
            Err(StatsError::Configuration(_))
        ));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let config = UpstreamConfig {
            base_url: "https://stats.example/v1/".into(),
            ..Default::default()
        };
        let provider = HttpStatsProvider::new(&config).unwrap();
        assert_eq!(provider.base_url, "https://stats.example/v1");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_upstream_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let config = UpstreamConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let provider = HttpStatsProvider::new(&config).unwrap();
        let err = provider.fetch_versions().await.unwrap_err();
        assert!(matches!(err, StatsError::Upstream(_)));
    }
}
