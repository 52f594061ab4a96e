//! Statistics HTTP API.
//!
//! - GET /api/stats
//! - POST /api/collect
//! - GET /api/versions
//! - GET /api/cache/stats
//! - GET /health
//! - GET /metrics

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::collect::{BulkOrchestrator, CollectionJob, CollectionRequest};
use crate::config::Config;
use crate::error::StatsError;
use crate::metrics::Metrics;
use crate::stats::{StatsFetcher, StatsPayload, StatsRequest};

/// Application state shared across handlers.
pub struct AppState {
    pub fetcher: Arc<StatsFetcher>,
    pub orchestrator: Arc<BulkOrchestrator>,
    pub config: Arc<Config>,
    pub metrics: Arc<Metrics>,
    pub start_time: Instant,
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/stats", get(get_stats))
        .route("/api/collect", post(run_collection))
        .route("/api/versions", get(list_versions))
        .route("/api/cache/stats", get(cache_stats))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VersionsQuery {
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct VersionList {
    pub versions: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStatsResponse,
}

/// Cache statistics response.
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub primary_configured: bool,
    pub local_entries: usize,
    pub primary_hits: u64,
    pub local_hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub store_errors: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hits = stats.primary_hits + stats.local_hits;
        let lookups = hits + stats.misses + stats.stale;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };
        Self {
            primary_configured: stats.primary_configured,
            local_entries: stats.local_entries,
            primary_hits: stats.primary_hits,
            local_hits: stats.local_hits,
            misses: stats.misses,
            stale: stats.stale,
            store_errors: stats.store_get_errors + stats.store_upsert_errors,
            hit_rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Error type for handlers: a [`StatsError`] rendered as JSON.
pub struct ApiError(StatsError);

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            StatsError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StatsError::Upstream(_) | StatsError::Parse(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(request): Query<StatsRequest>,
) -> Result<Json<StatsPayload>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id = request_id,
        key = %request.key(),
        "Stats request"
    );

    let payload = state.fetcher.fetch_stats(&request).await.map_err(|e| {
        error!(request_id = request_id, error = %e, "Stats request failed");
        ApiError::from(e)
    })?;
    Ok(Json(payload))
}

async fn run_collection(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CollectionJob>, Response> {
    let request: CollectionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CollectionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            let body = ErrorBody {
                error: "invalid_request",
                message: e.to_string(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        })?
    };

    let job = state
        .orchestrator
        .run(request)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;
    Ok(Json(job))
}

async fn list_versions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VersionsQuery>,
) -> Result<Json<VersionList>, ApiError> {
    let count = query
        .count
        .unwrap_or(state.config.collection.default_patch_count);
    let versions = state.fetcher.latest_versions(count).await?;
    Ok(Json(VersionList { versions }))
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let stats = state.fetcher.cache().stats().await;
    Json(stats.into())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.fetcher.cache().stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cache: stats.into(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
