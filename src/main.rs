//! champ-stats-cache server and one-shot collector.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use champ_stats_cache::cache::{HttpKvStore, PersistentStore, TieredCache, TtlPolicy};
use champ_stats_cache::collect::{BulkOrchestrator, CollectionRequest};
use champ_stats_cache::config::{Cli, Command, Config};
use champ_stats_cache::metrics::Metrics;
use champ_stats_cache::server::api::{build_router, AppState};
use champ_stats_cache::stats::StatsFetcher;
use champ_stats_cache::upstream::{HttpStatsProvider, StatsProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "champ_stats_cache=debug,tower_http=debug"
    } else {
        "champ_stats_cache=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("champ-stats-cache v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let mut config = Config::load(&cli.config)?;
    if let Some(listen) = &cli.listen {
        config.server.listen = listen.clone();
    }
    let config = Arc::new(config);

    info!(
        upstream = %config.upstream.base_url,
        store_configured = config.store.url.is_some(),
        stats_ttl_secs = config.cache.stats_ttl_secs,
        meta_ttl_secs = config.cache.meta_ttl_secs,
        dispatch_interval_ms = config.collection.dispatch_interval_ms,
        "Configuration loaded"
    );

    // Wire the pipeline: store → cache → fetcher → orchestrator.
    let metrics = Arc::new(Metrics::new()?);
    let primary = HttpKvStore::from_config(&config.store)?
        .map(|store| Arc::new(store) as Arc<dyn PersistentStore>);
    let cache = Arc::new(TieredCache::new(
        primary,
        TtlPolicy::from_config(&config.cache),
        metrics.clone(),
    ));
    let provider: Arc<dyn StatsProvider> = Arc::new(HttpStatsProvider::new(&config.upstream)?);
    let fetcher = Arc::new(StatsFetcher::new(cache, provider, metrics.clone()));
    let orchestrator = Arc::new(BulkOrchestrator::new(
        fetcher.clone(),
        config.clone(),
        metrics.clone(),
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Collect {
            patches,
            ranks,
            regions,
        } => {
            let request = CollectionRequest {
                patches: Some(patches),
                ranks: Some(ranks),
                regions: Some(regions),
            };
            let job = orchestrator.run(request).await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(())
        }
        Command::Serve => {
            let state = Arc::new(AppState {
                fetcher,
                orchestrator,
                config: config.clone(),
                metrics,
                start_time: Instant::now(),
            });

            // Build the HTTP router.
            let app = build_router(state);

            // Start the server.
            let listen_addr = config.server.listen.clone();
            info!(addr = listen_addr, "Starting server");

            let listener = TcpListener::bind(&listen_addr).await?;
            info!("Listening on {listen_addr}");

            axum::serve(listener, app).await?;

            Ok(())
        }
    }
}
