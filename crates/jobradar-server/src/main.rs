//! Jobradar runtime: HTTP API plus the background scrape scheduler.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobradar_browser::{ChromiumNavigator, FetchSettings};
use jobradar_core::AppConfig;
use jobradar_db::JobStore;
use jobradar_pipeline::{RunGuard, Scheduler, ScrapeOrchestrator};
use jobradar_sources::{SourceLoader, SourceRegistry};

mod routes;

/// Shared state behind every handler.
pub struct AppState {
    pub store: JobStore,
    pub orchestrator: Arc<ScrapeOrchestrator>,
    pub guard: RunGuard,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobradar=info".parse()?))
        .init();

    let config = AppConfig::load_with_env().context("load configuration")?;

    let db_path = config.database_path().context("resolve database path")?;
    let store = JobStore::open(&db_path)
        .await
        .with_context(|| format!("open job store at {}", db_path.display()))?;

    let loader = SourceLoader::new(&config.scraping.definitions_dir)
        .or_else(|_| SourceLoader::with_default_dir())
        .context("locate source definitions")?;
    let registry = SourceRegistry::load_from(&loader).context("load source definitions")?;
    info!(sources = registry.count(), "source definitions loaded");

    let navigator = Arc::new(ChromiumNavigator::new(FetchSettings::from_config(
        &config.scraping,
    )));

    let orchestrator = Arc::new(ScrapeOrchestrator::new(
        navigator,
        registry,
        store.clone(),
        config.scraping.snapshot_dir.clone(),
        config.scraping.max_concurrent_sources,
    ));

    let guard = RunGuard::new();

    if config.scheduler.enabled {
        let scheduler = Scheduler::new(
            Arc::clone(&orchestrator),
            store.clone(),
            guard.clone(),
            config.scheduler.interval_hours,
        );
        tokio::spawn(scheduler.run());
    } else {
        info!("scheduler disabled by configuration");
    }

    let state = Arc::new(AppState {
        store,
        orchestrator,
        guard,
    });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/jobs", get(routes::api_jobs))
        .route("/api/jobs/source/{source}", get(routes::api_jobs_by_source))
        .route("/api/runs", get(routes::api_runs))
        .route("/api/scrape", post(routes::api_scrape_all))
        .route("/api/scrape/{source}", post(routes::api_scrape_source))
        .with_state(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = &config.server.bind_addr;
    info!("jobradar API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
