use std::sync::Arc;

use crew_dispatch::api;
use crew_dispatch::config::Config;
use crew_dispatch::error::AppError;
use crew_dispatch::geo::{Geocoder, NoopGeocoder, StaticGeocoder};
use crew_dispatch::state::AppState;
use crew_dispatch::store::memory::{InMemoryRepository, Snapshot};
use crew_dispatch::store::SystemClock;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let repo = load_repository(config.seed_file.as_deref()).await?;
    let geocoder = load_geocoder(config.geocode_file.as_deref()).await?;
    let app_state = AppState::new(
        Arc::new(repo),
        geocoder,
        Arc::new(SystemClock),
        config.scoring_settings(),
        config.event_buffer_size,
    );
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        scoring_concurrency = config.scoring_concurrency,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn load_repository(seed_file: Option<&str>) -> Result<InMemoryRepository, AppError> {
    let Some(path) = seed_file else {
        return Ok(InMemoryRepository::new());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::Internal(format!("failed to read {path}: {err}")))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .map_err(|err| AppError::Internal(format!("invalid seed file {path}: {err}")))?;

    tracing::info!(
        path,
        jobs = snapshot.jobs.len(),
        workers = snapshot.workers.len(),
        "loading seed snapshot"
    );

    InMemoryRepository::from_snapshot(snapshot)
}

async fn load_geocoder(table_file: Option<&str>) -> Result<Arc<dyn Geocoder>, AppError> {
    let Some(path) = table_file else {
        tracing::info!("no geocode table configured, jobs without coordinates stay unlocated");
        return Ok(Arc::new(NoopGeocoder));
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::Internal(format!("failed to read {path}: {err}")))?;
    let geocoder: StaticGeocoder = serde_json::from_str(&raw)
        .map_err(|err| AppError::Internal(format!("invalid geocode table {path}: {err}")))?;

    tracing::info!(path, addresses = geocoder.len(), "loaded geocode table");
    Ok(Arc::new(geocoder))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
