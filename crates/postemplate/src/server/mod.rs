mod page;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use postemplate_core::config::Settings;
use postemplate_core::download_cache::DownloadCache;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub use page::UNCATEGORIZED_WARNING;
pub use routes::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.settings.max_upload_bytes;

    Router::new()
        .route("/", get(routes::index).post(routes::upload))
        .route("/download/{token}", get(routes::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drops downloads nobody collected before their TTL ran out.
pub fn spawn_expiry_sweeper(downloads: Arc<DownloadCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = downloads.purge_expired(Utc::now());
            if removed > 0 {
                debug!(removed, remaining = downloads.len(), "Purged expired downloads");
            }
        }
    })
}

pub async fn serve(settings: Settings) -> Result<()> {
    let state = AppState::new(settings).context("invalid server settings")?;
    let sweeper = spawn_expiry_sweeper(
        Arc::clone(&state.downloads),
        state.settings.sweep_interval(),
    );

    let bind_addr = state.settings.bind_addr;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(
        addr = %listener.local_addr()?,
        basis_path = %state.settings.basis_path.display(),
        "POS template server listening"
    );

    let result = axum::serve(listener, router(state)).await;
    sweeper.abort();
    result.context("server terminated")
}
