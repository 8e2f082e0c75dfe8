//! Server module - the HTTP control plane for runs
//!
//! Routes:
//! - `POST /run/` submits a run and answers its id
//! - `GET /run/{id}` answers the run's current status
//! - `GET /metrics` exposes product match counters
//! - `GET /healthz` liveness probe

pub mod api;
mod cache;
mod handlers;
mod lifecycle;

pub use cache::{CacheError, RunCache, RunRecord, RunStatusCache};
pub use lifecycle::{RunLauncher, SubmittedRun};

use crate::recorder::MatchCounter;
use crate::PenFinderError;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State shared by every handler
pub struct AppState {
    pub launcher: RunLauncher,
    pub metrics: Arc<MatchCounter>,
}

impl AppState {
    pub fn new(launcher: RunLauncher, metrics: Arc<MatchCounter>) -> Self {
        Self { launcher, metrics }
    }
}

/// Builds the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run/", post(handlers::post_run))
        .route("/run/{id}", get(handlers::get_run))
        .route("/metrics", get(handlers::metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

/// Serves the router until `shutdown` is cancelled
///
/// Stops accepting connections once the token fires and returns after
/// in-flight requests complete. Detached run tasks are not awaited.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> Result<(), PenFinderError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled_owned().await })
        .await
        .map_err(|e| PenFinderError::Server(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}
