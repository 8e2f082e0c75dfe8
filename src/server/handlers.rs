use crate::server::api::{GetRunResponse, PostRunRequest, PostRunResponse};
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// POST /run/
pub async fn post_run(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: PostRunRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Rejected malformed run request");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let run = state.launcher.submit(request.kinds());
    json_response(&PostRunResponse { run_id: run.id })
}

/// GET /run/{id}
pub async fn get_run(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    match state.launcher.status(id) {
        Some(record) => json_response(&GetRunResponse::from(record)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

fn json_response<T: serde::Serialize>(body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
