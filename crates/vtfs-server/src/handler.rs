use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use tracing::warn;

use vtfs_protocol::{HealthResponse, Reply};

use crate::dispatch::Dispatcher;
use crate::router::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// One protocol call: `/v1/rpc/{op}?{args}` with the write payload as body.
///
/// Protocol-level failures are answered with HTTP 200 and a negative
/// status in the reply. Only a bad token (401) and a panicked backend call
/// (500) surface as HTTP errors.
pub async fn rpc_handler(
    State(state): State<AppState>,
    Path(op): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let query = query.unwrap_or_default();
    if !state.authorized(&query) {
        warn!(%op, "rejected request with bad token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let request = match Dispatcher::parse(&op, &query, body.to_vec()) {
        Ok(request) => request,
        Err(err) => return reply_response(Reply::error(&err).encode()),
    };

    let dispatcher = state.dispatcher.clone();
    match tokio::task::spawn_blocking(move || dispatcher.respond(&request)).await {
        Ok(reply) => reply_response(reply),
        Err(join) => {
            warn!(%op, error = %join, "backend call panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, join.to_string()).into_response()
        }
    }
}

fn reply_response(bytes: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response()
}
