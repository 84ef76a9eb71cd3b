use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use vtfs_protocol::{args, endpoints, query_param};
use vtfs_store::Backend;

use crate::dispatch::Dispatcher;
use crate::handler;

/// Shared state of the HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            dispatcher: Dispatcher::new(backend),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.map(Arc::from);
        self
    }

    /// Whether the `token` argument in `query` matches the configured one.
    pub fn authorized(&self, query: &str) -> bool {
        match &self.token {
            None => true,
            Some(expected) => matches!(
                query_param(query, args::TOKEN),
                Ok(Some(given)) if *given == **expected
            ),
        }
    }
}

/// Build the axum router with all vtfs endpoints.
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    let rpc = format!("{}/:op", endpoints::RPC);
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(&rpc, post(handler::rpc_handler))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
