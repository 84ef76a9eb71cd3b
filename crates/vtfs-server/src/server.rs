use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use vtfs_store::{Backend, LocalTreeStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// vtfs peer: one backend served over HTTP.
pub struct VtfsServer {
    config: ServerConfig,
    backend: Arc<dyn Backend>,
}

impl VtfsServer {
    /// Server hosting a fresh local store with the configured limits.
    pub fn new(config: ServerConfig) -> Self {
        let backend = Arc::new(LocalTreeStore::with_config(config.store.clone()));
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: ServerConfig, backend: Arc<dyn Backend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let state = AppState::new(Arc::clone(&self.backend)).with_token(self.config.token.clone());
        build_router(state, self.config.max_body_size)
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The backend is initialized before the first request and shut down
    /// after the last one.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.backend.initialize()?;
        let addr = listener.local_addr()?;
        info!(%addr, backend = self.backend.name(), "vtfs server listening");

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));

        self.backend.shutdown();
        info!("vtfs server stopped");
        result
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}
