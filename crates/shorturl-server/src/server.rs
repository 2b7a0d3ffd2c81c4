use std::sync::Arc;

use shorturl_store::{SqliteStore, UrlStore};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::AppState;
use crate::router::build_router;

/// The shorturl HTTP server.
pub struct ShortUrlServer {
    config: ServerConfig,
    store: Arc<dyn UrlStore>,
}

impl ShortUrlServer {
    pub fn new(config: ServerConfig, store: Arc<dyn UrlStore>) -> Self {
        Self { config, store }
    }

    /// Open the SQLite store named in `config` and build a server over it.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let store = SqliteStore::from_config(&config.store)?;
        tracing::info!(
            path = %config.store.path.display(),
            starting_index = config.store.starting_index,
            "opened store"
        );
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            Arc::clone(&self.store),
            self.config.base_url.clone(),
            self.config.max_url_len,
        ))
    }

    /// Serve requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("shorturl listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
