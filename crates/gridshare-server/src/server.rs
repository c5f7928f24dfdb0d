use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use gridshare_repo::{GridRepository, ServerConfig};

use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// gridshare HTTP server.
pub struct GridshareServer {
    config: ServerConfig,
    repo: Arc<GridRepository>,
}

impl GridshareServer {
    pub fn new(config: ServerConfig, repo: Arc<GridRepository>) -> Self {
        Self { config, repo }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.repo), &self.config))
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(bind_addr = %self.config.bind_addr, "gridshare server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
