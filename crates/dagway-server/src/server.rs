use std::sync::Arc;

use tokio::net::TcpListener;

use dagway_store::BlockStore;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// The dagway gateway server.
pub struct DagwayServer {
    config: ServerConfig,
    store: Arc<dyn BlockStore>,
}

impl DagwayServer {
    pub fn new(config: ServerConfig, store: Arc<dyn BlockStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            store: self.store.clone(),
            config: Arc::new(self.config.clone()),
        })
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("dagway gateway listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

/// Install a plain fmt subscriber. Embedding applications that bring their
/// own subscriber skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}
