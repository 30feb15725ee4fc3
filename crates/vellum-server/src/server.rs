use std::sync::Arc;

use tokio::net::TcpListener;

use vellum_collate::Collator;
use vellum_store::{ArtifactStore, FsArtifactStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Vellum artifact server.
pub struct VellumServer {
    config: ServerConfig,
    collator: Collator,
}

impl VellumServer {
    /// Open the filesystem store named by `config` and build a server on it.
    pub async fn open(config: ServerConfig) -> ServerResult<Self> {
        let store = if config.create_root {
            FsArtifactStore::create(&config.storage_root)
                .await
                .map_err(|e| ServerError::Config(e.to_string()))?
        } else {
            FsArtifactStore::new(&config.storage_root)
        };
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build a server over any store (useful for testing).
    pub fn with_store(config: ServerConfig, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            config,
            collator: Collator::new(store),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.collator.clone())
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            root = %self.config.storage_root.display(),
            "Vellum server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_store::InMemoryArtifactStore;

    #[test]
    fn server_construction() {
        let server = VellumServer::with_store(
            ServerConfig::default(),
            Arc::new(InMemoryArtifactStore::new()),
        );
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        let _router = server.router();
    }

    #[tokio::test]
    async fn open_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage_root: dir.path().join("data").join("default"),
            ..ServerConfig::default()
        };
        let server = VellumServer::open(config).await.unwrap();
        assert!(server.config().storage_root.is_dir());
    }

    #[tokio::test]
    async fn open_without_create_leaves_root_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage_root: dir.path().join("missing"),
            create_root: false,
            ..ServerConfig::default()
        };
        let server = VellumServer::open(config).await.unwrap();
        assert!(!server.config().storage_root.exists());
    }
}
