//! Backend selection.

use std::sync::Arc;

use tracing::info;

use docone_core::config::DatabaseConfig;
use docone_core::error::AppError;
use docone_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{
    CaptureRepository, DocumentRepository, LinkRepository, ViewRepository,
};
use crate::store::{CaptureStore, DocumentStore, LinkStore, ViewStore};

#[derive(Debug, Clone)]
enum Backend {
    Postgres(DatabasePool),
    Memory,
}

/// The set of stores the services run against.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Documents.
    pub documents: Arc<dyn DocumentStore>,
    /// Shareable links.
    pub links: Arc<dyn LinkStore>,
    /// Viewing sessions.
    pub views: Arc<dyn ViewStore>,
    /// Email captures.
    pub captures: Arc<dyn CaptureStore>,
    backend: Backend,
}

impl Storage {
    /// Build the backend named by `config.provider`.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Using in-memory storage; data is lost on restart");
                Ok(Self::memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider '{other}'"
            ))),
        }
    }

    /// Stores backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            documents: Arc::new(DocumentRepository::new(pg.clone())),
            links: Arc::new(LinkRepository::new(pg.clone())),
            views: Arc::new(ViewRepository::new(pg.clone())),
            captures: Arc::new(CaptureRepository::new(pg)),
            backend: Backend::Postgres(pool),
        }
    }

    /// Stores backed by a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            documents: store.clone(),
            links: store.clone(),
            views: store.clone(),
            captures: store,
            backend: Backend::Memory,
        }
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    /// Whether the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.backend {
            Backend::Postgres(pool) => pool.ping().await,
            Backend::Memory => Ok(true),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Backend::Postgres(pool) = &self.backend {
            pool.close().await;
        }
    }
}
