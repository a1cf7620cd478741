//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use docone_auth::gate::{CacheGateStore, GateStore};
use docone_auth::jwt::JwtDecoder;
use docone_auth::password::PasswordHasher;
use docone_auth::token::RandomCodeSource;
use docone_cache::CacheManager;
use docone_core::config::AppConfig;
use docone_core::result::AppResult;
use docone_database::Storage;
use docone_service::document::{DocumentConverter, DocumentService, DocumentStorage, LibreOfficeConverter};
use docone_service::{
    AccessValidator, AnalyticsTracker, EmailCaptureLedger, LinkRegistry, OwnershipGuard,
    ViewerService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Document, link, view, and capture stores
    pub storage: Storage,
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Owner token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Owner checks for documents and links
    pub guard: Arc<OwnershipGuard>,
    /// Document registration and deletion
    pub documents: Arc<DocumentService>,
    /// Link lifecycle
    pub links: Arc<LinkRegistry>,
    /// Viewing sessions and statistics
    pub tracker: Arc<AnalyticsTracker>,
    /// Captured viewer emails
    pub ledger: Arc<EmailCaptureLedger>,
    /// Anonymous viewer gate flow
    pub viewer: Arc<ViewerService>,
}

impl AppState {
    /// Wire every service from configuration, using the external converter
    /// when conversion is enabled.
    pub async fn build(
        config: AppConfig,
        storage: Storage,
        cache: Arc<CacheManager>,
    ) -> AppResult<Self> {
        let converter = config.storage.conversion.enabled.then(|| {
            Arc::new(LibreOfficeConverter::new(&config.storage.conversion))
                as Arc<dyn DocumentConverter>
        });
        Self::with_converter(config, storage, cache, converter).await
    }

    /// Wire every service with an explicit converter.
    pub async fn with_converter(
        config: AppConfig,
        storage: Storage,
        cache: Arc<CacheManager>,
        converter: Option<Arc<dyn DocumentConverter>>,
    ) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new());
        let guard = OwnershipGuard::new(storage.documents.clone(), storage.links.clone());

        let files = Arc::new(DocumentStorage::new(config.storage.upload_root.clone()).await?);
        let documents = DocumentService::new(
            storage.documents.clone(),
            guard.clone(),
            files,
            converter,
            config.storage.clone(),
        );

        let links = LinkRegistry::new(
            storage.links.clone(),
            guard.clone(),
            Arc::clone(&hasher),
            Arc::new(RandomCodeSource),
        );
        let tracker = AnalyticsTracker::new(storage.views.clone());
        let ledger = EmailCaptureLedger::new(storage.captures.clone());

        let gates: Arc<dyn GateStore> = Arc::new(CacheGateStore::new(
            Arc::clone(&cache),
            Duration::from_secs(config.viewer.session_lifetime_seconds),
        ));
        let viewer = ViewerService::new(
            links.clone(),
            AccessValidator::new(hasher),
            tracker.clone(),
            ledger.clone(),
            gates,
            storage.documents.clone(),
        );

        Ok(Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            storage,
            cache,
            guard: Arc::new(guard),
            documents: Arc::new(documents),
            links: Arc::new(links),
            tracker: Arc::new(tracker),
            ledger: Arc::new(ledger),
            viewer: Arc::new(viewer),
        })
    }
}
