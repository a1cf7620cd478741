//! Shared fixtures for service tests, wired against the in-memory store and
//! the moka cache.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use docone_auth::gate::{CacheGateStore, GateStore};
use docone_auth::password::PasswordHasher;
use docone_auth::token::{CodeSource, RandomCodeSource, TokenGenerator};
use docone_cache::CacheManager;
use docone_cache::memory::MemoryCacheProvider;
use docone_core::config::StorageConfig;
use docone_core::config::cache::MemoryCacheConfig;
use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_core::types::UserId;
use docone_database::Storage;
use docone_entity::document::{CreateDocument, Document};
use docone_entity::link::ShareableLink;

use crate::analytics::AnalyticsTracker;
use crate::capture::EmailCaptureLedger;
use crate::context::RequestContext;
use crate::document::{DocumentConverter, DocumentService, DocumentStorage};
use crate::link::{AccessValidator, LinkRegistry, LinkSettings};
use crate::ownership::OwnershipGuard;
use crate::viewer::ViewerService;

pub(crate) struct Harness {
    pub storage: Storage,
    pub owner_id: UserId,
    pub registry: LinkRegistry,
    pub tracker: AnalyticsTracker,
    pub ledger: EmailCaptureLedger,
    pub viewer: ViewerService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_codes(Arc::new(RandomCodeSource))
    }

    pub fn with_codes(codes: Arc<dyn CodeSource>) -> Self {
        let storage = Storage::memory();
        let hasher = Arc::new(PasswordHasher::new());
        let guard = OwnershipGuard::new(storage.documents.clone(), storage.links.clone());
        let registry = LinkRegistry::new(storage.links.clone(), guard, hasher.clone(), codes);
        let tracker = AnalyticsTracker::new(storage.views.clone());
        let ledger = EmailCaptureLedger::new(storage.captures.clone());

        let cache = Arc::new(CacheManager::from_provider(
            Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default())),
            Duration::from_secs(300),
        ));
        let gates: Arc<dyn GateStore> =
            Arc::new(CacheGateStore::new(cache, Duration::from_secs(3600)));

        let viewer = ViewerService::new(
            registry.clone(),
            AccessValidator::new(hasher),
            tracker.clone(),
            ledger.clone(),
            gates,
            storage.documents.clone(),
        );

        Self {
            storage,
            owner_id: UserId::new(),
            registry,
            tracker,
            ledger,
            viewer,
        }
    }

    pub fn owner(&self) -> RequestContext {
        RequestContext::for_user(self.owner_id)
    }

    pub async fn owner_with_document(&self) -> (RequestContext, Document) {
        let ctx = self.owner();
        let document = self
            .storage
            .documents
            .create_document(&CreateDocument {
                owner_id: self.owner_id,
                title: "Pitch deck".to_string(),
                original_filename: "pitch.pdf".to_string(),
                file_type: "pdf".to_string(),
                file_path: format!("{}/pitch.pdf", self.owner_id),
                view_path: format!("{}/pitch.pdf", self.owner_id),
                file_size: 1024,
            })
            .await
            .unwrap();
        (ctx, document)
    }

    /// A link on a fresh document owned by the harness owner.
    pub async fn link(&self, settings: LinkSettings) -> ShareableLink {
        let (ctx, document) = self.owner_with_document().await;
        self.registry.create(&ctx, document.id, settings).await.unwrap()
    }

    pub async fn documents_service(&self) -> DocumentService {
        self.documents_service_with(Some(Arc::new(CopyConverter))).await
    }

    pub async fn documents_service_with(
        &self,
        converter: Option<Arc<dyn DocumentConverter>>,
    ) -> DocumentService {
        let root = std::env::temp_dir().join(format!("docone-service-{}", Uuid::new_v4()));
        let files = Arc::new(DocumentStorage::new(root).await.unwrap());
        DocumentService::new(
            self.storage.documents.clone(),
            OwnershipGuard::new(self.storage.documents.clone(), self.storage.links.clone()),
            files,
            converter,
            StorageConfig::default(),
        )
    }
}

/// Hands out a fixed sequence of codes, then random ones.
#[derive(Debug)]
pub(crate) struct ScriptedCodes {
    queue: Mutex<VecDeque<String>>,
    drawn: AtomicUsize,
}

impl ScriptedCodes {
    pub fn new<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            queue: Mutex::new(codes.into_iter().map(str::to_string).collect()),
            drawn: AtomicUsize::new(0),
        }
    }

    pub fn drawn(&self) -> usize {
        self.drawn.load(Ordering::SeqCst)
    }
}

impl CodeSource for ScriptedCodes {
    fn next_code(&self) -> String {
        self.drawn.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(TokenGenerator::link_code)
    }
}

/// Writes the input bytes to the output path.
#[derive(Debug)]
pub(crate) struct CopyConverter;

#[async_trait]
impl DocumentConverter for CopyConverter {
    async fn convert(&self, input: &Path, output: &Path) -> AppResult<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Always fails like a crashed converter.
#[derive(Debug)]
pub(crate) struct FailingConverter;

#[async_trait]
impl DocumentConverter for FailingConverter {
    async fn convert(&self, _input: &Path, _output: &Path) -> AppResult<()> {
        Err(AppError::external_service("converter exited with status 1"))
    }
}
