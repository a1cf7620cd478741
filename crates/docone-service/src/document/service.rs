//! Document registration, listing, and deletion.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use docone_core::config::StorageConfig;
use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_core::types::DocumentId;
use docone_database::store::DocumentStore;
use docone_entity::document::{CreateDocument, Document, VIEW_FORMAT_EXTENSION};

use super::converter::DocumentConverter;
use super::storage::DocumentStorage;
use crate::context::RequestContext;
use crate::ownership::OwnershipGuard;

/// A file received from an owner.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Display title; defaults to the filename without extension.
    pub title: Option<String>,
    /// Filename as sent by the client.
    pub filename: String,
    /// File contents.
    pub data: Bytes,
}

/// Owns uploaded documents and their files.
#[derive(Debug, Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    guard: OwnershipGuard,
    storage: Arc<DocumentStorage>,
    converter: Option<Arc<dyn DocumentConverter>>,
    config: StorageConfig,
}

impl DocumentService {
    /// Creates a new document service. Without a converter only PDF
    /// uploads are accepted.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        guard: OwnershipGuard,
        storage: Arc<DocumentStorage>,
        converter: Option<Arc<dyn DocumentConverter>>,
        config: StorageConfig,
    ) -> Self {
        Self {
            documents,
            guard,
            storage,
            converter,
            config,
        }
    }

    /// Store an upload, converting it to PDF when needed, and register it.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        upload: UploadedDocument,
    ) -> AppResult<Document> {
        let file_type = Path::new(&upload.filename)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .filter(|e| self.config.is_allowed_extension(e))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Unsupported file type. Allowed: {}",
                    self.config.allowed_extensions.join(", ")
                ))
            })?;

        if upload.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if upload.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the {} byte upload limit",
                self.config.max_upload_size_bytes
            )));
        }

        let needs_conversion = file_type != VIEW_FORMAT_EXTENSION;
        let converter = match (&self.converter, needs_conversion) {
            (Some(converter), true) => Some(converter),
            (None, true) => {
                return Err(AppError::validation(
                    "Only PDF uploads are accepted while conversion is disabled",
                ));
            }
            (_, false) => None,
        };

        let stored = self
            .storage
            .store_upload(ctx.user_id, &file_type, upload.data)
            .await?;

        let view_path = match converter {
            Some(converter) => match self.convert(converter.as_ref(), &stored.relative_path).await {
                Ok(path) => path,
                Err(e) => {
                    self.discard(&[stored.relative_path.as_str()]).await;
                    return Err(e);
                }
            },
            None => stored.relative_path.clone(),
        };

        let title = upload
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| file_stem(&upload.filename));

        let created = self
            .documents
            .create_document(&CreateDocument {
                owner_id: ctx.user_id,
                title,
                original_filename: upload.filename,
                file_type,
                file_path: stored.relative_path.clone(),
                view_path: view_path.clone(),
                file_size: stored.size as i64,
            })
            .await;

        match created {
            Ok(document) => {
                info!(
                    user_id = %ctx.user_id,
                    document_id = %document.id,
                    file_type = %document.file_type,
                    converted = document.has_converted_copy(),
                    "Document registered"
                );
                Ok(document)
            }
            Err(e) => {
                self.discard(&[stored.relative_path.as_str(), view_path.as_str()]).await;
                Err(e)
            }
        }
    }

    /// The caller's documents, newest first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Document>> {
        self.documents.list_documents(ctx.user_id).await
    }

    /// A document the caller owns.
    pub async fn get(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<Document> {
        self.guard.document(ctx, id).await
    }

    /// Find a document without an ownership check.
    pub async fn find(&self, id: DocumentId) -> AppResult<Option<Document>> {
        self.documents.find_document(id).await
    }

    /// Hard-delete a document, its links and analytics, and its files.
    pub async fn delete(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<()> {
        let document = self.guard.document(ctx, id).await?;
        self.documents.delete_document(id).await?;
        self.discard(&[document.file_path.as_str(), document.view_path.as_str()]).await;

        info!(user_id = %ctx.user_id, document_id = %id, "Document deleted");
        Ok(())
    }

    /// Storage holding the document files.
    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }

    async fn convert(
        &self,
        converter: &dyn DocumentConverter,
        relative_path: &str,
    ) -> AppResult<String> {
        let input = self.storage.resolve(relative_path)?;
        let output = input.with_extension(VIEW_FORMAT_EXTENSION);
        converter.convert(&input, &output).await?;
        self.storage.relativize(&output)
    }

    async fn discard(&self, paths: &[&str]) {
        for path in paths {
            if let Err(e) = self.storage.remove(path).await {
                warn!(path = %path, error = %e, "Failed to remove document file");
            }
        }
    }
}

fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| filename.to_string())
}
