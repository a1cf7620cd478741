//! Local filesystem layout for uploaded and converted documents.
//!
//! Files live under `{root}/{owner}/{yyyy}/{mm}/{uuid}.{ext}`; the database
//! stores paths relative to the root.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use chrono::{Datelike, Utc};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::UserId;

/// A file written to storage.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Path relative to the storage root.
    pub relative_path: String,
    /// Bytes written.
    pub size: u64,
}

/// Document files on the local filesystem.
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    /// Open storage rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root_path.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Write an upload to a fresh path for its owner.
    pub async fn store_upload(&self, owner: UserId, ext: &str, data: Bytes) -> AppResult<StoredFile> {
        let now = Utc::now();
        let relative_path = format!(
            "{owner}/{:04}/{:02}/{}.{ext}",
            now.year(),
            now.month(),
            Uuid::new_v4()
        );
        let full_path = self.resolve(&relative_path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {relative_path}"),
                e,
            )
        })?;

        debug!(path = %relative_path, bytes = data.len(), "Stored upload");
        Ok(StoredFile {
            relative_path,
            size: data.len() as u64,
        })
    }

    /// Absolute path of a stored file. Rejects paths escaping the root.
    pub fn resolve(&self, relative_path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(relative_path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!(
                "Invalid storage path: {relative_path}"
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Path relative to the root, for a file inside it.
    pub fn relativize(&self, path: &Path) -> AppResult<String> {
        path.strip_prefix(&self.root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .map_err(|_| {
                AppError::storage(format!("{} is outside the storage root", path.display()))
            })
    }

    /// Open a stored file for reading, with its length.
    pub async fn open(&self, relative_path: &str) -> AppResult<(fs::File, u64)> {
        let full_path = self.resolve(relative_path)?;
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {relative_path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open file: {relative_path}"),
                    e,
                )
            }
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to stat file", e))?
            .len();
        Ok((file, len))
    }

    /// Remove a stored file. Missing files are not an error.
    pub async fn remove(&self, relative_path: &str) -> AppResult<()> {
        let full_path = self.resolve(relative_path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove file: {relative_path}"),
                e,
            )),
        }
    }

    /// Whether the root directory is usable.
    pub async fn health_check(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
