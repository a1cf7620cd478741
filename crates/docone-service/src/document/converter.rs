//! Conversion of office documents into the served PDF format.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use docone_core::config::storage::ConversionConfig;
use docone_core::error::AppError;
use docone_core::result::AppResult;

/// Converts a stored upload into the served format.
#[async_trait]
pub trait DocumentConverter: Send + Sync + std::fmt::Debug + 'static {
    /// Convert `input` and write the result to `output`. Failures are
    /// reported as `ExternalService` errors and never retried.
    async fn convert(&self, input: &Path, output: &Path) -> AppResult<()>;
}

/// Runs `libreoffice --headless --convert-to pdf` under a timeout.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    command: String,
    timeout: Duration,
}

impl LibreOfficeConverter {
    /// Creates a converter from configuration.
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Where LibreOffice writes its result for `input` inside `out_dir`.
    fn produced_path(input: &Path, out_dir: &Path) -> Option<PathBuf> {
        input
            .file_stem()
            .map(|stem| out_dir.join(format!("{}.pdf", stem.to_string_lossy())))
    }
}

#[async_trait]
impl DocumentConverter for LibreOfficeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> AppResult<()> {
        let out_dir = output
            .parent()
            .ok_or_else(|| AppError::internal("Conversion output has no parent directory"))?;

        let mut cmd = Command::new(&self.command);
        cmd.arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                error!(input = %input.display(), timeout_seconds = self.timeout.as_secs(), "Conversion timed out");
                AppError::external_service(format!(
                    "Conversion timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                AppError::external_service(format!("Failed to run {}: {e}", self.command))
            })?;

        if !result.status.success() {
            let stderr: String = String::from_utf8_lossy(&result.stderr).chars().take(500).collect();
            error!(input = %input.display(), code = ?result.status.code(), %stderr, "Conversion failed");
            return Err(AppError::external_service("Document conversion failed"));
        }

        let produced = Self::produced_path(input, out_dir)
            .ok_or_else(|| AppError::internal("Conversion input has no file name"))?;
        if !produced.exists() {
            return Err(AppError::external_service(
                "Conversion finished without producing a PDF",
            ));
        }
        if produced != output {
            tokio::fs::rename(&produced, output).await?;
        }

        info!(
            input = %input.display(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Document converted"
        );
        Ok(())
    }
}
