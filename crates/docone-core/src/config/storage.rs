//! Document file storage and conversion settings.

use serde::{Deserialize, Serialize};

/// Where uploads live and which formats are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding uploads and their converted copies.
    pub upload_root: String,
    pub max_upload_size_bytes: u64,
    /// Lower-case extensions without the dot.
    pub allowed_extensions: Vec<String>,
    pub conversion: ConversionConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: "data/uploads".into(),
            max_upload_size_bytes: 50 * 1024 * 1024,
            allowed_extensions: ["pdf", "docx", "pptx"].map(String::from).to_vec(),
            conversion: ConversionConfig::default(),
        }
    }
}

impl StorageConfig {
    /// Case-insensitive membership in `allowed_extensions`.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// Office-to-PDF conversion through an external program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// When off, only PDF uploads are accepted.
    pub enabled: bool,
    pub command: String,
    pub timeout_seconds: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "libreoffice".into(),
            timeout_seconds: 60,
        }
    }
}
