//! Uploaded documents: storage, conversion, and registration.

pub mod converter;
pub mod service;
pub mod storage;

pub use converter::{DocumentConverter, LibreOfficeConverter};
pub use service::{DocumentService, UploadedDocument};
pub use storage::DocumentStorage;
