//! Uploaded documents.

pub mod model;

pub use model::{CreateDocument, Document, VIEW_FORMAT_EXTENSION};
