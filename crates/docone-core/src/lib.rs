//! # docone-core
//!
//! Core crate for DocOne. Contains the configuration schema, typed
//! identifiers, the cache provider trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocOne crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
