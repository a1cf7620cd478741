//! Convenience result type alias for DocOne.

use crate::error::AppError;

/// A specialized `Result` type for DocOne operations.
pub type AppResult<T> = Result<T, AppError>;
