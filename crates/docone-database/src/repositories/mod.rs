//! PostgreSQL implementations of the storage contracts.

pub mod capture;
pub mod document;
pub mod link;
pub mod view;

pub use capture::CaptureRepository;
pub use document::DocumentRepository;
pub use link::LinkRepository;
pub use view::ViewRepository;

use docone_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning constraint violations into caller-actionable kinds.
pub(crate) fn map_db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::with_source(ErrorKind::Conflict, context, e);
            }
            if db.is_foreign_key_violation() {
                return AppError::with_source(ErrorKind::NotFound, context, e);
            }
        }
        AppError::with_source(ErrorKind::Database, context, e)
    }
}
