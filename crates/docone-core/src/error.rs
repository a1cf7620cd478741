//! The error type shared by every DocOne crate.
//!
//! A viewer being turned away (expired link, wrong password) is a decision,
//! not an error; see the access validator. [`AppError`] covers requests
//! that cannot be served at all and infrastructure faults.

use std::fmt;

use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    /// Missing or invalid owner token.
    Unauthorized,
    /// Not the owner, or a viewer gate not yet passed.
    Forbidden,
    Validation,
    Conflict,
    Database,
    Cache,
    /// Document file I/O.
    Storage,
    Configuration,
    Serialization,
    /// The document converter failed or timed out.
    ExternalService,
    Internal,
}

impl ErrorKind {
    /// Stable upper-case code used in API error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Database => "DATABASE",
            Self::Cache => "CACHE",
            Self::Storage => "STORAGE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::ExternalService => "EXTERNAL_SERVICE",
            Self::Internal => "INTERNAL",
        }
    }

    /// Server-side faults, as opposed to conditions the caller can fix.
    pub fn is_fault(self) -> bool {
        !matches!(
            self,
            Self::NotFound | Self::Unauthorized | Self::Forbidden | Self::Validation | Self::Conflict
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// A failed operation: its kind, a message safe to show the caller for
/// non-fault kinds, and the underlying cause if there is one.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Cause>,
}

macro_rules! kind_constructors {
    ($($fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $fn_name(message: impl Into<String>) -> Self {
                Self::new(ErrorKind::$kind, message)
            }
        )*
    };
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// An error caused by `source`.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    kind_constructors! {
        not_found => NotFound,
        unauthorized => Unauthorized,
        forbidden => Forbidden,
        validation => Validation,
        conflict => Conflict,
        database => Database,
        storage => Storage,
        configuration => Configuration,
        external_service => ExternalService,
        internal => Internal,
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

/// Clones carry the kind and message; the cause is not cloneable.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Malformed JSON: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("File I/O failed: {err}"), err)
    }
}
