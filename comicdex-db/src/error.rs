//! Error types for the data-access layer.

use thiserror::Error;

use crate::classify::ConstraintViolation;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A point lookup matched no row.
    NotFound,
    /// Caller-supplied data was rejected.
    Generic,
    /// Storage failure the caller cannot fix.
    Database,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    Generic(String),
    /// A check constraint rejected the row; the violation is kept as the source.
    #[error("{message}")]
    Wrapped {
        message: String,
        #[source]
        source: Box<ConstraintViolation>,
    },
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("operation cancelled")]
    Cancelled,
}

impl DataError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Generic(_) | Self::Wrapped { .. } => ErrorKind::Generic,
            Self::Database(_) | Self::Cancelled => ErrorKind::Database,
        }
    }
}

impl From<comicdex_catalog::ValidationError> for DataError {
    fn from(e: comicdex_catalog::ValidationError) -> Self {
        Self::Generic(e.0)
    }
}
