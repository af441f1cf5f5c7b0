use comicdex_catalog::ValidationError;
use comicdex_db::{DataError, ErrorKind, SchemaError};
use thiserror::Error;

/// Errors surfaced by the service layer.
///
/// Not-found and validation errors carry user-facing text and display it
/// verbatim. Storage failures keep the full cause for logging but display
/// only an opaque message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Not found, or rejected caller data (validation or a classified
    /// constraint violation).
    #[error(transparent)]
    Data(DataError),

    /// The caller lacks the capability for a mutation.
    #[error("{0}")]
    Permission(String),

    #[error("storage problem")]
    Database(#[source] DataError),

    /// The blocking storage task panicked or was aborted.
    #[error("storage problem")]
    Task(#[source] tokio::task::JoinError),

    #[error("operation cancelled")]
    Cancelled,
}

impl ServiceError {
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(e) => e.kind(),
            Self::Permission(_) => ErrorKind::Generic,
            Self::Database(_) | Self::Task(_) | Self::Cancelled => ErrorKind::Database,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<DataError> for ServiceError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::Cancelled => Self::Cancelled,
            e if e.kind() == ErrorKind::Database => {
                log::error!("storage failure: {e}");
                Self::Database(e)
            }
            e => Self::Data(e),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        Self::Data(e.into())
    }
}

/// A best-effort cache operation failed. Never fatal to the caller.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache lock poisoned")]
    Poisoned,

    #[error("cache backend failure: {0}")]
    Backend(String),
}

/// The catalog database could not be opened.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot create {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
