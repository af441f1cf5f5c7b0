use thiserror::Error;

use comicdex_lib::{OpenError, ServiceError, SettingsError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening the catalog database failed
    #[error("Database error: {0}")]
    Open(#[from] OpenError),

    /// A catalog operation was refused or failed
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad command-line input
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
