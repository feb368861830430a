use std::path::PathBuf;

use newsdash_warehouse::WarehouseError;
use thiserror::Error;

/// Failures loading the dataset. Both are fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data path not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to load dataset from {}: {source}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: WarehouseError,
    },
}

impl LoadError {
    pub(crate) fn from_warehouse(path: PathBuf, error: WarehouseError) -> Self {
        match error {
            WarehouseError::SourceNotFound { path } => Self::SourceNotFound { path },
            source => Self::LoadFailure { path, source },
        }
    }
}

/// Validation and contract errors exposed by `newsdash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code must not be empty")]
    EmptyErrorCode,
    #[error("error message must not be empty")]
    EmptyErrorMessage,

    #[error("table limit must be greater than zero")]
    InvalidTableLimit,
    #[error("invalid bind address '{value}', expected HOST:PORT")]
    InvalidBindAddress { value: String },
    #[error("invalid table limit '{value}', expected a positive integer")]
    UnparseableTableLimit { value: String },
}
