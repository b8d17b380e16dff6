//! Storage Error Types

use std::path::PathBuf;

use crate::booking::api::BookingError;
use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Cannot access data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Data file {path} is not a valid snapshot: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Data file {path} has format version {found}, this build reads version {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("Data file {path} holds inconsistent state: {source}")]
    Inconsistent {
        path: PathBuf,
        #[source]
        source: BookingError,
    },
}

impl ContextualError for StorageError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
