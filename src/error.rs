//! Error types for the orchestration layer.

use std::path::PathBuf;

use thiserror::Error;

use docseal_crypto::SealError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Seal(#[from] SealError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encryption job {0} not found")]
    JobNotFound(u64),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True if the failure came from rejected input rather than I/O or crypto.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
