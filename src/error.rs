use thiserror::Error;

use crate::{api::TransportError, storage::StorageError};

/// Message shown for every transport-level failure. The underlying cause is only logged.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// StoreError
///
/// The single failure type returned by every store operation. Operations never panic
/// or propagate past their own boundary: a failed login, a rejected create or a dead
/// network all come back as an `Err(StoreError)` the caller can display directly via
/// `Display`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Input rejected locally, before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a usable response (connection, decode).
    #[error("{msg}", msg = NETWORK_ERROR_MESSAGE)]
    Transport { detail: String },

    /// A referenced parent entity is not loaded locally.
    #[error("{0}")]
    NotFound(String),

    /// The session could not be written to durable storage.
    #[error("Failed to persist session: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status for `Rejected`, None for everything else.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for StoreError {
    fn from(err: TransportError) -> Self {
        tracing::error!(error = %err, "transport failure");
        Self::Transport {
            detail: err.to_string(),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
