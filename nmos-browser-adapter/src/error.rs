//! Error types for the adapter.

use nmos_browser_prefs::PrefsError;
use thiserror::Error;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors surfaced to callers of the adapter.
///
/// None of these are retried inside the adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// A body that should have been JSON was not.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A well-formed response of the wrong shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The request cannot be expressed against the registry APIs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Preferences could not be read or written.
    #[error("preference error: {0}")]
    Preferences(#[from] PrefsError),
}

impl AdapterError {
    /// HTTP status of a remote failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
