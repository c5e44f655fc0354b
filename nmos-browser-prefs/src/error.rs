//! Error types for preference storage.

use thiserror::Error;

/// Result type for preference operations.
pub type PrefsResult<T> = Result<T, PrefsError>;

/// Errors that can occur reading or writing preferences.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Backing store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored value could not be interpreted.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// Store lock was poisoned by a panicking writer.
    #[error("preference store lock poisoned")]
    Poisoned,
}
