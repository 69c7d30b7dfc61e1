//! Error types for tacet-core.

use thiserror::Error;

/// Error type for tacet-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed constructor or setter argument.
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// Operation not valid for the current state.
    #[error("Invalid state: {0}")]
    State(String),

    /// Attempted to connect nodes owned by different contexts.
    #[error("Cannot connect across contexts (source context {source_context}, destination context {destination})")]
    CrossContext { source_context: u64, destination: u64 },

    /// Audio decoding failed.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Device operation failed.
    #[error("Device error: {0}")]
    Device(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Shorthand for a validation error with a formatted message.
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Shorthand for a state error with a formatted message.
    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Error::State(msg.into())
    }
}
