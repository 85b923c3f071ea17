//! Error types for the Ephemera store.

use thiserror::Error;

/// Main error type for Ephemera operations.
#[derive(Error, Debug)]
pub enum EphemeraError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blob payload that is not a well-formed base64 data URL
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Lookup for an id that is absent or expired. The two cases are
    /// deliberately indistinguishable.
    #[error("Not found")]
    NotFound,

    /// Id generation kept colliding with live entries
    #[error("Id space exhausted after repeated collisions")]
    IdSpaceExhausted,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Ephemera operations.
pub type Result<T> = std::result::Result<T, EphemeraError>;
