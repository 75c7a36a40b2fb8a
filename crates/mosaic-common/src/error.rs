//! Error types for the mosaic services.

use thiserror::Error;

/// Result type alias using MosaicError.
pub type MosaicResult<T> = Result<T, MosaicError>;

/// Primary error type for mosaic and video operations.
#[derive(Debug, Error)]
pub enum MosaicError {
    // === Request Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Too many tiles requested: {requested} exceeds the limit of {limit}")]
    TooManyTiles { requested: usize, limit: usize },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // === Tile Errors ===
    #[error("Tile ({col},{row}) could not be fetched: {reason}")]
    TileFetchFailed { col: u32, row: u32, reason: String },

    // === External Process Errors ===
    #[error("Frame interpolation failed: {0}")]
    InterpolationFailed(String),

    #[error("Video encoding failed: {0}")]
    EncodingFailed(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MosaicError {
    /// Shorthand for an `InvalidInput` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        MosaicError::InvalidInput(message.into())
    }

    /// Stable machine-readable code reported to API callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            MosaicError::InvalidInput(_) => "InvalidInput",
            MosaicError::TooManyTiles { .. } => "TooManyTiles",
            MosaicError::SessionNotFound(_) => "SessionNotFound",
            MosaicError::TileFetchFailed { .. } => "TileFetchFailed",
            MosaicError::InterpolationFailed(_) => "InterpolationFailed",
            MosaicError::EncodingFailed(_) => "EncodingFailed",
            MosaicError::Io(_) | MosaicError::Image(_) | MosaicError::Internal(_) => {
                "InternalError"
            }
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            MosaicError::InvalidInput(_) | MosaicError::TooManyTiles { .. } => 400,

            MosaicError::SessionNotFound(_) => 404,

            MosaicError::TileFetchFailed { .. } => 502,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        MosaicError::Io(err.to_string())
    }
}
