//! Per-attempt and per-tile fetch errors.

use std::time::Duration;

use mosaic_common::MosaicError;
use thiserror::Error;

/// Why a single fetch attempt failed.
#[derive(Debug, Clone, Error)]
pub enum TileFetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("tile source returned status {0}")]
    Status(u16),

    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("response is not a decodable image: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TileFetchError {
    fn from(err: reqwest::Error) -> Self {
        TileFetchError::Http(err.to_string())
    }
}

impl From<image::ImageError> for TileFetchError {
    fn from(err: image::ImageError) -> Self {
        TileFetchError::Decode(err.to_string())
    }
}

/// A tile that was dropped after exhausting its retries.
#[derive(Debug, Clone)]
pub struct TileFailure {
    pub col: u32,
    pub row: u32,
    pub attempts: u32,
    pub error: TileFetchError,
}

impl From<TileFailure> for MosaicError {
    fn from(failure: TileFailure) -> Self {
        MosaicError::TileFetchFailed {
            col: failure.col,
            row: failure.row,
            reason: format!("{} (after {} attempts)", failure.error, failure.attempts),
        }
    }
}
