//! Error types for the glint icon resolution engine.

use thiserror::Error;

/// Storage-related errors
///
/// Absence of a record is not an error; the store APIs model it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised while fetching a page or image over HTTP.
///
/// Every variant is recovered inside the resolver; a fetch failure becomes
/// the failed-attempt branch of the fallback chain rather than surfacing to
/// the rendering layer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Network error fetching {url}: {cause}")]
    Network { url: String, cause: String },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while deriving gradient colors from an icon.
#[derive(Debug, Error)]
pub enum GradientError {
    #[error("Image could not be decoded: {0}")]
    Decode(String),

    #[error("No usable color data in image")]
    EmptyPalette,
}

/// Engine-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}
