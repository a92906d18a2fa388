// src/error.rs

//! Error types shared across the crate

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    /// Certificate had no usable entitlement payload, or it failed to inflate
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Inflated entitlement payload is not a valid content document
    #[error("Malformed content: {0}")]
    MalformedContentError(#[from] serde_json::Error),

    /// Destination file could not be created or written
    #[error("Write error: {0}")]
    WriteError(String),

    /// No consumer identity installed, so there is no connection to use
    #[error("This system is not registered")]
    NotRegisteredError,

    #[error("Listing path error: {0}")]
    ListingPathError(String),

    #[error("Access forbidden: {0}")]
    ForbiddenError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
