//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur while reading provider data.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider message JSON could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Body data was not valid base64url.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Decoded body bytes were not UTF-8.
    #[error("Invalid UTF-8 in body: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
