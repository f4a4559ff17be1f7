//! Error types for Gmail access.

/// Result type alias for Gmail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Gmail client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Credentials were rejected, even after a refresh.
    #[error("Unauthorized: credentials rejected by Gmail")]
    Unauthorized,

    /// Gmail answered with a non-success status.
    #[error("Gmail API error: HTTP {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// A per-message detail call failed.
    #[error("Failed to fetch message {id}: {source}")]
    MessageFetch {
        /// ID of the message whose detail call failed.
        id: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// `OAuth2` error from the token endpoint.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// No refresh token available.
    #[error("No refresh token available")]
    NoRefreshToken,
}

impl Error {
    /// Creates an OAuth error from error code and description.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Wraps a detail call failure with the message ID.
    #[must_use]
    pub fn message_fetch(id: impl Into<String>, source: Self) -> Self {
        Self::MessageFetch {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error, or the failure it wraps, is an authorization failure.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::MessageFetch { source, .. } => source.is_auth_failure(),
            _ => false,
        }
    }
}
