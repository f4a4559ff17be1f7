//! Bearer tokens and where they come from.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Google's `OAuth2` token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Supplies bearer tokens to the client.
///
/// `refresh` is called after Gmail rejects a token; the client then retries
/// once with whatever `refresh` returned.
pub trait TokenSource: Send + Sync {
    /// Returns a token to use for the next request.
    fn access_token(&self) -> impl Future<Output = Result<String>> + Send;

    /// Obtains a fresh token, replacing the current one.
    fn refresh(&self) -> impl Future<Output = Result<String>> + Send;
}

/// A fixed access token that cannot be refreshed.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(access_token.into())
    }
}

impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    async fn refresh(&self) -> Result<String> {
        Err(Error::NoRefreshToken)
    }
}

/// `OAuth2` access token with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Access token string.
    pub access_token: String,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Expiration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token for obtaining new access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Token {
    /// Creates a bearer token.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_at: None,
            refresh_token: None,
        }
    }

    /// Creates a token from a token endpoint response.
    #[must_use]
    pub fn from_response(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(i64::from(secs)));

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token,
        }
    }

    /// Checks if the token is expired (with 60 second buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() + Duration::seconds(60) >= exp)
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiration time.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Token response from the `OAuth2` server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expires in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    /// Refresh token, usually absent on refresh grants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error response from the `OAuth2` server.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,
    /// Error description.
    #[serde(default)]
    pub error_description: String,
}

impl ErrorResponse {
    /// Converts to an Error.
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::oauth_error(self.error, self.error_description)
    }
}

/// Access token kept current with the refresh-token grant.
#[derive(Debug)]
pub struct RefreshingToken {
    http: reqwest::Client,
    client_id: String,
    client_secret: Option<String>,
    token_url: String,
    token: Mutex<Token>,
}

impl RefreshingToken {
    /// Creates a source for an installed-app client.
    #[must_use]
    pub fn new(client_id: impl Into<String>, token: Token) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: None,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            token: Mutex::new(token),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Returns a copy of the current token.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    async fn refresh_locked(&self, token: &mut Token) -> Result<()> {
        let refresh_token = token.refresh_token.as_deref().ok_or(Error::NoRefreshToken)?;

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(secret) = &self.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        debug!(url = %self.token_url, "Refreshing access token");
        let response = self.http.post(&self.token_url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) => error.into_error(),
                Err(_) => Error::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let mut new_token = Token::from_response(response.json().await?);
        // Preserve refresh token if not returned
        if new_token.refresh_token.is_none() {
            new_token.refresh_token.clone_from(&token.refresh_token);
        }
        *token = new_token;
        info!("Access token refreshed");
        Ok(())
    }
}

impl TokenSource for RefreshingToken {
    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if token.is_expired() && token.refresh_token.is_some() {
            self.refresh_locked(&mut token).await?;
        }
        Ok(token.access_token.clone())
    }

    async fn refresh(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        self.refresh_locked(&mut token).await?;
        Ok(token.access_token.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiration() {
        let expired = Token::bearer("a").with_expires_at(Utc::now() - Duration::seconds(120));
        assert!(expired.is_expired());

        let nearly = Token::bearer("a").with_expires_at(Utc::now() + Duration::seconds(30));
        assert!(nearly.is_expired());

        let valid = Token::bearer("a").with_expires_at(Utc::now() + Duration::seconds(3600));
        assert!(!valid.is_expired());

        assert!(!Token::bearer("a").is_expired());
    }

    #[test]
    fn test_token_from_response_without_type() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "ya29", "expires_in": 3599}"#).unwrap();
        let token = Token::from_response(response);
        assert_eq!(token.access_token, "ya29");
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_at.is_some());
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_error_response_into_error() {
        let response: ErrorResponse =
            serde_json::from_str(r#"{"error": "invalid_grant"}"#).unwrap();
        match response.into_error() {
            Error::OAuth { error, description } => {
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_static_token() {
        let source = StaticToken::new("fixed");
        assert_eq!(
            tokio_test::block_on(source.access_token()).unwrap(),
            "fixed"
        );
        assert!(matches!(
            tokio_test::block_on(source.refresh()),
            Err(Error::NoRefreshToken)
        ));
    }

    #[tokio::test]
    async fn test_refreshing_token_without_refresh_token() {
        let source = RefreshingToken::new("client", Token::bearer("current"));
        assert_eq!(source.access_token().await.unwrap(), "current");
        assert!(matches!(source.refresh().await, Err(Error::NoRefreshToken)));
    }
}
