//! Gmail REST client.

use std::future::Future;

use futures::future::try_join_all;
use mailglass_core::{MailRecord, RawMessage, normalize_batch};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::query::InboxQuery;
use crate::token::TokenSource;

/// Gmail REST API base URL.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Headers requested for inbox listings.
const METADATA_HEADERS: [&str; 6] = ["From", "Subject", "Date", "To", "Cc", "Bcc"];

/// Detail level for `users.messages.get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// Labels, snippet and the listing headers only.
    #[default]
    Metadata,
    /// Full MIME structure with body data.
    Full,
}

impl MessageFormat {
    /// Convert to the `format` parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Full => "full",
        }
    }

    fn params(self) -> Vec<(&'static str, String)> {
        let mut params = vec![("format", self.as_str().to_string())];
        if self == Self::Metadata {
            params.extend(
                METADATA_HEADERS
                    .iter()
                    .map(|h| ("metadataHeaders", (*h).to_string())),
            );
        }
        params
    }
}

/// Message reference from a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageRef {
    /// Message ID.
    pub id: String,
    /// Thread ID.
    pub thread_id: String,
}

/// Response of `users.messages.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListMessagesResponse {
    /// Message references, absent on an empty page.
    pub messages: Vec<MessageRef>,
    /// Token for the next page.
    pub next_page_token: Option<String>,
    /// Estimated total number of results.
    pub result_size_estimate: u32,
}

/// One page of normalized inbox records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxPage {
    /// Records, most recent first.
    pub messages: Vec<MailRecord>,
    /// Token for the next page.
    pub next_page_token: Option<String>,
    /// Estimated total number of results.
    pub result_size_estimate: u32,
}

fn is_auth_error(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Async Gmail client for one mailbox.
///
/// Every public operation runs with one bearer token. If Gmail rejects it,
/// the token source is refreshed and the whole operation runs once more.
#[derive(Debug)]
pub struct GmailClient<T> {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    tokens: T,
}

impl<T: TokenSource> GmailClient<T> {
    /// Creates a client for the authenticated user's mailbox.
    #[must_use]
    pub fn new(tokens: T) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: GMAIL_API_BASE.to_string(),
            user_id: "me".to_string(),
            tokens,
        }
    }

    /// Points the client at another API root.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;
        self.base_url = url.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Selects a mailbox other than `me`.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Returns the token source.
    pub const fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Lists one page of inbox message references.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or credentials are rejected.
    pub async fn list_messages(&self, query: &InboxQuery) -> Result<ListMessagesResponse> {
        self.with_auth_retry(|token| async move { self.list_with(&token, query).await })
            .await
    }

    /// Fetches one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or credentials are rejected.
    pub async fn get_message(&self, id: &str, format: MessageFormat) -> Result<RawMessage> {
        self.with_auth_retry(|token| async move { self.get_with(&token, id, format).await })
            .await
    }

    /// Fetches and normalizes one page of the inbox.
    ///
    /// Issues one list call, then a metadata call per listed message, all
    /// concurrently. The first failing detail call fails the page with
    /// [`Error::MessageFetch`].
    ///
    /// # Errors
    ///
    /// Returns an error if any call fails or credentials are rejected.
    pub async fn fetch_inbox(&self, query: &InboxQuery) -> Result<InboxPage> {
        self.with_auth_retry(|token| async move { self.fetch_inbox_with(&token, query).await })
            .await
    }

    async fn fetch_inbox_with(&self, token: &str, query: &InboxQuery) -> Result<InboxPage> {
        let list = self.list_with(token, query).await?;
        debug!(
            count = list.messages.len(),
            estimate = list.result_size_estimate,
            "Listed inbox"
        );

        let raws = try_join_all(list.messages.iter().map(|m| async move {
            self.get_with(token, &m.id, MessageFormat::Metadata)
                .await
                .map_err(|e| Error::message_fetch(&m.id, e))
        }))
        .await?;

        Ok(InboxPage {
            messages: normalize_batch(&raws),
            next_page_token: list.next_page_token,
            result_size_estimate: list.result_size_estimate,
        })
    }

    async fn list_with(&self, token: &str, query: &InboxQuery) -> Result<ListMessagesResponse> {
        let url = format!("{}/users/{}/messages", self.base_url, self.user_id);
        self.get_json(token, &url, &query.params()).await
    }

    async fn get_with(&self, token: &str, id: &str, format: MessageFormat) -> Result<RawMessage> {
        let url = format!("{}/users/{}/messages/{id}", self.base_url, self.user_id);
        self.get_json(token, &url, &format.params()).await
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<R> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        debug!(%url, %status, "Gmail response");
        if is_auth_error(status) {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await?;
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn with_auth_retry<R, F, Fut>(&self, op: F) -> Result<R>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let token = self.tokens.access_token().await?;
        match op(token).await {
            Err(e) if e.is_auth_failure() => {}
            other => return other,
        }

        warn!("Gmail rejected the access token, refreshing");
        let token = match self.tokens.refresh().await {
            Ok(token) => token,
            Err(Error::NoRefreshToken) => return Err(Error::Unauthorized),
            Err(e) => return Err(e),
        };

        match op(token).await {
            Err(e) if e.is_auth_failure() => Err(Error::Unauthorized),
            other => other,
        }
    }
}
