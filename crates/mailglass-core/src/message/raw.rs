//! Gmail API message resource, deserialized without interpretation.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A message as returned by `users.messages.get`.
///
/// Every field is optional on the wire; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMessage {
    /// Immutable message ID.
    pub id: String,
    /// ID of the thread the message belongs to.
    pub thread_id: String,
    /// Label IDs applied to the message, in provider order.
    pub label_ids: Vec<String>,
    /// Short part of the message text.
    pub snippet: String,
    /// ID of the last history record that modified this message.
    pub history_id: Option<String>,
    /// Internal creation time in epoch milliseconds, as a decimal string.
    pub internal_date: Option<String>,
    /// Estimated size in bytes.
    pub size_estimate: Option<u64>,
    /// Parsed message structure.
    pub payload: Option<MessagePart>,
}

impl RawMessage {
    /// Decodes a single message from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes a JSON array of messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has the wrong shape.
    pub fn from_json_list(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Top-level headers, empty when the payload is missing.
    #[must_use]
    pub fn headers(&self) -> &[RawHeader] {
        self.payload
            .as_ref()
            .map(|p| p.headers.as_slice())
            .unwrap_or_default()
    }
}

/// One MIME part of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessagePart {
    /// Part ID within the message.
    pub part_id: String,
    /// MIME type of the part.
    pub mime_type: String,
    /// Filename, set only for attachments.
    pub filename: String,
    /// Headers of this part, in wire order.
    pub headers: Vec<RawHeader>,
    /// Body of this part.
    pub body: Option<PartBody>,
    /// Child parts for `multipart/*` types.
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Whether this part declares a filename.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        !self.filename.trim().is_empty()
    }

    /// Depth-first iterator over this part and all its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let part = stack.pop()?;
            stack.extend(part.parts.iter().rev());
            Some(part)
        })
    }
}

/// One `{name, value}` header pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHeader {
    /// Header name as sent.
    pub name: String,
    /// Header value, already decoded by the provider.
    pub value: String,
}

impl RawHeader {
    /// Creates a header pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Body of a message part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartBody {
    /// Set when the data must be fetched as a separate attachment.
    pub attachment_id: Option<String>,
    /// Size of the data in bytes.
    pub size: u64,
    /// Base64url-encoded data.
    pub data: Option<String>,
}
