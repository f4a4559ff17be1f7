//! The normalized mail record.

use mailglass_content::ContentKind;
use serde::{Deserialize, Serialize};

use super::labels::{Category, Priority, label};

/// Display-ready form of one provider message.
///
/// Records are values: changing a flag goes through [`MailRecord::with_read`]
/// or [`MailRecord::with_starred`], which return a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    /// Provider message ID; the identity key.
    pub id: String,
    /// Provider thread ID.
    pub thread_id: String,
    /// Label IDs in first-seen order, without duplicates.
    pub label_ids: Vec<String>,
    /// Short preview text.
    pub snippet: String,
    /// Sender display name.
    pub sender_name: String,
    /// Sender address.
    pub sender_email: String,
    /// Subject as sent, possibly empty.
    pub subject: String,
    /// Raw `To` header.
    pub to: String,
    /// Raw `Cc` header.
    pub cc: String,
    /// Raw `Bcc` header.
    pub bcc: String,
    /// Raw `Date` header.
    pub date: String,
    /// Local time rendering of `date`, empty when unparseable.
    pub formatted_date: String,
    /// Epoch milliseconds of `date`, 0 when unparseable.
    pub timestamp: i64,
    /// Inbox tab.
    pub category: Category,
    /// Display priority.
    pub priority: Priority,
    /// Carries the `UNREAD` label.
    pub is_unread: bool,
    /// Carries the `IMPORTANT` label.
    pub is_important: bool,
    /// Carries the `STARRED` label.
    pub is_starred: bool,
    /// Carries the `INBOX` label.
    pub is_in_inbox: bool,
    /// Some part declares a filename.
    pub has_attachments: bool,
    /// Content kind declared by the body part, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentKind>,
    /// Provider history ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
    /// Provider internal date, epoch milliseconds as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_date: Option<String>,
    /// Provider size estimate in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_estimate: Option<u64>,
    /// Decoded body, present for messages fetched in full format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl MailRecord {
    /// Subject for display, `(no subject)` when empty.
    #[must_use]
    pub fn display_subject(&self) -> &str {
        if self.subject.trim().is_empty() {
            "(no subject)"
        } else {
            &self.subject
        }
    }

    /// Sender for display: the name, or the address when there is no name.
    #[must_use]
    pub fn display_sender(&self) -> &str {
        if self.sender_name.is_empty() {
            &self.sender_email
        } else {
            &self.sender_name
        }
    }

    /// Returns a copy marked read or unread.
    #[must_use]
    pub fn with_read(&self, read: bool) -> Self {
        let mut record = self.with_label(label::UNREAD, !read);
        record.is_unread = !read;
        record
    }

    /// Returns a copy starred or unstarred.
    #[must_use]
    pub fn with_starred(&self, starred: bool) -> Self {
        let mut record = self.with_label(label::STARRED, starred);
        record.is_starred = starred;
        record.priority = Priority::from_labels(&record.label_ids);
        record
    }

    fn with_label(&self, id: &str, present: bool) -> Self {
        let mut record = self.clone();
        record.label_ids.retain(|l| l != id);
        if present {
            record.label_ids.push(id.to_string());
        }
        record
    }
}
