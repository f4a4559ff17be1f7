//! # mailglass-core
//!
//! Core mail model for the `mailglass` client.
//!
//! This crate provides:
//! - Gmail API message types as delivered by `users.messages.get`
//! - **Message normalization** - flat, display-ready [`MailRecord`]s with sender,
//!   category, priority, date and flag fields derived from headers and labels
//! - Body extraction from full-format messages
//!
//! Normalization never fails: every derived field has a default, so a
//! partially populated provider message still yields a complete record.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod message;

pub use error::{Error, Result};
pub use message::{
    Category, MailBody, MailRecord, MessagePart, PartBody, Priority, RawHeader, RawMessage,
    Sender, normalize, normalize_batch,
};
