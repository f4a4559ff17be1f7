//! Provider messages and their normalized form.
//!
//! This module provides:
//! - **Raw types**: the Gmail `Message` resource shape, deserialized as-is
//! - **Labels**: Gmail system labels mapped to [`Category`] and [`Priority`]
//! - **Headers**: case-insensitive lookup and `From` parsing
//! - **Normalization**: [`normalize`] and [`normalize_batch`]
//!
//! # Example
//!
//! ```ignore
//! use mailglass_core::{RawMessage, normalize_batch};
//!
//! let raws: Vec<RawMessage> = serde_json::from_str(&json)?;
//! for record in normalize_batch(&raws) {
//!     println!("{} {} {}", record.formatted_date, record.sender_name, record.subject);
//! }
//! ```

mod body;
mod header;
mod labels;
mod model;
mod normalize;
mod raw;

pub use body::{MailBody, decode_part_data, extract_body};
pub use header::{Sender, header_value};
pub use labels::{Category, Priority, label};
pub use model::MailRecord;
pub use normalize::{normalize, normalize_batch, parse_date};
pub use raw::{MessagePart, PartBody, RawHeader, RawMessage};
