//! # mailglass-gmail
//!
//! Async Gmail REST client that turns an inbox page into normalized
//! [`mailglass_core::MailRecord`]s.
//!
//! ## Features
//!
//! - **Inbox pages**: one list call plus concurrent metadata calls, fail-fast
//! - **Token sources**: a fixed token, or an `OAuth2` refresh-token grant
//! - **Auth retry**: a rejected token is refreshed and the operation retried once
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailglass_core::Category;
//! use mailglass_gmail::{GmailClient, InboxQuery, RefreshingToken, Token};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = Token::bearer("ya29...").with_refresh_token("1//0g...");
//!     let client = GmailClient::new(RefreshingToken::new("client_id", token));
//!
//!     let page = client
//!         .fetch_inbox(&InboxQuery::new().with_category(Category::Primary))
//!         .await?;
//!     for record in &page.messages {
//!         println!("{} {}", record.display_sender(), record.display_subject());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod query;
mod token;

pub use client::{
    GMAIL_API_BASE, GmailClient, InboxPage, ListMessagesResponse, MessageFormat, MessageRef,
};
pub use error::{Error, Result};
pub use query::{DEFAULT_PAGE_SIZE, InboxQuery};
pub use token::{
    ErrorResponse, GOOGLE_TOKEN_URL, RefreshingToken, StaticToken, Token, TokenResponse,
    TokenSource,
};
