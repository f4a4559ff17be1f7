//! # mailglass-content
//!
//! Content handling for email bodies before they reach a rendering surface.
//!
//! ## Features
//!
//! - **Classification**: Detect whether a body is plain text, HTML or Markdown
//! - **Sanitization**: Best-effort denylist cleanup of HTML mail
//! - **Rendering**: Turn a body into display-ready text or a sandboxable HTML document
//! - **Text utilities**: HTML to text, safety check, reading time, truncation
//!
//! ## Quick Start
//!
//! ### Classifying a Body
//!
//! ```ignore
//! use mailglass_content::{classify, ContentKind};
//!
//! let result = classify("<!DOCTYPE html><html><body><p>hi</p></body></html>");
//! assert_eq!(result.kind(), ContentKind::Html);
//! assert!((result.confidence() - 0.95).abs() < f32::EPSILON);
//! ```
//!
//! ### Sanitizing HTML
//!
//! ```ignore
//! use mailglass_content::sanitize;
//!
//! let clean = sanitize("<script>alert(1)</script><p>safe</p>");
//! assert_eq!(clean, "<p>safe</p>");
//! ```
//!
//! ### Rendering
//!
//! ```ignore
//! use mailglass_content::{render, RenderedBody};
//!
//! match render("# Hello\n\nWorld", None) {
//!     RenderedBody::Markdown { html, .. } => println!("{html}"),
//!     other => println!("{}", other.kind().as_str()),
//! }
//! ```
//!
//! The sanitizer is pattern based, not a parser. It removes the usual
//! attack surface of marketing and newsletter mail, but the output must
//! still be shown in a surface that does not execute scripts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod classify;
mod render;
mod sanitize;
mod text;

pub use classify::{Classification, ContentKind, classify};
pub use render::{RenderedBody, html_document, render};
pub use sanitize::sanitize;
pub use text::{estimate_reading_time, html_to_text, is_content_safe, truncate};

/// Compiles a pattern that is a string literal in this crate.
#[allow(clippy::expect_used)]
pub(crate) fn pattern(source: &str) -> regex::Regex {
    regex::Regex::new(source).expect("built-in pattern must compile")
}

/// Compiles a set of literal patterns; match indices follow slice order.
#[allow(clippy::expect_used)]
pub(crate) fn pattern_set(sources: &[&str]) -> regex::RegexSet {
    regex::RegexSet::new(sources).expect("built-in pattern set must compile")
}
