//! Display preparation for message bodies.

use pulldown_cmark::{Options, Parser, html};

use crate::classify::{ContentKind, classify};
use crate::sanitize::{sanitize, sanitize_preformatted};

/// A body prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    /// Nothing to show.
    Empty,
    /// Plain text, shown verbatim.
    Text(String),
    /// Sanitized HTML wrapped in a standalone document.
    Html(String),
    /// Markdown source with its sanitized HTML rendering.
    Markdown {
        /// Original Markdown.
        source: String,
        /// Sanitized HTML fragment.
        html: String,
    },
}

impl RenderedBody {
    /// The content kind this body was rendered as.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Empty | Self::Text(_) => ContentKind::Text,
            Self::Html(_) => ContentKind::Html,
            Self::Markdown { .. } => ContentKind::Markdown,
        }
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Prepares `body` for display.
///
/// `hint` overrides detection when the sender declared a type; otherwise
/// the body is classified. HTML is sanitized and wrapped with
/// [`html_document`], Markdown is rendered to HTML and sanitized with code
/// blocks keeping their line breaks.
#[must_use]
pub fn render(body: &str, hint: Option<ContentKind>) -> RenderedBody {
    if body.trim().is_empty() {
        return RenderedBody::Empty;
    }

    let kind = hint.unwrap_or_else(|| classify(body).kind());
    tracing::debug!(kind = kind.as_str(), hinted = hint.is_some(), "rendering body");

    match kind {
        ContentKind::Text => RenderedBody::Text(body.to_string()),
        ContentKind::Html => RenderedBody::Html(html_document(&sanitize(body))),
        ContentKind::Markdown => {
            let mut rendered = String::with_capacity(body.len() * 3 / 2);
            let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
            html::push_html(&mut rendered, Parser::new_ext(body, options));
            RenderedBody::Markdown {
                source: body.to_string(),
                html: sanitize_preformatted(&rendered),
            }
        }
    }
}

const DOCUMENT_HEAD: &str = concat!(
    "<!DOCTYPE html><html><head>",
    r#"<meta charset="UTF-8">"#,
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=5.0, user-scalable=yes">"#,
    r#"<meta http-equiv="Content-Security-Policy" content="default-src 'none'; img-src https: http: data:; style-src 'unsafe-inline'">"#,
    "<style>",
    "*{box-sizing:border-box}",
    "body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif;",
    "font-size:16px;line-height:1.6;color:#111827;margin:0;padding:16px;",
    "word-wrap:break-word;overflow-wrap:break-word;-webkit-text-size-adjust:100%}",
    "img{max-width:100%!important;height:auto!important;display:block;margin:8px 0}",
    "a{color:#3b82f6;text-decoration:none;word-break:break-word}",
    "p{margin:0 0 12px 0}",
    "table{max-width:100%;border-collapse:collapse}",
    "pre,code{white-space:pre-wrap;font-family:ui-monospace,Menlo,monospace}",
    "blockquote{margin:0 0 12px 0;padding-left:12px;border-left:3px solid #e5e7eb;color:#4b5563}",
    "</style></head><body>",
);

const DOCUMENT_TAIL: &str = "</body></html>";

/// Wraps an already sanitized fragment in a mobile-friendly HTML document.
///
/// The document carries a restrictive content security policy so that a
/// web view showing it loads no scripts, frames or remote styles.
#[must_use]
pub fn html_document(sanitized: &str) -> String {
    let mut doc = String::with_capacity(DOCUMENT_HEAD.len() + sanitized.len() + DOCUMENT_TAIL.len());
    doc.push_str(DOCUMENT_HEAD);
    doc.push_str(sanitized);
    doc.push_str(DOCUMENT_TAIL);
    doc
}
