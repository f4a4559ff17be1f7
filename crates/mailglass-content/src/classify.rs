//! Content kind detection for message bodies.
//!
//! Detection counts how many patterns of a fixed HTML battery and a fixed
//! Markdown battery match, then walks an ordered rule list. The first rule
//! whose predicate holds decides the result.

use std::fmt;
use std::sync::LazyLock;

use regex::RegexSet;

use crate::pattern_set;

/// The kind of content a message body holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ContentKind {
    /// Plain text.
    #[default]
    Text,
    /// HTML markup.
    Html,
    /// Markdown source.
    Markdown,
}

impl ContentKind {
    /// Parse from its string representation; unknown values are text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "html" => Self::Html,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Text,
        }
    }

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    /// Maps a MIME type such as `text/html; charset=utf-8` to a kind.
    ///
    /// Returns `None` for non-textual types.
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "text/markdown" | "text/x-markdown" => Some(Self::Markdown),
            "text/plain" => Some(Self::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Detected kind of a body together with a confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// Plain text.
    Text {
        /// Confidence of the detection.
        confidence: f32,
    },
    /// HTML markup.
    Html {
        /// Confidence of the detection.
        confidence: f32,
    },
    /// Markdown source.
    Markdown {
        /// Confidence of the detection.
        confidence: f32,
    },
}

impl Classification {
    /// The detected kind.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Html { .. } => ContentKind::Html,
            Self::Markdown { .. } => ContentKind::Markdown,
        }
    }

    /// Confidence of the detection.
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        match self {
            Self::Text { confidence }
            | Self::Html { confidence }
            | Self::Markdown { confidence } => *confidence,
        }
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::Text { confidence: 1.0 }
    }
}

static HTML_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    pattern_set(&[
        r"(?i)<[a-z][\s\S]*>",
        r"&[a-zA-Z0-9]+;",
        r"(?i)<!DOCTYPE",
        r"(?i)<html",
        r"(?i)<head",
        r"(?i)<body",
        r"(?i)<div",
        r"(?i)<span",
        r"(?i)<p>",
        r"(?i)<br\s*/?>",
        r"(?i)<img",
        r"(?i)<a\s+href",
        r"(?i)<table",
    ])
});

const MD_HEADING: usize = 0;
const MD_FENCE: usize = 6;
const MD_TABLE: usize = 9;

static MARKDOWN_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    pattern_set(&[
        r"(?m)^#{1,6}\s",
        r"\*\*.*?\*\*",
        r"\*.*?\*",
        r"\[.*?\]\(.*?\)",
        r"(?m)^[-*+]\s",
        r"(?m)^\d+\.\s",
        r"```[\s\S]*?```",
        r"`.*?`",
        r"(?m)^>",
        r"(?m)^\|.*\|",
        r"!\[.*?\]\(.*?\)",
        r"---+",
    ])
});

/// Pattern evidence gathered from one body.
#[derive(Debug, Default)]
struct Signals {
    html_hits: usize,
    markdown_hits: usize,
    html_document: bool,
    markdown_structure: bool,
}

impl Signals {
    fn gather(content: &str) -> Self {
        let html = HTML_PATTERNS.matches(content);
        let markdown = MARKDOWN_PATTERNS.matches(content);

        let html_document = content.contains("<!DOCTYPE")
            || content.contains("<html")
            || (content.contains("<div") && content.contains("</div>"))
            || (content.contains("<p>") && content.contains("</p>"));

        let markdown_structure = markdown.matched(MD_HEADING)
            || markdown.matched(MD_FENCE)
            || markdown.matched(MD_TABLE);

        Self {
            html_hits: html.iter().count(),
            markdown_hits: markdown.iter().count(),
            html_document,
            markdown_structure,
        }
    }
}

struct Rule {
    applies: fn(&Signals) -> bool,
    result: Classification,
}

fn strong_html(s: &Signals) -> bool {
    s.html_hits >= 3 || s.html_document
}

fn strong_markdown(s: &Signals) -> bool {
    s.markdown_hits >= 3 || s.markdown_structure
}

fn several_html(s: &Signals) -> bool {
    s.html_hits >= 2
}

fn several_markdown(s: &Signals) -> bool {
    s.markdown_hits >= 2
}

fn single_html(s: &Signals) -> bool {
    s.html_hits == 1
}

fn single_markdown(s: &Signals) -> bool {
    s.markdown_hits == 1
}

// Evaluated top to bottom; HTML outranks Markdown at every tier.
const RULES: [Rule; 6] = [
    Rule {
        applies: strong_html,
        result: Classification::Html { confidence: 0.95 },
    },
    Rule {
        applies: strong_markdown,
        result: Classification::Markdown { confidence: 0.9 },
    },
    Rule {
        applies: several_html,
        result: Classification::Html { confidence: 0.7 },
    },
    Rule {
        applies: several_markdown,
        result: Classification::Markdown { confidence: 0.7 },
    },
    Rule {
        applies: single_html,
        result: Classification::Html { confidence: 0.5 },
    },
    Rule {
        applies: single_markdown,
        result: Classification::Markdown { confidence: 0.4 },
    },
];

/// Detects whether `content` is plain text, HTML or Markdown.
///
/// Empty or whitespace-only input is plain text with full confidence, as is
/// anything no rule claims.
#[must_use]
pub fn classify(content: &str) -> Classification {
    let content = content.trim();
    if content.is_empty() {
        return Classification::default();
    }

    let signals = Signals::gather(content);
    RULES
        .iter()
        .find(|rule| (rule.applies)(&signals))
        .map_or_else(Classification::default, |rule| rule.result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_classified(content: &str, kind: ContentKind, confidence: f32) {
        let result = classify(content);
        assert_eq!(result.kind(), kind, "kind of {content:?}");
        assert_eq!(result.confidence(), confidence, "confidence of {content:?}");
    }

    #[test]
    fn test_empty_is_text() {
        assert_classified("", ContentKind::Text, 1.0);
        assert_classified("   \n\t ", ContentKind::Text, 1.0);
    }

    #[test]
    fn test_plain_text() {
        assert_classified(
            "Hi Sam,\nSee you at lunch tomorrow.\nCheers",
            ContentKind::Text,
            1.0,
        );
    }

    #[test]
    fn test_full_html_document() {
        assert_classified(
            "<!DOCTYPE html><html><body><p>hi</p></body></html>",
            ContentKind::Html,
            0.95,
        );
    }

    #[test]
    fn test_paired_div_is_strong_html() {
        assert_classified("<div>hello</div>", ContentKind::Html, 0.95);
    }

    #[test]
    fn test_three_html_hits_is_strong() {
        // generic tag + span + br
        assert_classified("<span>x</span><br>", ContentKind::Html, 0.95);
    }

    #[test]
    fn test_heading_and_fence_are_strong_markdown() {
        assert_classified(
            "# Title\n\n**bold** and *italic*\n\n```code```",
            ContentKind::Markdown,
            0.9,
        );
        assert_classified("intro\n```\nlet x = 1;\n```", ContentKind::Markdown, 0.9);
        assert_classified("| a | b |", ContentKind::Markdown, 0.9);
    }

    #[test]
    fn test_html_wins_over_markdown() {
        assert_classified(
            "<html><body># not a heading</body></html>\n# Heading",
            ContentKind::Html,
            0.95,
        );
    }

    #[test]
    fn test_medium_confidence() {
        // generic tag + entity
        assert_classified("<b>Tom</b> &amp; Jerry", ContentKind::Html, 0.7);
        // bold also satisfies the italic pattern
        assert_classified("this is **important**", ContentKind::Markdown, 0.7);
    }

    #[test]
    fn test_low_confidence() {
        assert_classified("Tom &amp; Jerry", ContentKind::Html, 0.5);
        assert_classified("<b>bold</b> statement", ContentKind::Html, 0.5);
        assert_classified("see `cargo doc` output", ContentKind::Markdown, 0.4);
    }

    #[test]
    fn test_content_kind_parse_roundtrip() {
        for kind in [ContentKind::Text, ContentKind::Html, ContentKind::Markdown] {
            assert_eq!(ContentKind::parse(kind.as_str()), kind);
        }
        assert_eq!(ContentKind::parse("unknown"), ContentKind::Text);
    }

    #[test]
    fn test_content_kind_from_mime_type() {
        assert_eq!(
            ContentKind::from_mime_type("text/html; charset=\"UTF-8\""),
            Some(ContentKind::Html)
        );
        assert_eq!(
            ContentKind::from_mime_type("TEXT/PLAIN"),
            Some(ContentKind::Text)
        );
        assert_eq!(ContentKind::from_mime_type("image/png"), None);
    }

    proptest! {
        #[test]
        fn prop_confidence_in_unit_range(content in ".{0,200}") {
            let confidence = classify(&content).confidence();
            prop_assert!((0.0..=1.0).contains(&confidence));
        }

        #[test]
        fn prop_classify_is_deterministic(content in ".{0,200}") {
            prop_assert_eq!(classify(&content), classify(&content));
        }
    }
}
