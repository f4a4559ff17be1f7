//! Plain-text helpers: HTML to text, safety check, reading time, truncation.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};

use crate::sanitize::denied_data_urls;
use crate::{pattern, pattern_set};

/// Average adult silent reading speed.
const WORDS_PER_MINUTE: usize = 200;

/// Marker appended by [`truncate`].
const ELLIPSIS: &str = "...";

/// Tags whose boundaries become line breaks in extracted text.
const BLOCK_TAGS: [&str; 14] = [
    "br", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "table",
    "hr",
];

static INVISIBLE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>"));

static UNSAFE_MARKUP: LazyLock<RegexSet> = LazyLock::new(|| {
    pattern_set(&[
        r"(?i)<script",
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)\bon\w+\s*=",
        r"(?i)<iframe",
        r"(?i)<object",
        r"(?i)<embed",
        r"(?i)<form",
        r"(?i)<input",
    ])
});

/// Converts HTML into readable plain text.
///
/// Script and style contents are dropped, block-level tags become line
/// breaks, common entities are decoded and whitespace is normalized.
/// Consecutive block boundaries collapse into a single line break.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let visible = INVISIBLE_ELEMENT.replace_all(html, "");
    let mut out = String::with_capacity(visible.len());
    let mut rest: &str = &visible;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => {
                let end = rest.find('>').map_or(rest.len(), |i| i + 1);
                if is_block_tag(&rest[1..end]) {
                    push_break(&mut out);
                }
                rest = &rest[end..];
            }
            '&' => {
                let (decoded, consumed) = decode_entity(rest);
                out.push_str(&decoded);
                rest = &rest[consumed..];
            }
            c if c.is_whitespace() => {
                if !out.is_empty() && !out.ends_with([' ', '\n']) {
                    out.push(' ');
                }
                rest = &rest[c.len_utf8()..];
            }
            c => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_block_tag(inner: &str) -> bool {
    let name: String = inner
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

fn push_break(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Decodes the entity at the start of `text`.
///
/// Returns the replacement and the number of bytes consumed. Unknown or
/// unterminated entities are passed through as a literal `&`.
fn decode_entity(text: &str) -> (String, usize) {
    let Some(semi) = text.find(';').filter(|&i| i > 1 && i <= 10) else {
        return ("&".to_string(), 1);
    };
    let name = &text[1..semi];
    let named = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        _ => None,
    };
    let numeric = || {
        let digits = name.strip_prefix('#')?;
        let code = match digits.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => digits.parse().ok()?,
        };
        char::from_u32(code)
    };

    named.or_else(numeric).map_or_else(
        || ("&".to_string(), 1),
        |ch| (ch.to_string(), semi + 1),
    )
}

/// Reports whether raw content is free of active markup.
///
/// Looks for scripts, script URL schemes, event handler attributes, frames,
/// plugins, forms and `data:` URLs other than inline raster images. Empty
/// content is reported as unsafe since there is nothing to show.
#[must_use]
pub fn is_content_safe(content: &str) -> bool {
    if content.trim().is_empty() {
        return false;
    }
    !UNSAFE_MARKUP.is_match(content) && denied_data_urls(content).next().is_none()
}

/// Estimated reading time in whole minutes, rounded up.
#[must_use]
pub fn estimate_reading_time(content: &str) -> usize {
    let words = html_to_text(content).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE)
}

/// Shortens `text` to at most `max_chars` characters, appending `...` when
/// anything was cut. A limit of zero yields an empty string.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
