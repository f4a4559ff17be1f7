//! Header lookup and sender parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::raw::RawHeader;

#[allow(clippy::expect_used)] // literal pattern
static NAME_ADDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.*?)\s*<([^<>]*)>\s*$").expect("name-addr pattern must compile")
});

/// Returns the value of the first header named `name`, ignoring case.
///
/// A missing header yields an empty string.
#[must_use]
pub fn header_value<'a>(headers: &'a [RawHeader], name: &str) -> &'a str {
    headers
        .iter()
        .find(|h| h.name.trim().eq_ignore_ascii_case(name))
        .map_or("", |h| h.value.as_str())
}

/// Display name and address split out of a `From` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Display name, empty when the header carried only an address.
    pub name: String,
    /// Email address, empty when the header carried only a name.
    pub email: String,
}

impl Sender {
    /// Parses a raw `From` value.
    ///
    /// `"Jordan Lee" <jordan@example.com>` splits into name and address.
    /// Without angle brackets the whole value is the address if it contains
    /// `@`, otherwise it is the name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(caps) = NAME_ADDR.captures(raw) {
            return Self {
                name: clean_display_name(&caps[1]),
                email: caps[2].trim().to_string(),
            };
        }

        let raw = raw.trim();
        if raw.contains('@') {
            Self {
                name: String::new(),
                email: raw.to_string(),
            }
        } else {
            Self {
                name: raw.to_string(),
                email: String::new(),
            }
        }
    }
}

/// Strips double quotes anywhere and single quotes wrapping the name.
fn clean_display_name(name: &str) -> String {
    let name = name.replace('"', "");
    let name = name.trim();
    name.strip_prefix('\'')
        .and_then(|n| n.strip_suffix('\''))
        .unwrap_or(name)
        .trim()
        .to_string()
}
