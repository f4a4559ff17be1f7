//! Body extraction from `format=full` messages.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mailglass_content::ContentKind;

use super::raw::MessagePart;
use crate::error::Result;

/// Decoded body text of a message and the kind its MIME type declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailBody {
    /// Decoded body text.
    pub text: String,
    /// Kind declared by the part's MIME type.
    pub kind: ContentKind,
}

/// Decodes base64url part data as Gmail sends it.
///
/// Padding and whitespace are ignored, and standard-alphabet input is
/// accepted as well.
///
/// # Errors
///
/// Returns an error if the data is not base64 or does not decode to UTF-8.
pub fn decode_part_data(data: &str) -> Result<String> {
    let normalized: String = data
        .chars()
        .filter(|c| *c != '=' && !c.is_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD.decode(normalized)?;
    Ok(String::from_utf8(bytes)?)
}

/// Finds and decodes the displayable body of a message.
///
/// The first inline `text/html` part wins; otherwise the first inline
/// `text/plain` part. Attachments are skipped even when their type matches.
/// Returns `None` when no such part carries inline data.
///
/// # Errors
///
/// Returns an error if the chosen part's data cannot be decoded.
pub fn extract_body(payload: &MessagePart) -> Result<Option<MailBody>> {
    let inline_part = |mime: &str| {
        payload.walk().find(|part| {
            !part.is_attachment()
                && part.mime_type.eq_ignore_ascii_case(mime)
                && part
                    .body
                    .as_ref()
                    .and_then(|b| b.data.as_deref())
                    .is_some_and(|d| !d.is_empty())
        })
    };

    let Some(part) = inline_part("text/html").or_else(|| inline_part("text/plain")) else {
        return Ok(None);
    };

    let data = part
        .body
        .as_ref()
        .and_then(|b| b.data.as_deref())
        .unwrap_or_default();

    Ok(Some(MailBody {
        text: decode_part_data(data)?,
        kind: ContentKind::from_mime_type(&part.mime_type).unwrap_or_default(),
    }))
}
