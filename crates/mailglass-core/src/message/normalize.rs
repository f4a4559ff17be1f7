//! Raw provider message to [`MailRecord`].

use chrono::{DateTime, FixedOffset, Local};
use tracing::warn;

use super::body::extract_body;
use super::header::{Sender, header_value};
use super::labels::{Category, Priority, label};
use super::model::MailRecord;
use super::raw::{MessagePart, RawMessage};

const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M";

/// Parses a `Date` header value.
///
/// RFC 2822 is tried first, with a trailing comment such as `(UTC)` removed,
/// then RFC 3339.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let without_comment = match raw.rfind('(') {
        Some(open) if raw.ends_with(')') => raw[..open].trim_end(),
        _ => raw,
    };

    DateTime::parse_from_rfc2822(without_comment)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Maps one provider message to a record.
///
/// Never fails: missing headers become empty strings, an unparseable date
/// yields timestamp 0 and an empty formatted date, and a body that cannot be
/// decoded is left out.
#[must_use]
pub fn normalize(raw: &RawMessage) -> MailRecord {
    let headers = raw.headers();
    let date = header_value(headers, "Date");
    let sender = Sender::parse(header_value(headers, "From"));

    let mut label_ids: Vec<String> = Vec::with_capacity(raw.label_ids.len());
    for id in &raw.label_ids {
        if !label_ids.contains(id) {
            label_ids.push(id.clone());
        }
    }
    let has = |id: &str| label_ids.iter().any(|l| l == id);

    let parsed = parse_date(date);
    let (timestamp, formatted_date) = parsed.map_or_else(
        || (0, String::new()),
        |dt| {
            (
                dt.timestamp_millis(),
                dt.with_timezone(&Local).format(DATE_FORMAT).to_string(),
            )
        },
    );

    let has_attachments = raw
        .payload
        .as_ref()
        .is_some_and(|p| p.walk().any(MessagePart::is_attachment));

    let body = match raw.payload.as_ref().map(extract_body).transpose() {
        Ok(body) => body.flatten(),
        Err(e) => {
            warn!(id = %raw.id, error = %e, "Failed to decode message body");
            None
        }
    };

    MailRecord {
        id: raw.id.clone(),
        thread_id: raw.thread_id.clone(),
        snippet: raw.snippet.clone(),
        sender_name: sender.name,
        sender_email: sender.email,
        subject: header_value(headers, "Subject").to_string(),
        to: header_value(headers, "To").to_string(),
        cc: header_value(headers, "Cc").to_string(),
        bcc: header_value(headers, "Bcc").to_string(),
        date: date.to_string(),
        formatted_date,
        timestamp,
        category: Category::from_labels(&label_ids),
        priority: Priority::from_labels(&label_ids),
        is_unread: has(label::UNREAD),
        is_important: has(label::IMPORTANT),
        is_starred: has(label::STARRED),
        is_in_inbox: has(label::INBOX),
        has_attachments,
        content_type: body.as_ref().map(|b| b.kind),
        history_id: raw.history_id.clone(),
        internal_date: raw.internal_date.clone(),
        size_estimate: raw.size_estimate,
        body: body.map(|b| b.text),
        label_ids,
    }
}

/// Normalizes a batch, most recent first.
///
/// Records with equal timestamps keep their input order.
#[must_use]
pub fn normalize_batch(raws: &[RawMessage]) -> Vec<MailRecord> {
    let mut records: Vec<MailRecord> = raws.iter().map(normalize).collect();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::raw::{PartBody, RawHeader};
    use mailglass_content::ContentKind;
    use proptest::prelude::*;

    fn raw(id: &str, labels: &[&str], headers: &[(&str, &str)]) -> RawMessage {
        RawMessage {
            id: id.into(),
            thread_id: format!("t-{id}"),
            label_ids: labels.iter().map(ToString::to_string).collect(),
            snippet: "preview".into(),
            payload: Some(MessagePart {
                mime_type: "text/plain".into(),
                headers: headers
                    .iter()
                    .map(|(n, v)| RawHeader::new(*n, *v))
                    .collect(),
                ..MessagePart::default()
            }),
            ..RawMessage::default()
        }
    }

    fn dated(id: &str, date: &str) -> RawMessage {
        raw(id, &[], &[("Date", date)])
    }

    #[test]
    fn test_parse_date_rfc2822() {
        let dt = parse_date("Mon, 01 Jan 2024 12:00:00 +0000").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_704_110_400_000);
    }

    #[test]
    fn test_parse_date_with_trailing_comment() {
        let dt = parse_date("Mon, 1 Jan 2024 12:00:00 +0000 (UTC)").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_704_110_400_000);
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let dt = parse_date("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_704_110_400_000);
    }

    #[test]
    fn test_parse_date_garbage() {
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday-ish").is_none());
    }

    #[test]
    fn test_normalize_headers_and_sender() {
        let record = normalize(&raw(
            "m1",
            &["INBOX", "UNREAD"],
            &[
                ("from", r#""Jordan Lee" <jordan@example.com>"#),
                ("SUBJECT", "Quarterly numbers"),
                ("To", "team@example.com"),
                ("Date", "Mon, 01 Jan 2024 12:00:00 +0000"),
            ],
        ));

        assert_eq!(record.id, "m1");
        assert_eq!(record.thread_id, "t-m1");
        assert_eq!(record.sender_name, "Jordan Lee");
        assert_eq!(record.sender_email, "jordan@example.com");
        assert_eq!(record.subject, "Quarterly numbers");
        assert_eq!(record.to, "team@example.com");
        assert_eq!(record.cc, "");
        assert_eq!(record.timestamp, 1_704_110_400_000);
        assert!(!record.formatted_date.is_empty());
        assert!(record.is_unread);
        assert!(record.is_in_inbox);
        assert!(!record.is_important);
    }

    #[test]
    fn test_normalize_starred_social() {
        let record = normalize(&raw("m", &["STARRED", "CATEGORY_SOCIAL"], &[]));
        assert_eq!(record.category, Category::Social);
        assert_eq!(record.priority, Priority::Starred);
        assert!(record.is_starred);
    }

    #[test]
    fn test_normalize_importance_beats_star() {
        let record = normalize(&raw("m", &["IMPORTANT", "STARRED"], &[]));
        assert_eq!(record.priority, Priority::High);
        assert!(record.is_important);
        assert!(record.is_starred);
    }

    #[test]
    fn test_normalize_missing_everything() {
        let record = normalize(&RawMessage {
            id: "bare".into(),
            ..RawMessage::default()
        });

        assert_eq!(record.subject, "");
        assert_eq!(record.sender_name, "");
        assert_eq!(record.sender_email, "");
        assert_eq!(record.timestamp, 0);
        assert_eq!(record.formatted_date, "");
        assert_eq!(record.category, Category::Primary);
        assert_eq!(record.priority, Priority::Normal);
        assert!(!record.has_attachments);
        assert!(record.body.is_none());
        assert!(record.content_type.is_none());
    }

    #[test]
    fn test_normalize_unparseable_date() {
        let record = normalize(&dated("m", "not a date"));
        assert_eq!(record.date, "not a date");
        assert_eq!(record.timestamp, 0);
        assert_eq!(record.formatted_date, "");
    }

    #[test]
    fn test_normalize_dedupes_labels_in_order() {
        let record = normalize(&raw("m", &["UNREAD", "INBOX", "UNREAD"], &[]));
        assert_eq!(record.label_ids, vec!["UNREAD", "INBOX"]);
    }

    #[test]
    fn test_normalize_nested_attachment() {
        let mut message = raw("m", &[], &[]);
        let payload = message.payload.as_mut().unwrap();
        payload.parts = vec![MessagePart {
            mime_type: "multipart/mixed".into(),
            parts: vec![MessagePart {
                mime_type: "application/pdf".into(),
                filename: "invoice.pdf".into(),
                ..MessagePart::default()
            }],
            ..MessagePart::default()
        }];

        assert!(normalize(&message).has_attachments);
    }

    #[test]
    fn test_normalize_decodes_body() {
        let mut message = raw("m", &[], &[]);
        message.payload.as_mut().unwrap().body = Some(PartBody {
            data: Some("cGxhaW4".into()),
            ..PartBody::default()
        });

        let record = normalize(&message);
        assert_eq!(record.body.as_deref(), Some("plain"));
        assert_eq!(record.content_type, Some(ContentKind::Text));
    }

    #[test]
    fn test_normalize_undecodable_body_is_dropped() {
        let mut message = raw("m", &[], &[]);
        message.payload.as_mut().unwrap().body = Some(PartBody {
            data: Some("!!!".into()),
            ..PartBody::default()
        });

        let record = normalize(&message);
        assert!(record.body.is_none());
        assert!(record.content_type.is_none());
    }

    #[test]
    fn test_normalize_batch_descending() {
        let t1 = "Mon, 01 Jan 2024 12:00:00 +0000";
        let t2 = "Sun, 31 Dec 2023 12:00:00 +0000";
        let t3 = "Tue, 02 Jan 2024 12:00:00 +0000";

        let records = normalize_batch(&[dated("a", t1), dated("b", t2), dated("c", t3)]);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_normalize_batch_stable_on_ties() {
        let t = "Mon, 01 Jan 2024 12:00:00 +0000";
        let records = normalize_batch(&[
            dated("first", t),
            dated("undated", ""),
            dated("second", t),
        ]);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "undated"]);
    }

    #[test]
    fn test_normalize_twice_is_equal() {
        let message = raw(
            "m",
            &["INBOX", "CATEGORY_UPDATES"],
            &[
                ("From", "billing@example.com"),
                ("Date", "Mon, 01 Jan 2024 12:00:00 +0000"),
            ],
        );
        assert_eq!(normalize(&message), normalize(&message));
    }

    proptest! {
        #[test]
        fn prop_normalize_deterministic(
            labels in proptest::collection::vec(
                prop_oneof![
                    Just("INBOX"), Just("UNREAD"), Just("STARRED"), Just("IMPORTANT"),
                    Just("CATEGORY_SOCIAL"), Just("CATEGORY_FORUMS"),
                ],
                0..6,
            ),
            from in ".{0,40}",
            date in ".{0,40}",
        ) {
            let message = raw("p", &labels, &[("From", from.as_str()), ("Date", date.as_str())]);
            prop_assert_eq!(normalize(&message), normalize(&message));
        }
    }
}
