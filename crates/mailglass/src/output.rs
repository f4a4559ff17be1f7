//! Terminal formatting of records and bodies.

use std::fmt::Write as _;

use mailglass_content::{
    RenderedBody, estimate_reading_time, html_to_text, render, sanitize, truncate,
};
use mailglass_core::{MailRecord, Priority};

const SENDER_WIDTH: usize = 24;
const SUBJECT_WIDTH: usize = 60;

/// Shown when a message has no body.
pub const EMPTY_BODY: &str = "No content available";

/// One list line: flags, date, sender and subject.
pub fn record_line(record: &MailRecord) -> String {
    let unread = if record.is_unread { '●' } else { ' ' };
    let mark = match record.priority {
        Priority::High => '!',
        Priority::Starred => '★',
        Priority::Normal => ' ',
    };
    let clip = if record.has_attachments { '@' } else { ' ' };

    format!(
        "{unread}{mark}{clip} {:<17} {:<width$} {}",
        record.formatted_date,
        truncate(record.display_sender(), SENDER_WIDTH),
        truncate(record.display_subject(), SUBJECT_WIDTH),
        width = SENDER_WIDTH + 3,
    )
}

/// Header block for a single message.
pub fn record_details(record: &MailRecord) -> String {
    let mut out = String::new();
    let _ = write!(out, "From:     {}", record.display_sender());
    if !record.sender_name.is_empty() && !record.sender_email.is_empty() {
        let _ = write!(out, " <{}>", record.sender_email);
    }
    out.push('\n');
    for (label, value) in [("To", &record.to), ("Cc", &record.cc)] {
        if !value.is_empty() {
            let _ = writeln!(out, "{label}:{:pad$}{value}", "", pad = 9 - label.len());
        }
    }
    let _ = writeln!(out, "Subject:  {}", record.display_subject());
    if !record.formatted_date.is_empty() {
        let _ = writeln!(out, "Date:     {}", record.formatted_date);
    }
    let _ = write!(
        out,
        "Tab:      {}   Priority: {}",
        record.category.display_name(),
        record.priority
    );
    out
}

/// Body text for the terminal.
///
/// HTML is sanitized and converted to Markdown-ish text. With `as_html`,
/// HTML and Markdown bodies print the HTML that a browser surface would get.
pub fn body_text(body: &str, rendered: &RenderedBody, as_html: bool) -> String {
    match rendered {
        RenderedBody::Empty => EMPTY_BODY.to_string(),
        RenderedBody::Text(text) => text.clone(),
        RenderedBody::Html(document) if as_html => document.clone(),
        RenderedBody::Html(_) => html_for_terminal(&sanitize(body)),
        RenderedBody::Markdown { html, .. } if as_html => html.clone(),
        RenderedBody::Markdown { source, .. } => source.clone(),
    }
}

/// Renders a record's body, if it has one.
pub fn record_body(record: &MailRecord, as_html: bool) -> String {
    let body = record.body.as_deref().unwrap_or_default();
    let rendered = render(body, record.content_type);
    let text = body_text(body, &rendered, as_html);
    if rendered.is_empty() {
        return text;
    }
    format!("{text}\n\n({} min read)", estimate_reading_time(body))
}

fn html_for_terminal(html: &str) -> String {
    match htmd::convert(html) {
        Ok(markdown) => markdown,
        Err(e) => {
            tracing::warn!(error = %e, "HTML conversion failed, falling back to plain text");
            html_to_text(html)
        }
    }
}
