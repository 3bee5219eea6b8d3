//! Human-readable conversation transcripts

use crate::conversation::{ChatMessage, Conversation};
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::fmt::Write;

/// Render a conversation as a Markdown transcript
///
/// ```text
/// # <title>
/// Date: <local date>
///
/// ## You
///
/// <content>
///
/// ## Assistant
///
/// <content>
/// ```
pub fn render_transcript(conversation: &Conversation) -> String {
    render(
        &conversation.title,
        Some(conversation.date),
        &conversation.messages,
    )
}

/// Render a title and message list; `date` is `None` for the placeholder
pub(crate) fn render(title: &str, date: Option<DateTime<Utc>>, messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    let date_line = date
        .map(|d| {
            d.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string());

    // Writing to a String cannot fail
    let _ = writeln!(out, "# {}", title);
    let _ = writeln!(out, "Date: {}", date_line);
    out.push('\n');

    for message in messages {
        let _ = write!(
            out,
            "## {}\n\n{}\n\n",
            message.role.label(),
            message.content
        );
    }

    out
}

/// File name for an export made on `date`: `conversation-<YYYY-MM-DD>.md`
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use turbopech::conversation::export_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(export_file_name(date), "conversation-2024-03-09.md");
/// ```
pub fn export_file_name(date: NaiveDate) -> String {
    format!("conversation-{}.md", date.format("%Y-%m-%d"))
}
