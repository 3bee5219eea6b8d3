//! Conversations and their store
//!
//! A [`Conversation`] is a titled, timestamped, ordered list of chat
//! messages. The [`ConversationStore`] owns the collection, tracks the active
//! conversation, and writes the whole collection to durable storage after
//! every mutation.

pub mod export;
pub mod search;
pub mod store;

pub use export::{export_file_name, render_transcript};
pub use search::{filter_conversations, paginate, Page};
pub use store::{ConversationStore, CONVERSATIONS_KEY};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Title given to conversations before their first user message
pub const DEFAULT_TITLE: &str = "New conversation";

/// Titles longer than this many characters are truncated
pub const MAX_TITLE_CHARS: usize = 50;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the client
    User,
    /// The language model
    Assistant,
}

impl Role {
    /// Wire name (`user` / `assistant`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Section label used in transcripts
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use turbopech::conversation::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Hello!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A stored conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique, time-ordered identifier (ULID)
    pub id: String,
    /// Display title
    pub title: String,
    /// Creation time
    pub date: DateTime<Utc>,
    /// Messages in chronological order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Free-form metadata, `{}` when unused
    #[serde(default = "empty_object")]
    pub model_info: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Conversation {
    /// Create an empty conversation with the default title
    pub fn new(id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            date,
            messages: Vec::new(),
            model_info: empty_object(),
        }
    }

    /// Whether `query` (already lowercased) occurs in the title or any message
    pub fn matches(&self, lowered_query: &str) -> bool {
        self.title.to_lowercase().contains(lowered_query)
            || self
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(lowered_query))
    }
}

/// Derive a conversation title from the first user message
///
/// Content of at most 50 characters is used whole; longer content keeps its
/// first 47 characters followed by `...`.
///
/// # Examples
///
/// ```
/// use turbopech::conversation::derive_title;
///
/// assert_eq!(derive_title("What is a prime number?"), "What is a prime number?");
/// let long = "x".repeat(60);
/// assert_eq!(derive_title(&long), format!("{}...", "x".repeat(47)));
/// ```
pub fn derive_title(content: &str) -> String {
    if content.chars().count() > MAX_TITLE_CHARS {
        let head: String = content.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}
