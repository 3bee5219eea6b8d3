//! Conversation store
//!
//! Single owner of the conversation collection and the active conversation.
//! The active conversation is tracked by id and always read from the
//! collection, so edits to it are visible in the collection immediately.

use crate::conversation::export::{render, render_transcript};
use crate::conversation::{derive_title, ChatMessage, Conversation, Role, DEFAULT_TITLE};
use crate::error::{Result, TurboPechError};
use crate::storage::ConversationStorage;
use chrono::Utc;
use ulid::{Generator, Ulid};

/// Storage key holding the serialized conversation collection
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Owns all conversations and the active one
///
/// # Examples
///
/// ```
/// use turbopech::conversation::{ChatMessage, ConversationStore};
/// use turbopech::storage::MemoryStorage;
///
/// let mut store = ConversationStore::open(Box::new(MemoryStorage::new()));
/// store.add_message(ChatMessage::user("What is photosynthesis?"));
/// assert_eq!(store.conversations().len(), 1);
/// assert_eq!(store.current_title(), "What is photosynthesis?");
/// ```
pub struct ConversationStore {
    storage: Box<dyn ConversationStorage>,
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    ids: Generator,
}

impl ConversationStore {
    /// Open the store, loading the collection once from `storage`
    ///
    /// Missing data yields an empty collection. Unreadable or malformed data
    /// is logged and also yields an empty collection.
    pub fn open(storage: Box<dyn ConversationStorage>) -> Self {
        let conversations = load_collection(storage.as_ref());
        tracing::debug!("Loaded {} conversations", conversations.len());

        Self {
            storage,
            conversations,
            current_id: None,
            ids: Generator::new(),
        }
    }

    /// All conversations, most recently created first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// The active conversation, or `None` when the placeholder is active
    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current_index().map(|i| &self.conversations[i])
    }

    /// Id of the active conversation
    pub fn current_conversation_id(&self) -> Option<&str> {
        self.current_conversation().map(|c| c.id.as_str())
    }

    /// Title of the active conversation (the default title for the placeholder)
    pub fn current_title(&self) -> &str {
        self.current_conversation()
            .map(|c| c.title.as_str())
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Messages of the active conversation (empty for the placeholder)
    pub fn current_messages(&self) -> &[ChatMessage] {
        self.current_conversation()
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Find a conversation by id
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Resolve a full id or an unambiguous id prefix to a full id
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        if let Some(conversation) = self.get(id_or_prefix) {
            return Ok(conversation.id.clone());
        }

        let prefix = id_or_prefix.to_uppercase();
        let matches: Vec<&Conversation> = if prefix.is_empty() {
            Vec::new()
        } else {
            self.conversations
                .iter()
                .filter(|c| c.id.starts_with(&prefix))
                .collect()
        };

        match matches.as_slice() {
            [only] => Ok(only.id.clone()),
            [] => Err(TurboPechError::NotFound(format!(
                "Conversation not found: {}",
                id_or_prefix
            ))
            .into()),
            _ => Err(TurboPechError::InvalidInput(format!(
                "Ambiguous conversation id '{}' matches {} conversations",
                id_or_prefix,
                matches.len()
            ))
            .into()),
        }
    }

    /// Create an empty conversation, insert it first, and make it active
    pub fn create_conversation(&mut self) -> &Conversation {
        self.insert_new();
        self.persist();
        &self.conversations[0]
    }

    /// Append `message` to the active conversation
    ///
    /// Creates a conversation first when the placeholder is active. The first
    /// user message of a conversation that still has the default title
    /// becomes its title.
    pub fn add_message(&mut self, message: ChatMessage) -> &Conversation {
        let index = match self.current_index() {
            Some(index) => index,
            None => {
                self.insert_new();
                0
            }
        };

        let conversation = &mut self.conversations[index];
        if message.role == Role::User
            && conversation.messages.is_empty()
            && conversation.title == DEFAULT_TITLE
        {
            conversation.title = derive_title(&message.content);
        }
        conversation.messages.push(message);

        self.persist();
        &self.conversations[index]
    }

    /// Rename the conversation with `id`; returns false when it does not exist
    pub fn update_conversation_title(&mut self, id: &str, title: &str) -> bool {
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) else {
            tracing::debug!("Rename ignored, no conversation {}", id);
            return false;
        };

        conversation.title = title.to_string();
        self.persist();
        true
    }

    /// Make the conversation with `id` active and return it
    pub fn load_conversation(&mut self, id: &str) -> Option<&Conversation> {
        let index = self.conversations.iter().position(|c| c.id == id)?;
        self.current_id = Some(id.to_string());
        Some(&self.conversations[index])
    }

    /// Remove the conversation with `id`; returns false when it does not exist
    ///
    /// Deleting the active conversation switches to the placeholder.
    pub fn delete_conversation(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return false;
        }

        if self.current_id.as_deref() == Some(id) {
            self.current_id = None;
        }

        self.persist();
        true
    }

    /// Markdown transcript of the conversation with `id`
    ///
    /// Falls back to the active conversation (or the placeholder) when `id`
    /// is `None` or unknown.
    pub fn export_conversation(&self, id: Option<&str>) -> String {
        let target = id
            .and_then(|id| self.get(id))
            .or_else(|| self.current_conversation());

        match target {
            Some(conversation) => render_transcript(conversation),
            None => render(DEFAULT_TITLE, None, &[]),
        }
    }

    fn current_index(&self) -> Option<usize> {
        let id = self.current_id.as_deref()?;
        self.conversations.iter().position(|c| c.id == id)
    }

    fn insert_new(&mut self) {
        let conversation = Conversation::new(self.next_id(), Utc::now());
        tracing::debug!("Created conversation {}", conversation.id);
        self.current_id = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
    }

    fn next_id(&mut self) -> String {
        let id = self.ids.generate().unwrap_or_else(|e| {
            tracing::warn!("Monotonic id generation failed ({}), using a random id", e);
            Ulid::new()
        });
        id.to_string()
    }

    fn persist(&self) {
        if let Err(e) = self.write_collection() {
            tracing::error!("Failed to save conversations: {:#}", e);
        }
    }

    fn write_collection(&self) -> Result<()> {
        let json = serde_json::to_string(&self.conversations)?;
        self.storage.set(CONVERSATIONS_KEY, &json)
    }
}

fn load_collection(storage: &dyn ConversationStorage) -> Vec<Conversation> {
    let raw = match storage.get(CONVERSATIONS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!("Failed to read saved conversations: {:#}", e);
            return Vec::new();
        }
    };

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Saved conversations are malformed, starting empty: {}", e);
            return Vec::new();
        }
    };

    // One bad record must not cost the rest of the history
    records
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, record)| match serde_json::from_value::<Conversation>(record) {
                Ok(conversation) => Some(conversation),
                Err(e) => {
                    tracing::warn!("Skipping malformed saved conversation #{}: {}", index, e);
                    None
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn store() -> ConversationStore {
        ConversationStore::open(Box::new(MemoryStorage::new()))
    }

    fn shared_store() -> (ConversationStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ConversationStore::open(Box::new(Arc::clone(&storage)));
        (store, storage)
    }

    #[test]
    fn test_add_message_without_active_creates_one_conversation() {
        let mut store = store();
        store.add_message(ChatMessage::user("first"));
        store.add_message(ChatMessage::assistant("second"));
        store.add_message(ChatMessage::user("third"));

        assert_eq!(store.conversations().len(), 1);
        let contents: Vec<&str> = store.conversations()[0]
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(store.current_conversation(), store.conversations().first());
    }

    #[test]
    fn test_first_user_message_sets_title() {
        let mut store = store();
        store.create_conversation();
        store.add_message(ChatMessage::user("c".repeat(60)));
        assert_eq!(store.current_title(), format!("{}...", "c".repeat(47)));

        store.add_message(ChatMessage::user("later message"));
        assert_eq!(store.current_title().len(), 50);
    }

    #[test]
    fn test_first_assistant_message_keeps_default_title() {
        let mut store = store();
        store.add_message(ChatMessage::assistant("Hello!"));
        assert_eq!(store.current_title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_renamed_empty_conversation_keeps_its_title() {
        let mut store = store();
        let id = store.create_conversation().id.clone();
        assert!(store.update_conversation_title(&id, "Revision"));
        store.add_message(ChatMessage::user("question"));
        assert_eq!(store.current_title(), "Revision");
    }

    #[test]
    fn test_create_twice_most_recent_first_and_load() {
        let mut store = store();
        let first = store.create_conversation().id.clone();
        let second = store.create_conversation().id.clone();

        assert_ne!(first, second);
        assert!(second > first);
        let ids: Vec<&str> = store.conversations().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);

        let expected = store.get(&first).cloned().unwrap();
        let loaded = store.load_conversation(&first).cloned().unwrap();
        assert_eq!(loaded, expected);
        assert_eq!(store.current_conversation_id(), Some(first.as_str()));
    }

    #[test]
    fn test_load_unknown_returns_none_and_keeps_active() {
        let mut store = store();
        let id = store.create_conversation().id.clone();
        assert!(store.load_conversation("missing").is_none());
        assert_eq!(store.current_conversation_id(), Some(id.as_str()));
    }

    #[test]
    fn test_delete_active_resets_to_placeholder() {
        let mut store = store();
        let id = store.create_conversation().id.clone();
        store.add_message(ChatMessage::user("hi"));

        assert!(store.delete_conversation(&id));
        assert!(store.current_conversation().is_none());
        assert_eq!(store.current_title(), DEFAULT_TITLE);
        assert!(store.current_messages().is_empty());
    }

    #[test]
    fn test_delete_other_keeps_active() {
        let mut store = store();
        let other = store.create_conversation().id.clone();
        let active = store.create_conversation().id.clone();

        assert!(store.delete_conversation(&other));
        assert_eq!(store.current_conversation_id(), Some(active.as_str()));
        assert!(!store.delete_conversation(&other));
    }

    #[test]
    fn test_update_title_unknown_is_noop() {
        let mut store = store();
        store.create_conversation();
        assert!(!store.update_conversation_title("nope", "x"));
        assert_eq!(store.current_title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_export_falls_back_to_active_then_placeholder() {
        let mut store = store();
        assert_eq!(
            store.export_conversation(None),
            "# New conversation\nDate: -\n\n"
        );

        store.add_message(ChatMessage::user("Explain gravity"));
        store.add_message(ChatMessage::assistant("Mass attracts mass."));

        let text = store.export_conversation(Some("unknown"));
        assert!(text.starts_with("# Explain gravity\n"));
        assert!(text.contains("## You\n\nExplain gravity\n\n## Assistant\n\nMass attracts mass."));
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (mut store, storage) = shared_store();

        let id = store.create_conversation().id.clone();
        let saved = storage.get(CONVERSATIONS_KEY).unwrap().unwrap();
        assert!(saved.contains(&id));

        store.add_message(ChatMessage::user("persist me"));
        let saved = storage.get(CONVERSATIONS_KEY).unwrap().unwrap();
        assert!(saved.contains("persist me"));

        store.delete_conversation(&id);
        assert_eq!(storage.get(CONVERSATIONS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_reopen_restores_collection() {
        let storage = Arc::new(MemoryStorage::new());
        let original = {
            let mut store = ConversationStore::open(Box::new(Arc::clone(&storage)));
            store.add_message(ChatMessage::user("one"));
            store.create_conversation();
            store.add_message(ChatMessage::user("two"));
            store.conversations().to_vec()
        };

        let reopened = ConversationStore::open(Box::new(storage));
        assert_eq!(reopened.conversations(), original.as_slice());
        assert!(reopened.current_conversation().is_none());
    }

    #[test]
    fn test_malformed_data_falls_back_to_empty() {
        let storage = MemoryStorage::with_entry(CONVERSATIONS_KEY, "{not json");
        let store = ConversationStore::open(Box::new(storage));
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn test_malformed_record_is_skipped_and_others_kept() {
        let raw = serde_json::json!([
            {
                "id": "01HGOODAAAAAAAAAAAAAAAAAAA",
                "title": "Fractions",
                "date": "2024-03-09T10:00:00Z",
                "messages": [{"role": "user", "content": "What is 1/2 + 1/3?"}],
                "modelInfo": {}
            },
            {
                "id": "01HBADAAAAAAAAAAAAAAAAAAAA",
                "title": "Broken",
                "date": "2024-03-08T10:00:00Z",
                "messages": [{"role": "system", "content": "unsupported"}]
            }
        ]);
        let storage = Arc::new(MemoryStorage::with_entry(
            CONVERSATIONS_KEY,
            &raw.to_string(),
        ));
        let mut store = ConversationStore::open(Box::new(Arc::clone(&storage)));

        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.conversations()[0].title, "Fractions");

        store.create_conversation();
        let saved: Vec<Conversation> =
            serde_json::from_str(&storage.get(CONVERSATIONS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().any(|c| c.title == "Fractions"));
    }

    #[test]
    fn test_resolve_id_exact_and_prefix() {
        let mut store = store();
        let id = store.create_conversation().id.clone();

        assert_eq!(store.resolve_id(&id).unwrap(), id);
        assert_eq!(store.resolve_id(&id[..20].to_lowercase()).unwrap(), id);
        assert!(store.resolve_id("ZZZZ").is_err());
        assert!(store.resolve_id("").is_err());
    }

    #[test]
    fn test_resolve_id_ambiguous_prefix() {
        let mut store = store();
        let a = store.create_conversation().id.clone();
        store.create_conversation();

        let result = store.resolve_id(&a[..1]);
        crate::test_utils::assert_error_contains(result, "Ambiguous");
    }
}
