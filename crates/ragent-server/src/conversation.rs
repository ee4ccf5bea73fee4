//! In-memory conversation history with JSON save/load.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use ragent_core::{MessageRole, ReplyMetadata};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn new_conversation_id() -> String {
    format!("conversation_{}", Local::now().format("%Y%m%d%H%M%S"))
}

/// Reply metadata as rendered to clients, with cited files sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<ReplyMetadata> for MetadataView {
    fn from(metadata: ReplyMetadata) -> Self {
        Self {
            source_files: metadata
                .source_files
                .map(|files| files.into_iter().collect::<BTreeSet<_>>().into_iter().collect()),
            function: metadata.function,
            location: metadata.location,
        }
    }
}

impl MetadataView {
    pub fn is_empty(&self) -> bool {
        self.source_files.is_none() && self.function.is_none() && self.location.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataView>,
}

#[derive(Serialize)]
struct SavedConversation<'a> {
    id: &'a str,
    timestamp: String,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct LoadedConversation {
    id: Option<String>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// The single interactive conversation held by the server.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self { id: new_conversation_id(), messages: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Appends a message; empty metadata is not stored.
    pub fn add(&mut self, role: MessageRole, content: impl Into<String>, metadata: MetadataView) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            timestamp: timestamp(),
            metadata: (!metadata.is_empty()).then_some(metadata),
        });
    }

    /// Drops all messages and starts a new conversation id.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.id = new_conversation_id();
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let saved = SavedConversation {
            id: &self.id,
            timestamp: timestamp(),
            messages: &self.messages,
        };
        let json = serde_json::to_string_pretty(&saved)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Replaces the history with the file's; the id is kept if the file has none.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let loaded: LoadedConversation =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        if let Some(id) = loaded.id {
            self.id = id;
        }
        self.messages = loaded.messages;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_format() {
        let conversation = Conversation::new();
        let suffix = conversation.id().strip_prefix("conversation_").unwrap();
        assert_eq!(suffix.len(), 14);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_add_skips_empty_metadata() {
        let mut conversation = Conversation::new();
        conversation.add(MessageRole::User, "hi", MetadataView::default());
        conversation.add(
            MessageRole::Assistant,
            "report",
            ReplyMetadata::weather("paris").into(),
        );

        let messages = conversation.messages();
        assert!(messages[0].metadata.is_none());
        assert_eq!(messages[1].metadata.as_ref().unwrap().location.as_deref(), Some("paris"));
        assert_eq!(messages[0].timestamp.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_clear_resets_messages() {
        let mut conversation = Conversation::new();
        conversation.add(MessageRole::User, "hi", MetadataView::default());
        conversation.clear();
        assert!(conversation.messages().is_empty());
        assert!(conversation.id().starts_with("conversation_"));
    }

    #[test]
    fn test_source_files_are_sorted() {
        let files: HashSet<String> = ["b.md", "a.pdf", "c.txt"].iter().map(|s| s.to_string()).collect();
        let view = MetadataView::from(ReplyMetadata::sources(files));
        assert_eq!(view.source_files.unwrap(), vec!["a.pdf", "b.md", "c.txt"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chat.json");

        let mut original = Conversation::new();
        original.add(MessageRole::User, "What is the weather in Paris?", MetadataView::default());
        original.add(MessageRole::Assistant, "Sunny", ReplyMetadata::weather("paris").into());
        original.save(&path).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["id"], original.id());
        assert!(raw["timestamp"].is_string());

        let mut restored = Conversation::new();
        restored.id = "conversation_other".into();
        restored.load(&path).unwrap();
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.messages(), original.messages());
    }

    #[test]
    fn test_load_without_id_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        fs::write(&path, r#"{"messages": [{"role": "user", "content": "hi", "timestamp": "2024-01-01 10:00:00"}]}"#)
            .unwrap();

        let mut conversation = Conversation::new();
        let id = conversation.id().to_string();
        conversation.load(&path).unwrap();
        assert_eq!(conversation.id(), id);
        assert_eq!(conversation.messages().len(), 1);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut conversation = Conversation::new();
        assert!(conversation.load(Path::new("/no/such/chat.json")).is_err());
    }
}
