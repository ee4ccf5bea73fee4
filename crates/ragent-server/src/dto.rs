//! Request and response bodies for the HTTP API.

use std::path::PathBuf;

use ragent_core::{Model, ToolConfig};
use serde::{Deserialize, Serialize};

use crate::conversation::{ChatMessage, MetadataView};

// === Chat ===

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub tools: ToolConfig,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub metadata: MetadataView,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WebSearchRequest {
    pub query: String,
    #[serde(default)]
    pub model: Model,
}

#[derive(Debug, Serialize)]
pub struct WebSearchResponse {
    pub reply: String,
}

// === Conversation ===

#[derive(Debug, Serialize)]
pub struct ConversationView {
    pub id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveConversationRequest {
    /// Defaults to `{conversation_id}.json`.
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoadConversationRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub success: bool,
    pub path: String,
}

// === Settings ===

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub developer_prompt: &'static str,
    pub system_message: &'static str,
}

// === Vector stores ===

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

/// Server-local files to upload.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub paths: Vec<PathBuf>,
}

fn default_max_results() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
    #[serde(default)]
    pub model: Model,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub reply: String,
    pub source_files: Vec<String>,
}
