//! Core domain types and error definitions.
//!
//! This crate defines the types shared across the assistant: the upstream
//! error type, model tiers, the per-request tool configuration, tool
//! invocations, weather coordinates, and the `ApiResult` handed back to the
//! conversation store.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Substrings of an upstream error message that mark it as transient.
pub const RETRYABLE_MARKERS: [&str; 3] = ["rate_limit_exceeded", "Request too large", "unknown_parameter"];

/// Errors that can occur while talking to upstream services.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Failed to parse a payload or tool arguments.
    #[error("Failed to parse structured output: {0}")]
    ParseError(String),

    /// A non-LLM external API (geocoding, forecast, document index) failed.
    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl AgentError {
    /// Returns true if the error carries one of the rate-limit, oversized
    /// request or unknown parameter markers.
    pub fn is_retryable(&self) -> bool {
        let message = self.to_string();
        RETRYABLE_MARKERS.iter().any(|marker| message.contains(marker))
    }

    /// The underlying message without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            AgentError::LlmError(msg) | AgentError::ParseError(msg) | AgentError::ExternalApi(msg) => msg,
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// Upstream model tiers, from most to least capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-3.5-turbo-16k")]
    Gpt35Turbo16k,
}

impl Model {
    /// Returns the upstream model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt35Turbo16k => "gpt-3.5-turbo-16k",
        }
    }

    /// Returns true for the top-tier model.
    pub fn is_top_tier(&self) -> bool {
        matches!(self, Model::Gpt4o)
    }

    /// Model to use on the next attempt after `retry` retryable failures.
    ///
    /// Any gpt-4 family model drops to gpt-3.5-turbo; gpt-3.5-turbo moves to
    /// its 16k variant from the second retry on.
    pub fn downgrade(self, retry: u32) -> Model {
        match self {
            Model::Gpt4o | Model::Gpt4oMini => Model::Gpt35Turbo,
            Model::Gpt35Turbo if retry > 1 => Model::Gpt35Turbo16k,
            other => other,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities enabled for one request, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub web_search: bool,
    #[serde(default)]
    pub file_search: bool,
    #[serde(default)]
    pub vector_store_id: String,
    #[serde(default)]
    pub function_calling: bool,
    #[serde(default)]
    pub model: Model,
}

impl ToolConfig {
    /// File search only counts when a vector store is configured.
    pub fn file_search_ready(&self) -> bool {
        self.file_search && !self.vector_store_id.is_empty()
    }

    /// Returns true if any upstream tool would be attached.
    pub fn has_tools(&self) -> bool {
        self.web_search || self.file_search_ready() || self.function_calling
    }
}

/// An upstream capability attached to a response request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    WebSearch,
    FileSearch { vector_store_ids: Vec<String> },
    FunctionCall { name: String, forced: bool },
}

/// Temperature unit accepted by the weather function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Query-string value understood by the forecast service.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    /// Single-letter suffix used in formatted reports.
    pub fn letter(&self) -> char {
        match self {
            TemperatureUnit::Celsius => 'C',
            TemperatureUnit::Fahrenheit => 'F',
        }
    }
}

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Metadata attached to an assistant reply.
///
/// An empty value serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_files: Option<HashSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ReplyMetadata {
    /// Metadata for a reply produced by the weather function.
    pub fn weather(location: impl Into<String>) -> Self {
        Self {
            function: Some("weather".to_string()),
            location: Some(location.into()),
            ..Default::default()
        }
    }

    /// Metadata listing cited files; `None` when the set is empty.
    pub fn sources(files: HashSet<String>) -> Self {
        Self {
            source_files: (!files.is_empty()).then_some(files),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source_files.is_none() && self.function.is_none() && self.location.is_none()
    }
}

/// Final reply for one chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult {
    pub reply: String,
    #[serde(default)]
    pub metadata: ReplyMetadata,
}

impl ApiResult {
    /// A reply with empty metadata.
    pub fn text(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), metadata: ReplyMetadata::default() }
    }

    pub fn with_metadata(reply: impl Into<String>, metadata: ReplyMetadata) -> Self {
        Self { reply: reply.into(), metadata }
    }
}

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// JSON schema describing a function tool for upstream function calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique name of the function (e.g., "get_weather").
    pub name: String,
    /// Human-readable description of what the function does.
    pub description: String,
    /// JSON Schema object describing the parameters.
    pub parameters: serde_json::Value,
}
