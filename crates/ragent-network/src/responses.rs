//! Request and response types for the Responses API.
//!
//! The response payload is heterogeneous: output items may be assistant
//! messages, function calls or tool-call records, and message content may
//! carry citation annotations. It is parsed into tagged enums here and then
//! normalized into a [`ModelReply`].

use ragent_core::{Model, ToolSchema};
use serde::{Deserialize, Serialize};

use crate::client::LlmMetrics;

// === Request ===

/// A tool attached to a response request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestTool {
    WebSearchPreview,
    FileSearch {
        vector_store_ids: Vec<String>,
    },
    Function {
        name: String,
        description: String,
        parameters: serde_json::Value,
    },
}

impl From<ToolSchema> for RequestTool {
    fn from(schema: ToolSchema) -> Self {
        RequestTool::Function {
            name: schema.name,
            description: schema.description,
            parameters: schema.parameters,
        }
    }
}

/// Forces the model to call a specific tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    Function { name: String },
}

/// Body of `POST /responses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRequest {
    pub model: Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub input: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<RequestTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ResponseRequest {
    pub fn new(model: Model, input: impl Into<String>) -> Self {
        Self {
            model,
            instructions: None,
            input: input.into(),
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn tool(mut self, tool: RequestTool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = RequestTool>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Compels the model to call the named function.
    pub fn force_function(mut self, name: impl Into<String>) -> Self {
        self.tool_choice = Some(ToolChoice::Function { name: name.into() });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Returns the same request targeting another model.
    pub fn with_model(&self, model: Model) -> Self {
        Self { model, ..self.clone() }
    }
}

// === Raw response ===

/// Raw `POST /responses` payload, reduced to the parts we consume.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// One entry of the response's `output` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall {
        name: String,
        #[serde(default)]
        arguments: String,
        #[serde(default)]
        call_id: String,
    },
    /// Web/file search records, reasoning items and anything newer.
    #[serde(other)]
    Other,
}

/// A content block inside an output message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        text: String,
        #[serde(default)]
        annotations: Vec<Annotation>,
    },
    Refusal {
        refusal: String,
    },
    #[serde(other)]
    Other,
}

/// A citation marker attached to output text.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    FileCitation {
        #[serde(default)]
        file_id: String,
        #[serde(default)]
        filename: Option<String>,
    },
    ContainerFileCitation {
        #[serde(default)]
        filename: Option<String>,
    },
    UrlCitation {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    #[serde(other)]
    Other,
}

// === Normalized reply ===

/// A function call requested by the model. Arguments stay raw JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub call_id: String,
    pub name: String,
    pub arguments: String,
}

/// A source the model cited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Citation {
    File { filename: String },
    Url { url: String, title: Option<String> },
}

/// Normalized upstream reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Concatenated text of every `output_text` block.
    pub output_text: String,
    pub function_calls: Vec<FunctionCall>,
    /// Citations in output order; duplicates are kept.
    pub citations: Vec<Citation>,
    pub metrics: LlmMetrics,
}

impl ModelReply {
    /// A text-only reply, mostly useful for fakes.
    pub fn text(output_text: impl Into<String>) -> Self {
        Self { output_text: output_text.into(), ..Default::default() }
    }

    pub fn from_response(raw: ResponseObject, elapsed_ms: u64) -> Self {
        let mut reply = ModelReply::default();

        for item in raw.output {
            match item {
                OutputItem::Message { content } => {
                    for part in content {
                        let ContentPart::OutputText { text, annotations } = part else {
                            continue;
                        };
                        reply.output_text.push_str(&text);
                        reply.citations.extend(annotations.into_iter().filter_map(Annotation::into_citation));
                    }
                }
                OutputItem::FunctionCall { name, arguments, call_id } => {
                    reply.function_calls.push(FunctionCall { call_id, name, arguments });
                }
                OutputItem::Other => {}
            }
        }

        let usage = raw.usage.unwrap_or_default();
        reply.metrics = LlmMetrics {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            elapsed_ms,
        };
        reply
    }

    /// Filenames referenced by file citations, in output order.
    pub fn cited_filenames(&self) -> impl Iterator<Item = &str> {
        self.citations.iter().filter_map(|c| match c {
            Citation::File { filename } => Some(filename.as_str()),
            Citation::Url { .. } => None,
        })
    }
}

impl Annotation {
    fn into_citation(self) -> Option<Citation> {
        match self {
            Annotation::FileCitation { filename: Some(filename), .. }
            | Annotation::ContainerFileCitation { filename: Some(filename) } => Some(Citation::File { filename }),
            Annotation::UrlCitation { url, title } => Some(Citation::Url { url, title }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ModelReply {
        let raw: ResponseObject = serde_json::from_value(value).unwrap();
        ModelReply::from_response(raw, 0)
    }

    #[test]
    fn test_request_serialization() {
        let request = ResponseRequest::new(Model::Gpt4oMini, "hello")
            .instructions("be helpful")
            .tool(RequestTool::WebSearchPreview)
            .tool(RequestTool::FileSearch { vector_store_ids: vec!["vs_1".into()] })
            .force_function("get_weather")
            .temperature(0.7);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["tools"][0], json!({"type": "web_search_preview"}));
        assert_eq!(value["tools"][1], json!({"type": "file_search", "vector_store_ids": ["vs_1"]}));
        assert_eq!(value["tool_choice"], json!({"type": "function", "name": "get_weather"}));
    }

    #[test]
    fn test_bare_request_omits_optional_fields() {
        let value = serde_json::to_value(ResponseRequest::new(Model::Gpt4o, "hi")).unwrap();
        assert_eq!(value, json!({"model": "gpt-4o", "input": "hi"}));
    }

    #[test]
    fn test_message_with_annotations() {
        let reply = parse(json!({
            "output": [
                {"type": "file_search_call", "id": "fs_1", "status": "completed", "queries": ["q"]},
                {"type": "message", "role": "assistant", "content": [{
                    "type": "output_text",
                    "text": "Answer.",
                    "annotations": [
                        {"type": "file_citation", "file_id": "f1", "filename": "a.pdf", "index": 3},
                        {"type": "file_citation", "file_id": "f1", "filename": "a.pdf", "index": 5},
                        {"type": "url_citation", "url": "https://example.com", "start_index": 0, "end_index": 1}
                    ]
                }]}
            ]
        }));

        assert_eq!(reply.output_text, "Answer.");
        assert_eq!(reply.cited_filenames().collect::<Vec<_>>(), vec!["a.pdf", "a.pdf"]);
        assert_eq!(reply.citations.len(), 3);
        assert!(reply.function_calls.is_empty());
    }

    #[test]
    fn test_unknown_item_and_content_types_are_tolerated() {
        let reply = parse(json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [
                    {"type": "refusal", "refusal": "no"},
                    {"type": "output_audio", "data": "..."},
                    {"type": "output_text", "text": "ok"}
                ]}
            ]
        }));
        assert_eq!(reply.output_text, "ok");
    }

    #[test]
    fn test_empty_output() {
        let reply = parse(json!({"id": "resp_1"}));
        assert_eq!(reply, ModelReply::default());
    }

    #[test]
    fn test_text_is_concatenated_across_messages() {
        let reply = parse(json!({
            "output": [
                {"type": "message", "content": [{"type": "output_text", "text": "Hello, "}]},
                {"type": "message", "content": [{"type": "output_text", "text": "world"}]}
            ]
        }));
        assert_eq!(reply.output_text, "Hello, world");
    }
}
