//! In-memory fakes for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ragent_core::AgentError;
use ragent_network::{LanguageModel, LlmMetrics, LlmResponse, ModelReply, ResponseRequest};

/// Replays queued results and records what it was asked.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, AgentError>>>,
    chats: Mutex<VecDeque<Result<String, AgentError>>>,
    requests: Mutex<Vec<ResponseRequest>>,
    chat_calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<ModelReply, AgentError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            chats: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            chat_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chats(self, chats: Vec<Result<String, AgentError>>) -> Self {
        *self.chats.lock().unwrap() = chats.into();
        self
    }

    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(model, system prompt)` of every chat completion.
    pub fn chat_calls(&self) -> Vec<(String, String)> {
        self.chat_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(&self, model: &str, system_prompt: &str, _user_input: &str) -> Result<LlmResponse, AgentError> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((model.to_string(), system_prompt.to_string()));
        let content = self
            .chats
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::LlmError("script exhausted".into())))?;
        Ok(LlmResponse { content, metrics: LlmMetrics::default() })
    }

    async fn respond(&self, request: &ResponseRequest) -> Result<ModelReply, AgentError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::LlmError("script exhausted".into())))
    }
}
