use std::collections::HashSet;
use std::sync::Arc;

use ragent_core::{ApiResult, Model, ReplyMetadata, TemperatureUnit, ToolConfig, ToolInvocation};
use ragent_network::{LanguageModel, RequestTool, ResponseRequest};
use ragent_tools::WeatherService;
use tracing::{info, warn};

use crate::prompts::{DEVELOPER_PROMPT, SYSTEM_MESSAGE};
use crate::reconcile::reconcile;
use crate::retry::{RetryPolicy, RetryingInvoker, TOOL_RESPONSE};
use crate::search::{search_files, web_search};
use crate::selector::{select, Route, ToolPlan};
use crate::weather::WeatherAgent;

/// Answers chat turns against one upstream client.
///
/// The client is fixed for the lifetime of the assistant; a new credential
/// means a new `Assistant`.
pub struct Assistant {
    llm: Arc<dyn LanguageModel>,
    weather: WeatherAgent,
    invoker: RetryingInvoker,
}

impl Assistant {
    pub fn new(llm: Arc<dyn LanguageModel>, weather: Arc<WeatherService>, policy: RetryPolicy) -> Self {
        Self {
            weather: WeatherAgent::new(weather, llm.clone()),
            invoker: RetryingInvoker::new(policy),
            llm,
        }
    }

    /// Produces the reply for one user message.
    pub async fn respond(&self, message: &str, config: &ToolConfig) -> ApiResult {
        match select(message, config) {
            Route::DirectWeather { location } => {
                info!("╔══ ROUTE: direct weather for '{}'", location);
                let report = self
                    .weather
                    .get_weather(&location, TemperatureUnit::default(), config.model)
                    .await;
                ApiResult::with_metadata(report, ReplyMetadata::weather(location))
            }
            Route::Tools(plan) => {
                info!("╔══ ROUTE: {} tool(s) on {}", plan.tools.len(), plan.model);
                self.use_tools(message, &plan, config.model).await
            }
            Route::Plain { model } => {
                info!("╔══ ROUTE: chat completion on {}", model);
                ApiResult::text(self.chat_completion(message, model).await)
            }
        }
    }

    /// Plain completion with the fixed system message.
    pub async fn chat_completion(&self, message: &str, model: Model) -> String {
        match self.llm.chat(model.as_str(), SYSTEM_MESSAGE, message).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                format!("Error: {}", e.detail())
            }
        }
    }

    pub async fn web_search(&self, query: &str, model: Model) -> String {
        web_search(self.llm.as_ref(), query, model).await
    }

    pub async fn search_files(
        &self,
        message: &str,
        vector_store_ids: &[String],
        model: Model,
    ) -> (String, HashSet<String>) {
        search_files(self.llm.as_ref(), &self.invoker, message, vector_store_ids, model).await
    }

    async fn use_tools(&self, message: &str, plan: &ToolPlan, configured: Model) -> ApiResult {
        let mut request = ResponseRequest::new(plan.model, message)
            .instructions(DEVELOPER_PROMPT)
            .tools(plan.tools.iter().map(|t| self.request_tool(t)))
            .temperature(0.7);
        if let Some(name) = plan.forced_function() {
            request = request.force_function(name);
        }

        let llm = &self.llm;
        let result = self
            .invoker
            .invoke(plan.model, |model| {
                let request = request.with_model(model);
                async move { llm.respond(&request).await }
            })
            .await;

        match result {
            Ok((reply, model)) => {
                if model != plan.model {
                    info!("║ TOOLS: reply came from downgraded model {}", model);
                }
                reconcile(&reply, configured, &self.weather).await
            }
            Err(e) => ApiResult::text(TOOL_RESPONSE.recover(&e)),
        }
    }

    fn request_tool(&self, tool: &ToolInvocation) -> RequestTool {
        match tool {
            ToolInvocation::WebSearch => RequestTool::WebSearchPreview,
            ToolInvocation::FileSearch { vector_store_ids } => RequestTool::FileSearch {
                vector_store_ids: vector_store_ids.clone(),
            },
            ToolInvocation::FunctionCall { .. } => RequestTool::from(self.weather.schema().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;
    use ragent_core::AgentError;
    use ragent_network::{Citation, FunctionCall, ModelReply};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assistant(llm: Arc<ScriptedModel>, weather_base: &str) -> Assistant {
        let weather = WeatherService::from_urls(weather_base, weather_base, "RAGAgentic/1.0");
        Assistant::new(llm, Arc::new(weather), RetryPolicy::default())
    }

    async fn weather_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "52.52", "lon": "13.40", "display_name": "Berlin, Germany"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {"temperature_2m": 3.5, "weather_code": 71, "wind_speed_10m": 14.0},
                "hourly": {"precipitation_probability": [10, 80, 30]}
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_plain_chat_uses_system_message() {
        let llm = Arc::new(ScriptedModel::new(vec![]).with_chats(vec![Ok("Hi there".into())]));
        let result = assistant(llm.clone(), "http://127.0.0.1:9")
            .respond("hello", &ToolConfig::default())
            .await;

        assert_eq!(result, ApiResult::text("Hi there"));
        assert_eq!(llm.chat_calls(), vec![("gpt-4o".to_string(), SYSTEM_MESSAGE.to_string())]);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_plain_chat_error_text() {
        let llm = Arc::new(
            ScriptedModel::new(vec![]).with_chats(vec![Err(AgentError::LlmError("invalid_api_key".into()))]),
        );
        let result = assistant(llm, "http://127.0.0.1:9")
            .respond("hello", &ToolConfig::default())
            .await;
        assert_eq!(result.reply, "Error: invalid_api_key");
        assert!(result.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_direct_weather_route() {
        let server = weather_server().await;
        let llm = Arc::new(ScriptedModel::new(vec![]));
        let config = ToolConfig { function_calling: true, ..Default::default() };

        let result = assistant(llm.clone(), &server.uri())
            .respond("What is the weather in Berlin?", &config)
            .await;

        assert!(result.reply.contains("Slight snow fall"));
        assert!(result.reply.contains("80% (next 12 hours)"));
        assert_eq!(result.metadata, ReplyMetadata::weather("berlin"));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_tool_response_with_citations() {
        let mut reply = ModelReply::text("Per the handbook, yes.");
        reply.citations = vec![Citation::File { filename: "handbook.pdf".into() }];
        let llm = Arc::new(ScriptedModel::new(vec![Ok(reply)]));
        let config = ToolConfig {
            web_search: true,
            file_search: true,
            vector_store_id: "vs_1".into(),
            ..Default::default()
        };

        let result = assistant(llm.clone(), "http://127.0.0.1:9")
            .respond("can I expense lunch?", &config)
            .await;

        assert_eq!(result.reply, "Per the handbook, yes.");
        assert!(result.metadata.source_files.unwrap().contains("handbook.pdf"));

        let request = &llm.requests()[0];
        assert_eq!(request.model, Model::Gpt4oMini);
        assert_eq!(request.tools.len(), 2);
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.tool_choice.is_none());
    }

    #[tokio::test]
    async fn test_forced_function_call_runs_weather() {
        let server = weather_server().await;
        let call = ModelReply {
            function_calls: vec![FunctionCall {
                call_id: "call_1".into(),
                name: "get_weather".into(),
                arguments: r#"{"location": "Berlin", "unit": "fahrenheit"}"#.into(),
            }],
            ..Default::default()
        };
        let llm = Arc::new(ScriptedModel::new(vec![Ok(call)]));
        let config = ToolConfig { function_calling: true, ..Default::default() };

        let result = assistant(llm.clone(), &server.uri())
            .respond("weather?", &config)
            .await;

        assert!(result.reply.starts_with("## Weather in Berlin, Germany"));
        assert!(result.reply.contains("°F"));
        assert_eq!(result.metadata, ReplyMetadata::weather("Berlin"));
        assert_eq!(
            llm.requests()[0].tool_choice,
            Some(ragent_network::ToolChoice::Function { name: "get_weather".into() })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_response_apology_after_rate_limits() {
        let rate_limited = || Err(AgentError::LlmError("Error code: 429 - rate_limit_exceeded".into()));
        let llm = Arc::new(ScriptedModel::new(vec![rate_limited(), rate_limited(), rate_limited()]));
        let config = ToolConfig { web_search: true, ..Default::default() };

        let result = assistant(llm.clone(), "http://127.0.0.1:9")
            .respond("latest news", &config)
            .await;

        assert_eq!(result, ApiResult::text(TOOL_RESPONSE.apology));
        let models: Vec<Model> = llm.requests().iter().map(|r| r.model).collect();
        assert_eq!(models, vec![Model::Gpt4o, Model::Gpt35Turbo, Model::Gpt35Turbo16k]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_weather_fallback_uses_configured_model_after_downgrade() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let call = ModelReply {
            function_calls: vec![FunctionCall {
                call_id: "call_1".into(),
                name: "get_weather".into(),
                arguments: r#"{"location": "Atlantis"}"#.into(),
            }],
            ..Default::default()
        };
        let llm = Arc::new(ScriptedModel::new(vec![
            Err(AgentError::LlmError("Error code: 429 - rate_limit_exceeded".into())),
            Ok(call),
            Ok(ModelReply::default()),
            Ok(ModelReply::text("Sunken and damp.")),
        ]));
        let config = ToolConfig { function_calling: true, ..Default::default() };

        let result = assistant(llm.clone(), &server.uri())
            .respond("weather?", &config)
            .await;

        assert_eq!(result.reply, "Sunken and damp.");
        let models: Vec<Model> = llm.requests().iter().map(|r| r.model).collect();
        assert_eq!(models, vec![Model::Gpt4o, Model::Gpt35Turbo, Model::Gpt4o, Model::Gpt4o]);
    }

    #[tokio::test]
    async fn test_tool_response_terminal_error() {
        let llm = Arc::new(ScriptedModel::new(vec![Err(AgentError::LlmError(
            "Error code: 401 - invalid_api_key".into(),
        ))]));
        let config = ToolConfig { web_search: true, ..Default::default() };

        let result = assistant(llm.clone(), "http://127.0.0.1:9")
            .respond("latest news", &config)
            .await;

        assert_eq!(result.reply, "Error with tools: Error code: 401 - invalid_api_key");
        assert_eq!(llm.requests().len(), 1);
    }
}
