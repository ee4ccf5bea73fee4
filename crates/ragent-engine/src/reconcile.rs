//! Turns a normalized model reply into the final `ApiResult`.

use std::collections::HashSet;

use ragent_core::{ApiResult, Model, ReplyMetadata};
use ragent_network::ModelReply;
use ragent_tools::{WeatherArgs, WEATHER_FUNCTION};
use tracing::{info, warn};

use crate::weather::WeatherAgent;

/// Distinct filenames cited by the reply.
pub fn collect_source_files(reply: &ModelReply) -> HashSet<String> {
    reply.cited_filenames().map(str::to_string).collect()
}

/// First `get_weather` call whose arguments parse. Malformed ones are skipped.
pub fn weather_request(reply: &ModelReply) -> Option<WeatherArgs> {
    reply
        .function_calls
        .iter()
        .filter(|call| call.name == WEATHER_FUNCTION)
        .find_map(|call| match WeatherArgs::parse(&call.arguments) {
            Ok(args) => Some(args),
            Err(e) => {
                warn!("Skipping get_weather call {}: {}", call.call_id, e);
                None
            }
        })
}

/// Weather call first, then cited files, then plain text.
///
/// `model` is the caller's configured model; any weather fallback runs on it
/// rather than on whatever model produced the reply.
pub async fn reconcile(reply: &ModelReply, model: Model, weather: &WeatherAgent) -> ApiResult {
    if let Some(args) = weather_request(reply) {
        info!("║ RECONCILE: model requested weather for '{}'", args.location);
        let report = weather.get_weather(&args.location, args.unit, model).await;
        return ApiResult::with_metadata(report, ReplyMetadata::weather(args.location));
    }

    let sources = collect_source_files(reply);
    ApiResult::with_metadata(reply.output_text.clone(), ReplyMetadata::sources(sources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;
    use ragent_network::{Citation, FunctionCall};
    use ragent_tools::WeatherService;
    use std::sync::Arc;

    fn agent() -> WeatherAgent {
        let service = WeatherService::from_urls("http://127.0.0.1:9", "http://127.0.0.1:9", "test");
        WeatherAgent::new(Arc::new(service), Arc::new(ScriptedModel::new(vec![])))
    }

    fn cited(text: &str, files: &[&str]) -> ModelReply {
        let mut reply = ModelReply::text(text);
        reply.citations = files
            .iter()
            .map(|f| Citation::File { filename: f.to_string() })
            .chain(std::iter::once(Citation::Url { url: "https://example.com".into(), title: None }))
            .collect();
        reply
    }

    fn weather_call(arguments: &str) -> FunctionCall {
        FunctionCall { call_id: "c".into(), name: "get_weather".into(), arguments: arguments.into() }
    }

    #[tokio::test]
    async fn test_plain_text_has_empty_metadata() {
        let result = reconcile(&ModelReply::text("Hello"), Model::Gpt4o, &agent()).await;
        assert_eq!(result, ApiResult::text("Hello"));
    }

    #[tokio::test]
    async fn test_duplicate_citations_collapse() {
        let result = reconcile(&cited("Answer", &["a.pdf", "b.md", "a.pdf"]), Model::Gpt4o, &agent()).await;
        let files = result.metadata.source_files.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains("a.pdf") && files.contains("b.md"));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let reply = cited("Answer", &["a.pdf"]);
        let agent = agent();
        let first = reconcile(&reply, Model::Gpt4o, &agent).await;
        let second = reconcile(&reply, Model::Gpt4o, &agent).await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_weather_call_is_skipped() {
        let mut reply = ModelReply::text("fallback");
        reply.function_calls = vec![
            weather_call("{oops"),
            FunctionCall { call_id: "d".into(), name: "other".into(), arguments: r#"{"location": "x"}"#.into() },
            weather_call(r#"{"location": "Lyon"}"#),
        ];
        let args = weather_request(&reply).unwrap();
        assert_eq!(args.location, "Lyon");
    }

    #[tokio::test]
    async fn test_only_malformed_calls_fall_through_to_text() {
        let mut reply = cited("From the docs", &["notes.txt"]);
        reply.function_calls = vec![weather_call("not json")];
        let result = reconcile(&reply, Model::Gpt4o, &agent()).await;
        assert_eq!(result.reply, "From the docs");
        assert!(result.metadata.function.is_none());
        assert_eq!(result.metadata.source_files.unwrap().len(), 1);
    }
}
