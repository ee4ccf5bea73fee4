//! Weather lookup with model-assisted fallbacks.
//!
//! A request walks down three stages until one produces text:
//!
//! ```text
//! direct lookup ──▶ forced get_weather call ──▶ web search
//! ```
//!
//! Both lookups run through the `get_weather` [`Tool`]. The forced call asks
//! the model to normalise the place name and then retries the tool with it.
//! Web search always returns something, so `get_weather` never fails.

use std::sync::Arc;

use ragent_core::{AgentError, Model, TemperatureUnit, ToolSchema};
use ragent_network::{LanguageModel, RequestTool, ResponseRequest};
use ragent_tools::{Tool, WeatherService, WeatherTool, WEATHER_FUNCTION};
use serde_json::json;
use tracing::{info, warn};

use crate::search::web_search;

/// Where the function-calling stage ended up.
enum FunctionStage {
    Report(String),
    SearchFor(String),
}

pub struct WeatherAgent {
    tool: Arc<dyn Tool>,
    llm: Arc<dyn LanguageModel>,
    schema: ToolSchema,
}

impl WeatherAgent {
    pub fn new(service: Arc<WeatherService>, llm: Arc<dyn LanguageModel>) -> Self {
        Self::with_tool(Arc::new(WeatherTool::new(service)), llm)
    }

    /// Uses `tool` for every direct lookup instead of the built-in service.
    pub fn with_tool(tool: Arc<dyn Tool>, llm: Arc<dyn LanguageModel>) -> Self {
        let schema = tool.schema();
        Self { tool, llm, schema }
    }

    async fn lookup(&self, location: &str, unit: TemperatureUnit) -> Option<String> {
        match self
            .tool
            .execute(json!({ "location": location, "unit": unit.as_str() }))
            .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                info!("║ WEATHER: lookup for '{}' fell back: {}", location, e);
                None
            }
        }
    }

    /// Schema of the `get_weather` function.
    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub async fn get_weather(&self, location: &str, unit: TemperatureUnit, model: Model) -> String {
        if let Some(report) = self.lookup(location, unit).await {
            return report;
        }

        let search_for = match self.via_function_call(location, unit, model).await {
            Ok(FunctionStage::Report(report)) => return report,
            Ok(FunctionStage::SearchFor(extracted)) => extracted,
            Err(e) => {
                warn!("║ WEATHER: function call for '{}' failed: {}", location, e);
                location.to_string()
            }
        };

        info!("║ WEATHER: searching the web for '{}'", search_for);
        web_search(
            self.llm.as_ref(),
            &format!("What's the current weather in {}?", search_for),
            model,
        )
        .await
    }

    async fn via_function_call(
        &self,
        location: &str,
        unit: TemperatureUnit,
        model: Model,
    ) -> Result<FunctionStage, AgentError> {
        let request = ResponseRequest::new(model, format!("What is the weather like in {}?", location))
            .tool(RequestTool::from(self.schema.clone()))
            .force_function(WEATHER_FUNCTION);

        let reply = self.llm.respond(&request).await?;
        let mut extracted = location.to_string();

        for call in reply
            .function_calls
            .iter()
            .filter(|c| c.name == WEATHER_FUNCTION && !c.arguments.is_empty())
        {
            let args: serde_json::Value = serde_json::from_str(&call.arguments)?;
            let Some(name) = args.get("location").and_then(|v| v.as_str()) else {
                continue;
            };
            extracted = name.to_string();
            if let Some(report) = self.lookup(&extracted, unit).await {
                return Ok(FunctionStage::Report(report));
            }
        }

        Ok(FunctionStage::SearchFor(extracted))
    }
}
