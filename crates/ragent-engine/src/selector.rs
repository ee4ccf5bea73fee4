//! Chooses how a message is answered from the caller's tool settings.

use ragent_core::{Model, ToolConfig, ToolInvocation};
use ragent_tools::{extract_location, is_plausible_location, is_weather_query, WEATHER_FUNCTION};

/// Tools and model for one Responses API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPlan {
    pub tools: Vec<ToolInvocation>,
    pub model: Model,
}

impl ToolPlan {
    /// Name of the function the model is compelled to call, if any.
    pub fn forced_function(&self) -> Option<&str> {
        self.tools.iter().find_map(|t| match t {
            ToolInvocation::FunctionCall { name, forced: true } => Some(name.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Weather lookup without asking the model first.
    DirectWeather { location: String },
    Tools(ToolPlan),
    /// Plain chat completion, no tools attached.
    Plain { model: Model },
}

pub fn select(message: &str, config: &ToolConfig) -> Route {
    let weather_intent = config.function_calling && is_weather_query(message);

    if weather_intent {
        let location = extract_location(message);
        if is_plausible_location(&location) {
            return Route::DirectWeather { location };
        }
    }

    if !config.has_tools() {
        return Route::Plain { model: config.model };
    }

    let mut tools = Vec::new();
    if config.web_search {
        tools.push(ToolInvocation::WebSearch);
    }
    if config.file_search_ready() {
        tools.push(ToolInvocation::FileSearch {
            vector_store_ids: vec![config.vector_store_id.clone()],
        });
    }
    if config.function_calling {
        tools.push(ToolInvocation::FunctionCall {
            name: WEATHER_FUNCTION.to_string(),
            forced: weather_intent,
        });
    }

    let model = if tools.len() > 1 && config.model.is_top_tier() {
        Model::Gpt4oMini
    } else {
        config.model
    };

    Route::Tools(ToolPlan { tools, model })
}
