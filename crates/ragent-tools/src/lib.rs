//! Weather tooling for the assistant.
//!
//! - [`extract_location`] and [`is_weather_query`] read intent from a message
//! - [`Geocoder`] resolves place names to [`Coordinates`]
//! - [`ForecastClient`] and [`format_report`] build the Markdown report
//! - [`WeatherService`] chains the two into a tagged [`WeatherOutcome`]
//! - [`WeatherTool`] exposes the lookup as the `get_weather` function

mod forecast;
mod geocode;
mod location;
mod weather;

pub use forecast::{
    describe_weather_code, format_report, precipitation_chance, CurrentConditions, Forecast,
    ForecastClient, HourlySeries,
};
pub use geocode::Geocoder;
pub use location::{extract_location, is_plausible_location, is_weather_query};
pub use weather::{FallbackReason, WeatherOutcome, WeatherService};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub use ragent_core::{Coordinates, TemperatureUnit, ToolSchema};

/// Name of the weather function as advertised to the model.
pub const WEATHER_FUNCTION: &str = "get_weather";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A function the model can call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> serde_json::Value;
    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError>;

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Arguments of a `get_weather` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherArgs {
    pub location: String,
    pub unit: TemperatureUnit,
}

#[derive(Deserialize)]
struct RawWeatherArgs {
    location: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

impl WeatherArgs {
    /// Parses the raw JSON argument string of a function call.
    ///
    /// An unrecognised unit falls back to celsius; a missing or blank
    /// location is an error.
    pub fn parse(arguments: &str) -> Result<Self, ToolError> {
        let raw: RawWeatherArgs =
            serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_value(args: serde_json::Value) -> Result<Self, ToolError> {
        let raw: RawWeatherArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawWeatherArgs) -> Result<Self, ToolError> {
        let location = raw
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' parameter".to_string()))?;

        let unit = match raw.unit.as_deref() {
            Some("fahrenheit") => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        };

        Ok(Self { location, unit })
    }
}

/// The `get_weather` function, backed by a direct lookup.
pub struct WeatherTool {
    service: Arc<WeatherService>,
}

impl WeatherTool {
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_FUNCTION
    }

    fn description(&self) -> &str {
        "Get current weather information for a given location"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City and country (if known), e.g., 'Paris, France' or just 'Paris'"
                },
                "unit": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "description": "Temperature unit"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let args = WeatherArgs::from_value(args)?;
        match self.service.lookup(&args.location, args.unit).await {
            WeatherOutcome::Report(report) => Ok(report),
            WeatherOutcome::NeedsFallback(FallbackReason::LocationNotFound) => Err(
                ToolError::ExecutionFailed(format!("Could not find location: {}", args.location)),
            ),
            WeatherOutcome::NeedsFallback(FallbackReason::ForecastUnavailable(reason)) => {
                Err(ToolError::ExecutionFailed(reason))
            }
        }
    }
}
