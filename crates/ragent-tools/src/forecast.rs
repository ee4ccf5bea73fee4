//! Open-Meteo forecast client and report formatting.

use ragent_core::{Coordinates, TemperatureUnit};
use serde::Deserialize;

use crate::ToolError;

/// Hours of hourly data considered for the precipitation chance.
const PRECIPITATION_WINDOW: usize = 12;

/// Current conditions block of a forecast response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: f64,
    pub weather_code: u32,
    pub wind_speed_10m: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Forecast {
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub hourly: HourlySeries,
}

pub struct ForecastClient {
    client: reqwest::Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch(&self, coords: &Coordinates, unit: TemperatureUnit) -> Result<Forecast, ToolError> {
        let response = self
            .client
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", "temperature_2m,weather_code,wind_speed_10m".to_string()),
                (
                    "hourly",
                    "temperature_2m,precipitation_probability,weather_code".to_string(),
                ),
                ("temperature_unit", unit.as_str().to_string()),
                ("wind_speed_unit", "kmh".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "forecast service returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("unreadable forecast: {}", e)))
    }
}

/// WMO weather interpretation code to text.
pub fn describe_weather_code(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Highest probability over the next 12 hours, skipping gaps.
pub fn precipitation_chance(hourly: &HourlySeries) -> Option<f64> {
    hourly
        .precipitation_probability
        .iter()
        .take(PRECIPITATION_WINDOW)
        .flatten()
        .copied()
        .fold(None, |max, p| Some(max.map_or(p, |m: f64| m.max(p))))
}

/// Renders the Markdown weather report.
///
/// Temperature and wind always carry a decimal (`9.0°C`); the precipitation
/// percentage is printed as a whole number.
pub fn format_report(
    display_name: &str,
    unit: TemperatureUnit,
    current: &CurrentConditions,
    precipitation: Option<f64>,
) -> String {
    let mut report = format!(
        "## Weather in {}\n- **Temperature:** {:?}°{}\n- **Conditions:** {}\n- **Wind Speed:** {:?} km/h",
        display_name,
        current.temperature_2m,
        unit.letter(),
        describe_weather_code(current.weather_code),
        current.wind_speed_10m,
    );

    if let Some(chance) = precipitation.filter(|p| *p > 0.0) {
        report.push_str(&format!(
            "\n- **Precipitation Chance:** {}% (next 12 hours)",
            chance
        ));
    }
    report
}
