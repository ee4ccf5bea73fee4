use ragent_core::TemperatureUnit;
use tracing::{info, warn};

use crate::forecast::{format_report, precipitation_chance, ForecastClient};
use crate::geocode::Geocoder;

/// Why a direct lookup could not produce a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    LocationNotFound,
    ForecastUnavailable(String),
}

/// Result of a direct weather lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherOutcome {
    Report(String),
    NeedsFallback(FallbackReason),
}

/// Geocoding plus forecast, without any model involvement.
pub struct WeatherService {
    geocoder: Geocoder,
    forecast: ForecastClient,
}

impl WeatherService {
    pub fn new(geocoder: Geocoder, forecast: ForecastClient) -> Self {
        Self { geocoder, forecast }
    }

    /// Builds both clients over one shared HTTP connection pool.
    pub fn from_urls(geocoding_base: &str, forecast_base: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::new();
        Self::new(
            Geocoder::new(client.clone(), geocoding_base, user_agent),
            ForecastClient::new(client, forecast_base),
        )
    }

    pub async fn lookup(&self, location: &str, unit: TemperatureUnit) -> WeatherOutcome {
        let Some(coords) = self.geocoder.resolve_coordinates(location).await else {
            info!("No coordinates for '{}'", location);
            return WeatherOutcome::NeedsFallback(FallbackReason::LocationNotFound);
        };

        let forecast = match self.forecast.fetch(&coords, unit).await {
            Ok(f) => f,
            Err(e) => {
                warn!("Forecast for '{}' failed: {}", coords.display_name, e);
                return WeatherOutcome::NeedsFallback(FallbackReason::ForecastUnavailable(e.to_string()));
            }
        };

        let Some(current) = forecast.current.as_ref() else {
            return WeatherOutcome::NeedsFallback(FallbackReason::ForecastUnavailable(
                "no current conditions".to_string(),
            ));
        };

        WeatherOutcome::Report(format_report(
            &coords.display_name,
            unit,
            current,
            precipitation_chance(&forecast.hourly),
        ))
    }
}
