//! Place name to coordinates via a Nominatim-compatible search endpoint.

use ragent_core::Coordinates;
use serde::Deserialize;
use tracing::{debug, warn};

/// Nominatim returns coordinates as strings; accept numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Text(String),
    Number(f64),
}

impl Degrees {
    fn value(&self) -> Option<f64> {
        match self {
            Degrees::Text(s) => s.trim().parse().ok(),
            Degrees::Number(n) => Some(*n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: Degrees,
    lon: Degrees,
    #[serde(default)]
    display_name: Option<String>,
}

pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl Geocoder {
    pub fn new(client: reqwest::Client, base_url: &str, user_agent: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Looks up the first match for `location`.
    ///
    /// Returns `None` for no match as well as for any transport or decode
    /// failure; the caller falls back to the model either way.
    pub async fn resolve_coordinates(&self, location: &str) -> Option<Coordinates> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Geocoding '{}' failed: HTTP {}", location, r.status());
                return None;
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", location, e);
                return None;
            }
        };

        let places: Vec<Place> = match response.json().await {
            Ok(places) => places,
            Err(e) => {
                warn!("Geocoding '{}' returned an unreadable body: {}", location, e);
                return None;
            }
        };

        let place = places.into_iter().next()?;
        let coords = Coordinates {
            latitude: place.lat.value()?,
            longitude: place.lon.value()?,
            display_name: place.display_name.unwrap_or_else(|| location.to_string()),
        };
        debug!("Resolved '{}' to {}, {}", location, coords.latitude, coords.longitude);
        Some(coords)
    }
}
