//! Geocode adapter over the Google Geocoding API.
//!
//! One lookup per call, no retry, no cache. Every failure is logged and
//! reported as "no result".

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use geolens_core::{GeocodeResult, Geocoder};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Deserialize)]
struct Place {
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    place_id: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// First result of an `OK` reply.
fn first_result(response: GeocodeResponse) -> Option<GeocodeResult> {
    if response.status != "OK" {
        debug!(status = %response.status, "Geocoder returned no match");
        return None;
    }
    let place = response.results.into_iter().next()?;
    Some(GeocodeResult {
        lat: place.geometry.location.lat,
        lng: place.geometry.location.lng,
        formatted_address: place.formatted_address,
        place_id: place.place_id,
    })
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn name(&self) -> &str {
        "google-geocoding"
    }

    async fn geocode(&self, place: &str) -> Option<GeocodeResult> {
        let place = place.trim();
        if place.is_empty() {
            return None;
        }

        let resp = match self
            .client
            .get(&self.base_url)
            .query(&[("address", place), ("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                // reqwest errors carry the URL, key included.
                warn!(error = %e.without_url(), "Geocoding request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "Geocoding returned an error status");
            return None;
        }
        match resp.json::<GeocodeResponse>().await {
            Ok(body) => first_result(body),
            Err(e) => {
                warn!(error = %e.without_url(), "Failed to parse geocoding response");
                None
            }
        }
    }
}
