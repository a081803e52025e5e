//! Nominatim reverse-geocoding client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use storyteller_domain::GeoHierarchy;

use crate::infrastructure::ports::{GeocodeError, GeocoderPort};

/// Public OpenStreetMap Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying agent.
pub const DEFAULT_USER_AGENT: &str = "storyteller-engine/0.1";

pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Client for Nominatim's `/reverse` endpoint.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            timeout,
        }
    }

    async fn fetch(&self, lat: f64, lon: f64, zoom: u8) -> Result<GeoHierarchy, GeocodeError> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("zoom", zoom.min(18).to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.map_err(request_error)?;
            return Err(GeocodeError::RequestFailed(format!("{status}: {body}")));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        to_hierarchy(body)
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_GEOCODER_URL,
            DEFAULT_USER_AGENT,
            DEFAULT_GEOCODER_TIMEOUT_SECS,
        )
    }
}

#[async_trait]
impl GeocoderPort for NominatimClient {
    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
        zoom: u8,
    ) -> Result<GeoHierarchy, GeocodeError> {
        // The client timeout covers each request; this bounds the whole call
        // including body decoding.
        match tokio::time::timeout(self.timeout, self.fetch(lat, lon, zoom)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    lat,
                    lon,
                    timeout_secs = self.timeout.as_secs(),
                    "Reverse geocoding timed out"
                );
                Err(GeocodeError::Timeout)
            }
        }
    }
}

fn request_error(e: reqwest::Error) -> GeocodeError {
    if e.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::RequestFailed(e.to_string())
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    place_id: Option<serde_json::Value>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Address {
    building: Option<String>,
    amenity: Option<String>,
    tourism: Option<String>,
    shop: Option<String>,
    house_name: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    quarter: Option<String>,
    city_district: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    region: Option<String>,
    province: Option<String>,
    county: Option<String>,
    country: Option<String>,
    continent: Option<String>,
}

/// First non-blank value among the address keys Nominatim may use for a tier.
fn first_of(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn to_hierarchy(body: ReverseResponse) -> Result<GeoHierarchy, GeocodeError> {
    if let Some(error) = body.error {
        tracing::debug!(%error, "Geocoder reported no result");
        return Err(GeocodeError::NoData);
    }
    let address = body.address.unwrap_or_default();
    let place_id = match body.place_id {
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    };

    let hierarchy = GeoHierarchy {
        building: first_of(&[
            &address.building,
            &address.amenity,
            &address.tourism,
            &address.shop,
            &address.house_name,
        ]),
        neighborhood: first_of(&[
            &address.neighbourhood,
            &address.suburb,
            &address.quarter,
            &address.city_district,
        ]),
        city: first_of(&[
            &address.city,
            &address.town,
            &address.village,
            &address.hamlet,
            &address.municipality,
        ]),
        region: first_of(&[
            &address.state,
            &address.region,
            &address.province,
            &address.county,
        ]),
        country: first_of(&[&address.country]),
        continent: first_of(&[&address.continent]),
        display_name: body.display_name.filter(|s| !s.trim().is_empty()),
        place_id,
    };

    if hierarchy.is_empty() && hierarchy.display_name.is_none() {
        return Err(GeocodeError::NoData);
    }
    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GeoHierarchy, GeocodeError> {
        to_hierarchy(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn maps_address_fields_onto_tiers() {
        let hierarchy = parse(
            r#"{
                "place_id": 283746,
                "display_name": "Louvre, Rue de Rivoli, Paris, France",
                "address": {
                    "tourism": "Louvre",
                    "suburb": "1st Arrondissement",
                    "city": "Paris",
                    "state": "Ile-de-France",
                    "country": "France"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(hierarchy.building.as_deref(), Some("Louvre"));
        assert_eq!(hierarchy.neighborhood.as_deref(), Some("1st Arrondissement"));
        assert_eq!(hierarchy.city.as_deref(), Some("Paris"));
        assert_eq!(hierarchy.region.as_deref(), Some("Ile-de-France"));
        assert_eq!(hierarchy.country.as_deref(), Some("France"));
        assert_eq!(hierarchy.continent, None);
        assert_eq!(hierarchy.place_id.as_deref(), Some("283746"));
    }

    #[test]
    fn towns_and_villages_count_as_cities() {
        let hierarchy =
            parse(r#"{"address": {"village": "Little Snoring", "county": "Norfolk"}}"#).unwrap();
        assert_eq!(hierarchy.city.as_deref(), Some("Little Snoring"));
        assert_eq!(hierarchy.region.as_deref(), Some("Norfolk"));
    }

    #[test]
    fn error_body_is_no_data() {
        assert_eq!(
            parse(r#"{"error": "Unable to geocode"}"#),
            Err(GeocodeError::NoData)
        );
    }

    #[test]
    fn empty_address_is_no_data() {
        assert_eq!(parse(r#"{"address": {}}"#), Err(GeocodeError::NoData));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = NominatimClient::new("http://localhost:8080/", DEFAULT_USER_AGENT, 5);
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
