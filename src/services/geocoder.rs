use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::GeocoderConfig;
use crate::database::models::Location;

const MAPQUEST_API: &str = "https://www.mapquestapi.com/geocoding/v1/address";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No location found for '{0}'")]
    NoMatch(String),

    #[error("Unsupported geocoder provider: {0}")]
    UnsupportedProvider(String),

    #[error("Geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoder returned an error: {0}")]
    Provider(String),

    #[error("Invalid geocoder URL: {0}")]
    Url(#[from] url::ParseError),
}

/// First match for an address or postal code
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl GeoPoint {
    /// GeoJSON point; coordinates are `[lng, lat]`
    pub fn into_location(self) -> Location {
        Location {
            location_type: "Point".to_string(),
            coordinates: vec![self.longitude, self.latitude],
            formatted_address: self.formatted_address,
            street: self.street,
            city: self.city,
            state: self.state,
            zipcode: self.zipcode,
            country: self.country,
        }
    }
}

/// Address to coordinates lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError>;
}

/// Build the configured provider
pub fn from_config(config: &GeocoderConfig) -> Result<Arc<dyn Geocoder>, GeocodeError> {
    match config.provider.as_str() {
        "mapquest" => Ok(Arc::new(MapQuestGeocoder::new(&config.api_key)?)),
        other => Err(GeocodeError::UnsupportedProvider(other.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    info: MapQuestInfo,
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestInfo {
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    #[serde(default)]
    street: String,
    /// city
    #[serde(default)]
    admin_area5: String,
    /// state code
    #[serde(default)]
    admin_area3: String,
    /// country code
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
    lat_lng: MapQuestLatLng,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Clone)]
pub struct MapQuestGeocoder {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl MapQuestGeocoder {
    pub fn new(api_key: &str) -> Result<Self, GeocodeError> {
        Self::with_endpoint(api_key, MAPQUEST_API)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("devcamper-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: Url::parse(endpoint)?,
        })
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("location", query)
            .append_pair("maxResults", "1");
        url
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
        let response = self.client.get(self.request_url(query)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Provider(format!("{} - {}", status, body)));
        }

        let body: MapQuestResponse = response.json().await?;
        first_match(body, query)
    }
}

fn first_match(body: MapQuestResponse, query: &str) -> Result<GeoPoint, GeocodeError> {
    if body.info.statuscode != 0 {
        return Err(GeocodeError::Provider(body.info.messages.join("; ")));
    }

    let location = body
        .results
        .into_iter()
        .flat_map(|r| r.locations)
        .next()
        .ok_or_else(|| GeocodeError::NoMatch(query.to_string()))?;

    let non_empty = |s: String| if s.trim().is_empty() { None } else { Some(s) };
    let state_zip = [location.admin_area3.as_str(), location.postal_code.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let formatted = [
        location.street.as_str(),
        location.admin_area5.as_str(),
        state_zip.as_str(),
        location.admin_area1.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(", ");

    Ok(GeoPoint {
        latitude: location.lat_lng.lat,
        longitude: location.lat_lng.lng,
        formatted_address: non_empty(formatted),
        street: non_empty(location.street),
        city: non_empty(location.admin_area5),
        state: non_empty(location.admin_area3),
        zipcode: non_empty(location.postal_code),
        country: non_empty(location.admin_area1),
    })
}
