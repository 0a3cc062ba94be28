use serde::Deserialize;
use thiserror::Error;

use crate::models::{Coordinate, GeocodedLocation, PlaceAddress};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_CITY: &str = "Palangka Raya";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("location {0:?} not found")]
    NotFound(String),

    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoder returned a non-numeric coordinate: {0:?}")]
    InvalidCoordinate(String),
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Nominatim-compatible search endpoint.
    pub base_url: String,
    /// Appended to every query and used for the in-city check.
    pub city: String,
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            city: DEFAULT_CITY.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: PlaceAddress,
}

impl NominatimPlace {
    fn into_location(self) -> Result<GeocodedLocation, GeocodeError> {
        let lat = parse_degrees(&self.lat)?;
        let lon = parse_degrees(&self.lon)?;
        Ok(GeocodedLocation {
            point: Coordinate { lat, lon },
            display_name: self.display_name,
            address: self.address,
        })
    }
}

fn parse_degrees(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeocodeError::InvalidCoordinate(raw.to_string()))
}

pub struct Geocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl Geocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn city(&self) -> &str {
        &self.config.city
    }

    /// Looks up `"<address>, <city>"` and returns the first match.
    ///
    /// # Errors
    /// `NotFound` when the service answers with an empty list; transport,
    /// status and body errors surface as `Request`.
    pub async fn search(&self, address: &str) -> Result<GeocodedLocation, GeocodeError> {
        let query = format!("{address}, {}", self.config.city);
        tracing::debug!("geocoding {query:?} via {}", self.config.base_url);

        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        place.into_location()
    }
}
