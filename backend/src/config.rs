use std::{net::SocketAddr, path::PathBuf};

use crate::error::AppError;
use crate::geocode::{GeocoderConfig, DEFAULT_CITY, DEFAULT_GEOCODER_URL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_GEOJSON_DIR: &str = "static/geojson";
pub const DEFAULT_GEOJSON_EXTENSION: &str = ".geojson";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub geojson_dir: PathBuf,
    pub geojson_extension: String,
    pub geocoder: GeocoderConfig,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `GEOJSON_DIR`, `GEOJSON_EXTENSION`, `GEOCODER_URL`,
    /// `GEOCODE_CITY` and `GEOCODER_USER_AGENT`, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = var("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|err| AppError::Config(format!("invalid BIND_ADDR {bind_addr:?}: {err}")))?;

        let defaults = GeocoderConfig::default();
        let geocoder = GeocoderConfig {
            base_url: var("GEOCODER_URL", DEFAULT_GEOCODER_URL),
            city: var("GEOCODE_CITY", DEFAULT_CITY),
            user_agent: var("GEOCODER_USER_AGENT", &defaults.user_agent),
        };

        Ok(Self {
            bind_addr,
            geojson_dir: PathBuf::from(var("GEOJSON_DIR", DEFAULT_GEOJSON_DIR)),
            geojson_extension: var("GEOJSON_EXTENSION", DEFAULT_GEOJSON_EXTENSION),
            geocoder,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            geojson_dir: PathBuf::from(DEFAULT_GEOJSON_DIR),
            geojson_extension: DEFAULT_GEOJSON_EXTENSION.to_string(),
            geocoder: GeocoderConfig::default(),
        }
    }
}
