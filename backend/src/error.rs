use thiserror::Error;

use crate::geocode::GeocodeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read GeoJSON directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("configuration error: {0}")]
    Config(String),
}
