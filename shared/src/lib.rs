use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// How a caller trades travel time against travel distance.
///
/// Only the exact strings `high` and `low` select an optimization; anything
/// else, including other casings, is `medium`, which keeps the first
/// generated candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn parse(value: &str) -> Self {
        match value {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// `(time_weight, distance_weight)` used by the quality score.
    pub fn score_weights(&self) -> (f64, f64) {
        match self {
            Priority::High => (0.7, 0.3),
            Priority::Low => (0.3, 0.7),
            Priority::Medium => (0.5, 0.5),
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::parse(&value)
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals of a route, in meters and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_distance: f64,
    pub total_time: f64,
}

impl RouteSummary {
    pub fn distance_km(&self) -> f64 {
        self.total_distance / 1000.0
    }

    pub fn time_minutes(&self) -> f64 {
        self.total_time / 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    pub summary: RouteSummary,
    pub coordinates: Vec<Coordinate>,
}

/// Number of alternatives generated per request.
pub const CANDIDATE_COUNT: usize = 3;

/// The generated alternatives together with the one picked for a priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteBundle {
    routes: [CandidateRoute; CANDIDATE_COUNT],
    chosen_index: usize,
}

impl RouteBundle {
    /// An index past the last candidate is clamped to it.
    pub fn new(routes: [CandidateRoute; CANDIDATE_COUNT], chosen_index: usize) -> Self {
        Self {
            routes,
            chosen_index: chosen_index.min(CANDIDATE_COUNT - 1),
        }
    }

    pub fn routes(&self) -> &[CandidateRoute] {
        &self.routes
    }

    pub fn chosen_index(&self) -> usize {
        self.chosen_index
    }

    pub fn chosen_route(&self) -> &CandidateRoute {
        &self.routes[self.chosen_index]
    }

    pub fn into_parts(self) -> (Vec<CandidateRoute>, usize) {
        (Vec::from(self.routes), self.chosen_index)
    }
}

/// Rounded-for-humans view of a route summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub time_minutes: f64,
}

impl From<&RouteSummary> for RouteEstimate {
    fn from(summary: &RouteSummary) -> Self {
        Self {
            distance_km: summary.distance_km(),
            time_minutes: summary.time_minutes(),
        }
    }
}

impl fmt::Display for RouteEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimated distance: {:.2} km, estimated time: {:.0} min",
            self.distance_km, self.time_minutes
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Service area of the Palangka Raya deployment.
    pub const PALANGKA_RAYA: BoundingBox = BoundingBox {
        min_lat: -2.35,
        max_lat: -2.05,
        min_lon: 113.8,
        max_lon: 114.05,
    };

    /// Area the benchmark samples its origins and destinations from.
    pub const BENCHMARK_AREA: BoundingBox = BoundingBox {
        min_lat: -2.2,
        max_lat: -2.1,
        min_lon: 113.9,
        max_lon: 114.0,
    };

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        Coordinate {
            lat: self.min_lat + rng.random::<f64>() * (self.max_lat - self.min_lat),
            lon: self.min_lon + rng.random::<f64>() * (self.max_lon - self.min_lon),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub routes: Vec<CandidateRoute>,
    pub chosen_index: usize,
    pub chosen_route: CandidateRoute,
    pub priority: Priority,
    pub quality_score: f64,
    pub estimate: RouteEstimate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub point: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: PlaceAddress,
}

impl GeocodedLocation {
    /// Whether the place's city, town or village (first non-empty) names `city`.
    pub fn is_in_city(&self, city: &str) -> bool {
        let locality = [
            &self.address.city,
            &self.address.town,
            &self.address.village,
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty());

        match locality {
            Some(name) => name.to_lowercase().contains(&city.to_lowercase()),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub location: GeocodedLocation,
    pub in_city: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonListing {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
