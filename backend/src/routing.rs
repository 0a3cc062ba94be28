//! Synthetic route simulation.
//!
//! Nothing here searches a road network: candidates are the great-circle
//! distance scaled by random factors, with a jittered straight line as
//! geometry. Every function takes its random source explicitly so callers
//! can seed it.

use rand::Rng;

pub use crate::models::CANDIDATE_COUNT;
use crate::models::{CandidateRoute, Coordinate, Priority, RouteBundle, RouteSummary};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Points in each candidate's geometry.
pub const ROUTE_POINT_COUNT: usize = 10;

const JITTER_DEGREES: f64 = 0.005;
const DISTANCE_FACTOR: std::ops::Range<f64> = 0.9..1.1;
const MINUTES_PER_KM: std::ops::Range<f64> = 1.5..2.5;

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Straight line from `origin` to `destination` with `num_points` points,
/// each coordinate shifted by up to `JITTER_DEGREES` in either direction.
///
/// A single point yields the (jittered) origin; zero points yield nothing.
pub fn generate_route_coordinates<R: Rng + ?Sized>(
    origin: Coordinate,
    destination: Coordinate,
    num_points: usize,
    rng: &mut R,
) -> Vec<Coordinate> {
    let segments = num_points.saturating_sub(1).max(1) as f64;

    (0..num_points)
        .map(|i| {
            let mut point = origin.interpolate(destination, i as f64 / segments);
            point.lat += rng.random_range(-JITTER_DEGREES..=JITTER_DEGREES);
            point.lon += rng.random_range(-JITTER_DEGREES..=JITTER_DEGREES);
            point
        })
        .collect()
}

pub fn generate_candidates<R: Rng + ?Sized>(
    origin: Coordinate,
    destination: Coordinate,
    rng: &mut R,
) -> [CandidateRoute; CANDIDATE_COUNT] {
    let direct_km = haversine_km(origin, destination);

    std::array::from_fn(|_| {
        let distance_km = direct_km * rng.random_range(DISTANCE_FACTOR);
        let time_minutes = distance_km * rng.random_range(MINUTES_PER_KM);

        CandidateRoute {
            summary: RouteSummary {
                total_distance: distance_km * 1000.0,
                total_time: time_minutes * 60.0,
            },
            coordinates: generate_route_coordinates(origin, destination, ROUTE_POINT_COUNT, rng),
        }
    })
}

/// Index of the candidate a priority prefers. Ties go to the earliest
/// candidate; medium never optimizes and always keeps the first one.
pub fn select_route(routes: &[CandidateRoute], priority: Priority) -> Option<usize> {
    if routes.is_empty() {
        return None;
    }

    let key: fn(&RouteSummary) -> f64 = match priority {
        Priority::High => |summary| summary.total_time,
        Priority::Low => |summary| summary.total_distance,
        Priority::Medium => return Some(0),
    };

    routes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| key(&a.summary).total_cmp(&key(&b.summary)))
        .map(|(idx, _)| idx)
}

pub fn calculate_route<R: Rng + ?Sized>(
    origin: Coordinate,
    destination: Coordinate,
    priority: Priority,
    rng: &mut R,
) -> RouteBundle {
    let routes = generate_candidates(origin, destination, rng);
    let chosen = select_route(&routes, priority).unwrap_or(0);

    tracing::debug!(
        "simulated {} candidates, priority={} chose #{}",
        routes.len(),
        priority,
        chosen
    );

    RouteBundle::new(routes, chosen)
}
