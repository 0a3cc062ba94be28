use crate::models::{CandidateRoute, Priority};

/// Distance at which the distance component bottoms out.
pub const MAX_DISTANCE_KM: f64 = 50.0;
/// Travel time at which the time component bottoms out.
pub const MAX_TIME_MINUTES: f64 = 120.0;

/// Normalized quality of a route for a priority, roughly in `[0, 1]`.
///
/// Each component is `1 - min(value / cap, 1)`, then the two are blended with
/// [`Priority::score_weights`]. The result is not clamped.
pub fn quality_score(route: &CandidateRoute, priority: Priority) -> f64 {
    let distance_km = route.summary.distance_km();
    let time_minutes = route.summary.time_minutes();

    let distance_score = 1.0 - capped_ratio(distance_km, MAX_DISTANCE_KM);
    let time_score = 1.0 - capped_ratio(time_minutes, MAX_TIME_MINUTES);

    let (time_weight, distance_weight) = priority.score_weights();
    time_weight * time_score + distance_weight * distance_score
}

// Unlike `f64::min`, keeps a NaN ratio instead of replacing it with the cap.
fn capped_ratio(value: f64, cap: f64) -> f64 {
    let ratio = value / cap;
    if ratio > 1.0 { 1.0 } else { ratio }
}
