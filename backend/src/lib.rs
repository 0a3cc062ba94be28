pub mod config;
pub mod error;
pub mod files;
pub mod geocode;
pub mod models;
pub mod perf;
pub mod routing;
pub mod scoring;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use rand::Rng;
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::files::{GEOJSON_ROUTE, list_geojson_files, render_index};
use crate::geocode::{GeocodeError, Geocoder};
use crate::models::{
    ApiError, GeoJsonListing, GeocodeResponse, RouteEstimate, RouteRequest, RouteResponse,
};
use crate::routing::calculate_route;
use crate::scoring::quality_score;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub geocoder: Arc<Geocoder>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/geojson", get(list_handler))
        .route("/api/route", post(route_handler))
        .route("/api/geocode", get(geocode_handler))
        .nest_service(GEOJSON_ROUTE, ServeDir::new(&state.config.geojson_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

async fn index_handler(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let files = list_geojson_files(&state.config.geojson_dir, &state.config.geojson_extension)
        .await
        .map_err(|err| api_error(err.into()))?;
    Ok(Html(render_index(&files)))
}

async fn list_handler(State(state): State<AppState>) -> ApiResult<Json<GeoJsonListing>> {
    let files = list_geojson_files(&state.config.geojson_dir, &state.config.geojson_extension)
        .await
        .map_err(|err| api_error(err.into()))?;
    Ok(Json(GeoJsonListing { files }))
}

async fn route_handler(
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResult<Json<RouteResponse>> {
    let Json(req) =
        payload.map_err(|rejection| rejection_error(rejection.status(), rejection.body_text()))?;

    for (label, point) in [("origin", req.origin), ("destination", req.destination)] {
        if !point.is_valid() {
            return Err(api_error(AppError::InvalidCoordinate(format!(
                "{label} ({}, {}) is outside latitude [-90, 90] / longitude [-180, 180]",
                point.lat, point.lon
            ))));
        }
    }

    tracing::info!(
        "Route request: {:?} -> {:?} priority={}",
        req.origin,
        req.destination,
        req.priority
    );

    let response = simulate_route(&req, &mut rand::rng());
    tracing::debug!("{}", response.estimate);
    Ok(Json(response))
}

/// Runs the simulator for one request and packages the chosen route.
pub fn simulate_route<R: Rng + ?Sized>(req: &RouteRequest, rng: &mut R) -> RouteResponse {
    let bundle = calculate_route(req.origin, req.destination, req.priority, rng);
    let chosen_route = bundle.chosen_route().clone();
    let quality_score = quality_score(&chosen_route, req.priority);
    let estimate = RouteEstimate::from(&chosen_route.summary);
    let (routes, chosen_index) = bundle.into_parts();

    RouteResponse {
        routes,
        chosen_index,
        chosen_route,
        priority: req.priority,
        quality_score,
        estimate,
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeQuery {
    address: String,
}

async fn geocode_handler(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> ApiResult<Json<GeocodeResponse>> {
    let Query(query) =
        query.map_err(|rejection| rejection_error(rejection.status(), rejection.body_text()))?;

    let location = state
        .geocoder
        .search(&query.address)
        .await
        .map_err(|err| api_error(err.into()))?;
    let in_city = location.is_in_city(state.geocoder.city());

    Ok(Json(GeocodeResponse { location, in_city }))
}

// Extractor failures keep axum's status but use the same JSON body as every
// other error.
fn rejection_error(status: StatusCode, message: String) -> (StatusCode, Json<ApiError>) {
    tracing::warn!("rejected request: {message}");
    (status, Json(ApiError { message }))
}

fn api_error(err: AppError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        AppError::InvalidCoordinate(_) => StatusCode::BAD_REQUEST,
        AppError::Geocode(GeocodeError::NotFound(_)) => StatusCode::NOT_FOUND,
        AppError::Geocode(_) => StatusCode::BAD_GATEWAY,
        AppError::Io(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("{err}");
    } else {
        tracing::warn!("{err}");
    }

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
