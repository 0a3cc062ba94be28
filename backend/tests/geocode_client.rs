use std::{collections::HashMap, sync::Arc};

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::Query,
    http::Request,
    routing::get,
};
use geo_route_sim::{
    AppState,
    config::ServerConfig,
    create_router,
    geocode::{GeocodeError, Geocoder, GeocoderConfig},
    models::{ApiError, GeocodeResponse},
};
use hyper::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Answers like Nominatim: one hit for queries mentioning "Bundaran", nothing
/// otherwise. Rejects requests missing the expected parameters and fails
/// with 500 for queries starting with "Banjir".
async fn fake_search(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if params.get("format").map(String::as_str) != Some("json")
        || params.get("addressdetails").map(String::as_str) != Some("1")
    {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad params"})));
    }

    let query = params.get("q").cloned().unwrap_or_default();
    if query.starts_with("Bundaran Besar") && query.ends_with(", Palangka Raya") {
        (
            StatusCode::OK,
            Json(json!([{
                "lat": "-2.2096",
                "lon": "113.9136",
                "display_name": "Bundaran Besar, Palangka Raya, Kalimantan Tengah",
                "address": {"city": "Palangka Raya", "state": "Kalimantan Tengah"}
            }])),
        )
    } else if query.starts_with("Banjir") {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "upstream unavailable"})),
        )
    } else if query.starts_with("Sampit") {
        (
            StatusCode::OK,
            Json(json!([{
                "lat": "-2.5333",
                "lon": "112.95",
                "address": {"town": "Sampit"}
            }])),
        )
    } else {
        (StatusCode::OK, Json(json!([])))
    }
}

async fn spawn_fake_nominatim() -> String {
    let app = Router::new().route("/search", get(fake_search));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/search")
}

async fn geocoder() -> Geocoder {
    let config = GeocoderConfig {
        base_url: spawn_fake_nominatim().await,
        ..GeocoderConfig::default()
    };
    Geocoder::new(config).unwrap()
}

#[tokio::test]
async fn search_returns_first_match() {
    let geocoder = geocoder().await;

    let location = geocoder.search("Bundaran Besar").await.unwrap();
    assert_eq!(location.point.lat, -2.2096);
    assert_eq!(location.point.lon, 113.9136);
    assert!(location.is_in_city(geocoder.city()));
}

#[tokio::test]
async fn empty_result_is_not_found() {
    let geocoder = geocoder().await;

    let err = geocoder.search("Nowhere").await.unwrap_err();
    assert!(matches!(err, GeocodeError::NotFound(ref address) if address == "Nowhere"));
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    let config = GeocoderConfig {
        base_url: "http://127.0.0.1:9/search".to_string(),
        ..GeocoderConfig::default()
    };
    let geocoder = Geocoder::new(config).unwrap();

    let err = geocoder.search("Bundaran Besar").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Request(_)));
}

#[tokio::test]
async fn upstream_server_error_is_a_request_error() {
    let geocoder = geocoder().await;

    let err = geocoder.search("Banjir").await.unwrap_err();
    match err {
        GeocodeError::Request(inner) => {
            assert_eq!(inner.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        }
        other => panic!("expected a request error, got {other:?}"),
    }
}

async fn app_with_fake_geocoder() -> Router {
    let geocoder = geocoder().await;
    let state = AppState {
        config: Arc::new(ServerConfig::default()),
        geocoder: Arc::new(geocoder),
    };
    create_router(state)
}

#[tokio::test]
async fn geocode_endpoint_reports_city_membership() {
    let app = app_with_fake_geocoder().await;

    let request = Request::builder()
        .uri("/api/geocode?address=Sampit")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: GeocodeResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.location.address.town.as_deref(), Some("Sampit"));
    assert!(!body.in_city);
}

#[tokio::test]
async fn geocode_endpoint_maps_not_found() {
    let app = app_with_fake_geocoder().await;

    let request = Request::builder()
        .uri("/api/geocode?address=Nowhere")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(body.message.contains("Nowhere"));
}

#[tokio::test]
async fn geocode_endpoint_maps_upstream_failure_to_bad_gateway() {
    let app = app_with_fake_geocoder().await;

    let request = Request::builder()
        .uri("/api/geocode?address=Banjir")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(body.message.contains("geocoding request failed"));
}

#[tokio::test]
async fn geocode_endpoint_requires_address() {
    let app = app_with_fake_geocoder().await;

    let request = Request::builder()
        .uri("/api/geocode")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(body.message.contains("address"));
}
