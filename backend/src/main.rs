use std::sync::Arc;

use geo_route_sim::{AppState, config::ServerConfig, create_router, geocode::Geocoder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geo_route_sim=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        "serving {} files from {}",
        config.geojson_extension,
        config.geojson_dir.display()
    );
    if !config.geojson_dir.is_dir() {
        tracing::warn!(
            "GeoJSON directory {} does not exist yet; listings will fail until it does",
            config.geojson_dir.display()
        );
    }

    let geocoder = Geocoder::new(config.geocoder.clone())?;
    tracing::info!(
        "geocoding via {} scoped to {}",
        config.geocoder.base_url,
        geocoder.city()
    );

    let addr = config.bind_addr;
    let state = AppState {
        config: Arc::new(config),
        geocoder: Arc::new(geocoder),
    };
    let app = create_router(state);

    tracing::info!("starting server on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
