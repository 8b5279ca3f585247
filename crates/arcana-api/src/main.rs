//! Arcana API server entry point.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use arcana_api::error::AppError;
use arcana_api::routes;
use arcana_api::state::AppState;
use arcana_core::clock::{Clock, SystemClock};
use arcana_core::rng::{DeterministicRng, ThreadRng};
use arcana_reading::{AdGateway, HttpReadingService, ReadingService, UnavailableAdGateway};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Arcana API server");

    // Read configuration from environment.
    let reading_api_url = std::env::var("READING_API_BASE_URL").map_err(|_| {
        AppError::Config("READING_API_BASE_URL environment variable must be set".to_owned())
    })?;
    let reading_api_token = std::env::var("READING_API_TOKEN").ok();
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

    // Wire production collaborators.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(ThreadRng));
    let mut service = HttpReadingService::new(reading_api_url);
    if let Some(token) = reading_api_token {
        service = service.with_token(token);
    }
    let reading_service: Arc<dyn ReadingService> = Arc::new(service);
    // No ad SDK is wired server-side; the gateway reports unavailable.
    let ads: Arc<dyn AdGateway> = Arc::new(UnavailableAdGateway);

    let app_state = AppState::new(clock, rng, reading_service, ads);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/layouts", routes::layouts::router())
        .nest(
            "/api/v1/sessions",
            routes::sessions::router().merge(routes::readings::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
