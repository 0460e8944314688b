//! Route configuration and setup

use crate::api_doc::openapi_json;
use crate::handlers;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use parcel_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.server.max_request_body_bytes;

    // CorsLayer answers every OPTIONS request itself, so the upload route
    // keeps its own OPTIONS handler outside the layer.
    let upload_routes = Router::new().route(
        "/upload",
        post(handlers::upload::upload_files)
            .layer(cors.clone())
            .options(handlers::upload::upload_options),
    );

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/store", get(handlers::store::store_status))
        .route("/api/openapi.json", get(openapi_json))
        .layer(cors);

    let app = api_routes
        .merge(upload_routes)
        // Replaces axum's 2MB default. Overflow surfaces as a multipart error,
        // which renders as a JSON 413.
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("CORS_ORIGINS contains an invalid origin")?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
