use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::time::Instant;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::handlers;
use crate::metrics;
use crate::state::AppState;

pub fn form_routes() -> Router<AppState> {
    Router::new().route("/ajax", post(handlers::submit))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(handlers::metrics_endpoint))
}

/// CORS for the configured origins; any origin when none are configured.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(form_routes())
        .merge(health_routes())
        .merge(observability_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(cors_layer(config))
        .with_state(state)
}

async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();
    metrics::HTTP_IN_FLIGHT.inc();

    let response = next.run(req).await;

    metrics::HTTP_IN_FLIGHT.dec();
    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::observe_http(
        method.as_str(),
        metrics::path_label(uri.path()),
        status,
        elapsed.as_secs_f64(),
    );

    tracing::info!("{method} {uri} {status} {}ms", elapsed.as_millis());

    response
}
