use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use shared::{RawInput, ResponseEnvelope};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Form submission endpoint. Every outcome, including an undecodable body,
/// is answered with 200 and an envelope.
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Json<ResponseEnvelope> {
    let raw = match form {
        Ok(Form(values)) => RawInput::from(values),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Could not decode form submission");
            return Json(state.dispatcher.error_envelope());
        }
    };

    Json(state.dispatcher.dispatch(raw.get("action"), &raw).await)
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    let now = chrono::Utc::now().to_rfc3339();

    tracing::debug!(uptime_secs = uptime, "health check passed");
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": now,
            "uptime_secs": uptime
        })),
    )
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let families = state.registry.gather();
    let mut buf = Vec::new();
    TextEncoder::new().encode(&families, &mut buf)?;
    let body = String::from_utf8(buf)
        .map_err(|e| ApiError::internal(format!("Metrics output is not UTF-8: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    ))
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("RouteNotFound", "Route not found")
}
