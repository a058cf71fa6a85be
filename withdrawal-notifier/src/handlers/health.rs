use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::services::get_metrics;
use crate::startup::AppState;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "withdrawal-notifier",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the user directory must answer and the push provider must
/// be configured.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state
        .notifier
        .directory()
        .health_check()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "User directory not ready");
            AppError::ServiceUnavailable
        })?;

    state.push_provider.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Push provider not ready");
        AppError::ServiceUnavailable
    })?;

    Ok(StatusCode::OK)
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
