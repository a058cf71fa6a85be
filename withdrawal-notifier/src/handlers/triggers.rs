use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::models::WithdrawalRequest;
use crate::services::record_event;
use crate::startup::AppState;

/// Delivery of a `withdrawals/{requestId}` create event.
#[derive(Debug, Deserialize)]
pub struct WithdrawalCreatedEvent {
    #[serde(default)]
    pub value: Option<WithdrawalRequest>,
}

/// Delivery of a `withdrawals/{requestId}` update event.
#[derive(Debug, Deserialize)]
pub struct WithdrawalUpdatedEvent {
    #[serde(default)]
    pub before: Option<WithdrawalRequest>,
    #[serde(default)]
    pub after: Option<WithdrawalRequest>,
}

/// Always acknowledges with 204 so the trigger runtime never redelivers.
#[tracing::instrument(skip(state, event))]
pub async fn on_withdrawal_created(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(event): Json<WithdrawalCreatedEvent>,
) -> StatusCode {
    let outcome = state
        .notifier
        .notify_withdrawal_created(&request_id, event.value)
        .await;

    record_event("created", outcome.as_str());
    tracing::debug!(outcome = %outcome, "Created event handled");

    StatusCode::NO_CONTENT
}

#[tracing::instrument(skip(state, event))]
pub async fn on_withdrawal_updated(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Json(event): Json<WithdrawalUpdatedEvent>,
) -> StatusCode {
    let outcome = state
        .notifier
        .notify_withdrawal_updated(&request_id, event.before, event.after)
        .await;

    record_event("updated", outcome.as_str());
    tracing::debug!(outcome = %outcome, "Updated event handled");

    StatusCode::NO_CONTENT
}
