//! Engagement tracking endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

use crate::middleware::CurrentUser;
use crate::services::metrics::record_impression as record_impression_metric;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub success: bool,
}

/// Best-effort impression tracking.
///
/// Tracking must never block the user-facing page, so failures are logged
/// and reported to the caller as success.
pub async fn record_impression(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Json<TrackResponse> {
    match state.repository.record_impression(&test_id).await {
        Ok(()) => record_impression_metric(),
        Err(err) => {
            tracing::warn!(test_id = %test_id, error = %err, "Impression tracking failed");
        }
    }
    Json(TrackResponse { success: true })
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub message: String,
}

/// Record a completed test attempt, adding the caller to the test's
/// unique-taker set.
pub async fn record_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(test_id): Path<String>,
) -> Result<Json<SubmissionResponse>, AppError> {
    state.repository.record_submission(&test_id, user.id()).await?;

    tracing::debug!(test_id = %test_id, user_id = %user.id(), "Submission recorded");
    Ok(Json(SubmissionResponse {
        message: "Submission recorded".to_string(),
    }))
}
