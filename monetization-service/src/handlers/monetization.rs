//! Creator-facing monetization request endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use service_core::error::AppError;

use crate::middleware::CurrentUser;
use crate::models::user::{is_eligible_for_monetization, MIN_TESTS_CREATED, MIN_UNIQUE_TAKERS};
use crate::models::MonetizationStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub message: String,
}

/// Apply for monetization.
///
/// Eligibility is re-validated server-side: the caller must have created at
/// least 100 tests with at least 1000 unique takers in total.
pub async fn apply(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApplyResponse>, AppError> {
    let account = state
        .repository
        .find_user(user.id())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    match account.monetization_status {
        MonetizationStatus::Requested => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "A monetization request is already pending"
            )));
        }
        MonetizationStatus::Approved => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Monetization is already approved"
            )));
        }
        MonetizationStatus::Rejected => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "A previous monetization request was rejected"
            )));
        }
        MonetizationStatus::None => {}
    }

    let (tests_created, total_unique_takers) = tokio::join!(
        state.repository.count_tests_created(user.id()),
        state.repository.total_unique_takers(user.id())
    );
    let tests_created = tests_created?;
    let total_unique_takers = total_unique_takers?;

    if !is_eligible_for_monetization(tests_created, total_unique_takers) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Not eligible: requires at least {} tests and {} unique takers (you have {} and {})",
            MIN_TESTS_CREATED,
            MIN_UNIQUE_TAKERS,
            tests_created,
            total_unique_takers
        )));
    }

    state
        .repository
        .set_monetization_status(user.id(), MonetizationStatus::Requested)
        .await?;

    tracing::info!(user_id = %user.id(), "Monetization requested");
    Ok(Json(ApplyResponse {
        message: "Monetization request submitted".to_string(),
    }))
}
