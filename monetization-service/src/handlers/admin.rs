//! Admin endpoints: earnings recalculation, payout recording, monetization
//! decisions and live-test settlement.

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::middleware::CurrentUser;
use crate::models::{MonetizationDecision, MonetizationStatus};
use crate::services::metrics::record_payout as record_payout_metric;
use crate::AppState;

/// Response after an earnings calculator run.
#[derive(Debug, Serialize)]
pub struct CalculateEarningsResponse {
    pub message: String,
    pub creators_processed: usize,
}

/// Run the earnings calculator over every approved creator.
pub async fn calculate_earnings(
    State(state): State<AppState>,
    admin: CurrentUser,
) -> Result<Json<CalculateEarningsResponse>, AppError> {
    admin.require_admin()?;

    tracing::info!(admin = %admin.email(), "Earnings recalculation requested");
    let summary = state.earnings.recalculate().await?;

    Ok(Json(CalculateEarningsResponse {
        message: format!(
            "Earnings recalculated for {} creators",
            summary.creators_processed
        ),
        creators_processed: summary.creators_processed,
    }))
}

/// Request to record a disbursement against a creator's ledger.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPayoutRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub amount: Decimal,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordPayoutResponse {
    pub message: String,
    pub transaction_id: String,
}

/// Record a payout inside a single read-modify-write transaction.
pub async fn record_payout(
    State(state): State<AppState>,
    admin: CurrentUser,
    Json(payload): Json<RecordPayoutRequest>,
) -> Result<Json<RecordPayoutResponse>, AppError> {
    admin.require_admin()?;
    payload.validate()?;

    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Payout amount must be positive"
        )));
    }

    let record = state
        .repository
        .record_payout(&payload.user_id, payload.amount, payload.transaction_id)
        .await?;
    record_payout_metric();

    Ok(Json(RecordPayoutResponse {
        message: format!(
            "Payout of {} recorded for user {}",
            record.amount, payload.user_id
        ),
        transaction_id: record.transaction_id,
    }))
}

/// Admin decision on a pending monetization request.
#[derive(Debug, Deserialize, Validate)]
pub struct HandleMonetizationRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    pub decision: String,
}

#[derive(Debug, Serialize)]
pub struct HandleMonetizationResponse {
    pub message: String,
}

/// Approve or reject a creator's monetization request.
///
/// `requested -> approved` and `requested -> rejected` are the only
/// transitions exposed here; no side effects on the earnings ledger.
pub async fn handle_monetization_request(
    State(state): State<AppState>,
    admin: CurrentUser,
    Json(payload): Json<HandleMonetizationRequest>,
) -> Result<Json<HandleMonetizationResponse>, AppError> {
    admin.require_admin()?;
    payload.validate()?;

    let decision = MonetizationDecision::parse(&payload.decision).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Decision must be 'approved' or 'rejected'"
        ))
    })?;

    let user = state
        .repository
        .find_user(&payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    if user.monetization_status != MonetizationStatus::Requested {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "User has no pending monetization request (current status: {})",
            user.monetization_status.as_str()
        )));
    }

    let new_status = decision.into_status();
    state
        .repository
        .set_monetization_status(&payload.user_id, new_status)
        .await?;

    tracing::info!(
        admin = %admin.email(),
        user_id = %payload.user_id,
        decision = new_status.as_str(),
        "Monetization request decided"
    );

    Ok(Json(HandleMonetizationResponse {
        message: format!(
            "Monetization request for user {} {}",
            payload.user_id,
            new_status.as_str()
        ),
    }))
}

/// Request to settle a live test's winners.
#[derive(Debug, Deserialize, Validate)]
pub struct CalculateWinnersRequest {
    #[validate(length(min = 1))]
    pub live_test_id: String,
}

#[derive(Debug, Serialize)]
pub struct WinnerSummary {
    pub user_id: String,
    pub rank: u32,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CalculateWinnersResponse {
    pub message: String,
    pub prize_pool: Decimal,
    pub winners: Vec<WinnerSummary>,
}

/// Settle a live test: rank results, split the prize pool, persist winnings.
pub async fn calculate_winners(
    State(state): State<AppState>,
    admin: CurrentUser,
    Json(payload): Json<CalculateWinnersRequest>,
) -> Result<Json<CalculateWinnersResponse>, AppError> {
    admin.require_admin()?;
    payload.validate()?;

    tracing::info!(
        admin = %admin.email(),
        live_test_id = %payload.live_test_id,
        "Live test settlement requested"
    );
    let outcome = state.settlement.settle(&payload.live_test_id).await?;

    let winners: Vec<WinnerSummary> = outcome
        .winners
        .iter()
        .map(|w| WinnerSummary {
            user_id: w.user_id.clone(),
            rank: w.rank,
            amount: w.amount,
        })
        .collect();

    Ok(Json(CalculateWinnersResponse {
        message: format!(
            "Live test {} settled with {} winners",
            payload.live_test_id,
            winners.len()
        ),
        prize_pool: outcome.prize_pool,
        winners,
    }))
}
