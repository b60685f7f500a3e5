//! Live-test entry endpoints: entry-fee order creation and paid join.

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::middleware::CurrentUser;
use crate::services::razorpay::PaymentVerification;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EntryOrderResponse {
    /// Razorpay order ID (use this in frontend checkout).
    pub razorpay_order_id: String,
    /// Entry fee in the smallest currency unit (paise).
    pub amount: u64,
    pub currency: String,
    /// Razorpay key ID (for frontend initialization).
    pub razorpay_key_id: String,
}

/// Create a Razorpay order for the live test's entry fee.
pub async fn create_entry_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(live_test_id): Path<String>,
) -> Result<Json<EntryOrderResponse>, AppError> {
    let live_test = state
        .repository
        .find_live_test(&live_test_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Live test not found")))?;

    // Entry fee is stored in rupees; Razorpay wants paise.
    let amount_paise = (live_test.entry_fee * rust_decimal::Decimal::from(100))
        .to_u64()
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Invalid entry fee")))?;

    let receipt = format!("live_{}_{}", live_test_id, user.id());
    let order = state
        .razorpay
        .create_order(amount_paise, "INR", Some(receipt))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create Razorpay order");
            AppError::InternalError(anyhow::anyhow!("Failed to create payment order"))
        })?;

    Ok(Json(EntryOrderResponse {
        razorpay_order_id: order.id,
        amount: amount_paise,
        currency: "INR".to_string(),
        razorpay_key_id: state.razorpay.key_id().to_string(),
    }))
}

/// Request to join a live test after paying the entry fee.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinLiveTestRequest {
    #[validate(length(min = 1))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1))]
    pub razorpay_signature: String,
}

#[derive(Debug, Serialize)]
pub struct JoinLiveTestResponse {
    pub message: String,
}

/// Join a live test. The Razorpay checkout signature is verified before the
/// participant is registered and their entry fee added to the pot.
pub async fn join(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(live_test_id): Path<String>,
    Json(payload): Json<JoinLiveTestRequest>,
) -> Result<Json<JoinLiveTestResponse>, AppError> {
    payload.validate()?;

    let verification = PaymentVerification {
        razorpay_order_id: payload.razorpay_order_id,
        razorpay_payment_id: payload.razorpay_payment_id,
        razorpay_signature: payload.razorpay_signature,
    };

    let is_valid = state
        .razorpay
        .verify_payment_signature(&verification)
        .map_err(|e| {
            tracing::error!(error = %e, "Signature verification error");
            AppError::InternalError(anyhow::anyhow!("Signature verification failed"))
        })?;

    if !is_valid {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Payment signature verification failed"
        )));
    }

    state.repository.join_live_test(&live_test_id, user.id()).await?;

    tracing::info!(live_test_id = %live_test_id, user_id = %user.id(), "Live test joined");
    Ok(Json(JoinLiveTestResponse {
        message: "Joined live test".to_string(),
    }))
}
