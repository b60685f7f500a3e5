//! Creator earnings ledger: derived amounts, payout history and the
//! recompute/payout arithmetic.

use mongodb::bson::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

/// Reward credited per unique taker, in rupees.
pub fn reward_per_unique_taker() -> Decimal {
    Decimal::from(2)
}

/// Platform fee rate applied to gross earnings.
pub fn fee_rate() -> Decimal {
    Decimal::new(2, 1) // 0.2
}

/// One disbursement, appended to `payment_history` by the payout recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub amount: Decimal,
    pub paid_at: DateTime,
    pub transaction_id: String,
}

impl PayoutRecord {
    /// Build a history entry. A missing transaction id marks the payout as a
    /// manual disbursement.
    pub fn new(amount: Decimal, transaction_id: Option<String>) -> Self {
        let paid_at = DateTime::now();
        let transaction_id = transaction_id
            .unwrap_or_else(|| format!("manual_{}", paid_at.timestamp_millis()));
        Self {
            amount,
            paid_at,
            transaction_id,
        }
    }
}

/// The per-creator financial ledger document.
///
/// `total_earnings`, `platform_fees`, `net_earnings` and `pending_amount` are
/// derived and fully recomputed each calculator cycle; `paid_amount` and
/// `payment_history` are owned by the payout recorder and never touched by
/// the recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Earnings {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub total_earnings: Decimal,
    pub platform_fees: Decimal,
    pub net_earnings: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    #[serde(default)]
    pub payment_history: Vec<PayoutRecord>,
    pub updated_at: DateTime,
}

impl Earnings {
    /// Resolve a ledger lookup for payout. A creator with no earnings
    /// document has never been through a calculator run and cannot be paid;
    /// the payout must fail before any write is attempted.
    pub fn require_existing(found: Option<Self>, user_id: &str) -> Result<Self, AppError> {
        found.ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!(
                "No earnings document yet for user {}",
                user_id
            ))
        })
    }

    /// Apply a disbursement: `paid += amount`, `pending = max(0, pending - amount)`.
    ///
    /// Over-payment is allowed and clamps pending to zero; the excess is
    /// absorbed silently (manual-correction slack).
    pub fn apply_payout(
        &self,
        amount: Decimal,
        transaction_id: Option<String>,
    ) -> (Decimal, Decimal, PayoutRecord) {
        let new_paid = self.paid_amount + amount;
        let new_pending = (self.pending_amount - amount).max(Decimal::ZERO);
        (new_paid, new_pending, PayoutRecord::new(amount, transaction_id))
    }
}

/// Derived amounts for one creator, recomputed from scratch each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarningsBreakdown {
    pub total_earnings: Decimal,
    pub platform_fees: Decimal,
    pub net_earnings: Decimal,
    pub pending_amount: Decimal,
}

impl EarningsBreakdown {
    /// Full recompute from the creator's unique-taker total and the already
    /// disbursed amount. Recomputing (rather than incrementing) avoids drift
    /// from missed updates.
    pub fn recompute(total_unique_takers: u64, paid_amount: Decimal) -> Self {
        let total_earnings = Decimal::from(total_unique_takers) * reward_per_unique_taker();
        let platform_fees = total_earnings * fee_rate();
        let net_earnings = total_earnings - platform_fees;
        let pending_amount = (net_earnings - paid_amount).max(Decimal::ZERO);
        Self {
            total_earnings,
            platform_fees,
            net_earnings,
            pending_amount,
        }
    }
}

/// One creator's pending ledger write, staged by the calculator and committed
/// in a single multi-document transaction.
#[derive(Debug, Clone)]
pub struct EarningsUpdate {
    pub user_id: String,
    pub breakdown: EarningsBreakdown,
}
