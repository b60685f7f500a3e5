//! Earnings calculator: admin-triggered batch recompute of every approved
//! creator's ledger.

use crate::models::{EarningsBreakdown, EarningsUpdate};
use crate::services::metrics::record_earnings_run;
use crate::services::MonetizationRepository;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::instrument;

/// Outcome of one calculator run.
#[derive(Debug)]
pub struct EarningsRunSummary {
    pub creators_processed: usize,
}

#[derive(Clone)]
pub struct EarningsCalculator {
    repository: MonetizationRepository,
}

impl EarningsCalculator {
    pub fn new(repository: MonetizationRepository) -> Self {
        Self { repository }
    }

    /// Recompute every approved creator's ledger from scratch.
    ///
    /// All reads happen before the single batch commit, so a failed read
    /// aborts the whole run with no partial write. Derived amounts are
    /// recomputed rather than incremented to avoid drift from missed
    /// aggregator updates; `paid_amount` is carried over untouched.
    #[instrument(skip(self))]
    pub async fn recalculate(&self) -> Result<EarningsRunSummary, AppError> {
        let creators = self.repository.list_approved_creators().await?;
        tracing::info!(creators = creators.len(), "Starting earnings recalculation");

        let mut updates = Vec::with_capacity(creators.len());
        for creator in &creators {
            let total_unique_takers = self.repository.total_unique_takers(&creator.id).await?;
            let paid_amount = self
                .repository
                .get_earnings(&creator.id)
                .await?
                .map(|e| e.paid_amount)
                .unwrap_or(Decimal::ZERO);

            let breakdown = EarningsBreakdown::recompute(total_unique_takers, paid_amount);
            tracing::debug!(
                user_id = %creator.id,
                total_unique_takers,
                net_earnings = %breakdown.net_earnings,
                pending_amount = %breakdown.pending_amount,
                "Creator earnings recomputed"
            );
            updates.push(EarningsUpdate {
                user_id: creator.id.clone(),
                breakdown,
            });
        }

        self.repository.apply_earnings_updates(&updates).await?;
        record_earnings_run();

        tracing::info!(
            creators_processed = updates.len(),
            "Earnings recalculation committed"
        );
        Ok(EarningsRunSummary {
            creators_processed: updates.len(),
        })
    }
}
