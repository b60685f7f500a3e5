//! Live-test winner settlement.

use crate::models::live_test::{prize_breakdown, rank_results};
use crate::models::Winning;
use crate::services::metrics::record_settlement;
use crate::services::MonetizationRepository;
use mongodb::bson::DateTime;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::instrument;

/// Outcome of settling one live test.
#[derive(Debug)]
pub struct SettlementOutcome {
    pub prize_pool: Decimal,
    pub winners: Vec<Winning>,
}

#[derive(Clone)]
pub struct LiveTestSettlement {
    repository: MonetizationRepository,
}

impl LiveTestSettlement {
    pub fn new(repository: MonetizationRepository) -> Self {
        Self { repository }
    }

    /// Rank all results for the live test's source test, split 80% of the pot
    /// 50/30/20 across the top three, and persist the winnings.
    ///
    /// Settlement is idempotent: winnings are keyed by
    /// `(user_id, live_test_id)`, so a second run overwrites rather than
    /// duplicates.
    #[instrument(skip(self), fields(live_test_id = %live_test_id))]
    pub async fn settle(&self, live_test_id: &str) -> Result<SettlementOutcome, AppError> {
        let live_test = self
            .repository
            .find_live_test(live_test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Live test not found")))?;

        let results = self
            .repository
            .list_results(&live_test.source_test_id)
            .await?;
        let ranked = rank_results(results);
        let (prize_pool, amounts) = prize_breakdown(live_test.pot);

        let settled_at = DateTime::now();
        let winners: Vec<Winning> = ranked
            .into_iter()
            .take(3)
            .zip(amounts)
            .enumerate()
            .map(|(index, (result, amount))| Winning {
                user_id: result.user_id,
                live_test_id: live_test_id.to_string(),
                rank: index as u32 + 1,
                amount,
                settled_at,
            })
            .collect();

        self.repository
            .settle_live_test(live_test_id, &winners)
            .await?;
        record_settlement();

        tracing::info!(
            live_test_id = %live_test_id,
            prize_pool = %prize_pool,
            winners = winners.len(),
            "Live test settled"
        );
        Ok(SettlementOutcome {
            prize_pool,
            winners,
        })
    }
}
