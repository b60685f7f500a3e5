//! Live test lifecycle and winner settlement arithmetic.

use mongodb::bson::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of the collected pot that is disbursed as prizes.
pub fn prize_pool_share() -> Decimal {
    Decimal::new(8, 1) // 0.8
}

/// Prize split across ranks 1-3.
pub fn prize_splits() -> [Decimal; 3] {
    [
        Decimal::new(5, 1), // 0.5
        Decimal::new(3, 1), // 0.3
        Decimal::new(2, 1), // 0.2
    ]
}

/// Live test lifecycle: `scheduled -> live -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveTestStatus {
    Scheduled,
    Live,
    Completed,
}

/// A scheduled live event over an existing test. The pot accumulates entry
/// fees as participants join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveTest {
    #[serde(rename = "_id")]
    pub id: String,
    pub source_test_id: String,
    pub title: String,
    pub status: LiveTestStatus,
    pub entry_fee: Decimal,
    pub pot: Decimal,
    #[serde(default)]
    pub participants: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// One participant's result for a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub user_id: String,
    pub test_id: String,
    pub score: i64,
    pub total_time_taken: i64,
}

/// A settled prize, keyed by `(user_id, live_test_id)` so re-running
/// settlement overwrites instead of duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Winning {
    pub user_id: String,
    pub live_test_id: String,
    pub rank: u32,
    pub amount: Decimal,
    pub settled_at: DateTime,
}

/// Rank results by score (descending), breaking ties on faster completion.
pub fn rank_results(mut results: Vec<TestResult>) -> Vec<TestResult> {
    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.total_time_taken.cmp(&b.total_time_taken))
    });
    results
}

/// Compute the disbursable pool (80% of the pot) and the 50/30/20 prize
/// amounts for ranks 1-3.
pub fn prize_breakdown(pot: Decimal) -> (Decimal, [Decimal; 3]) {
    let pool = pot * prize_pool_share();
    let splits = prize_splits();
    (pool, [pool * splits[0], pool * splits[1], pool * splits[2]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn result(user_id: &str, score: i64, total_time_taken: i64) -> TestResult {
        TestResult {
            user_id: user_id.to_string(),
            test_id: "test_1".to_string(),
            score,
            total_time_taken,
        }
    }

    #[test]
    fn test_ranking_orders_by_score_descending() {
        let ranked = rank_results(vec![
            result("a", 70, 100),
            result("b", 90, 100),
            result("c", 80, 100),
        ]);
        let order: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ranking_breaks_ties_on_faster_completion() {
        let ranked = rank_results(vec![
            result("slow", 90, 1200),
            result("fast", 90, 800),
            result("mid", 90, 1000),
        ]);
        let order: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["fast", "mid", "slow"]);
    }

    #[test]
    fn test_prize_breakdown_splits_fifty_thirty_twenty() {
        // A 1250 pot yields a 1000 pool split 500/300/200.
        let (pool, amounts) = prize_breakdown(dec("1250"));
        assert_eq!(pool, dec("1000"));
        assert_eq!(amounts[0], dec("500"));
        assert_eq!(amounts[1], dec("300"));
        assert_eq!(amounts[2], dec("200"));
    }

    #[test]
    fn test_prize_amounts_sum_to_pool() {
        let (pool, amounts) = prize_breakdown(dec("777.77"));
        assert_eq!(amounts[0] + amounts[1] + amounts[2], pool);
    }
}
