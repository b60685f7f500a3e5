//! Per-test engagement counters.

use serde::{Deserialize, Serialize};

/// One document per test. `impression_count` only increases and
/// `unique_takers` only grows; there is no removal path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAnalytics {
    #[serde(rename = "_id")]
    pub test_id: String,
    pub created_by: String,
    #[serde(default)]
    pub impression_count: i64,
    #[serde(default)]
    pub unique_takers: Vec<String>,
}

impl TestAnalytics {
    /// Distinct takers for this test, counted at most once regardless of
    /// retake count.
    pub fn unique_taker_count(&self) -> u64 {
        self.unique_takers.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_taker_count() {
        let analytics = TestAnalytics {
            test_id: "test_1".to_string(),
            created_by: "user_1".to_string(),
            impression_count: 42,
            unique_takers: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        assert_eq!(analytics.unique_taker_count(), 3);
    }
}
