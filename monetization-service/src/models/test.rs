//! Mock-test definition, referenced for ownership and eligibility checks.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// Per-test review state. Deliberately a separate type from the account-level
/// [`super::MonetizationStatus`]: they are distinct state machines that happen
/// to share a field name upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestReviewStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockTest {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub created_by: String,
    pub question_count: i64,
    pub review_status: TestReviewStatus,
    pub created_at: DateTime,
}
