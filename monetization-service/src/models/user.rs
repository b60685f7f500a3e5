//! Platform account model and the monetization request state machine.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// Minimum number of published tests before a creator may request monetization.
pub const MIN_TESTS_CREATED: u64 = 100;

/// Minimum number of unique takers across all of a creator's tests.
pub const MIN_UNIQUE_TAKERS: u64 = 1000;

/// Account-level monetization state.
///
/// `none -> requested -> {approved | rejected}`. `rejected` is terminal;
/// re-opening a rejected account is a manual operation outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonetizationStatus {
    None,
    Requested,
    Approved,
    Rejected,
}

impl MonetizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Requested => "requested",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl Default for MonetizationStatus {
    fn default() -> Self {
        Self::None
    }
}

/// Admin decision on a pending monetization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonetizationDecision {
    Approved,
    Rejected,
}

impl MonetizationDecision {
    /// Parse a decision value from a request body. Anything outside
    /// `{approved, rejected}` is invalid.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn into_status(self) -> MonetizationStatus {
        match self {
            Self::Approved => MonetizationStatus::Approved,
            Self::Rejected => MonetizationStatus::Rejected,
        }
    }
}

/// Bank details required before a payout can be disbursed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
}

/// A platform account. Created externally on first sign-in; this service only
/// mutates `monetization_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub monetization_status: MonetizationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Server-side eligibility gate for `apply_for_monetization`.
pub fn is_eligible_for_monetization(tests_created: u64, total_unique_takers: u64) -> bool {
    tests_created >= MIN_TESTS_CREATED && total_unique_takers >= MIN_UNIQUE_TAKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parses_only_approved_and_rejected() {
        assert_eq!(
            MonetizationDecision::parse("approved"),
            Some(MonetizationDecision::Approved)
        );
        assert_eq!(
            MonetizationDecision::parse("rejected"),
            Some(MonetizationDecision::Rejected)
        );
        assert_eq!(MonetizationDecision::parse("pending"), None);
        assert_eq!(MonetizationDecision::parse("APPROVED"), None);
        assert_eq!(MonetizationDecision::parse(""), None);
    }

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(
            MonetizationDecision::Approved.into_status(),
            MonetizationStatus::Approved
        );
        assert_eq!(
            MonetizationDecision::Rejected.into_status(),
            MonetizationStatus::Rejected
        );
    }

    #[test]
    fn test_eligibility_requires_both_thresholds() {
        assert!(is_eligible_for_monetization(100, 1000));
        assert!(is_eligible_for_monetization(250, 5000));
        assert!(!is_eligible_for_monetization(99, 1000));
        assert!(!is_eligible_for_monetization(100, 999));
        assert!(!is_eligible_for_monetization(0, 0));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let status = serde_json::to_string(&MonetizationStatus::Requested).unwrap();
        assert_eq!(status, "\"requested\"");
        let parsed: MonetizationStatus = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, MonetizationStatus::None);
    }
}
