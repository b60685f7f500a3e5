pub mod analytics;
pub mod earnings;
pub mod live_test;
pub mod test;
pub mod user;

pub use analytics::TestAnalytics;
pub use earnings::{Earnings, EarningsBreakdown, EarningsUpdate, PayoutRecord};
pub use live_test::{LiveTest, LiveTestStatus, TestResult, Winning};
pub use test::{MockTest, TestReviewStatus};
pub use user::{BankDetails, MonetizationDecision, MonetizationStatus, User};
