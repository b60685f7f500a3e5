pub mod auth;
pub mod earnings;
pub mod metrics;
pub mod razorpay;
pub mod repository;
pub mod settlement;

pub use auth::TokenVerifier;
pub use earnings::EarningsCalculator;
pub use metrics::{get_metrics, init_metrics};
pub use razorpay::RazorpayClient;
pub use repository::MonetizationRepository;
pub use settlement::LiveTestSettlement;
