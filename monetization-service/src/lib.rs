pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use services::{
    EarningsCalculator, LiveTestSettlement, MonetizationRepository, RazorpayClient, TokenVerifier,
};

pub use startup::Application;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: config::Config,
    pub repository: MonetizationRepository,
    pub earnings: EarningsCalculator,
    pub settlement: LiveTestSettlement,
    pub razorpay: RazorpayClient,
    pub verifier: TokenVerifier,
}
