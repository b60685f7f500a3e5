//! Application startup and lifecycle management.

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::services::{
    EarningsCalculator, LiveTestSettlement, MonetizationRepository, RazorpayClient, TokenVerifier,
};
use crate::AppState;

/// Application container for managing server lifecycle.
pub struct Application {
    host: String,
    port: u16,
    router: Router,
}

fn bind_address(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        // Connect to MongoDB
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::DatabaseError(e.into())
            })?;
        client_options.app_name = Some("monetization-service".to_string());

        let client = Client::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(e.into())
        })?;
        let db = client.database(&config.database.db_name);

        let repository = MonetizationRepository::new(client, &db);
        repository.init_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {:?}", e);
            e
        })?;

        let earnings = EarningsCalculator::new(repository.clone());
        let settlement = LiveTestSettlement::new(repository.clone());

        let razorpay = RazorpayClient::new(config.razorpay.clone());
        if razorpay.is_configured() {
            tracing::info!("Razorpay client initialized");
        } else {
            tracing::warn!(
                "Razorpay credentials not configured - live-test entry payments will be limited"
            );
        }

        let verifier = TokenVerifier::from_config(&config.auth)
            .map_err(AppError::ConfigError)?;

        let state = AppState {
            db,
            config: config.clone(),
            repository,
            earnings,
            settlement,
            razorpay,
            verifier,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            // Engagement tracking
            .route(
                "/api/tests/:test_id/impressions",
                post(handlers::analytics::record_impression),
            )
            .route(
                "/api/tests/:test_id/submissions",
                post(handlers::analytics::record_submission),
            )
            // Creator monetization
            .route(
                "/api/monetization/apply",
                post(handlers::monetization::apply),
            )
            // Live tests
            .route(
                "/api/live-tests/:id/order",
                post(handlers::live_tests::create_entry_order),
            )
            .route("/api/live-tests/:id/join", post(handlers::live_tests::join))
            // Admin workflows
            .route(
                "/api/admin/calculate-earnings",
                post(handlers::admin::calculate_earnings),
            )
            .route(
                "/api/admin/record-payout",
                post(handlers::admin::record_payout),
            )
            .route(
                "/api/admin/handle-monetization-request",
                post(handlers::admin::handle_monetization_request),
            )
            .route(
                "/api/admin/live-tests/calculate-winners",
                post(handlers::admin::calculate_winners),
            )
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                }),
            )
            .with_state(state);

        Ok(Self {
            host: config.server.host.clone(),
            port: config.server.port,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        let addr = bind_address(&self.host, self.port);
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
