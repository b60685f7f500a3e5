use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounter, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static EARNINGS_RUNS_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static PAYOUTS_RECORDED_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static IMPRESSIONS_TRACKED_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static LIVE_TEST_SETTLEMENTS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }

    // Initialize Prometheus registry for custom metrics
    let registry = Registry::new();

    let earnings_runs = IntCounter::with_opts(Opts::new(
        "earnings_recalculations_total",
        "Total earnings calculator runs",
    ))
    .expect("Failed to create earnings_recalculations_total metric");

    let payouts = IntCounter::with_opts(Opts::new(
        "payouts_recorded_total",
        "Total payouts recorded by admins",
    ))
    .expect("Failed to create payouts_recorded_total metric");

    let impressions = IntCounter::with_opts(Opts::new(
        "impressions_tracked_total",
        "Total test impressions tracked",
    ))
    .expect("Failed to create impressions_tracked_total metric");

    let settlements = IntCounter::with_opts(Opts::new(
        "live_test_settlements_total",
        "Total live-test winner settlements",
    ))
    .expect("Failed to create live_test_settlements_total metric");

    registry
        .register(Box::new(earnings_runs.clone()))
        .expect("Failed to register earnings_recalculations_total");
    registry
        .register(Box::new(payouts.clone()))
        .expect("Failed to register payouts_recorded_total");
    registry
        .register(Box::new(impressions.clone()))
        .expect("Failed to register impressions_tracked_total");
    registry
        .register(Box::new(settlements.clone()))
        .expect("Failed to register live_test_settlements_total");

    PROMETHEUS_REGISTRY
        .set(registry)
        .expect("Failed to set prometheus registry");
    EARNINGS_RUNS_TOTAL
        .set(earnings_runs)
        .expect("Failed to set earnings_recalculations_total");
    PAYOUTS_RECORDED_TOTAL
        .set(payouts)
        .expect("Failed to set payouts_recorded_total");
    IMPRESSIONS_TRACKED_TOTAL
        .set(impressions)
        .expect("Failed to set impressions_tracked_total");
    LIVE_TEST_SETTLEMENTS_TOTAL
        .set(settlements)
        .expect("Failed to set live_test_settlements_total");
}

pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    // Append custom prometheus metrics
    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

pub fn record_earnings_run() {
    if let Some(counter) = EARNINGS_RUNS_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_payout() {
    if let Some(counter) = PAYOUTS_RECORDED_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_impression() {
    if let Some(counter) = IMPRESSIONS_TRACKED_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_settlement() {
    if let Some(counter) = LIVE_TEST_SETTLEMENTS_TOTAL.get() {
        counter.inc();
    }
}
