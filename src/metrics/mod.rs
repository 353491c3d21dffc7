use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("history_fetch_time".to_string()),
            EXPONENTIAL_SECONDS,
        )?
        .install_recorder()
}

#[derive(Clone)]
pub struct Metrics {
    pub prometheus_handle: PrometheusHandle,
}

impl Metrics {
    pub fn new(prometheus_handle: PrometheusHandle) -> Self {
        Self { prometheus_handle }
    }

    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }
}

// The recorders below are no-ops until `setup_metrics_recorder` has run, so
// library code and tests can call them unconditionally.

pub fn record_transaction_submitted() {
    metrics::increment_counter!("transactions_submitted_total");
}

pub fn record_transaction_failed() {
    metrics::increment_counter!("transaction_submission_failures_total");
}

/// Records one explorer round trip and whether it fell back to local data.
pub fn record_history_fetch(duration: Duration, fell_back: bool) {
    metrics::increment_counter!("history_fetches_total");
    if fell_back {
        metrics::increment_counter!("history_fetch_fallbacks_total");
    }
    metrics::histogram!("history_fetch_time", duration.as_secs_f64());
}

pub fn record_history_size(records: usize) {
    metrics::gauge!("history_records", records as f64);
}
