use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec, IntCounter,
    IntCounterVec, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    // Remote query metrics
    pub static ref QUERIES: IntCounterVec = register_int_counter_vec!(
        "apigee_queries_total",
        "Queries sent to the remote API, by kind and outcome",
        &["kind", "outcome"]
    ).unwrap();

    pub static ref QUERY_DURATION: HistogramVec = register_histogram_vec!(
        "apigee_query_duration_seconds",
        "Remote query duration in seconds",
        &["kind"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // Emission metrics
    pub static ref METRIC_SETS_EMITTED: IntCounter = register_int_counter!(
        "apigee_metric_sets_emitted_total",
        "Metric sets handed to the integration buffer"
    ).unwrap();

    pub static ref ORG_FAILURES: IntCounter = register_int_counter!(
        "apigee_org_failures_total",
        "Organizations whose collection stopped on an error"
    ).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Discovery,
    Stats,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Discovery => "discovery",
            QueryKind::Stats => "stats",
        }
    }
}

/// Observes query latency when dropped. Call [`QueryTimer::finish`] to also
/// count the outcome.
pub struct QueryTimer {
    kind: QueryKind,
    start: Instant,
}

impl QueryTimer {
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }

    pub fn finish(self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        QUERIES.with_label_values(&[self.kind.as_str(), outcome]).inc();
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        QUERY_DURATION
            .with_label_values(&[self.kind.as_str()])
            .observe(duration);
    }
}

pub fn record_metric_sets(count: usize) {
    METRIC_SETS_EMITTED.inc_by(count as u64);
}

pub fn record_org_failure() {
    ORG_FAILURES.inc();
}

/// Text exposition of every collector metric.
pub fn render() -> String {
    TextEncoder::new()
        .encode_to_string(&prometheus::gather())
        .unwrap_or_else(|e| format!("# failed to encode metrics: {}", e))
}
