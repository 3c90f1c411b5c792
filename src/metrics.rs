//! Prometheus metrics for API requests.
//!
//! This module provides:
//! - Request counts per endpoint and outcome
//! - Request latency per endpoint
//! - The optional Prometheus scrape endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::debug;

// === Metric Name Constants ===

/// Requests handled counter metric name.
pub const METRIC_API_REQUESTS: &str = "api_requests_total";
/// Request latency metric name.
pub const METRIC_API_REQUEST_LATENCY: &str = "api_request_latency_ms";

/// Request served with a success envelope.
pub const OUTCOME_OK: &str = "ok";
/// Request refused by the method or key check.
pub const OUTCOME_REJECTED: &str = "rejected";
/// Container runtime query failed.
pub const OUTCOME_RUNTIME_ERROR: &str = "runtime_error";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_API_REQUESTS,
        "Total number of API requests by endpoint and outcome"
    );
    describe_histogram!(
        METRIC_API_REQUEST_LATENCY,
        "API request latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and serve it on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Record a handled request.
pub fn record_request(endpoint: &'static str, outcome: &'static str, start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    counter!(METRIC_API_REQUESTS, "endpoint" => endpoint, "outcome" => outcome).increment(1);
    histogram!(METRIC_API_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Metrics recorded while `f` ran, as `(name, labels, value)`.
#[cfg(test)]
pub(crate) fn capture<F: FnOnce()>(f: F) -> Vec<Recorded> {
    use metrics_util::debugging::DebuggingRecorder;

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    metrics::with_local_recorder(&recorder, f);

    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite, _, _, value)| {
            let key = composite.key();
            let labels = key
                .labels()
                .map(|label| (label.key().to_string(), label.value().to_string()))
                .collect();
            (key.name().to_string(), labels, value)
        })
        .collect()
}

/// One captured metric.
#[cfg(test)]
pub(crate) type Recorded = (
    String,
    Vec<(String, String)>,
    metrics_util::debugging::DebugValue,
);

/// Counter value for `name` carrying all of `labels`.
#[cfg(test)]
pub(crate) fn counter_value(recorded: &[Recorded], name: &str, labels: &[(&str, &str)]) -> Option<u64> {
    use metrics_util::debugging::DebugValue;

    recorded.iter().find_map(|(metric, metric_labels, value)| {
        let matches = metric == name
            && labels
                .iter()
                .all(|(k, v)| metric_labels.iter().any(|(mk, mv)| mk == k && mv == v));
        match value {
            DebugValue::Counter(count) if matches => Some(*count),
            _ => None,
        }
    })
}

/// Number of histogram samples for `name` with `endpoint`.
#[cfg(test)]
pub(crate) fn histogram_samples(recorded: &[Recorded], name: &str, endpoint: &str) -> usize {
    use metrics_util::debugging::DebugValue;

    recorded
        .iter()
        .filter(|(metric, labels, _)| {
            metric == name && labels.iter().any(|(k, v)| k == "endpoint" && v == endpoint)
        })
        .map(|(_, _, value)| match value {
            DebugValue::Histogram(samples) => samples.len(),
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_request_counts_by_endpoint_and_outcome() {
        let recorded = capture(|| {
            init_metrics();
            record_request("images", OUTCOME_OK, Instant::now());
            record_request("images", OUTCOME_OK, Instant::now());
            record_request("images", OUTCOME_REJECTED, Instant::now());
        });

        assert_eq!(
            counter_value(&recorded, METRIC_API_REQUESTS, &[("endpoint", "images"), ("outcome", OUTCOME_OK)]),
            Some(2)
        );
        assert_eq!(
            counter_value(&recorded, METRIC_API_REQUESTS, &[("endpoint", "images"), ("outcome", OUTCOME_REJECTED)]),
            Some(1)
        );
        assert_eq!(
            counter_value(&recorded, METRIC_API_REQUESTS, &[("outcome", OUTCOME_RUNTIME_ERROR)]),
            None
        );
        assert_eq!(histogram_samples(&recorded, METRIC_API_REQUEST_LATENCY, "images"), 3);
    }
}
