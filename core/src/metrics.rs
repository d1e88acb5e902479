//! Prometheus-backed request metrics

use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::traits::MetricsRecorder;

/// Name of the request counter
pub const REQUESTS_TOTAL: &str = "loadgen_requests_total";

/// Name of the request duration histogram
pub const REQUEST_DURATION_SECONDS: &str = "loadgen_request_duration_seconds";

/// Request counter and duration histogram registered in a private registry
///
/// Cloning is cheap and clones share the same underlying collectors.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl PrometheusMetrics {
    /// Create and register the collectors
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                REQUESTS_TOTAL,
                "Total number of requests made by the load generator",
            ),
            &["url", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION_SECONDS, "Histogram of request durations"),
            &["url"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
        })
    }

    /// The registry the collectors live in
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current value of the request counter for a label pair
    pub fn requests(&self, url: &str, status: &str) -> u64 {
        self.requests_total.with_label_values(&[url, status]).get()
    }

    /// Number of durations observed for a url
    pub fn duration_samples(&self, url: &str) -> u64 {
        self.request_duration
            .with_label_values(&[url])
            .get_sample_count()
    }

    /// Render every metric in the Prometheus text exposition format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        encode_registry(&self.registry)
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn increment_requests(&self, url: &str, status: &str) {
        self.requests_total.with_label_values(&[url, status]).inc();
    }

    fn observe_duration(&self, url: &str, elapsed: Duration) {
        self.request_duration
            .with_label_values(&[url])
            .observe(elapsed.as_secs_f64());
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("families", &self.registry.gather().len())
            .finish()
    }
}

/// Render a registry in the Prometheus text exposition format
pub fn encode_registry(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_url_and_status() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.increment_requests("http://h/a", "200");
        metrics.increment_requests("http://h/a", "200");
        metrics.increment_requests("http://h/a", "error");
        metrics.increment_requests("http://h/b", "503");

        assert_eq!(metrics.requests("http://h/a", "200"), 2);
        assert_eq!(metrics.requests("http://h/a", "error"), 1);
        assert_eq!(metrics.requests("http://h/b", "503"), 1);
        assert_eq!(metrics.requests("http://h/b", "200"), 0);
    }

    #[test]
    fn test_observe_duration() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.observe_duration("http://h/a", Duration::from_millis(120));
        metrics.observe_duration("http://h/a", Duration::from_millis(30));

        assert_eq!(metrics.duration_samples("http://h/a"), 2);
        assert_eq!(metrics.duration_samples("http://h/b"), 0);
    }

    #[test]
    fn test_encode_exposition() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.increment_requests("http://h/a", "200");
        metrics.observe_duration("http://h/a", Duration::from_millis(5));

        let text = metrics.encode().unwrap();
        assert!(text.contains("# TYPE loadgen_requests_total counter"));
        assert!(text.contains(r#"loadgen_requests_total{status="200",url="http://h/a"} 1"#));
        assert!(text.contains("loadgen_request_duration_seconds_bucket"));
    }

    #[test]
    fn test_clones_share_collectors() {
        let metrics = PrometheusMetrics::new().unwrap();
        let clone = metrics.clone();
        clone.increment_requests("http://h/a", "error");
        assert_eq!(metrics.requests("http://h/a", "error"), 1);
    }
}
