use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Histogram bucket boundaries for GitHub round-trip latency (seconds).
const LATENCY_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 5.0, 10.0, 30.0, 60.0,
];

/// Thin handle around the global metrics recorder.
///
/// After `Metrics::install()` the `metrics` crate macros (`counter!`, `gauge!`,
/// `histogram!`) can be used anywhere in the codebase. The `PrometheusHandle`
/// is retained solely for rendering the `/metrics` endpoint.
#[derive(Clone)]
pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and register metric descriptions.
    ///
    /// Must be called **once** at startup before any `counter!` / `gauge!` /
    /// `histogram!` calls.
    pub fn install() -> Self {
        let handle = builder()
            .install_recorder()
            .expect("failed to install metrics recorder");
        describe();
        Self { handle }
    }

    /// Wrap an existing handle, e.g. from a recorder built for tests.
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Prometheus builder with the proxy's bucket layout.
pub fn builder() -> PrometheusBuilder {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("github_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .expect("valid matcher")
}

/// Describe all metrics (adds HELP / TYPE lines).
pub fn describe() {
    // github requests
    describe_counter!(
        "github_requests_total",
        Unit::Count,
        "GitHub API requests by simplified path, method, status and user agent"
    );
    describe_histogram!(
        "github_request_duration_seconds",
        Unit::Seconds,
        "GitHub API round-trip time by simplified path, method, status and user agent"
    );

    // rate limits
    describe_gauge!(
        "github_token_usage",
        Unit::Count,
        "Requests remaining in the current rate limit window, per resource"
    );
    describe_gauge!(
        "github_token_limit",
        Unit::Count,
        "Request limit of the current rate limit window, per resource"
    );
    describe_gauge!(
        "github_token_reset_seconds",
        Unit::Seconds,
        "Seconds until the rate limit window resets, per resource"
    );

    // path simplification
    describe_counter!(
        "ghproxy_unmatched_paths_total",
        Unit::Count,
        "Requests whose path is not covered by the GitHub API schema"
    );

    // connections
    describe_gauge!(
        "ghproxy_connections_active",
        Unit::Count,
        "Number of active downstream connections"
    );
    describe_counter!(
        "ghproxy_connections_total",
        Unit::Count,
        "Total connections accepted"
    );
}
