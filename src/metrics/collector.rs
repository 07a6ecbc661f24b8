//! Per-request GitHub metrics.
//!
//! Every series that carries a request path uses the simplified template from
//! [`crate::ghpath`], never the raw path, except for paths the schema does not
//! cover. Those are passed through and reported with a warning.

use crate::ghpath::simplify_path;
use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Label used when a request carries no usable `User-Agent`.
pub const UNKNOWN_USER_AGENT: &str = "unknown";

/// Rate limit resource assumed when GitHub does not name one.
pub const DEFAULT_RATE_LIMIT_RESOURCE: &str = "core";

/// Metric label for a request path.
///
/// Unhandled paths fall back to the raw path so the data point is not lost,
/// and are logged so the schema gap can be fixed.
pub fn path_label(path: &str) -> String {
    let resolution = simplify_path(path);
    if !resolution.is_match() {
        tracing::warn!(path = %path, "path not handled by the GitHub schema");
        metrics::counter!("ghproxy_unmatched_paths_total").increment(1);
    }
    resolution.into_string()
}

/// Product token of a `User-Agent`, without its version.
///
/// `hook/v20200101-abc` becomes `hook`; a missing or blank header becomes
/// [`UNKNOWN_USER_AGENT`].
pub fn user_agent_label(user_agent: Option<&str>) -> String {
    user_agent
        .and_then(|ua| ua.split_whitespace().next())
        .and_then(|product| product.split('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_USER_AGENT)
        .to_string()
}

/// One completed GitHub round trip.
#[derive(Debug, Clone)]
pub struct RequestRecord<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub status: u16,
    pub user_agent: Option<&'a str>,
    pub duration: Duration,
}

pub fn record_request(record: &RequestRecord<'_>) {
    let mut buf = itoa::Buffer::new();
    let status = buf.format(record.status).to_owned();
    let path = path_label(record.path);
    let user_agent = user_agent_label(record.user_agent);

    metrics::counter!(
        "github_requests_total",
        "path" => path.clone(),
        "method" => record.method.to_owned(),
        "status" => status.clone(),
        "user_agent" => user_agent.clone(),
    )
    .increment(1);

    metrics::histogram!(
        "github_request_duration_seconds",
        "path" => path,
        "method" => record.method.to_owned(),
        "status" => status,
        "user_agent" => user_agent,
    )
    .record(record.duration.as_secs_f64());
}

/// Rate limit state reported by GitHub in response headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimit {
    pub resource: String,
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// Unix timestamp (seconds) at which the window resets.
    pub reset: Option<u64>,
}

impl RateLimit {
    /// Parse the `X-RateLimit-*` headers. Returns `None` when the response
    /// carries none of them.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_u64(headers, "x-ratelimit-limit");
        let remaining = header_u64(headers, "x-ratelimit-remaining");
        let reset = header_u64(headers, "x-ratelimit-reset");
        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }

        let resource = headers
            .get("x-ratelimit-resource")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_RATE_LIMIT_RESOURCE)
            .to_string();

        Some(Self {
            resource,
            limit,
            remaining,
            reset,
        })
    }

    /// Seconds from `now` until the window resets, clamped at zero.
    pub fn seconds_until_reset(&self, now: SystemTime) -> Option<u64> {
        let reset = self.reset?;
        let now = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        Some(reset.saturating_sub(now))
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

pub fn record_rate_limit(rate_limit: &RateLimit, now: SystemTime) {
    let resource = rate_limit.resource.clone();
    if let Some(remaining) = rate_limit.remaining {
        metrics::gauge!("github_token_usage", "resource" => resource.clone()).set(remaining as f64);
    }
    if let Some(limit) = rate_limit.limit {
        metrics::gauge!("github_token_limit", "resource" => resource.clone()).set(limit as f64);
    }
    if let Some(secs) = rate_limit.seconds_until_reset(now) {
        metrics::gauge!("github_token_reset_seconds", "resource" => resource).set(secs as f64);
    }
}
