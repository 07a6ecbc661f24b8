use crate::error::ProxyError;
use crate::metrics::{record_request, RequestRecord};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use std::net::IpAddr;
use std::time::{Duration, Instant};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

/// Per-request state carried from accept to the access log.
pub struct RequestContext {
    pub path: String,
    pub method: String,
    pub user_agent: Option<String>,
    pub client_ip: IpAddr,
    pub start: Instant,
    pub upstream_start: Option<Instant>,
}

impl RequestContext {
    pub fn new(path: String, method: String, user_agent: Option<String>, client_ip: IpAddr) -> Self {
        Self {
            path,
            method,
            user_agent,
            client_ip,
            start: Instant::now(),
            upstream_start: None,
        }
    }

    /// Time spent waiting on GitHub, or zero if the request never left.
    pub fn upstream_elapsed(&self) -> Duration {
        self.upstream_start
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    /// Build the JSON error response for `err` and record it like any other
    /// completed request.
    pub fn error_response(&self, err: &ProxyError) -> hyper::Response<BoxBody> {
        let status = err.status();
        self.finalize_metrics(status.as_u16());

        hyper::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(full_body(format!(r#"{{"error":"{}"}}"#, err.public_message())))
            .unwrap_or_else(|_| hyper::Response::new(empty_body()))
    }

    pub fn finalize_metrics(&self, resp_status: u16) {
        record_request(&RequestRecord {
            path: &self.path,
            method: &self.method,
            status: resp_status,
            user_agent: self.user_agent.as_deref(),
            duration: self.upstream_elapsed(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ctx(path: &str) -> RequestContext {
        RequestContext::new(
            path.to_string(),
            "GET".to_string(),
            Some("hook/v1".to_string()),
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
        )
    }

    #[test]
    fn test_request_context_new() {
        let ctx = ctx("/repos/o/r");
        assert_eq!(ctx.path, "/repos/o/r");
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.user_agent.as_deref(), Some("hook/v1"));
        assert!(ctx.upstream_start.is_none());
        assert_eq!(ctx.upstream_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_error_response_status_and_body() {
        let resp = ctx("/rate_limit").error_response(&ProxyError::UpstreamTimeout);
        assert_eq!(resp.status(), http::StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_error_response_various_errors() {
        let ctx = ctx("/user");
        for err in [
            ProxyError::BadRequest("x".into()),
            ProxyError::UpstreamConnect("refused".into()),
            ProxyError::UpstreamTimeout,
            ProxyError::Internal("boom".into()),
        ] {
            let resp = ctx.error_response(&err);
            assert_eq!(resp.status(), err.status());
        }
    }

    #[tokio::test]
    async fn test_error_body_is_public_message() {
        let resp = ctx("/user").error_response(&ProxyError::UpstreamConnect("10.1.1.1".into()));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"error":"bad gateway"}"#);
    }
}
