use http::StatusCode;
use std::fmt;

/// Request-time failures of the proxy. Each maps onto the status code the
/// client receives.
#[derive(Debug)]
pub enum ProxyError {
    BadRequest(String),
    UpstreamConnect(String),
    UpstreamTimeout,
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamConnect(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message safe to return to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::BadRequest(_) => "bad request",
            ProxyError::UpstreamConnect(_) => "bad gateway",
            ProxyError::UpstreamTimeout => "gateway timeout",
            ProxyError::Internal(_) => "internal server error",
        }
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ProxyError::UpstreamConnect(msg) => write!(f, "upstream connect error: {}", msg),
            ProxyError::UpstreamTimeout => write!(f, "upstream timeout"),
            ProxyError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}
