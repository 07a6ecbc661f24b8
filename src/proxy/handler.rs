use crate::error::ProxyError;
use crate::metrics::{record_rate_limit, RateLimit};
use crate::proxy::context::{BoxBody, RequestContext};
use crate::server::ProxyState;
use http::header::{CONNECTION, HOST, TRANSFER_ENCODING, USER_AGENT};
use http::{HeaderName, HeaderValue};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::time::{Instant, SystemTime};
use tracing::{debug, warn};

/// Forward one request to the GitHub upstream:
///
/// 1. CONTEXT:  capture path, method, user agent and client address
/// 2. UPSTREAM: rewrite the target, strip hop headers, send with timeout
/// 3. LOG:      rate limit gauges, request metrics, access log
pub async fn handle_request(
    req: Request<Incoming>,
    state: ProxyState,
    peer_addr: SocketAddr,
) -> Result<Response<BoxBody>, hyper::Error> {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let mut ctx = RequestContext::new(
        req.uri().path().to_string(),
        req.method().as_str().to_string(),
        user_agent,
        peer_addr.ip(),
    );

    let upstream_resp = match phase_upstream(req, &mut ctx, &state).await {
        Ok(resp) => resp,
        Err(err) => {
            warn!(
                "proxy: request failed, method={}, path={}, error={}",
                ctx.method, ctx.path, err
            );
            return Ok(ctx.error_response(&err));
        }
    };

    let resp = build_downstream_response(upstream_resp);
    phase_log(&ctx, &resp);
    Ok(resp)
}

async fn phase_upstream(
    req: Request<Incoming>,
    ctx: &mut RequestContext,
    state: &ProxyState,
) -> Result<Response<Incoming>, ProxyError> {
    let upstream = &state.upstream;
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());
    let target = upstream
        .target_uri(&path_and_query)
        .map_err(|e| ProxyError::BadRequest(e.to_string()))?;

    let (parts, body) = req.into_parts();
    let mut headers = parts.headers;
    remove_hop_headers(&mut headers);
    let host = HeaderValue::from_str(upstream.authority().as_str())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    headers.insert(HOST, host);

    let mut builder = Request::builder().method(parts.method).uri(target);
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }
    let upstream_req = builder
        .body(body.boxed())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;

    debug!(
        "proxy: forwarding, method={}, uri={}",
        ctx.method,
        upstream_req.uri()
    );

    ctx.upstream_start = Some(Instant::now());
    match tokio::time::timeout(upstream.read_timeout(), upstream.client().request(upstream_req)).await
    {
        Ok(Ok(resp)) => Ok(resp),
        Ok(Err(e)) => Err(ProxyError::UpstreamConnect(e.to_string())),
        Err(_) => Err(ProxyError::UpstreamTimeout),
    }
}

fn phase_log(ctx: &RequestContext, resp: &Response<BoxBody>) {
    let status = resp.status().as_u16();

    if let Some(rate_limit) = RateLimit::from_headers(resp.headers()) {
        record_rate_limit(&rate_limit, SystemTime::now());
    }

    ctx.finalize_metrics(status);

    tracing::info!(
        client_ip = %ctx.client_ip,
        method = %ctx.method,
        path = %ctx.path,
        status = status,
        user_agent = ctx.user_agent.as_deref().unwrap_or(""),
        latency_ms = %ctx.start.elapsed().as_millis(),
        upstream_ms = %ctx.upstream_elapsed().as_millis(),
        "access"
    );
}

fn build_downstream_response(upstream_resp: Response<Incoming>) -> Response<BoxBody> {
    let (mut parts, body) = upstream_resp.into_parts();
    remove_hop_headers(&mut parts.headers);
    Response::from_parts(parts, body.boxed())
}

fn remove_hop_headers(headers: &mut http::HeaderMap) {
    let hop_headers: &[HeaderName] = &[
        CONNECTION,
        HeaderName::from_static("keep-alive"),
        HeaderName::from_static("proxy-authenticate"),
        HeaderName::from_static("proxy-authorization"),
        HeaderName::from_static("te"),
        HeaderName::from_static("trailers"),
        TRANSFER_ENCODING,
        HeaderName::from_static("upgrade"),
    ];

    for h in hop_headers {
        headers.remove(h);
    }
}
