use crate::config::{KeepalivePoolConfig, ProxyConfig};
use crate::proxy::context::BoxBody;
use anyhow::Result;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::Duration;

pub type HttpClient = Client<HttpsConnector<HttpConnector>, BoxBody>;

/// The GitHub endpoint requests are forwarded to, plus a pooled client.
#[derive(Clone)]
pub struct Upstream {
    client: HttpClient,
    scheme: Arc<str>,
    authority: http::uri::Authority,
    base_path: Arc<str>,
    read_timeout: Duration,
}

impl Upstream {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let origin = config.upstream_origin()?;
        let cfg = &config.upstream;
        let client = build_http_client(&cfg.keepalive_pool, cfg.timeout.connect);
        Ok(Self {
            client,
            scheme: Arc::from(origin.scheme),
            authority: origin.authority,
            base_path: Arc::from(origin.base_path),
            read_timeout: Duration::from_secs_f64(cfg.timeout.read),
        })
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn authority(&self) -> &http::uri::Authority {
        &self.authority
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Upstream URI for a request's path and query, below the configured base
    /// path. `/rate_limit` on `https://ghe.example.com/api/v3` becomes
    /// `https://ghe.example.com/api/v3/rate_limit`.
    pub fn target_uri(&self, path_and_query: &str) -> Result<http::Uri, http::Error> {
        let separator = if path_and_query.starts_with('/') { "" } else { "/" };
        let full = format!("{}{}{}", self.base_path, separator, path_and_query);
        http::Uri::builder()
            .scheme(&*self.scheme)
            .authority(self.authority.clone())
            .path_and_query(full)
            .build()
    }
}

/// Build a pooled hyper `Client` for the upstream.
///
/// `https://` is terminated with rustls against the webpki roots; HTTP/2 is
/// negotiated via ALPN. Plain `http://` stays on HTTP/1.1.
fn build_http_client(pool_cfg: &KeepalivePoolConfig, connect_timeout_secs: f64) -> HttpClient {
    let mut http = HttpConnector::new();
    http.set_nodelay(true);
    http.set_keepalive(Some(Duration::from_secs(pool_cfg.idle_timeout)));
    http.set_connect_timeout(Some(Duration::from_secs_f64(connect_timeout_secs)));
    http.enforce_http(false);

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(pool_cfg.idle_timeout))
        .pool_max_idle_per_host(pool_cfg.size)
        .build(https)
}
