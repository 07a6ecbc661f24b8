pub mod types;


pub use types::*;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

impl ProxyConfig {
    /// Load configuration from a file (if it exists) and apply environment
    /// variable overrides. When the file does not exist, built-in defaults
    /// are used, which proxy to `https://api.github.com`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: ProxyConfig = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content, path)?
        } else {
            tracing::info!("config file not found at {}, using defaults", path.display());
            ProxyConfig::default()
        };

        config.apply_env_overrides();

        config.validate()?;
        tracing::info!(
            upstream = %config.upstream.url,
            listen = %config.server.listen,
            admin_listen = %config.server.admin_listen,
            "loaded proxy configuration"
        );
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        Ok(match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(content)?,
            Some("json") => serde_json::from_str(content)?,
            Some(ext) => anyhow::bail!("unsupported config format: .{ext}, use .toml or .json"),
            None => anyhow::bail!("config file has no extension, use .toml or .json"),
        })
    }

    /// Apply `GHPROXY_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GHPROXY_UPSTREAM_URL") {
            self.upstream.url = v;
        }
        if let Some(n) = numeric_override(&lookup, "GHPROXY_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout.read = n;
        }
        if let Some(n) = numeric_override(&lookup, "GHPROXY_UPSTREAM_CONNECT_TIMEOUT_SECS") {
            self.upstream.timeout.connect = n;
        }
        if let Some(v) = lookup("GHPROXY_LISTEN") {
            self.server.listen = v;
        }
        if let Some(v) = lookup("GHPROXY_ADMIN_LISTEN") {
            self.server.admin_listen = v;
        }
        if let Some(n) = numeric_override(&lookup, "GHPROXY_DRAIN_TIMEOUT_SECS") {
            self.server.drain_timeout_secs = n;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let uri: http::Uri = self
            .upstream
            .url
            .parse()
            .map_err(|e| anyhow::anyhow!("upstream url '{}' is invalid: {}", self.upstream.url, e))?;
        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            _ => anyhow::bail!(
                "upstream url '{}' must use http or https",
                self.upstream.url
            ),
        }
        if uri.authority().is_none() {
            anyhow::bail!("upstream url '{}' has no host", self.upstream.url);
        }
        if uri.query().is_some() {
            anyhow::bail!("upstream url '{}' must not carry a query", self.upstream.url);
        }

        let timeout = &self.upstream.timeout;
        if !(timeout.connect > 0.0 && timeout.connect.is_finite())
            || !(timeout.read > 0.0 && timeout.read.is_finite())
        {
            anyhow::bail!(
                "upstream timeouts must be positive, connect={}, read={}",
                timeout.connect,
                timeout.read
            );
        }

        for (name, addr) in [
            ("listen", &self.server.listen),
            ("admin_listen", &self.server.admin_listen),
        ] {
            if addr.parse::<SocketAddr>().is_err() {
                anyhow::bail!("server.{name} '{addr}' is not a socket address");
            }
        }
        Ok(())
    }

    /// Parsed `upstream.url`.
    pub fn upstream_origin(&self) -> Result<UpstreamOrigin> {
        let uri: http::Uri = self.upstream.url.parse()?;
        let scheme = uri.scheme_str().unwrap_or("https").to_string();
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("upstream url '{}' has no host", self.upstream.url))?;
        let base_path = uri.path().trim_end_matches('/').to_string();
        Ok(UpstreamOrigin {
            scheme,
            authority,
            base_path,
        })
    }
}

/// Parse a numeric override. Malformed values are skipped with a warning and
/// the configured value stays in place.
fn numeric_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key = key, value = %raw, "ignoring malformed config override");
            None
        }
    }
}

/// Where requests are forwarded: scheme, authority and an optional base path
/// such as `/api/v3` for GitHub Enterprise Server.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamOrigin {
    pub scheme: String,
    pub authority: http::uri::Authority,
    /// Empty, or starts with `/` and has no trailing `/`.
    pub base_path: String,
}
