use serde::{Deserialize, Serialize};

/// Top-level proxy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Health, metrics and path-simplify debug endpoints.
    #[serde(default = "default_admin_listen")]
    pub admin_listen: String,

    /// How long in-flight connections may run after shutdown is requested (seconds).
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            admin_listen: default_admin_listen(),
            drain_timeout_secs: default_drain_timeout(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8888".to_string()
}

fn default_admin_listen() -> String {
    "0.0.0.0:9091".to_string()
}

fn default_drain_timeout() -> u64 {
    30
}

/// The single API endpoint every request is forwarded to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Absolute base URL, e.g. `https://api.github.com` or
    /// `https://ghe.example.com/api/v3`. Request paths are appended to it.
    #[serde(default = "default_upstream_url")]
    pub url: String,

    #[serde(default)]
    pub timeout: TimeoutConfig,

    #[serde(default)]
    pub keepalive_pool: KeepalivePoolConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout: TimeoutConfig::default(),
            keepalive_pool: KeepalivePoolConfig::default(),
        }
    }
}

fn default_upstream_url() -> String {
    "https://api.github.com".to_string()
}

/// Upstream timeouts in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect: f64,

    /// Time allowed until the upstream response head arrives.
    #[serde(default = "default_read_timeout")]
    pub read: f64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: default_connect_timeout(),
            read: default_read_timeout(),
        }
    }
}

fn default_connect_timeout() -> f64 {
    5.0
}

fn default_read_timeout() -> f64 {
    60.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepalivePoolConfig {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    #[serde(default = "default_pool_size")]
    pub size: usize,
}

impl Default for KeepalivePoolConfig {
    fn default() -> Self {
        Self {
            idle_timeout: default_idle_timeout(),
            size: default_pool_size(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    90
}

fn default_pool_size() -> usize {
    64
}
