use crate::config::ProxyConfig;
use crate::metrics::Metrics;
use crate::proxy::Upstream;
use anyhow::Result;
use std::sync::Arc;

/// Shared proxy state, cheaply cloneable.
///
/// Configuration is fixed for the lifetime of the process, so it is held as a
/// plain `Arc` snapshot.
#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<ProxyConfig>,
    pub metrics: Metrics,
    pub upstream: Upstream,
}

impl ProxyState {
    /// Build state and install the global metrics recorder.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let metrics = Metrics::install();
        Self::with_metrics(config, metrics)
    }

    /// Build state around an existing metrics handle. Used where the global
    /// recorder is already installed or not wanted, such as tests.
    pub fn with_metrics(config: ProxyConfig, metrics: Metrics) -> Result<Self> {
        let upstream = Upstream::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            metrics,
            upstream,
        })
    }
}
