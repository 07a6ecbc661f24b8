use crate::config::ProxyConfig;
use crate::server;
use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// CLI arguments forwarded from `main()`.
pub struct BootstrapArgs {
    pub config_path: std::path::PathBuf,
    pub listen: Option<String>,
    pub admin_listen: Option<String>,
}

/// Proxy lifecycle: init → load config → bind → serve → shutdown.
///
/// Bind failures abort startup. If the proxy server stops on its own the
/// process exits with its error instead of waiting for a signal.
pub async fn run(args: BootstrapArgs) -> Result<()> {
    init_tracing();

    let config = load_config(&args)?;
    tracing::info!(
        "config: loaded, path={}, upstream={}",
        args.config_path.display(),
        config.upstream.url
    );

    let state = server::ProxyState::new(config)?;

    let proxy_listener = server::bind(&state.config.server.listen).await?;
    let admin_listener = server::bind(&state.config.server.admin_listen).await?;
    tracing::info!(
        "server: listening, proxy={}, admin={}",
        state.config.server.listen,
        state.config.server.admin_listen
    );

    tokio::spawn({
        let state = state.clone();
        async move {
            if let Err(e) = server::serve_admin(admin_listener, state).await {
                tracing::error!("server: admin failed, error={}", e);
            }
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut proxy_handle = tokio::spawn(server::serve_proxy(proxy_listener, state, shutdown_rx));

    tokio::select! {
        finished = &mut proxy_handle => {
            return finished
                .context("proxy task panicked")?
                .context("proxy server stopped unexpectedly");
        }
        signal = wait_for_shutdown() => signal?,
    }

    shutdown_tx.send_replace(true);
    proxy_handle.await.context("proxy task panicked")??;

    tracing::info!("server: shutdown complete");
    Ok(())
}

/// Load the config file and apply CLI listen overrides, which win over both
/// the file and the environment.
fn load_config(args: &BootstrapArgs) -> Result<ProxyConfig> {
    let mut config = ProxyConfig::load(&args.config_path)?;
    let mut overridden = false;
    if let Some(listen) = &args.listen {
        config.server.listen = listen.clone();
        overridden = true;
    }
    if let Some(admin_listen) = &args.admin_listen {
        config.server.admin_listen = admin_listen.clone();
        overridden = true;
    }
    if overridden {
        config.validate()?;
    }
    Ok(config)
}

fn init_tracing() {
    let (non_blocking, _guard) = tracing_appender::non_blocking::NonBlockingBuilder::default()
        .buffered_lines_limit(128_000)
        .lossy(true)
        .finish(std::io::stdout());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .json(),
        )
        .init();

    // writer must outlive every log call, including those during shutdown
    std::mem::forget(_guard);
}

async fn wait_for_shutdown() -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    #[cfg(unix)]
    let terminate = sigterm.recv();

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("server: received SIGINT, shutting down"),
        _ = terminate => tracing::info!("server: received SIGTERM, shutting down"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(listen: Option<&str>, admin_listen: Option<&str>) -> BootstrapArgs {
        BootstrapArgs {
            config_path: PathBuf::from("/nonexistent/ghproxy.toml"),
            listen: listen.map(str::to_owned),
            admin_listen: admin_listen.map(str::to_owned),
        }
    }

    #[test]
    fn test_cli_overrides_listen() {
        let config = load_config(&args(Some("127.0.0.1:18888"), Some("127.0.0.1:19091"))).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:18888");
        assert_eq!(config.server.admin_listen, "127.0.0.1:19091");
    }

    #[test]
    fn test_cli_override_revalidated() {
        assert!(load_config(&args(Some("not-an-address"), None)).is_err());
    }
}
