mod admin;
pub mod bootstrap;
mod state;

pub use admin::handle_admin;
pub use state::ProxyState;

use crate::proxy;
use anyhow::{Context, Result};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Parse and bind a listen address.
pub async fn bind(listen: &str) -> Result<TcpListener> {
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid listen address '{listen}'"))?;
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))
}

/// Holds one slot of `ghproxy_connections_active` until dropped.
struct ActiveConnection;

impl ActiveConnection {
    fn open() -> Self {
        metrics::gauge!("ghproxy_connections_active").increment(1.0);
        ActiveConnection
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        metrics::gauge!("ghproxy_connections_active").decrement(1.0);
    }
}

/// Serve proxy connections until `shutdown` turns `true`.
///
/// On shutdown the listener is closed and every open connection is asked to
/// finish: idle keep-alive connections close at once, busy ones after their
/// in-flight request. Whatever is still open after
/// `server.drain_timeout_secs` is abandoned.
pub async fn serve_proxy(
    listener: TcpListener,
    state: ProxyState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let drain_timeout = Duration::from_secs(state.config.server.drain_timeout_secs);

    let mut server = auto::Builder::new(TokioExecutor::new());
    server.http1().keep_alive(true);
    server
        .http2()
        .timer(TokioTimer::new())
        .keep_alive_interval(Some(Duration::from_secs(20)));
    let graceful = GracefulShutdown::new();

    loop {
        let (stream, peer_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("server: proxy: accept failed, error={}", e);
                    metrics::counter!("ghproxy_connections_total", "status" => "error").increment(1);
                    continue;
                }
            },
            _ = shutdown.wait_for(|stop| *stop) => break,
        };
        metrics::counter!("ghproxy_connections_total", "status" => "accepted").increment(1);

        let state = state.clone();
        let svc = service_fn(move |req: Request<Incoming>| {
            proxy::handle_request(req, state.clone(), peer_addr)
        });
        let conn = graceful.watch(
            server
                .serve_connection(TokioIo::new(stream), svc)
                .into_owned(),
        );

        tokio::spawn(async move {
            let _active = ActiveConnection::open();
            if let Err(e) = conn.await {
                debug!("server: proxy: connection ended, peer={}, error={}", peer_addr, e);
            }
        });
    }

    drop(listener);
    info!("server: proxy: listener closed, draining connections");
    tokio::select! {
        _ = graceful.shutdown() => info!("server: proxy: all connections drained"),
        _ = tokio::time::sleep(drain_timeout) => warn!(
            "server: proxy: drain timeout ({}s), abandoning open connections",
            drain_timeout.as_secs()
        ),
    }
    Ok(())
}

/// Serve the admin endpoints. Runs until the process exits.
pub async fn serve_admin(listener: TcpListener, state: ProxyState) -> Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req: Request<Incoming>| {
                let resp = admin::handle_admin(req, &state);
                async move { Ok::<_, hyper::Error>(resp) }
            });
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                debug!("server: admin: connection ended, error={}", e);
            }
        });
    }
}
