//! HTTP server launcher.
//!
//! # Responsibilities
//! - Accept connections from the bounded listener
//! - Serve each connection on its own task (HTTP/1.1 and HTTP/2)
//! - Enforce the read timeout (first byte, headers, HTTP/2 keep-alive) and header size cap
//! - Hand every request to the shared pipeline with its peer address
//!
//! # Design Decisions
//! - No graceful drain: shutdown stops accepting and returns
//! - Accept errors are logged and retried; only bind failures are fatal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::ConnectInfo};
use hyper::{body::Incoming, Request};
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto,
};
use tokio::sync::broadcast;
use tower::ServiceExt;

use crate::config::ServerConfig;
use crate::http::pipeline::Pipeline;
use crate::lifecycle::shutdown_requested;
use crate::net::listener::{Listener, ListenerError};

/// Pause after a failed accept, e.g. when the process is out of file descriptors.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP server bound to an assembled pipeline.
pub struct HttpServer {
    pipeline: Pipeline,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(pipeline: Pipeline, config: ServerConfig) -> Self {
        Self { pipeline, config }
    }

    fn connection_builder(&self) -> auto::Builder<TokioExecutor> {
        let mut builder = auto::Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout())
            .max_buf_size(self.config.max_header_bytes);
        builder
            .http2()
            .timer(TokioTimer::new())
            .keep_alive_interval(self.config.read_timeout())
            .keep_alive_timeout(self.config.read_timeout())
            .max_header_list_size(u32::try_from(self.config.max_header_bytes).unwrap_or(u32::MAX));
        builder
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %addr,
            max_connections = listener.max_connections(),
            read_timeout = ?self.config.read_timeout(),
            write_timeout = ?self.config.write_timeout(),
            max_header_bytes = self.config.max_header_bytes,
            "Listening"
        );

        let builder = Arc::new(self.connection_builder());

        loop {
            let accepted = tokio::select! {
                res = listener.accept() => res,
                _ = shutdown_requested(&mut shutdown) => {
                    tracing::info!("HTTP server stopped accepting connections");
                    return Ok(());
                }
            };

            let (stream, peer_addr, permit) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };

            let pipeline = self.pipeline.clone();
            let builder = builder.clone();
            let read_timeout = self.config.read_timeout();

            tokio::spawn(async move {
                let _permit = permit;

                // Protocol detection waits for the first byte with no timer of its own.
                match tokio::time::timeout(read_timeout, stream.peek(&mut [0u8; 1])).await {
                    Ok(Ok(n)) if n > 0 => {}
                    Ok(Ok(_)) => return,
                    Ok(Err(e)) => {
                        tracing::debug!(peer_addr = %peer_addr, error = %e, "Connection failed before first byte");
                        return;
                    }
                    Err(_) => {
                        tracing::debug!(
                            peer_addr = %peer_addr,
                            timeout = ?read_timeout,
                            "Closing silent connection"
                        );
                        return;
                    }
                }

                let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                    let mut request = request.map(Body::new);
                    request.extensions_mut().insert(ConnectInfo(peer_addr));
                    pipeline.clone().oneshot(request)
                });

                if let Err(e) = builder
                    .serve_connection_with_upgrades(TokioIo::new(stream), service)
                    .await
                {
                    tracing::debug!(peer_addr = %peer_addr, error = %e, "Connection closed with error");
                }
            });
        }
    }
}
