//! Export service: accept loop, per-connection tasks, graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use rex_core::{RexConfig, RexError};

use crate::export::Exporter;
use crate::transport::{HttpResponse, read_request, route, with_cors};

const READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Unread request bytes discarded after an early error response.
const DRAIN_LIMIT: usize = 1024 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared state handed to every connection task.
pub struct ServerState {
    pub exporter: Exporter,
    pub max_body_bytes: usize,
}

impl ServerState {
    pub fn from_config(config: &RexConfig) -> Self {
        Self {
            exporter: Exporter::from_config(config),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Bind `addr` and serve until `shutdown` fires.
pub async fn run(
    addr: &str,
    state: Arc<ServerState>,
    shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind export server on {addr}"))?;
    serve(listener, state, shutdown).await
}

/// Serve on an already-bound listener.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    info!("Export server listening on http://{local}");

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        let state = Arc::clone(&state);
                        let span = info_span!("request", id = %Uuid::new_v4(), peer = %peer_addr);
                        tokio::spawn(handle_connection(stream, peer_addr, state).instrument(span));
                    }
                    Err(e) => {
                        error!("TCP accept failed: {e}");
                    }
                }
            }
            _ = shutdown.recv() => {
                info!("Export server shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_connection(mut stream: TcpStream, peer_addr: SocketAddr, state: Arc<ServerState>) {
    let read = tokio::time::timeout(
        READ_TIMEOUT,
        read_request(&mut stream, state.max_body_bytes),
    )
    .await;

    let unread_body = matches!(read, Ok(Err(_)));
    let response = match read {
        Ok(Ok(request)) => {
            info!(method = %request.method, path = %request.path, "handling request");
            let state = Arc::clone(&state);
            match tokio::task::spawn_blocking(move || route(&state.exporter, &request)).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Export task failed: {e}");
                    with_cors(HttpResponse::error(&RexError::Internal(e.to_string())))
                }
            }
        }
        Ok(Err(e)) => {
            warn!(category = ?e.category(), "Bad request from {peer_addr}: {e}");
            with_cors(HttpResponse::error(&e))
        }
        Err(_) => {
            warn!("Timed out reading request from {peer_addr}");
            with_cors(HttpResponse::error(&RexError::InvalidRequest(
                "Timed out reading request".into(),
            )))
        }
    };

    let status = response.status.as_u16();
    match response.write_to(&mut stream).await {
        Ok(()) => debug!(status, bytes = response.body.len(), "response sent"),
        Err(e) => debug!("Failed to write response to {peer_addr}: {e}"),
    }

    // Unread input at close turns the FIN into an RST.
    let _ = stream.shutdown().await;
    if unread_body {
        drain(&mut stream).await;
    }
}

/// Discard up to [`DRAIN_LIMIT`] bytes until the peer stops sending.
async fn drain(stream: &mut TcpStream) {
    let mut scratch = [0u8; 8192];
    let mut left = DRAIN_LIMIT;
    while left > 0 {
        match tokio::time::timeout(DRAIN_TIMEOUT, stream.read(&mut scratch)).await {
            Ok(Ok(n)) if n > 0 => left = left.saturating_sub(n),
            _ => break,
        }
    }
}
