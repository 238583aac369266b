use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::time::{timeout_at, Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::echo::capture::HeadCapturingStream;
use crate::echo::guards::ConnectionGuard;
use crate::echo::handler;
use crate::error::{ProbeError, Result};

/// Bind `config.listen` and serve until SIGINT or SIGTERM
pub async fn run(config: Arc<Config>) -> Result<()> {
    let listener = TcpListener::bind(config.listen).await?;
    let shutdown = shutdown_signal()?;
    serve(listener, config, shutdown).await
}

/// Resolves on the first SIGINT or SIGTERM
pub fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
        ProbeError::Io(std::io::Error::other(format!("Failed to setup SIGTERM handler: {e}")))
    })?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(|e| {
        ProbeError::Io(std::io::Error::other(format!("Failed to setup SIGINT handler: {e}")))
    })?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    })
}

/// Accept connections on `listener` until `shutdown` resolves, then wait up to
/// `timeout.shutdown_secs` for in-flight requests to complete.
///
/// Every connection runs in its own task and carries exactly one request.
pub async fn serve<F>(listener: TcpListener, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    let max_head_bytes = config.capture.max_head_bytes;

    let mut builder = http1::Builder::new();
    builder.keep_alive(false);

    let active_connections = Arc::new(AtomicUsize::new(0));
    let (closed_tx, mut closed_rx) = watch::channel(());

    info!(%addr, "echo backend listening");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };

                let guard = ConnectionGuard::new(active_connections.clone(), closed_tx.clone());
                let builder = builder.clone();

                tokio::spawn(async move {
                    let _guard = guard;
                    let (head_tx, head_rx) = watch::channel(None::<Bytes>);
                    let stream = HeadCapturingStream::new(stream, max_head_bytes, head_tx);

                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        handler::handle(req, head_rx.clone(), peer)
                    });

                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        debug!(%peer, error = %e, "serve_connection error");
                    }
                });
            }
        }
    }

    drop(listener);

    let shutdown_timeout = Duration::from_secs(config.timeout.shutdown_secs);
    info!(
        "Waiting for active connections to finish (timeout: {}s)",
        config.timeout.shutdown_secs
    );
    let deadline = Instant::now() + shutdown_timeout;

    loop {
        let active = active_connections.load(Ordering::Relaxed);
        if active == 0 {
            info!("All connections closed, shutdown complete");
            break;
        }
        match timeout_at(deadline, closed_rx.changed()).await {
            Ok(Ok(())) => continue,
            Ok(Err(_)) | Err(_) => {
                warn!(
                    active_connections = active,
                    "Shutdown timeout reached, {} connections still active", active
                );
                break;
            }
        }
    }

    info!("Echo backend stopped");
    Ok(())
}
