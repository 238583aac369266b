//! Shared helpers for the echo backend, readiness and scenario tests
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use echoprobe_lib::{serve, Config};
use tokio::io::{copy_bidirectional, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Echo backend running in the background on an ephemeral loopback port
pub struct EchoServer {
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<echoprobe_lib::Result<()>>,
}

impl EchoServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger graceful shutdown and wait for the server to return
    pub async fn stop(self) -> TestResult {
        let _ = self.shutdown.send(());
        self.handle.await??;
        Ok(())
    }
}

pub async fn spawn_echo() -> TestResult<EchoServer> {
    let mut config = Config::default();
    config.timeout.shutdown_secs = 5;
    spawn_echo_with(config).await
}

pub async fn spawn_echo_with(config: Config) -> TestResult<EchoServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    spawn_echo_on(listener, config)
}

pub fn spawn_echo_on(listener: TcpListener, config: Config) -> TestResult<EchoServer> {
    let addr = listener.local_addr()?;
    let (shutdown, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, Arc::new(config), async {
        let _ = rx.await;
    }));
    Ok(EchoServer { addr, shutdown, handle })
}

/// reqwest client that ignores proxy settings from the environment
pub fn client() -> TestResult<reqwest::Client> {
    Ok(reqwest::Client::builder().no_proxy().build()?)
}

/// An address nothing listens on
pub async fn closed_addr() -> TestResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Response read off a raw socket
pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: Vec<u8>,
}

/// Write `request` verbatim and read until the server closes the connection
pub async fn raw_request(addr: SocketAddr, request: &[u8]) -> TestResult<RawResponse> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;

    let end = find_subsequence(&buf, b"\r\n\r\n").ok_or("response has no header terminator")?;
    let head = String::from_utf8(buf[..end].to_vec())?;
    let body = buf[end + 4..].to_vec();
    let status = head
        .split(' ')
        .nth(1)
        .ok_or("response has no status code")?
        .parse::<u16>()?;

    Ok(RawResponse { status, head, body })
}

/// Minimal stand-in for the nginx configuration under test: sets X-Real-IP,
/// appends to X-Forwarded-For, keeps an upstream X-Forwarded-Proto or falls
/// back to "http", and passes every other header through untouched.
pub async fn spawn_forwarding_proxy(backend: SocketAddr) -> TestResult<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((client, peer)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = forward(client, peer, backend).await;
            });
        }
    });

    Ok(addr)
}

async fn forward(mut client: TcpStream, peer: SocketAddr, backend: SocketAddr) -> TestResult {
    let mut buf = Vec::new();
    let end = loop {
        let mut chunk = [0u8; 4096];
        let n = client.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_subsequence(&buf, b"\r\n\r\n") {
            break end;
        }
    };

    let head = String::from_utf8(buf[..end].to_vec())?;
    let rest = buf[end + 4..].to_vec();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().ok_or("empty request head")?;

    let client_ip = peer.ip().to_string();
    let mut forwarded_for = None;
    let mut proto = None;
    let mut out = format!("{request_line}\r\n");
    for line in lines {
        let Some((name, value)) = line.split_once(':') else { continue };
        let value = value.trim();
        if name.eq_ignore_ascii_case("x-real-ip") {
            continue;
        } else if name.eq_ignore_ascii_case("x-forwarded-for") {
            forwarded_for = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("x-forwarded-proto") {
            proto = Some(value.to_string());
        } else {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
    }
    let forwarded_for = match forwarded_for {
        Some(chain) => format!("{chain}, {client_ip}"),
        None => client_ip.clone(),
    };
    out.push_str(&format!("X-Real-IP: {client_ip}\r\n"));
    out.push_str(&format!("X-Forwarded-For: {forwarded_for}\r\n"));
    out.push_str(&format!("X-Forwarded-Proto: {}\r\n\r\n", proto.as_deref().unwrap_or("http")));

    let mut upstream = TcpStream::connect(backend).await?;
    upstream.write_all(out.as_bytes()).await?;
    upstream.write_all(&rest).await?;
    copy_bidirectional(&mut client, &mut upstream).await?;
    Ok(())
}

/// Answers every connection with `503` and counts how many it saw
pub async fn spawn_unavailable() -> TestResult<(SocketAddr, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
                let _ = stream.shutdown().await;
            });
        }
    });

    Ok((addr, hits))
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
