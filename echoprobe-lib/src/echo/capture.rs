use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::watch;
use tracing::debug;

/// HeadCapturingStream keeps a verbatim copy of the HTTP/1 request head
/// (request line and header block) while passing every byte through to the
/// HTTP parser. The head is published on the watch channel as soon as its
/// terminating empty line has been read, so it is always available before the
/// parser hands the request to the service.
pub struct HeadCapturingStream<S> {
    inner: S,
    head_tx: watch::Sender<Option<Bytes>>,
    max_capture: usize,
    buffer: Vec<u8>,
    scanned: usize,
    done: bool,
}

impl<S> HeadCapturingStream<S> {
    pub fn new(inner: S, max_capture: usize, head_tx: watch::Sender<Option<Bytes>>) -> Self {
        Self {
            inner,
            head_tx,
            max_capture,
            buffer: Vec::with_capacity(max_capture.min(4096)),
            scanned: 0,
            done: false,
        }
    }

    fn capture(&mut self, data: &[u8]) {
        let remaining = self.max_capture.saturating_sub(self.buffer.len());
        let take = data.len().min(remaining);
        self.buffer.extend_from_slice(&data[..take]);

        if let Some(end) = find_head_end(&self.buffer, self.scanned) {
            self.buffer.truncate(end);
            let head = Bytes::from(std::mem::take(&mut self.buffer));
            let _ = self.head_tx.send(Some(head));
            self.done = true;
            return;
        }

        // Keep the last bytes in the scan window, the terminator may straddle reads
        self.scanned = self.buffer.len().saturating_sub(3);

        if self.buffer.len() >= self.max_capture {
            debug!(limit = self.max_capture, "request head exceeds capture limit");
            self.buffer = Vec::new();
            self.done = true;
        }
    }
}

/// Position just past the empty line ending a request head.
/// Accepts both CRLF and bare LF line endings.
pub(crate) fn find_head_end(buf: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < buf.len() {
        if buf[i] == b'\n' && i > 0 {
            let next = i.saturating_add(1);
            match buf.get(next) {
                Some(b'\n') => return Some(next.saturating_add(1)),
                Some(b'\r') if buf.get(next.saturating_add(1)) == Some(&b'\n') => {
                    return Some(next.saturating_add(2));
                }
                _ => {}
            }
        }
        i = i.saturating_add(1);
    }
    None
}

impl<S: AsyncRead + Unpin> AsyncRead for HeadCapturingStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let result = Pin::new(&mut self.inner).poll_read(cx, buf);
        let after = buf.filled().len();

        if after > before && !self.done {
            self.capture(&buf.filled()[before..after]);
        }
        result
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for HeadCapturingStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, data)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\nHost: a\r\n\r\nbody", 0), Some(27));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\nHost: a\n\nbody", 0), Some(24));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\nHost: a\r\n", 0), None);
    }

    #[tokio::test]
    async fn test_publishes_head_split_across_reads() -> std::io::Result<()> {
        let (client, server) = tokio::io::duplex(8);
        let (tx, rx) = watch::channel(None);
        let mut stream = HeadCapturingStream::new(server, 1024, tx);

        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let mut client = client;
            client.write_all(b"POST /x HTTP/1.1\r\nX-Test: 1\r\n\r\nhello").await?;
            client.shutdown().await
        });

        let mut all = Vec::new();
        stream.read_to_end(&mut all).await?;
        writer.await.map_err(std::io::Error::other)??;

        assert_eq!(all, b"POST /x HTTP/1.1\r\nX-Test: 1\r\n\r\nhello");
        let head = rx.borrow().clone();
        assert_eq!(head.as_deref(), Some(&b"POST /x HTTP/1.1\r\nX-Test: 1\r\n\r\n"[..]));
        Ok(())
    }

    #[tokio::test]
    async fn test_gives_up_past_capture_limit() -> std::io::Result<()> {
        let data = b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaa\r\n\r\n".to_vec();
        let (tx, rx) = watch::channel(None);
        let mut stream = HeadCapturingStream::new(&data[..], 16, tx);

        let mut all = Vec::new();
        stream.read_to_end(&mut all).await?;

        assert_eq!(all, data, "bytes must pass through untouched");
        assert!(rx.borrow().is_none());
        Ok(())
    }
}
