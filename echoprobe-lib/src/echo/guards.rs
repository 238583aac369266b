use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Tracks one open connection; decrements the shared counter when dropped
/// and notifies when the last connection closes (for graceful shutdown)
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>, notifier: watch::Sender<()>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter, notifier }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let remaining = self.counter.fetch_sub(1, Ordering::Relaxed);
        if remaining == 1 {
            let _ = self.notifier.send(());
        }
    }
}
