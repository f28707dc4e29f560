use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation flag for one scan.
///
/// Clones share the flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct ScanCanceller {
    flag: Arc<watch::Sender<bool>>,
}

impl ScanCanceller {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { flag: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Wait until [`cancel`](Self::cancel) is called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Whether `other` is a clone of this canceller.
    pub fn same_scan(&self, other: &ScanCanceller) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

impl Default for ScanCanceller {
    fn default() -> Self {
        Self::new()
    }
}
