use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Per-client trailing-edge debouncer.
///
/// Each call registers itself as the latest request for its key and waits for
/// the quiet window. If another call for the same key arrived meanwhile, the
/// earlier one reports that it was superseded and should do no work.
pub struct Debouncer {
    window: Duration,
    tickets: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

/// Clears the key's entry when the latest call for it finishes or is
/// dropped mid-wait.
struct Pending<'a> {
    latest: &'a Mutex<HashMap<String, u64>>,
    key: &'a str,
    ticket: u64,
}

impl Pending<'_> {
    fn is_latest(&self) -> bool {
        match self.latest.lock() {
            Ok(latest) => latest.get(self.key) == Some(&self.ticket),
            Err(_) => true,
        }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if let Ok(mut latest) = self.latest.lock() {
            if latest.get(self.key) == Some(&self.ticket) {
                latest.remove(self.key);
            }
        }
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            tickets: AtomicU64::new(0),
            latest: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves to `true` when this call is still the latest for `key` once
    /// the window has elapsed.
    pub async fn settle(&self, key: &str) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        match self.latest.lock() {
            Ok(mut latest) => {
                latest.insert(key.to_string(), ticket);
            }
            Err(_) => return true,
        }
        let pending = Pending {
            latest: &self.latest,
            key,
            ticket,
        };

        tokio::time::sleep(self.window).await;
        pending.is_latest()
    }

    #[cfg(test)]
    fn pending_keys(&self) -> usize {
        self.latest.lock().map_or(0, |latest| latest.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_single_call_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        assert!(debouncer.settle("client").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_keeps_only_last() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(400)));

        let first = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("client").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("client").await }
        });

        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(400)));

        let a = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("a").await }
        });
        let b = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("b").await }
        });

        assert!(a.await.unwrap());
        assert!(b.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_call_leaves_no_entry() {
        let debouncer = Debouncer::new(Duration::from_millis(400));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), debouncer.settle("client")).await;
        assert!(abandoned.is_err());
        assert_eq!(debouncer.pending_keys(), 0);

        assert!(debouncer.settle("client").await);
        assert_eq!(debouncer.pending_keys(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_both_settle() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        assert!(debouncer.settle("client").await);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(debouncer.settle("client").await);
    }
}
