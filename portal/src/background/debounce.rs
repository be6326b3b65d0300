use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Trailing-edge debouncer: of several calls inside the window, only the last
/// one runs its action. Superseded calls wake up, see they are stale and
/// return without doing anything.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a call. The returned future sleeps out the window and then
    /// runs `action` only if no later call arrived meanwhile. Returns whether
    /// the action ran.
    pub fn call<F, Fut>(&self, action: F) -> impl Future<Output = bool> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = self.latest.clone();
        let window = self.window;

        async move {
            tokio::time::sleep(window).await;
            if latest.load(Ordering::SeqCst) != ticket {
                tracing::trace!("Debounced call {} superseded", ticket);
                return false;
            }
            action().await;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_in_window_runs() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let runs = Arc::new(AtomicUsize::new(0));
        let last_query = Arc::new(std::sync::Mutex::new(String::new()));

        let mut handles = Vec::new();
        for query in ["r", "ru", "rus", "rust"] {
            let runs = runs.clone();
            let last_query = last_query.clone();
            let call = debouncer.call(move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                *last_query.lock().unwrap() = query.to_string();
            });
            handles.push(tokio::spawn(call));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut ran = Vec::new();
        for handle in handles {
            ran.push(handle.await.unwrap());
        }

        assert_eq!(ran, vec![false, false, false, true]);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(*last_query.lock().unwrap(), "rust");
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_outside_window_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let runs = runs.clone();
            let ran = debouncer
                .call(move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .await;
            assert!(ran);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_call_waits_out_window() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let first = tokio::spawn(debouncer.call(|| async {}));
        tokio::time::sleep(Duration::from_millis(399)).await;
        let second = tokio::spawn(debouncer.call(|| async {}));

        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
    }
}
