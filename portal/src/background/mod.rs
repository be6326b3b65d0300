pub mod data_loader;
pub mod debounce;
pub mod geolocation;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

use debounce::Debouncer;

/// Manages background tasks for data loading
/// Tracks running tasks and provides cancellation support
pub struct BackgroundTaskManager {
    tasks: HashMap<String, JoinHandle<()>>,
    search: Debouncer,
    debounced: Vec<JoinHandle<bool>>,
}

impl BackgroundTaskManager {
    pub fn new(search_window: Duration) -> Self {
        Self {
            tasks: HashMap::new(),
            search: Debouncer::new(search_window),
            debounced: Vec::new(),
        }
    }

    /// Spawn a background data loading task
    /// If a task with the same ID already exists, it will be cancelled first
    pub fn spawn_load_task<F>(&mut self, task_id: impl Into<String>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task_id = task_id.into();
        if let Some(handle) = self.tasks.remove(&task_id) {
            if !handle.is_finished() {
                tracing::debug!("Cancelling superseded task {}", task_id);
            }
            handle.abort();
        }

        let handle = tokio::spawn(future);
        self.tasks.insert(task_id, handle);
    }

    /// Schedule a job search behind the search debouncer. Superseded searches
    /// run out their timer and finish without calling the backend.
    pub fn spawn_debounced_search<F, Fut>(&mut self, search: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.debounced.retain(|handle| !handle.is_finished());
        self.debounced.push(tokio::spawn(self.search.call(search)));
    }

    /// Drop searches still waiting out the debounce window.
    pub fn cancel_pending_searches(&mut self) {
        for handle in self.debounced.drain(..) {
            handle.abort();
        }
    }

    /// Cancel all running tasks (used on shutdown)
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
        self.cancel_pending_searches();
    }
}

impl Drop for BackgroundTaskManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
