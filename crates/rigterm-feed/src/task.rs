//! Ownership of background timer tasks

use tokio::task::JoinHandle;

/// Owns a spawned timer task and aborts it when cancelled or dropped.
///
/// Views hold one of these per timer they start, so tearing a view down
/// stops its timers.
#[derive(Debug)]
#[must_use = "dropping a TaskHandle cancels the task"]
pub struct TaskHandle {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub(crate) fn new(name: &'static str, handle: JoinHandle<()>) -> Self {
        tracing::info!(task = name, "timer task started");
        Self {
            name,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the task is still scheduled
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!(task = self.name, "timer task cancelled");
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
