// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use crate::models::modes::{DeliveryMode, WorkerKind};

/// The record describing one running producer or consumer.
///
/// The registry owns the entry; the background loop only holds a clone of the
/// running flag and of the broker handle. Dropping the entry after the task
/// was joined therefore releases the last handle reference, which closes the
/// broker handle exactly once.
pub struct WorkerState<H: ?Sized> {
    pub id: String,
    pub kind: WorkerKind,
    pub topic: String,

    /// Consumer group, consumers only
    pub group: Option<String>,

    /// Delivery mode, producers only
    pub mode: Option<DeliveryMode>,

    pub started_at: DateTime<Utc>,

    /// Broker handle shared with the loop task
    pub handle: Arc<H>,

    /// Cooperative stop flag, flipped by the registry under its lock and read
    /// lock-free at loop-top. The loop clears it itself on an abnormal exit so
    /// a dead worker is never listed as running.
    running: Arc<AtomicBool>,

    /// Taken once during stop for joining
    task: Option<JoinHandle<()>>,
}

impl<H: ?Sized> WorkerState<H> {

    pub fn new(id: &str, kind: WorkerKind, topic: &str, handle: Arc<H>,
               running: Arc<AtomicBool>, task: JoinHandle<()>) -> Self {
        WorkerState {
            id: id.to_string(),
            kind,
            topic: topic.to_string(),
            group: None,
            mode: None,
            started_at: Utc::now(),
            handle,
            running,
            task: Some(task),
        }
    }

    /// Set the consumer group
    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the producer delivery mode
    pub fn with_mode(mut self, mode: DeliveryMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the loop to exit at its next flag check
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Take the task handle for joining. The handle can be taken exactly once.
    pub fn take_task(&mut self) -> Option<JoinHandle<()>> {
        self.task.take()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use crate::models::modes::{DeliveryMode, WorkerKind};
    use super::WorkerState;

    #[tokio::test]
    async fn worker_state_lifecycle_test() {
        let running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(async {});
        let handle: Arc<str> = Arc::from("handle");

        let mut state = WorkerState::new("p1", WorkerKind::Producer, "updates", handle, running, task)
            .with_mode(DeliveryMode::Synchronous);

        assert!(state.is_running());
        assert_eq!(Some(DeliveryMode::Synchronous), state.mode);

        state.request_stop();
        assert!(!state.is_running());

        // the task handle can be taken exactly once
        assert!(state.take_task().is_some());
        assert!(state.take_task().is_none());
    }
}
