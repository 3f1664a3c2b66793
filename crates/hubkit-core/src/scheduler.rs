//! Delayed-task scheduling capability
//!
//! Response-listener timeouts run through a `TaskScheduler` trait so the
//! runtime never hard-codes a timer backend. The default implementation
//! spawns a tokio task per scheduled job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;

/// A deferred unit of work. Scheduled tasks run at most once.
pub type ScheduledTask = Box<dyn FnOnce() + Send>;

// ----------------------------------------------------------------------------
// Scheduler Capability
// ----------------------------------------------------------------------------

/// Schedules a task to run once after a delay.
pub trait TaskScheduler: Send + Sync {
    fn schedule_after(&self, delay: Duration, task: ScheduledTask) -> ScheduledTaskHandle;
}

/// Cancellation handle for a scheduled task.
///
/// `cancel` is idempotent. A task that has already started running is not
/// interrupted; cancellation only prevents a pending task from starting.
#[derive(Debug, Clone)]
pub struct ScheduledTaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl ScheduledTaskHandle {
    pub fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Prevent the task from running if it has not started yet.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            if let Some(abort) = &self.abort {
                abort.abort();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ----------------------------------------------------------------------------
// Tokio Scheduler
// ----------------------------------------------------------------------------

/// Timer backend spawning one tokio task per scheduled job.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TaskScheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: ScheduledTask) -> ScheduledTaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The abort above can only land while parked in the sleep; once
            // past it the task body runs to completion.
            if !flag.load(Ordering::Acquire) {
                task();
            }
        });
        ScheduledTaskHandle::new(cancelled, Some(join.abort_handle()))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_scheduled_task_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let _handle = TokioScheduler.schedule_after(
            Duration::from_millis(10),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_prevents_run_and_is_idempotent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let handle = TokioScheduler.schedule_after(
            Duration::from_millis(20),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }
}
