//! One-shot response listeners
//!
//! Listeners are keyed by the identifier of the event that triggered them and
//! armed with a timeout. Exactly one of {response delivery, timeout failure}
//! reaches each callback: whichever side removes the entry first wins, the
//! other finds nothing and is dropped silently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hubkit_core::internal::{LoggerWrapper, ScheduledTaskHandle, TaskScheduler};
use hubkit_core::{Event, HubError, ResponseCallback};

const TAG: &str = "hub.responses";

struct ResponseEntry {
    id: u64,
    trigger_event_id: String,
    timeout_handle: ScheduledTaskHandle,
    callback: ResponseCallback,
}

// ----------------------------------------------------------------------------
// Response Listener Registry
// ----------------------------------------------------------------------------

/// Registry of armed response listeners. Mutations happen on the hub lane and
/// inside timeout tasks; both remove atomically under the same lock, and no
/// callback runs while the lock is held.
pub struct ResponseListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<ResponseEntry>>,
    logger: LoggerWrapper,
}

impl ResponseListenerRegistry {
    pub fn new(logger: LoggerWrapper) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Arm a listener for responses to `trigger_event_id` and schedule its
    /// timeout.
    pub fn register(
        self: &Arc<Self>,
        trigger_event_id: String,
        timeout: Duration,
        callback: ResponseCallback,
        scheduler: &dyn TaskScheduler,
    ) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(self);
        let timeout_handle =
            scheduler.schedule_after(timeout, Box::new(move || registry.expire(id)));

        self.entries.lock().unwrap().push(ResponseEntry {
            id,
            trigger_event_id,
            timeout_handle,
            callback,
        });
    }

    /// Deliver `response` to every listener waiting on its trigger, cancelling
    /// their timeouts. Listeners fire outside the registry lock.
    pub fn notify(&self, response: &Arc<Event>) {
        let Some(trigger_id) = response.response_id() else {
            return;
        };

        let matched: Vec<ResponseEntry> = {
            let mut entries = self.entries.lock().unwrap();
            let mut matched = Vec::new();
            let mut index = 0;
            while index < entries.len() {
                if entries[index].trigger_event_id == trigger_id {
                    matched.push(entries.swap_remove(index));
                } else {
                    index += 1;
                }
            }
            matched
        };

        for entry in matched {
            entry.timeout_handle.cancel();
            (entry.callback)(Ok(response.clone()));
        }
    }

    /// Timeout path: remove the entry if it is still armed and fail it.
    fn expire(&self, id: u64) {
        let entry = {
            let mut entries = self.entries.lock().unwrap();
            entries
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| entries.swap_remove(index))
        };

        if let Some(entry) = entry {
            self.logger.debug(
                TAG,
                &format!(
                    "response listener for trigger {} timed out",
                    entry.trigger_event_id
                ),
            );
            (entry.callback)(Err(HubError::CallbackTimeout));
        }
    }

    /// Drop every armed listener without firing it. Used at hub shutdown.
    pub fn clear(&self) -> usize {
        let entries = std::mem::take(&mut *self.entries.lock().unwrap());
        for entry in &entries {
            entry.timeout_handle.cancel();
        }
        entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
