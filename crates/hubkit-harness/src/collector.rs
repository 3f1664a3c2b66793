//! Event collector
//!
//! A cloneable sink that records every event a listener sees and lets tests
//! await delivery instead of sleeping blindly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hubkit_core::{Event, EventListener};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Records events delivered to a listener, in delivery order.
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<Arc<Event>>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that appends every event to this collector.
    pub fn listener(&self) -> EventListener {
        let events = self.events.clone();
        Arc::new(move |event: Arc<Event>| {
            events.lock().unwrap().push(event);
        })
    }

    pub fn events(&self) -> Vec<Arc<Event>> {
        self.events.lock().unwrap().clone()
    }

    /// Names of the recorded events, in delivery order.
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `count` events arrived or `timeout` elapses.
    /// Returns whether the count was reached.
    pub async fn wait_for_count(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait `quiet` with no arrivals to conclude nothing more is coming, then
    /// return the final count.
    pub async fn settle(&self, quiet: Duration) -> usize {
        loop {
            let before = self.len();
            tokio::time::sleep(quiet).await;
            if self.len() == before {
                return before;
            }
        }
    }
}
