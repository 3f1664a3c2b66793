//! Bounded event history
//!
//! An in-memory ring buffer recording masked events for diagnostics. Oldest
//! entries are evicted first; nothing is persisted.

use std::collections::VecDeque;
use std::sync::Arc;

use hubkit_core::{Event, EventNumber};

/// Ring buffer of `(event number, event)` pairs for events carrying a mask.
pub struct EventHistory {
    capacity: usize,
    entries: VecDeque<(EventNumber, Arc<Event>)>,
}

impl EventHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Record an event. A zero-capacity history records nothing.
    pub fn record(&mut self, number: EventNumber, event: Arc<Event>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back((number, event));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> Vec<(EventNumber, Arc<Event>)> {
        self.entries.iter().cloned().collect()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
