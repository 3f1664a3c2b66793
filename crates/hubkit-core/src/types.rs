//! Core types for the hubkit event runtime
//!
//! Fundamental types shared across the event model, the shared-state store,
//! and the runtime.

use core::fmt;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Event Number
// ----------------------------------------------------------------------------

/// Process-wide strictly increasing number assigned to an event at dispatch
/// acceptance. Doubles as the version key of the shared-state store.
pub type EventNumber = u64;

/// Sentinel version meaning "the most recent shared state available".
pub const VERSION_LATEST: EventNumber = EventNumber::MAX;

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a new timestamp
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the raw milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Shared State Type
// ----------------------------------------------------------------------------

/// The two shared-state stores every extension owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharedStateType {
    /// Regular extension shared state
    Standard,
    /// XDM-formatted shared state
    Xdm,
}

impl fmt::Display for SharedStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedStateType::Standard => write!(f, "STANDARD"),
            SharedStateType::Xdm => write!(f, "XDM"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
