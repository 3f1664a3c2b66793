//! Time capability
//!
//! Timestamps flow through a `TimeSource` trait so tests can pin the clock.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Timestamp;

/// Source of wall-clock timestamps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// System clock implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Timestamp::new(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source_is_monotonic_enough() {
        let a = SystemTimeSource.now();
        let b = SystemTimeSource.now();
        assert!(b >= a);
    }
}
