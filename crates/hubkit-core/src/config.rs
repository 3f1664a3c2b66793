//! Centralized configuration for the hubkit runtime
//!
//! All tunables live here so hosts and tests configure the hub through one
//! structure instead of scattered constructor parameters.

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Buffer sizes for the hub's internal channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Capacity of the hub lane's request channel.
    pub request_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_buffer_size: 256,
        }
    }
}

impl ChannelConfig {
    /// Small buffers that surface back-pressure bugs quickly in tests.
    pub fn for_testing() -> Self {
        Self {
            request_buffer_size: 16,
        }
    }
}

// ----------------------------------------------------------------------------
// Hub Configuration
// ----------------------------------------------------------------------------

/// Top-level configuration for an event hub instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Internal channel sizing.
    pub channels: ChannelConfig,
    /// Maximum number of masked events retained by the history sink.
    pub history_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channels: ChannelConfig::default(),
            history_capacity: 1000,
        }
    }
}

impl HubConfig {
    /// Configuration suited to fast, deterministic tests.
    pub fn for_testing() -> Self {
        Self {
            channels: ChannelConfig::for_testing(),
            history_capacity: 32,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_nonzero() {
        let config = HubConfig::default();
        assert!(config.channels.request_buffer_size > 0);
        assert!(config.history_capacity > 0);
    }
}
