//! Hub builder
//!
//! Builder-style construction for hosts and tests: pick a logger, a
//! scheduler, and a configuration, then `build()` to get a running hub with
//! its placeholder extension already registered.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use hubkit_core::internal::{ConsoleLogger, LoggerWrapper, LogLevel, TaskScheduler, TokioScheduler};
use hubkit_core::HubConfig;

use crate::hub::{EventHub, EventHubTask, HubPlaceholderExtension};

// ----------------------------------------------------------------------------
// Event Hub Builder
// ----------------------------------------------------------------------------

/// Builds a running [`EventHub`]. Must be awaited inside a tokio runtime.
pub struct EventHubBuilder {
    config: HubConfig,
    logger: LoggerWrapper,
    scheduler: Arc<dyn TaskScheduler>,
}

impl EventHubBuilder {
    pub fn new() -> Self {
        Self {
            config: HubConfig::default(),
            logger: LoggerWrapper::default(),
            scheduler: Arc::new(TokioScheduler),
        }
    }

    pub fn with_config(mut self, config: HubConfig) -> Self {
        self.config = config;
        self
    }

    /// Log through `tracing` at the given minimum level.
    pub fn with_console_logging(mut self, min_level: LogLevel) -> Self {
        self.logger = LoggerWrapper::Console(ConsoleLogger::new(min_level));
        self
    }

    pub fn with_logger(mut self, logger: LoggerWrapper) -> Self {
        self.logger = logger;
        self
    }

    /// Substitute the timer backend used for response-listener timeouts.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Spawn the hub lane and register the placeholder extension. The hub
    /// accepts dispatches immediately but drains them only after
    /// [`EventHub::start`].
    pub async fn build(self) -> EventHub {
        let (request_tx, request_rx) = mpsc::channel(self.config.channels.request_buffer_size);

        let task = EventHubTask::new(
            request_rx,
            request_tx.clone(),
            self.scheduler,
            self.config.history_capacity,
            self.logger.clone(),
        );
        tokio::spawn(task.run());

        let hub = EventHub::new(request_tx, self.logger.clone());
        if hub
            .register_extension(Box::new(|_api| Ok(Box::new(HubPlaceholderExtension))))
            .await
            .is_err()
        {
            self.logger
                .error("hub", "failed to register the placeholder extension");
        }

        info!(target: "hubkit", "event hub built");
        hub
    }
}

impl Default for EventHubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
