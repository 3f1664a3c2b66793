//! Test extensions
//!
//! A configurable extension for exercising the hub: it registers listeners
//! in `on_registered`, records its lifecycle transitions, and can be told to
//! fail registration.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hubkit_core::{
    EventListener, Extension, ExtensionApi, ExtensionError, ExtensionFactory,
};

// ----------------------------------------------------------------------------
// Lifecycle Log
// ----------------------------------------------------------------------------

/// Records lifecycle hook invocations, in order.
#[derive(Clone, Default)]
pub struct LifecycleLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl LifecycleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

// ----------------------------------------------------------------------------
// Test Extension
// ----------------------------------------------------------------------------

/// Configuration for a [`test_extension`] factory.
pub struct TestExtensionConfig {
    pub name: String,
    pub friendly_name: String,
    pub version: String,
    pub listeners: Vec<(String, String, EventListener)>,
    pub fail_registration: bool,
    pub lifecycle: LifecycleLog,
}

impl TestExtensionConfig {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            friendly_name: name.clone(),
            name,
            version: "1.0.0".to_string(),
            listeners: Vec::new(),
            fail_registration: false,
            lifecycle: LifecycleLog::new(),
        }
    }

    pub fn friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = friendly_name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Register `listener` for the type/source pair during `on_registered`.
    pub fn listen(
        mut self,
        event_type: impl Into<String>,
        event_source: impl Into<String>,
        listener: EventListener,
    ) -> Self {
        self.listeners
            .push((event_type.into(), event_source.into(), listener));
        self
    }

    /// Make `on_registered` fail, stopping the container.
    pub fn failing(mut self) -> Self {
        self.fail_registration = true;
        self
    }

    pub fn lifecycle(mut self, lifecycle: LifecycleLog) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

struct TestExtension {
    config: TestExtensionConfig,
    api: Arc<dyn ExtensionApi>,
}

#[async_trait]
impl Extension for TestExtension {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn friendly_name(&self) -> &str {
        &self.config.friendly_name
    }

    fn version(&self) -> &str {
        &self.config.version
    }

    async fn on_registered(&mut self) -> Result<(), ExtensionError> {
        self.config.lifecycle.record(format!("{}:registered", self.config.name));
        if self.config.fail_registration {
            return Err(ExtensionError::UnexpectedError(
                "configured to fail registration".to_string(),
            ));
        }
        for (event_type, event_source, listener) in self.config.listeners.drain(..) {
            self.api
                .register_event_listener(&event_type, &event_source, listener);
        }
        Ok(())
    }

    async fn on_unregistered(&mut self) {
        self.config
            .lifecycle
            .record(format!("{}:unregistered", self.config.name));
    }
}

/// Build an [`ExtensionFactory`] from the given configuration.
pub fn test_extension(config: TestExtensionConfig) -> ExtensionFactory {
    Box::new(move |api| Ok(Box::new(TestExtension { config, api })))
}
