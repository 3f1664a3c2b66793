//! Extension containers
//!
//! A container wraps one extension instance and gives it an isolated serial
//! lane: the extension's lifecycle hooks and all of its listener callbacks
//! run there, one at a time. The container also owns the extension's two
//! shared-state managers and its listener table.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use hubkit_core::internal::LoggerWrapper;
use hubkit_core::{
    Event, EventData, EventListener, EventNumber, Extension, ExtensionError, HubError,
    SharedStateType,
};

use crate::dispatcher::{SerialWorkDispatcher, WorkHandler};
use crate::shared_state::{SharedStateManager, SharedStateStatus};

// ----------------------------------------------------------------------------
// Listener Table
// ----------------------------------------------------------------------------

/// A registered type/source listener. `"*"` in either field is a wildcard.
pub struct ListenerEntry {
    pub event_type: String,
    pub event_source: String,
    pub listener: EventListener,
}

impl ListenerEntry {
    fn matches(&self, event: &Event) -> bool {
        event.matches(&self.event_type, &self.event_source)
    }
}

/// Listener table shared between a container and its extension's API handle.
pub type ListenerTable = Arc<Mutex<Vec<ListenerEntry>>>;

pub fn new_listener_table() -> ListenerTable {
    Arc::new(Mutex::new(Vec::new()))
}

// ----------------------------------------------------------------------------
// Container State
// ----------------------------------------------------------------------------

/// Container lifecycle. Only `Registered` containers receive events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionState {
    Registering,
    Registered,
    Stopped,
}

// ----------------------------------------------------------------------------
// Extension Container
// ----------------------------------------------------------------------------

/// Hosts one extension on its own serial lane.
pub struct ExtensionContainer {
    name: String,
    friendly_name: String,
    version: String,
    state: Mutex<ExtensionState>,
    listeners: ListenerTable,
    processor: SerialWorkDispatcher<Arc<Event>>,
    standard_states: Mutex<SharedStateManager>,
    xdm_states: Mutex<SharedStateManager>,
}

impl ExtensionContainer {
    /// Create the container and start its lane. The extension's
    /// `on_registered` hook runs first; its outcome is reported through
    /// `ready`, and events offered before it completes stay queued.
    pub fn new(
        extension: Box<dyn Extension>,
        listeners: ListenerTable,
        ready: oneshot::Sender<Result<(), ExtensionError>>,
        logger: LoggerWrapper,
    ) -> Arc<Self> {
        let name = extension.name().to_string();
        let friendly_name = extension.friendly_name().to_string();
        let version = extension.version().to_string();
        let tag = format!("container.{name}");

        let handler = ContainerWorkHandler {
            extension,
            listeners: listeners.clone(),
            logger: logger.clone(),
            tag: tag.clone(),
            ready: Some(ready),
        };

        let container = Arc::new(Self {
            state: Mutex::new(ExtensionState::Registering),
            listeners,
            processor: SerialWorkDispatcher::new(tag.clone(), Box::new(handler), logger.clone()),
            standard_states: Mutex::new(SharedStateManager::new(
                format!("{tag}.states.standard"),
                logger.clone(),
            )),
            xdm_states: Mutex::new(SharedStateManager::new(
                format!("{tag}.states.xdm"),
                logger,
            )),
            name,
            friendly_name,
            version,
        });

        container.processor.start();
        container
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn state(&self) -> ExtensionState {
        *self.state.lock().unwrap()
    }

    pub fn set_state(&self, state: ExtensionState) {
        *self.state.lock().unwrap() = state;
    }

    /// Queue an event for this extension's listeners.
    pub fn offer(&self, event: Arc<Event>) -> bool {
        self.processor.offer(event)
    }

    /// Append a listener. No de-duplication; invocation follows registration
    /// order.
    pub fn register_listener(
        &self,
        event_type: impl Into<String>,
        event_source: impl Into<String>,
        listener: EventListener,
    ) {
        self.listeners.lock().unwrap().push(ListenerEntry {
            event_type: event_type.into(),
            event_source: event_source.into(),
            listener,
        });
    }

    pub fn set_shared_state(
        &self,
        state_type: SharedStateType,
        version: EventNumber,
        data: Option<Arc<EventData>>,
    ) -> SharedStateStatus {
        self.states(state_type).lock().unwrap().set(version, data)
    }

    pub fn get_shared_state(
        &self,
        state_type: SharedStateType,
        version: EventNumber,
    ) -> Option<Arc<EventData>> {
        self.states(state_type).lock().unwrap().get(version)
    }

    pub fn clear_shared_states(&self, state_type: SharedStateType) {
        self.states(state_type).lock().unwrap().clear();
    }

    fn states(&self, state_type: SharedStateType) -> &Mutex<SharedStateManager> {
        match state_type {
            SharedStateType::Standard => &self.standard_states,
            SharedStateType::Xdm => &self.xdm_states,
        }
    }

    /// Stop the lane: queued events are dropped, `on_unregistered` runs, and
    /// further offers are refused.
    pub async fn stop(&self) {
        self.set_state(ExtensionState::Stopped);
        self.processor.shutdown().await;
    }
}

// ----------------------------------------------------------------------------
// Container Work Handler
// ----------------------------------------------------------------------------

struct ContainerWorkHandler {
    extension: Box<dyn Extension>,
    listeners: ListenerTable,
    logger: LoggerWrapper,
    tag: String,
    ready: Option<oneshot::Sender<Result<(), ExtensionError>>>,
}

#[async_trait]
impl WorkHandler<Arc<Event>> for ContainerWorkHandler {
    async fn on_start(&mut self) -> Result<(), HubError> {
        let result = self.extension.on_registered().await;
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(result.clone());
        }
        result.map_err(HubError::Extension)
    }

    async fn handle(&mut self, event: Arc<Event>) {
        let matching: Vec<EventListener> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .iter()
                .filter(|entry| entry.matches(&event))
                .map(|entry| entry.listener.clone())
                .collect()
        };

        self.logger.verbose(
            &self.tag,
            &format!(
                "delivering event {} ({}/{}) to {} listeners",
                event.name(),
                event.event_type(),
                event.source(),
                matching.len()
            ),
        );

        for listener in matching {
            let event = event.clone();
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                self.logger
                    .error(&self.tag, "listener panicked; continuing with next listener");
            }
        }
    }

    async fn on_shutdown(&mut self) {
        self.extension.on_unregistered().await;
        self.logger.debug(&self.tag, "extension unregistered");
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
