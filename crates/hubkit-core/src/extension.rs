//! Extension contract
//!
//! Feature modules implement [`Extension`] and are handed an [`ExtensionApi`]
//! at construction. Registering listeners, publishing shared state, and
//! dispatching events all go through that handle, so extensions never reach
//! into the runtime directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ExtensionError, HubError};
use crate::event::Event;
use crate::types::SharedStateType;
use crate::value::EventData;

// ----------------------------------------------------------------------------
// Callback Types
// ----------------------------------------------------------------------------

/// Listener invoked for every matching event on the owning extension's lane.
pub type EventListener = Arc<dyn Fn(Arc<Event>) + Send + Sync>;

/// One-shot callback for a response listener. Receives the response event or
/// `HubError::CallbackTimeout` when the deadline elapses, never both.
pub type ResponseCallback = Box<dyn FnOnce(Result<Arc<Event>, HubError>) + Send>;

/// Constructs an extension given its API handle.
pub type ExtensionFactory =
    Box<dyn FnOnce(Arc<dyn ExtensionApi>) -> Result<Box<dyn Extension>, ExtensionError> + Send>;

// ----------------------------------------------------------------------------
// Extension
// ----------------------------------------------------------------------------

/// A feature module hosted by the hub.
///
/// The runtime gives every extension its own serial lane: `on_registered`,
/// `on_unregistered`, and all listener callbacks run there, one at a time. A
/// slow extension stalls only itself.
#[async_trait]
pub trait Extension: Send {
    /// Unique, non-blank, case-sensitive identity of this extension.
    fn name(&self) -> &str;

    /// Display name used in the hub's shared-state snapshot.
    fn friendly_name(&self) -> &str {
        self.name()
    }

    /// Version advertised in the hub's shared-state snapshot.
    fn version(&self) -> &str;

    /// Called on the extension's lane once registration is underway. Events
    /// are queued but not delivered until this returns `Ok`. Returning an
    /// error stops the container and discards queued events.
    async fn on_registered(&mut self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Called on the extension's lane as its container shuts down.
    async fn on_unregistered(&mut self) {}
}

// ----------------------------------------------------------------------------
// Extension API
// ----------------------------------------------------------------------------

/// Handle through which an extension talks back to the hub.
///
/// State operations complete when the hub lane has processed them, so a
/// `create_shared_state` followed by a `get_shared_state` on the same handle
/// observes the write.
#[async_trait]
pub trait ExtensionApi: Send + Sync {
    /// Register a listener for the given type/source pair. `"*"` is a
    /// wildcard; comparison is case-insensitive. Listeners are invoked in
    /// registration order and are never de-duplicated.
    fn register_event_listener(&self, event_type: &str, event_source: &str, listener: EventListener);

    /// Publish shared state for the owning extension. `None` data reserves
    /// the version as PENDING; a later call with data resolves it. Returns
    /// `Ok(false)` for stale versions.
    async fn create_shared_state(
        &self,
        state_type: SharedStateType,
        data: Option<EventData>,
        event: Option<&Event>,
    ) -> Result<bool, ExtensionError>;

    /// Read another extension's shared state as of `event`, or the latest
    /// when `event` is `None`.
    async fn get_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
        event: Option<&Event>,
    ) -> Result<Option<EventData>, ExtensionError>;

    /// Drop every shared state version the owning extension has published.
    async fn clear_shared_states(&self, state_type: SharedStateType)
        -> Result<bool, ExtensionError>;

    /// Dispatch an event through the hub.
    async fn dispatch(&self, event: Event);
}
