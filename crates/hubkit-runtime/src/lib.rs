//! Hubkit Runtime Engine
//!
//! This crate contains the event hub engine:
//! - [`EventHub`]: the façade and single serialization point for dispatch,
//!   registration, shared state, and response listeners
//! - [`SerialWorkDispatcher`]: the ordered single-consumer lane primitive
//! - [`ExtensionContainer`]: one isolated lane plus state stores per
//!   extension
//! - [`SharedStateManager`]: the versioned shared-state store
//!
//! This is the "engine" of hubkit; `hubkit-core` provides the stable API
//! definitions extensions are written against.

mod api;
pub mod builder;
pub mod container;
pub mod dispatcher;
pub mod history;
pub mod hub;
pub mod response;
pub mod shared_state;

pub use builder::EventHubBuilder;
pub use container::{ExtensionContainer, ExtensionState, ListenerEntry};
pub use dispatcher::{DispatcherState, SerialWorkDispatcher, WorkHandler};
pub use history::EventHistory;
pub use hub::{EventHub, HubStats, EVENT_HUB_NAME};
pub use response::ResponseListenerRegistry;
pub use shared_state::{SharedStateManager, SharedStateStatus};

// Re-export core types for convenience
pub use hubkit_core::{
    event_source, event_type, Event, EventBuilder, EventData, EventListener, EventNumber,
    Extension, ExtensionApi, ExtensionError, ExtensionFactory, HubConfig, HubError, HubResult,
    RegistrationError, ResponseCallback, SharedStateType, Timestamp, Value, HUB_VERSION,
    VERSION_LATEST,
};
