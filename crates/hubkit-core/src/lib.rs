//! Hubkit Core
//!
//! This crate provides the event model, capability traits, and public API
//! surface for the hubkit event runtime. It is intentionally free of any
//! dispatch machinery so it can be depended on by extensions, test harnesses,
//! and host applications without pulling in the runtime.
//!
//! ## Architecture Overview
//!
//! Hubkit follows a clean split across crates:
//!
//! ### hubkit-core: The Stable Surface
//!
//! This crate defines everything the rest of the system agrees on:
//!
//! - **Event model**: the [`event`] module holds the immutable [`Event`]
//!   record and its builder; the [`value`] module holds the typed payload
//!   representation.
//! - **Extension contract**: the [`extension`] module defines the
//!   [`Extension`] trait implemented by feature modules and the
//!   [`ExtensionApi`] handle the runtime gives each of them.
//! - **Capabilities**: logging ([`logging`]), time ([`time`]), and delayed
//!   task scheduling ([`scheduler`]) are traits the runtime consumes, so the
//!   hub functions the same under a no-op logger or a test clock.
//! - **Errors and configuration**: [`errors`] and [`config`].
//!
//! ### hubkit-runtime: The Engine
//!
//! The runtime crate owns the hub lane, the serial work dispatchers, the
//! extension containers, and the versioned shared-state store. It depends on
//! this crate, never the other way around.
//!
//! ### hubkit-harness: Test Plumbing
//!
//! Recording extensions, event collectors, and a capture logger shared by
//! unit and integration tests.

pub mod config;
pub mod errors;
pub mod event;
pub mod extension;
pub mod logging;
pub mod scheduler;
pub mod time;
pub mod types;
pub mod value;

pub use config::{ChannelConfig, HubConfig};
pub use errors::{ExtensionError, HubError, HubResult, RegistrationError};
pub use event::{event_source, event_type, Event, EventBuilder};
pub use extension::{
    EventListener, Extension, ExtensionApi, ExtensionFactory, ResponseCallback,
};
pub use types::{EventNumber, SharedStateType, Timestamp, VERSION_LATEST};
pub use value::{EventData, Value};

/// Version string reported in the hub's own shared state.
pub const HUB_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lower-level plumbing re-exported for the runtime and harness crates.
pub mod internal {
    pub use crate::logging::{ConsoleLogger, HubLogger, LogLevel, LoggerWrapper, NoOpLogger};
    pub use crate::scheduler::{ScheduledTask, ScheduledTaskHandle, TaskScheduler, TokioScheduler};
    pub use crate::time::{SystemTimeSource, TimeSource};
}
