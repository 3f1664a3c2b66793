//! Extension API handle
//!
//! The concrete [`ExtensionApi`] implementation handed to every extension at
//! construction. Listener registrations go straight into the container's
//! table; everything else round-trips the hub lane.

use std::sync::OnceLock;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use hubkit_core::internal::LoggerWrapper;
use hubkit_core::{
    Event, EventData, EventListener, ExtensionApi, ExtensionError, SharedStateType,
};

use crate::container::{ListenerEntry, ListenerTable};
use crate::hub::HubRequest;

const TAG: &str = "hub.api";

pub(crate) struct ExtensionApiHandle {
    hub_tx: mpsc::Sender<HubRequest>,
    listeners: ListenerTable,
    name: OnceLock<String>,
    logger: LoggerWrapper,
}

impl ExtensionApiHandle {
    pub(crate) fn new(
        hub_tx: mpsc::Sender<HubRequest>,
        listeners: ListenerTable,
        logger: LoggerWrapper,
    ) -> Self {
        Self {
            hub_tx,
            listeners,
            name: OnceLock::new(),
            logger,
        }
    }

    /// Attach the extension's declared name once registration has validated
    /// it. State operations fail until this happens.
    pub(crate) fn bind_name(&self, name: &str) {
        let _ = self.name.set(name.to_string());
    }

    fn bound_name(&self) -> Result<&str, ExtensionError> {
        self.name.get().map(String::as_str).ok_or_else(|| {
            ExtensionError::UnexpectedError("extension is not attached to the hub yet".to_string())
        })
    }

    async fn round_trip<T>(
        &self,
        request: HubRequest,
        reply: oneshot::Receiver<Result<T, ExtensionError>>,
    ) -> Result<T, ExtensionError> {
        self.hub_tx.send(request).await.map_err(|_| {
            ExtensionError::UnexpectedError("hub lane is no longer running".to_string())
        })?;
        reply.await.map_err(|_| {
            ExtensionError::UnexpectedError("hub lane dropped the request".to_string())
        })?
    }
}

#[async_trait]
impl ExtensionApi for ExtensionApiHandle {
    fn register_event_listener(
        &self,
        event_type: &str,
        event_source: &str,
        listener: EventListener,
    ) {
        self.listeners.lock().unwrap().push(ListenerEntry {
            event_type: event_type.to_string(),
            event_source: event_source.to_string(),
            listener,
        });
    }

    async fn create_shared_state(
        &self,
        state_type: SharedStateType,
        data: Option<EventData>,
        event: Option<&Event>,
    ) -> Result<bool, ExtensionError> {
        let extension_name = self.bound_name()?.to_string();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.round_trip(
            HubRequest::SetSharedState {
                state_type,
                extension_name,
                data,
                event_id: event.map(|e| e.id().to_string()),
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    async fn get_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
        event: Option<&Event>,
    ) -> Result<Option<EventData>, ExtensionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.round_trip(
            HubRequest::GetSharedState {
                state_type,
                extension_name: extension_name.to_string(),
                event_id: event.map(|e| e.id().to_string()),
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    async fn clear_shared_states(
        &self,
        state_type: SharedStateType,
    ) -> Result<bool, ExtensionError> {
        let extension_name = self.bound_name()?.to_string();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.round_trip(
            HubRequest::ClearSharedState {
                state_type,
                extension_name,
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    async fn dispatch(&self, event: Event) {
        if self
            .hub_tx
            .send(HubRequest::Dispatch { event })
            .await
            .is_err()
        {
            self.logger
                .warning(TAG, "dispatch dropped: hub lane is no longer running");
        }
    }
}
