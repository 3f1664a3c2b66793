//! The event hub
//!
//! The hub lane is the single serialization point for every mutating
//! operation: dispatch acceptance, extension registration, shared-state
//! reads and writes, and response-listener installation all flow through one
//! request channel drained by [`EventHubTask`]. Ordered fan-out to extension
//! lanes happens on a separate serial dispatcher so a slow extension never
//! stalls acceptance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use hubkit_core::internal::{LoggerWrapper, TaskScheduler};
use hubkit_core::{
    event_source, event_type, Event, EventData, EventListener, EventNumber, Extension,
    ExtensionError, ExtensionFactory, HubError, HubResult, RegistrationError, ResponseCallback,
    SharedStateType, Value, HUB_VERSION, VERSION_LATEST,
};

use crate::api::ExtensionApiHandle;
use crate::container::{new_listener_table, ExtensionContainer, ExtensionState};
use crate::dispatcher::{SerialWorkDispatcher, WorkHandler};
use crate::history::EventHistory;
use crate::response::ResponseListenerRegistry;
use crate::shared_state::SharedStateStatus;

const TAG: &str = "hub";

/// Registered name of the built-in placeholder extension that hosts
/// unattributed listeners and the hub's own shared state.
pub const EVENT_HUB_NAME: &str = "com.adobe.module.eventhub";

const EVENT_HUB_FRIENDLY_NAME: &str = "EventHub";

type Registry = Arc<RwLock<HashMap<String, Arc<ExtensionContainer>>>>;

// ----------------------------------------------------------------------------
// Hub Requests
// ----------------------------------------------------------------------------

/// Messages processed by the hub lane, one at a time, in arrival order.
pub(crate) enum HubRequest {
    Dispatch {
        event: Event,
    },
    RegisterExtension {
        factory: ExtensionFactory,
        completion: oneshot::Sender<Result<(), RegistrationError>>,
    },
    MarkRegistered {
        name: String,
        result: Result<(), ExtensionError>,
        completion: oneshot::Sender<Result<(), RegistrationError>>,
    },
    UnregisterExtension {
        name: String,
        completion: oneshot::Sender<Result<(), RegistrationError>>,
    },
    RegisterResponseListener {
        trigger_event_id: String,
        timeout: Duration,
        callback: ResponseCallback,
    },
    RegisterListener {
        event_type: String,
        event_source: String,
        listener: EventListener,
    },
    SetSharedState {
        state_type: SharedStateType,
        extension_name: String,
        data: Option<EventData>,
        event_id: Option<String>,
        reply: oneshot::Sender<Result<bool, ExtensionError>>,
    },
    GetSharedState {
        state_type: SharedStateType,
        extension_name: String,
        event_id: Option<String>,
        reply: oneshot::Sender<Result<Option<EventData>, ExtensionError>>,
    },
    ClearSharedState {
        state_type: SharedStateType,
        extension_name: String,
        reply: oneshot::Sender<Result<bool, ExtensionError>>,
    },
    Start,
    Shutdown {
        completion: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
    History {
        reply: oneshot::Sender<Vec<(EventNumber, Arc<Event>)>>,
    },
}

// ----------------------------------------------------------------------------
// Hub Statistics
// ----------------------------------------------------------------------------

/// Counters maintained by the hub lane, snapshotted for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct HubStats {
    pub events_accepted: u64,
    pub events_dropped: u64,
    pub extensions_registered: u64,
    pub extensions_unregistered: u64,
    pub shared_states_published: u64,
    pub response_listeners_registered: u64,
}

// ----------------------------------------------------------------------------
// Hub Event Handler (event-dispatch lane)
// ----------------------------------------------------------------------------

struct HubEventHandler {
    registry: Registry,
    response_listeners: Arc<ResponseListenerRegistry>,
    history: Arc<Mutex<EventHistory>>,
    logger: LoggerWrapper,
}

#[async_trait]
impl WorkHandler<(EventNumber, Arc<Event>)> for HubEventHandler {
    async fn handle(&mut self, item: (EventNumber, Arc<Event>)) {
        let (number, event) = item;
        if event.response_id().is_some() {
            self.response_listeners.notify(&event);
        }

        let containers: Vec<Arc<ExtensionContainer>> =
            self.registry.read().unwrap().values().cloned().collect();
        for container in containers {
            if container.state() != ExtensionState::Registered {
                continue;
            }
            if !container.offer(event.clone()) {
                self.logger.warning(
                    TAG,
                    &format!(
                        "extension {} refused event #{number}: lane has shut down",
                        container.name()
                    ),
                );
            }
        }

        if event.mask().is_some() {
            self.history.lock().unwrap().record(number, event);
        }
    }
}

// ----------------------------------------------------------------------------
// Event Hub Handle
// ----------------------------------------------------------------------------

/// Cloneable handle to a running event hub.
///
/// Constructed by [`crate::EventHubBuilder`]; there is no process-wide
/// singleton. Dropping every handle does not stop the hub; call
/// [`EventHub::shutdown`].
#[derive(Clone)]
pub struct EventHub {
    request_tx: mpsc::Sender<HubRequest>,
    logger: LoggerWrapper,
}

impl EventHub {
    pub(crate) fn new(request_tx: mpsc::Sender<HubRequest>, logger: LoggerWrapper) -> Self {
        Self { request_tx, logger }
    }

    /// Introduce an event. Fire-and-forget: the event is accepted in call
    /// order and assigned the next event number on the hub lane.
    pub async fn dispatch(&self, event: Event) {
        if self
            .request_tx
            .send(HubRequest::Dispatch { event })
            .await
            .is_err()
        {
            self.logger
                .warning(TAG, "dispatch dropped: hub lane is no longer running");
        }
    }

    /// Construct and register an extension. Resolves once the extension's
    /// `on_registered` hook has completed and the container receives events.
    pub async fn register_extension(
        &self,
        factory: ExtensionFactory,
    ) -> Result<(), RegistrationError> {
        let (completion_tx, completion_rx) = oneshot::channel();
        if self
            .request_tx
            .send(HubRequest::RegisterExtension {
                factory,
                completion: completion_tx,
            })
            .await
            .is_err()
        {
            return Err(RegistrationError::Unknown);
        }
        completion_rx.await.unwrap_or(Err(RegistrationError::Unknown))
    }

    /// Remove a registered extension, running its `on_unregistered` hook.
    pub async fn unregister_extension(&self, name: &str) -> Result<(), RegistrationError> {
        let (completion_tx, completion_rx) = oneshot::channel();
        if self
            .request_tx
            .send(HubRequest::UnregisterExtension {
                name: name.to_string(),
                completion: completion_tx,
            })
            .await
            .is_err()
        {
            return Err(RegistrationError::Unknown);
        }
        completion_rx.await.unwrap_or(Err(RegistrationError::Unknown))
    }

    /// Arm a one-shot listener for responses to `trigger`. The callback
    /// receives the response event or `HubError::CallbackTimeout`, never
    /// both.
    pub async fn register_response_listener(
        &self,
        trigger: &Event,
        timeout: Duration,
        callback: ResponseCallback,
    ) {
        let send = self
            .request_tx
            .send(HubRequest::RegisterResponseListener {
                trigger_event_id: trigger.id().to_string(),
                timeout,
                callback,
            })
            .await;
        if let Err(mpsc::error::SendError(request)) = send {
            self.logger
                .warning(TAG, "response listener failed: hub lane is no longer running");
            if let HubRequest::RegisterResponseListener { callback, .. } = request {
                callback(Err(HubError::ShutDown));
            }
        }
    }

    /// Dispatch `event` and resolve with the first matching response, or
    /// `CallbackTimeout` when none arrives in time.
    pub async fn dispatch_with_response(
        &self,
        event: Event,
        timeout: Duration,
    ) -> HubResult<Arc<Event>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.register_response_listener(
            &event,
            timeout,
            Box::new(move |result| {
                let _ = response_tx.send(result);
            }),
        )
        .await;
        self.dispatch(event).await;
        response_rx.await.unwrap_or(Err(HubError::ShutDown))
    }

    /// Attach an unattributed listener, hosted by the hub's placeholder
    /// extension.
    pub async fn register_listener<F>(&self, event_type: &str, event_source: &str, listener: F)
    where
        F: Fn(Arc<Event>) + Send + Sync + 'static,
    {
        if self
            .request_tx
            .send(HubRequest::RegisterListener {
                event_type: event_type.to_string(),
                event_source: event_source.to_string(),
                listener: Arc::new(listener),
            })
            .await
            .is_err()
        {
            self.logger
                .warning(TAG, "listener dropped: hub lane is no longer running");
        }
    }

    /// Publish shared state for `extension_name`. `None` data reserves a
    /// PENDING version. Returns `Ok(false)` for stale versions.
    pub async fn set_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
        data: Option<EventData>,
        event: Option<&Event>,
    ) -> Result<bool, ExtensionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.state_request(
            HubRequest::SetSharedState {
                state_type,
                extension_name: extension_name.to_string(),
                data,
                event_id: event.map(|e| e.id().to_string()),
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    /// Read `extension_name`'s shared state as of `event`, or the latest
    /// when `event` is `None`.
    pub async fn get_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
        event: Option<&Event>,
    ) -> Result<Option<EventData>, ExtensionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.state_request(
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

    /// Drop every shared-state version `extension_name` has published for
    /// `state_type`.
    pub async fn clear_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: &str,
    ) -> Result<bool, ExtensionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.state_request(
            HubRequest::ClearSharedState {
                state_type,
                extension_name: extension_name.to_string(),
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    /// Begin draining the event queue. Events dispatched earlier are
    /// delivered now, in order.
    pub async fn start(&self) {
        let _ = self.request_tx.send(HubRequest::Start).await;
    }

    /// Stop the hub: the event queue stops draining, every extension lane is
    /// shut down (running `on_unregistered`), and the registry is cleared.
    pub async fn shutdown(&self) {
        let (completion_tx, completion_rx) = oneshot::channel();
        if self
            .request_tx
            .send(HubRequest::Shutdown {
                completion: completion_tx,
            })
            .await
            .is_ok()
        {
            let _ = completion_rx.await;
        }
    }

    /// Snapshot of the hub lane's counters.
    pub async fn stats(&self) -> HubStats {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .request_tx
            .send(HubRequest::Stats { reply: reply_tx })
            .await
            .is_err()
        {
            return HubStats::default();
        }
        reply_rx.await.unwrap_or_default()
    }

    /// Recorded `(event number, event)` pairs for masked events, oldest
    /// first.
    pub async fn event_history(&self) -> Vec<(EventNumber, Arc<Event>)> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .request_tx
            .send(HubRequest::History { reply: reply_tx })
            .await
            .is_err()
        {
            return Vec::new();
        }
        reply_rx.await.unwrap_or_default()
    }

    async fn state_request<T>(
        &self,
        request: HubRequest,
        reply: oneshot::Receiver<Result<T, ExtensionError>>,
    ) -> Result<T, ExtensionError> {
        self.request_tx.send(request).await.map_err(|_| {
            ExtensionError::UnexpectedError("hub lane is no longer running".to_string())
        })?;
        reply.await.map_err(|_| {
            ExtensionError::UnexpectedError("hub lane dropped the request".to_string())
        })?
    }
}

// ----------------------------------------------------------------------------
// Hub Lane Task
// ----------------------------------------------------------------------------

/// The task draining the hub's request channel. Owns the registry, the event
/// number counter, and the event-number map; nothing else mutates them.
pub(crate) struct EventHubTask {
    request_rx: mpsc::Receiver<HubRequest>,
    request_tx: mpsc::Sender<HubRequest>,
    registry: Registry,
    event_numbers: HashMap<String, EventNumber>,
    counter: AtomicU64,
    response_listeners: Arc<ResponseListenerRegistry>,
    dispatcher: SerialWorkDispatcher<(EventNumber, Arc<Event>)>,
    history: Arc<Mutex<EventHistory>>,
    scheduler: Arc<dyn TaskScheduler>,
    logger: LoggerWrapper,
    started: bool,
    running: bool,
    stats: HubStats,
}

impl EventHubTask {
    pub(crate) fn new(
        request_rx: mpsc::Receiver<HubRequest>,
        request_tx: mpsc::Sender<HubRequest>,
        scheduler: Arc<dyn TaskScheduler>,
        history_capacity: usize,
        logger: LoggerWrapper,
    ) -> Self {
        let registry: Registry = Arc::new(RwLock::new(HashMap::new()));
        let response_listeners = Arc::new(ResponseListenerRegistry::new(logger.clone()));
        let history = Arc::new(Mutex::new(EventHistory::new(history_capacity)));

        let handler = HubEventHandler {
            registry: registry.clone(),
            response_listeners: response_listeners.clone(),
            history: history.clone(),
            logger: logger.clone(),
        };
        let dispatcher = SerialWorkDispatcher::new("hub.events", Box::new(handler), logger.clone());

        Self {
            request_rx,
            request_tx,
            registry,
            event_numbers: HashMap::new(),
            counter: AtomicU64::new(0),
            response_listeners,
            dispatcher,
            history,
            scheduler,
            logger,
            started: false,
            running: true,
            stats: HubStats::default(),
        }
    }

    pub(crate) async fn run(mut self) {
        self.logger.debug(TAG, "hub lane running");
        while self.running {
            match self.request_rx.recv().await {
                Some(request) => self.process(request).await,
                None => break,
            }
        }
        self.logger.debug(TAG, "hub lane stopped");
    }

    async fn process(&mut self, request: HubRequest) {
        match request {
            HubRequest::Dispatch { event } => self.accept_event(event),
            HubRequest::RegisterExtension {
                factory,
                completion,
            } => self.register_extension(factory, completion),
            HubRequest::MarkRegistered {
                name,
                result,
                completion,
            } => self.mark_registered(name, result, completion),
            HubRequest::UnregisterExtension { name, completion } => {
                self.unregister_extension(name, completion)
            }
            HubRequest::RegisterResponseListener {
                trigger_event_id,
                timeout,
                callback,
            } => {
                self.stats.response_listeners_registered += 1;
                self.response_listeners.register(
                    trigger_event_id,
                    timeout,
                    callback,
                    &*self.scheduler,
                );
            }
            HubRequest::RegisterListener {
                event_type,
                event_source,
                listener,
            } => {
                let registry = self.registry.read().unwrap();
                match registry.get(EVENT_HUB_NAME) {
                    Some(container) => {
                        container.register_listener(event_type, event_source, listener)
                    }
                    None => self
                        .logger
                        .error(TAG, "placeholder extension missing; listener dropped"),
                }
            }
            HubRequest::SetSharedState {
                state_type,
                extension_name,
                data,
                event_id,
                reply,
            } => {
                let _ = reply.send(self.set_shared_state(state_type, extension_name, data, event_id));
            }
            HubRequest::GetSharedState {
                state_type,
                extension_name,
                event_id,
                reply,
            } => {
                let _ = reply.send(self.get_shared_state(state_type, extension_name, event_id));
            }
            HubRequest::ClearSharedState {
                state_type,
                extension_name,
                reply,
            } => {
                let _ = reply.send(self.clear_shared_state(state_type, extension_name));
            }
            HubRequest::Start => {
                if self.started {
                    self.logger.debug(TAG, "start ignored: already started");
                    return;
                }
                self.started = true;
                self.dispatcher.start();
                self.logger.debug(TAG, "event hub started");
                self.publish_hub_shared_state();
            }
            HubRequest::Shutdown { completion } => {
                self.shutdown().await;
                let _ = completion.send(());
            }
            HubRequest::Stats { reply } => {
                let _ = reply.send(self.stats.clone());
            }
            HubRequest::History { reply } => {
                let _ = reply.send(self.history.lock().unwrap().snapshot());
            }
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn next_number(&self) -> EventNumber {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn accept_event(&mut self, event: Event) {
        let number = self.next_number();
        self.event_numbers.insert(event.id().to_string(), number);
        self.logger.verbose(
            TAG,
            &format!(
                "accepted event #{number} {} ({}/{})",
                event.name(),
                event.event_type(),
                event.source()
            ),
        );

        if self.dispatcher.offer((number, Arc::new(event))) {
            self.stats.events_accepted += 1;
        } else {
            self.stats.events_dropped += 1;
            self.logger
                .warning(TAG, "event dropped: dispatch lane has shut down");
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    fn register_extension(
        &mut self,
        factory: ExtensionFactory,
        completion: oneshot::Sender<Result<(), RegistrationError>>,
    ) {
        let listeners = new_listener_table();
        let api = Arc::new(ExtensionApiHandle::new(
            self.request_tx.clone(),
            listeners.clone(),
            self.logger.clone(),
        ));

        let extension: Box<dyn Extension> = match factory(api.clone()) {
            Ok(extension) => extension,
            Err(err) => {
                self.logger
                    .error(TAG, &format!("extension construction failed: {err}"));
                let _ = completion.send(Err(RegistrationError::ExtensionInitializationFailure));
                return;
            }
        };

        let name = extension.name().trim().to_string();
        if name.is_empty() {
            let _ = completion.send(Err(RegistrationError::InvalidExtensionName));
            return;
        }
        if self.registry.read().unwrap().contains_key(&name) {
            let _ = completion.send(Err(RegistrationError::DuplicateExtensionName));
            return;
        }
        api.bind_name(&name);

        let (ready_tx, ready_rx) = oneshot::channel();
        let container =
            ExtensionContainer::new(extension, listeners, ready_tx, self.logger.clone());
        self.registry
            .write()
            .unwrap()
            .insert(name.clone(), container);

        // The hub lane must not block on the extension's on_registered hook;
        // a watcher task reports the outcome back as a request.
        let request_tx = self.request_tx.clone();
        tokio::spawn(async move {
            let result = match ready_rx.await {
                Ok(result) => result,
                Err(_) => Err(ExtensionError::UnexpectedError(
                    "container stopped before initialization completed".to_string(),
                )),
            };
            let _ = request_tx
                .send(HubRequest::MarkRegistered {
                    name,
                    result,
                    completion,
                })
                .await;
        });
    }

    fn mark_registered(
        &mut self,
        name: String,
        result: Result<(), ExtensionError>,
        completion: oneshot::Sender<Result<(), RegistrationError>>,
    ) {
        match result {
            Ok(()) => {
                let container = self.registry.read().unwrap().get(&name).cloned();
                match container {
                    Some(container) => {
                        container.set_state(ExtensionState::Registered);
                        self.stats.extensions_registered += 1;
                        self.logger
                            .debug(TAG, &format!("extension {name} registered"));
                        self.publish_hub_shared_state();
                        let _ = completion.send(Ok(()));
                    }
                    // Unregistered while its on_registered hook was running.
                    None => {
                        let _ = completion.send(Err(RegistrationError::Unknown));
                    }
                }
            }
            Err(err) => {
                self.logger.error(
                    TAG,
                    &format!("extension {name} failed to initialize: {err}"),
                );
                if let Some(container) = self.registry.write().unwrap().remove(&name) {
                    tokio::spawn(async move { container.stop().await });
                }
                let _ = completion.send(Err(RegistrationError::ExtensionInitializationFailure));
            }
        }
    }

    fn unregister_extension(
        &mut self,
        name: String,
        completion: oneshot::Sender<Result<(), RegistrationError>>,
    ) {
        if name == EVENT_HUB_NAME {
            // The placeholder hosts hub-internal listeners; removing it would
            // silently drop them.
            let _ = completion.send(Err(RegistrationError::ExtensionNotRegistered));
            return;
        }

        match self.registry.write().unwrap().remove(&name) {
            Some(container) => {
                self.stats.extensions_unregistered += 1;
                self.logger
                    .debug(TAG, &format!("extension {name} unregistered"));
                tokio::spawn(async move {
                    container.stop().await;
                    let _ = completion.send(Ok(()));
                });
            }
            None => {
                let _ = completion.send(Err(RegistrationError::ExtensionNotRegistered));
                return;
            }
        }
        self.publish_hub_shared_state();
    }

    // ------------------------------------------------------------------
    // Shared State
    // ------------------------------------------------------------------

    fn resolve_container(
        &self,
        extension_name: &str,
    ) -> Result<Arc<ExtensionContainer>, ExtensionError> {
        let name = extension_name.trim();
        if name.is_empty() {
            return Err(ExtensionError::BadName);
        }
        self.registry
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(ExtensionError::BadName)
    }

    fn set_shared_state(
        &mut self,
        state_type: SharedStateType,
        extension_name: String,
        data: Option<EventData>,
        event_id: Option<String>,
    ) -> Result<bool, ExtensionError> {
        let container = self.resolve_container(&extension_name)?;
        let version = event_id
            .as_deref()
            .and_then(|id| self.event_numbers.get(id).copied())
            .unwrap_or_else(|| self.next_number());

        let status = container.set_shared_state(state_type, version, data.map(Arc::new));
        match status {
            SharedStateStatus::Set => {
                self.stats.shared_states_published += 1;
                self.logger.verbose(
                    TAG,
                    &format!("{state_type} state set for {extension_name} at v{version}"),
                );
                self.dispatch_state_notification(container.name(), state_type);
                Ok(true)
            }
            SharedStateStatus::Pending => Ok(true),
            SharedStateStatus::NotSet => Ok(false),
        }
    }

    fn get_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: String,
        event_id: Option<String>,
    ) -> Result<Option<EventData>, ExtensionError> {
        let container = self.resolve_container(&extension_name)?;
        let version = event_id
            .as_deref()
            .and_then(|id| self.event_numbers.get(id).copied())
            .unwrap_or(VERSION_LATEST);
        Ok(container
            .get_shared_state(state_type, version)
            .map(|data| (*data).clone()))
    }

    fn clear_shared_state(
        &self,
        state_type: SharedStateType,
        extension_name: String,
    ) -> Result<bool, ExtensionError> {
        let container = self.resolve_container(&extension_name)?;
        container.clear_shared_states(state_type);
        Ok(true)
    }

    /// Publish a `hub.sharedState` notification through the normal dispatch
    /// path so it carries a higher event number than the state it announces.
    fn dispatch_state_notification(&mut self, owner: &str, state_type: SharedStateType) {
        let name = match state_type {
            SharedStateType::Standard => "Shared state change",
            SharedStateType::Xdm => "Shared state change (XDM)",
        };
        let mut data = EventData::new();
        data.insert("stateowner".to_string(), Value::from(owner));
        data.insert(
            "statetype".to_string(),
            Value::from(state_type.to_string()),
        );

        let event = Event::builder(name, event_type::HUB, event_source::SHARED_STATE)
            .data(data)
            .build();
        self.accept_event(event);
    }

    /// Republish the hub's own shared-state snapshot. No-op until the hub has
    /// started.
    fn publish_hub_shared_state(&mut self) {
        if !self.started {
            return;
        }
        let (hub_container, extensions) = {
            let registry = self.registry.read().unwrap();
            let Some(hub_container) = registry.get(EVENT_HUB_NAME).cloned() else {
                return;
            };
            let mut extensions = HashMap::new();
            for (name, container) in registry.iter() {
                if name.as_str() == EVENT_HUB_NAME {
                    continue;
                }
                let mut entry = HashMap::new();
                entry.insert(
                    "friendlyName".to_string(),
                    Value::from(container.friendly_name()),
                );
                entry.insert("version".to_string(), Value::from(container.version()));
                extensions.insert(container.friendly_name().to_string(), Value::Map(entry));
            }
            (hub_container, extensions)
        };

        let mut data = EventData::new();
        data.insert("version".to_string(), Value::from(HUB_VERSION));
        data.insert("extensions".to_string(), Value::Map(extensions));

        let version = self.next_number();
        let status =
            hub_container.set_shared_state(SharedStateType::Standard, version, Some(Arc::new(data)));
        if status == SharedStateStatus::Set {
            self.stats.shared_states_published += 1;
            self.dispatch_state_notification(EVENT_HUB_NAME, SharedStateType::Standard);
        }
    }

    // ------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------

    async fn shutdown(&mut self) {
        self.running = false;
        self.dispatcher.shutdown().await;

        let containers: Vec<Arc<ExtensionContainer>> = {
            let mut registry = self.registry.write().unwrap();
            registry.drain().map(|(_, container)| container).collect()
        };
        for container in containers {
            container.stop().await;
        }

        let dropped_listeners = self.response_listeners.clear();
        if dropped_listeners > 0 {
            self.logger.debug(
                TAG,
                &format!("dropped {dropped_listeners} armed response listeners"),
            );
        }
        self.event_numbers.clear();
        self.logger
            .debug(TAG, &format!("event hub shut down; stats: {:?}", self.stats));
    }
}

// ----------------------------------------------------------------------------
// Placeholder Extension
// ----------------------------------------------------------------------------

/// Built-in extension registered at hub construction. Hosts unattributed
/// listeners and publishes the hub's shared-state snapshot under
/// [`EVENT_HUB_NAME`].
pub(crate) struct HubPlaceholderExtension;

#[async_trait]
impl Extension for HubPlaceholderExtension {
    fn name(&self) -> &str {
        EVENT_HUB_NAME
    }

    fn friendly_name(&self) -> &str {
        EVENT_HUB_FRIENDLY_NAME
    }

    fn version(&self) -> &str {
        HUB_VERSION
    }
}
