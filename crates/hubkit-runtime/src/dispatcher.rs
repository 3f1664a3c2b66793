//! Serial work dispatcher
//!
//! The single-consumer ordered queue behind every lane in the runtime. One
//! instance drains the hub's global event stream; every extension container
//! owns another for its own deliveries. At most one handler invocation is in
//! flight per dispatcher, and items are processed strictly in offer order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use hubkit_core::internal::LoggerWrapper;
use hubkit_core::HubError;

// ----------------------------------------------------------------------------
// Work Handler
// ----------------------------------------------------------------------------

/// The consumer driven by a [`SerialWorkDispatcher`].
///
/// `on_start` runs exactly once before the first item is handled; items
/// offered in the meantime stay queued. Returning an error from `on_start`
/// shuts the dispatcher down and discards the queue. `on_shutdown` runs
/// exactly once when the dispatcher shuts down after a successful start.
#[async_trait]
pub trait WorkHandler<T>: Send {
    async fn on_start(&mut self) -> Result<(), HubError> {
        Ok(())
    }

    async fn handle(&mut self, item: T);

    async fn on_shutdown(&mut self) {}
}

// ----------------------------------------------------------------------------
// Dispatcher State
// ----------------------------------------------------------------------------

/// Lifecycle of a dispatcher. `Shutdown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    NotStarted,
    Active,
    Paused,
    Shutdown,
}

struct DispatcherInner<T> {
    state: Mutex<DispatcherState>,
    queue: Mutex<VecDeque<T>>,
    wake: Notify,
}

// ----------------------------------------------------------------------------
// Serial Work Dispatcher
// ----------------------------------------------------------------------------

/// Single-consumer FIFO queue driving one [`WorkHandler`] on its own task.
pub struct SerialWorkDispatcher<T> {
    name: String,
    logger: LoggerWrapper,
    inner: Arc<DispatcherInner<T>>,
    handler: Mutex<Option<Box<dyn WorkHandler<T>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> SerialWorkDispatcher<T> {
    pub fn new(
        name: impl Into<String>,
        handler: Box<dyn WorkHandler<T>>,
        logger: LoggerWrapper,
    ) -> Self {
        Self {
            name: name.into(),
            logger,
            inner: Arc::new(DispatcherInner {
                state: Mutex::new(DispatcherState::NotStarted),
                queue: Mutex::new(VecDeque::new()),
                wake: Notify::new(),
            }),
            handler: Mutex::new(Some(handler)),
            worker: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> DispatcherState {
        *self.inner.state.lock().unwrap()
    }

    /// Enqueue an item. Returns `false` once the dispatcher has shut down.
    pub fn offer(&self, item: T) -> bool {
        {
            let state = self.inner.state.lock().unwrap();
            if *state == DispatcherState::Shutdown {
                return false;
            }
            self.inner.queue.lock().unwrap().push_back(item);
        }
        self.inner.wake.notify_one();
        true
    }

    /// Run the handler's initial job, then begin draining. Valid only from
    /// `NotStarted`; later calls are ignored.
    pub fn start(&self) -> bool {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state != DispatcherState::NotStarted {
                self.logger.warning(
                    &self.name,
                    &format!("start ignored in state {:?}", *state),
                );
                return false;
            }
            *state = DispatcherState::Active;
        }

        let handler = match self.handler.lock().unwrap().take() {
            Some(handler) => handler,
            None => return false,
        };

        let worker = tokio::spawn(run_worker(
            self.name.clone(),
            self.logger.clone(),
            self.inner.clone(),
            handler,
        ));
        *self.worker.lock().unwrap() = Some(worker);
        true
    }

    /// Halt draining. Items continue to be accepted.
    pub fn pause(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if *state == DispatcherState::Active {
            *state = DispatcherState::Paused;
        }
        drop(state);
        self.inner.wake.notify_one();
    }

    /// Re-arm draining after a pause.
    pub fn resume(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if *state == DispatcherState::Paused {
            *state = DispatcherState::Active;
        }
        drop(state);
        self.inner.wake.notify_one();
    }

    /// Drop queued items, refuse future offers, and run the final job exactly
    /// once. An in-flight handler invocation completes first.
    pub async fn shutdown(&self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state == DispatcherState::Shutdown {
                return;
            }
            *state = DispatcherState::Shutdown;
        }

        let dropped = {
            let mut queue = self.inner.queue.lock().unwrap();
            let dropped = queue.len();
            queue.clear();
            dropped
        };
        if dropped > 0 {
            self.logger.debug(
                &self.name,
                &format!("dropped {dropped} queued items on shutdown"),
            );
        }
        self.inner.wake.notify_one();

        let worker = self.worker.lock().unwrap().take();
        if let Some(worker) = worker {
            let _ = worker.await;
        } else {
            // Never started: the handler was never handed to a worker, so the
            // final job runs here.
            let handler = self.handler.lock().unwrap().take();
            if let Some(mut handler) = handler {
                handler.on_shutdown().await;
            }
        }
    }
}

async fn run_worker<T: Send>(
    name: String,
    logger: LoggerWrapper,
    inner: Arc<DispatcherInner<T>>,
    mut handler: Box<dyn WorkHandler<T>>,
) {
    if let Err(err) = handler.on_start().await {
        logger.error(&name, &format!("initial job failed: {err}"));
        let mut state = inner.state.lock().unwrap();
        *state = DispatcherState::Shutdown;
        inner.queue.lock().unwrap().clear();
        return;
    }

    enum Step<T> {
        Run(T),
        Wait,
        Exit,
    }

    loop {
        let step = {
            let state = inner.state.lock().unwrap();
            match *state {
                DispatcherState::Shutdown => Step::Exit,
                DispatcherState::Paused => Step::Wait,
                _ => match inner.queue.lock().unwrap().pop_front() {
                    Some(item) => Step::Run(item),
                    None => Step::Wait,
                },
            }
        };

        match step {
            Step::Run(item) => handler.handle(item).await,
            Step::Wait => inner.wake.notified().await,
            Step::Exit => break,
        }
    }

    handler.on_shutdown().await;
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
