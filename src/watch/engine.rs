use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use super::poll::poll_cycle;
use super::PollOutcome;
use super::Scheduler;
use super::TimerHandle;
use super::WatchEvent;
use super::WatchRegistry;
use super::WatchState;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::request::RequestHandler;
use crate::Settings;
use crate::TxnDispatcher;
use crate::TxnQuery;
use crate::TxnService;
use crate::WatchOptions;

/// Periodically re-reads a set of watched keys through batched transactions.
///
/// Each engine owns its registry and exactly one scheduler; several engines
/// can run side by side without sharing state.
///
/// # Example
/// ```rust,ignore
/// let engine = WatchEngine::new(WatchOptions::default(), Arc::new(dispatcher));
/// let mut events = engine.subscribe();
/// engine.register_keys(["app/flags/a", "app/flags/b"]);
/// engine.start();
/// while let Ok(event) = events.recv().await {
///     println!("{:?}", event);
/// }
/// ```
pub struct WatchEngine<D: TxnDispatcher> {
    options: WatchOptions,
    query: TxnQuery,
    registry: Arc<WatchRegistry>,
    dispatcher: Arc<D>,
    scheduler: Scheduler,
    events: broadcast::Sender<WatchEvent>,
}

impl<D: TxnDispatcher> WatchEngine<D> {
    pub fn new(
        options: WatchOptions,
        dispatcher: Arc<D>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            options,
            query: TxnQuery::default(),
            registry: Arc::new(WatchRegistry::new()),
            dispatcher,
            scheduler: Scheduler::new(),
            events,
        }
    }

    /// Query parameters attached to every transaction of this engine
    pub fn with_query(
        mut self,
        query: TxnQuery,
    ) -> Self {
        self.query = query;
        self
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn register_key(
        &self,
        key: impl Into<String>,
    ) {
        self.registry.register(key);
    }

    pub fn register_keys<I, K>(
        &self,
        keys: I,
    ) where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.registry.register_many(keys);
    }

    pub fn deregister_key(
        &self,
        key: &str,
    ) {
        self.registry.deregister(key);
    }

    pub fn deregister_keys<I, K>(
        &self,
        keys: I,
    ) where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.registry.deregister_many(keys);
    }

    /// Snapshot of every watched key and its lock state
    pub fn get_state(&self) -> HashMap<String, WatchState> {
        self.registry.snapshot()
    }

    /// Receive the events of every subsequent poll cycle
    pub fn subscribe(&self) -> broadcast::Receiver<WatchEvent> {
        self.events.subscribe()
    }

    /// Start polling every `iteration_time`. Idempotent.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> TimerHandle {
        if let Some(handle) = self.scheduler.current() {
            return handle;
        }

        let registry = self.registry.clone();
        let dispatcher = self.dispatcher.clone();
        let query = self.query.clone();
        let events = self.events.clone();

        let handle = self.scheduler.start(self.options.iteration_time, move || {
            let registry = registry.clone();
            let dispatcher = dispatcher.clone();
            let query = query.clone();
            let events = events.clone();
            async move {
                poll_cycle(&registry, dispatcher.as_ref(), &query, &events).await;
            }
        });
        info!(timer_id = handle.id(), keys = self.registry.len(), "watch engine started");
        handle
    }

    /// Stop scheduling new cycles. In-flight cycles run to completion.
    pub fn stop(&self) {
        if self.scheduler.stop() {
            info!("watch engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Run one poll cycle right away, independent of the timer
    pub async fn poll_once(&self) -> PollOutcome {
        poll_cycle(&self.registry, self.dispatcher.as_ref(), &self.query, &self.events).await
    }
}

impl<H: RequestHandler> WatchEngine<TxnService<H>> {
    /// Engine talking to the agent described by `settings` through `handler`
    pub fn from_settings(
        settings: &Settings,
        handler: Arc<H>,
    ) -> Self {
        let dispatcher = Arc::new(TxnService::new(&settings.client, handler));
        let query = TxnQuery {
            dc: settings.client.datacenter.clone(),
        };
        WatchEngine::new(settings.watch.options(), dispatcher).with_query(query)
    }
}
