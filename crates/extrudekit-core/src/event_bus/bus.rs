//! Event Bus implementation.
//!
//! One bus per application context; there is no process-wide instance.
//! Synchronous handlers run on the publishing task; async hosts poll a
//! broadcast receiver instead. The bus also remembers the most recent
//! progress milestone so a host that attaches mid-operation can draw the
//! indicator without waiting for the next one.

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory, ProgressEvent};

/// Broadcast capacity when none is given
pub const DEFAULT_CAPACITY: usize = 256;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", &self.0.simple().to_string()[..8])
    }
}

/// Which events a handler wants
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Any of these categories
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn only(category: EventCategory) -> Self {
        EventFilter::Categories(vec![category])
    }

    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Box<dyn Fn(AppEvent) + Send + Sync>;

/// Failure to deliver an event
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// Neither a handler nor a receiver saw the event
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Event bus owned by one application context
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, Handler)>>,
    progress: RwLock<Option<ProgressEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus whose broadcast receivers may lag by up to `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            progress: RwLock::new(None),
        }
    }

    /// Publish an event to handlers and receivers
    ///
    /// Returns how many broadcast receivers will see the event. Publishing
    /// with nobody listening is not a fault for the core, so callers usually
    /// discard the `NoSubscribers` error.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("publish {}", event.description());

        if let AppEvent::Progress(milestone) = &event {
            *self.progress.write() = (!milestone.is_hidden()).then(|| milestone.clone());
        }

        let handlers = self.handlers.read();
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(event.clone());
            }
        }

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if handlers.is_empty() => Err(EventBusError::NoSubscribers),
            Err(_) => Ok(0),
        }
    }

    /// Register a synchronous handler
    ///
    /// The handler must not subscribe or unsubscribe from inside itself.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Remove a handler; false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// A receiver for polling events from a tokio task
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// The milestone currently on display, `None` once hidden
    pub fn current_progress(&self) -> Option<ProgressEvent> {
        self.progress.read().clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("progress", &self.current_progress())
            .finish()
    }
}
