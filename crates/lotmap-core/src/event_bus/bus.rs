//! Event bus implementation.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(&AppEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for async receivers.
    pub channel_capacity: usize,
    /// Keep the most recent events for inspection.
    pub enable_history: bool,
    /// Maximum number of events retained in history.
    pub max_history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
        }
    }
}

/// Publish/subscribe bus for drawing, data, and notification events.
///
/// Synchronous handlers run on the publishing thread; async consumers can
/// take a broadcast [`receiver`](EventBus::receiver) instead.
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    history: RwLock<VecDeque<AppEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Publish an event to all matching handlers and async receivers.
    ///
    /// Returns how many handlers and receivers saw the event. Publishing
    /// with nobody listening is not an error.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::trace!("Publishing {}", event.description());

        if self.config.enable_history {
            let mut history = self.history.write();
            history.push_back(event.clone());
            while history.len() > self.config.max_history_size {
                history.pop_front();
            }
        }

        let mut delivered = 0;
        {
            let handlers = self.handlers.read();
            for (filter, handler) in handlers.values() {
                if filter.matches(&event) {
                    handler(&event);
                    delivered += 1;
                }
            }
        }

        delivered + self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe with a synchronous handler.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for polling events from an async task.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Recent events, oldest first. Empty unless history is enabled.
    pub fn history(&self) -> Vec<AppEvent> {
        self.history.read().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
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
            .field("config", &self.config)
            .finish()
    }
}
