//! Notification collaborator.
//!
//! Surfaces success/failure of persistence calls to the operator. Only the
//! controller notifies; the pure geometry and aggregation code never does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::event_bus::{AppEvent, EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Receives operator-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Success, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Error, message));
    }
}

/// Publishes notifications as [`AppEvent::Notification`] on an event bus.
#[derive(Debug, Clone)]
pub struct EventBusNotifier {
    bus: Arc<EventBus>,
}

impl EventBusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl Notifier for EventBusNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::error!("{}", notification.message),
            NotificationLevel::Warning => tracing::warn!("{}", notification.message),
            _ => tracing::info!("{}", notification.message),
        }
        self.bus.publish(AppEvent::Notification(notification));
    }
}
