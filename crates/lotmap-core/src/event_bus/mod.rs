//! # Event Bus Module
//!
//! Decoupled publish/subscribe between the map controller and whatever
//! hosts it (a UI shell, a CLI, tests):
//! - the controller publishes drawing and data events after the store confirms them
//! - [`EventBusNotifier`](crate::notify::EventBusNotifier) publishes operator notifications
//! - subscribers filter by [`EventCategory`]
//!
//! ## Usage
//!
//! ```rust
//! use lotmap_core::event_bus::{AppEvent, DrawingEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Drawing]),
//!     |event| {
//!         if let AppEvent::Drawing(e) = event {
//!             println!("{}", e.description());
//!         }
//!     },
//! );
//!
//! bus.publish(AppEvent::Drawing(DrawingEvent::Started));
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
