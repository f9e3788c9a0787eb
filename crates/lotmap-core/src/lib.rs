//! # LotMap Core
//!
//! Core types, traits, and utilities for LotMap.
//! Provides the lot/sublot/crop data model, the wire geometry types
//! (`[longitude, latitude]` GeoJSON polygons and `[latitude, longitude]`
//! display points), the persistence and notification collaborator traits,
//! and the application event bus.

pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod model;
pub mod notify;
pub mod store;
pub mod style;
pub mod units;

pub use error::{Error, GeometryError, Result, StoreError, StoreResult};

pub use geometry::{Coordinates, DisplayPoint, GeoPoint, Polygon, Ring};

pub use model::{
    Crop, CropId, CropPage, Lot, LotId, LotPatch, MapDatum, MapSublot, NewLot, NewSublot, Sublot,
    SublotId,
};

pub use notify::{EventBusNotifier, Notification, NotificationLevel, Notifier};

pub use store::{
    save_lot_geometry, save_sublot_geometry, InMemoryLotStore, LotStore, LotTarget, StoreCall,
    StoreSnapshot,
};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, DataEvent, DrawingEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    SubscriptionId,
};

pub use style::RingStyle;
pub use units::{format_area, AreaUnit};
