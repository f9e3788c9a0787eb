//! # LotMap Controller
//!
//! [`LotMapController`] wires the store, the map surface, the drawing
//! session, and the aggregator together. It is the only component that
//! talks to the notifier.

pub mod controller;
pub mod error;

pub use controller::{LotMapController, MAX_CROP_PAGES};
pub use error::{ControllerError, ControllerResult};
