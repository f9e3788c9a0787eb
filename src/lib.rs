//! # LotMap
//!
//! Geospatial map and area analytics for farm lots and sublots:
//! - Polygon geometry in GeoJSON `[longitude, latitude]` order, rendered in
//!   `[latitude, longitude]` display order
//! - Planar area in square meters and hectares
//! - Lot status and coverage summaries, crop-type filters, area rankings
//! - Interactive polygon drawing with create-then-update persistence
//!
//! ## Architecture
//!
//! LotMap is organized as a workspace with multiple crates:
//!
//! 1. **lotmap-core** - Data model, wire geometry, store and notifier traits, event bus
//! 2. **lotmap-geometry** - Coordinate transforms, area, bounds
//! 3. **lotmap-analytics** - Map data aggregation, crop-type normalization, rankings
//! 4. **lotmap-drawing** - Map surface abstraction and the drawing session
//! 5. **lotmap-settings** - Configuration files
//! 6. **lotmap-controller** - Orchestration of refreshes, rendering, and writes
//! 7. **lotmap** - Report CLI over a JSON snapshot

pub mod report;

pub use lotmap_analytics as analytics;
pub use lotmap_controller as controller;
pub use lotmap_drawing as drawing;
pub use lotmap_geometry as geometry;
pub use lotmap_settings as settings;

pub use lotmap_analytics::{CropCategory, MapDataAggregator, MapSummary, RankedLot};
pub use lotmap_controller::{ControllerError, LotMapController};
pub use lotmap_core::{
    event_bus, format_area, AreaUnit, DisplayPoint, Error, EventBus, GeoPoint, InMemoryLotStore,
    Lot, LotStore, Polygon, Result, Ring, Sublot,
};
pub use lotmap_drawing::{DrawingSession, HeadlessSurface, MapSurface};
pub use lotmap_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so report output on stdout stays clean. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize logging as JSON lines on stderr.
pub fn init_json_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).json())
        .try_init()?;

    Ok(())
}
