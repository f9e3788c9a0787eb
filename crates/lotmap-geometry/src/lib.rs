//! # LotMap Geometry
//!
//! Pure geometric utilities over lot and sublot boundaries:
//!
//! - [`transform`]: wire order (`[lng, lat]`) to display order (`[lat, lng]`) and back
//! - [`area`]: planar surface area through a local equirectangular projection
//! - [`bounds`]: geographic bounding boxes for "fit to data"
//!
//! Nothing here fails hard on malformed input. Transforms degrade to empty
//! output and area degrades to zero, so a single bad record never blocks
//! the rest of the map.

pub mod area;
pub mod bounds;
pub mod transform;

pub use area::{
    area_m2, geometry_area_m2, polygon_area_m2, ring_area_m2, to_hectares, LocalProjection,
    EARTH_RADIUS_M,
};
pub use bounds::GeoBounds;
pub use transform::{
    display_rings_from_value, polygon_from_display, polygon_to_display, to_display,
    to_wire_ring, DisplayGeometry,
};
