//! Coordinate-order transforms between wire rings and display points.
//!
//! The map surface speaks `[latitude, longitude]`; the store speaks GeoJSON
//! `[longitude, latitude]`. Conversion happens only at those two boundaries.

use lotmap_core::{Coordinates, DisplayPoint, GeoPoint, Polygon, Ring};
use serde_json::Value;

/// Maps a wire ring to display points, preserving order and count.
///
/// A ring holding any non-finite coordinate maps to an empty sequence.
pub fn to_display(ring: &Ring) -> Vec<DisplayPoint> {
    if ring.points().iter().any(|p| !p.is_finite()) {
        return Vec::new();
    }
    ring.points()
        .iter()
        .map(|p| DisplayPoint::new(p.lat, p.lng))
        .collect()
}

/// Inverse of [`to_display`].
pub fn to_wire_ring(points: &[DisplayPoint]) -> Ring {
    Ring::new(
        points
            .iter()
            .map(|p| GeoPoint::new(p.lng, p.lat))
            .collect(),
    )
}

/// Maps every ring of a polygon (outer first, then holes).
pub fn polygon_to_display(polygon: &Polygon) -> Vec<Vec<DisplayPoint>> {
    polygon.rings().iter().map(to_display).collect()
}

pub fn polygon_from_display(rings: &[Vec<DisplayPoint>]) -> Polygon {
    Polygon::new(rings.iter().map(|r| to_wire_ring(r)).collect())
}

/// Display-order counterpart of [`Coordinates`].
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayGeometry {
    Ring(Vec<DisplayPoint>),
    Polygon(Vec<Vec<DisplayPoint>>),
}

impl DisplayGeometry {
    pub fn from_coordinates(coordinates: &Coordinates) -> Self {
        match coordinates {
            Coordinates::Ring(ring) => Self::Ring(to_display(ring)),
            Coordinates::Polygon(polygon) => Self::Polygon(polygon_to_display(polygon)),
        }
    }

    /// The outer ring; for a bare ring, the ring itself.
    pub fn outer(&self) -> &[DisplayPoint] {
        match self {
            Self::Ring(points) => points,
            Self::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn rings(&self) -> Vec<&[DisplayPoint]> {
        match self {
            Self::Ring(points) => vec![points.as_slice()],
            Self::Polygon(rings) => rings.iter().map(Vec::as_slice).collect(),
        }
    }

    pub fn into_rings(self) -> Vec<Vec<DisplayPoint>> {
        match self {
            Self::Ring(points) => vec![points],
            Self::Polygon(rings) => rings,
        }
    }

    /// Every vertex of every ring, in ring order.
    pub fn points(&self) -> impl Iterator<Item = &DisplayPoint> + '_ {
        self.rings().into_iter().flatten()
    }

    /// Converts back to wire form, always as a polygon.
    pub fn to_polygon(&self) -> Polygon {
        match self {
            Self::Ring(points) => Polygon::from_ring(to_wire_ring(points)),
            Self::Polygon(rings) => polygon_from_display(rings),
        }
    }
}

impl From<&Polygon> for DisplayGeometry {
    fn from(polygon: &Polygon) -> Self {
        Self::Polygon(polygon_to_display(polygon))
    }
}

/// Ring-aware display conversion of a raw geometry value.
///
/// A single ring yields one display ring, a ring-of-rings yields one per
/// ring. Absent or malformed input yields no rings.
pub fn display_rings_from_value(value: &Value) -> Vec<Vec<DisplayPoint>> {
    match Coordinates::from_value(value) {
        Some(coordinates) => DisplayGeometry::from_coordinates(&coordinates).into_rings(),
        None => {
            if !value.is_null() {
                tracing::debug!("Skipping malformed geometry during display conversion");
            }
            Vec::new()
        }
    }
}
