//! Geographic bounding boxes over display points.

use lotmap_core::DisplayPoint;
use serde::{Deserialize, Serialize};

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Bounds of every finite point. Returns `None` when there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DisplayPoint>,
    {
        let mut south = f64::INFINITY;
        let mut west = f64::INFINITY;
        let mut north = f64::NEG_INFINITY;
        let mut east = f64::NEG_INFINITY;
        let mut has_points = false;

        for p in points.into_iter().filter(|p| p.is_finite()) {
            south = south.min(p.lat);
            west = west.min(p.lng);
            north = north.max(p.lat);
            east = east.max(p.lng);
            has_points = true;
        }

        has_points.then_some(Self {
            south,
            west,
            north,
            east,
        })
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn center(&self) -> DisplayPoint {
        DisplayPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// A single point or a zero-width line.
    pub fn is_degenerate(&self) -> bool {
        self.height() <= 0.0 || self.width() <= 0.0
    }

    pub fn contains(&self, point: DisplayPoint) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }

    /// Grows the box by `ratio` of its span on every edge.
    pub fn padded(&self, ratio: f64) -> Self {
        let dlat = self.height() * ratio;
        let dlng = self.width() * ratio;
        Self {
            south: self.south - dlat,
            west: self.west - dlng,
            north: self.north + dlat,
            east: self.east + dlng,
        }
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }
}
