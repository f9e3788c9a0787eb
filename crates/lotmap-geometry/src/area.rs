//! Planar area of geographic rings.
//!
//! Points are projected to local meters with a fixed-latitude equirectangular
//! projection (scale factor `cos(lat0)` at the ring's mean latitude) and the
//! shoelace formula is applied over the implicitly closed ring.
//!
//! This is an approximation for farm-scale plots. It performs no geodesic
//! correction, and holes are not subtracted: only the outer ring counts.

use lotmap_core::units::SQUARE_METERS_PER_HECTARE;
use lotmap_core::{DisplayPoint, Polygon, Ring};

use crate::transform::{to_display, DisplayGeometry};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Local equirectangular projection anchored at a reference latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    cos_lat0: f64,
}

impl LocalProjection {
    /// Projection anchored at `lat0_deg` degrees.
    pub fn new(lat0_deg: f64) -> Self {
        Self {
            cos_lat0: lat0_deg.to_radians().cos(),
        }
    }

    /// Projection anchored at the mean latitude of `points`.
    pub fn for_points(points: &[DisplayPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mean_lat = points.iter().map(|p| p.lat).sum::<f64>() / points.len() as f64;
        Some(Self::new(mean_lat))
    }

    /// Planar `(x, y)` in meters.
    pub fn project(&self, point: DisplayPoint) -> (f64, f64) {
        let x = EARTH_RADIUS_M * point.lng.to_radians() * self.cos_lat0;
        let y = EARTH_RADIUS_M * point.lat.to_radians();
        (x, y)
    }

    pub fn unproject(&self, x: f64, y: f64) -> DisplayPoint {
        let lat = (y / EARTH_RADIUS_M).to_degrees();
        let lng = (x / (EARTH_RADIUS_M * self.cos_lat0)).to_degrees();
        DisplayPoint::new(lat, lng)
    }
}

/// Area in square meters of a display-order ring.
///
/// Returns 0 for fewer than 3 points or any non-finite coordinate.
pub fn area_m2(points: &[DisplayPoint]) -> f64 {
    if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
        return 0.0;
    }
    let Some(projection) = LocalProjection::for_points(points) else {
        return 0.0;
    };

    let projected: Vec<(f64, f64)> = points.iter().map(|p| projection.project(*p)).collect();
    let n = projected.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let (x1, y1) = projected[i];
            let (x2, y2) = projected[(i + 1) % n];
            x1 * y2 - x2 * y1
        })
        .sum();

    twice_area.abs() / 2.0
}

/// Area of a wire ring.
pub fn ring_area_m2(ring: &Ring) -> f64 {
    area_m2(&to_display(ring))
}

/// Area of a polygon's outer ring. Holes are ignored.
pub fn polygon_area_m2(polygon: &Polygon) -> f64 {
    polygon.outer().map_or(0.0, ring_area_m2)
}

/// Area of either a bare ring or the outer ring of a ring-of-rings.
pub fn geometry_area_m2(geometry: &DisplayGeometry) -> f64 {
    area_m2(geometry.outer())
}

pub fn to_hectares(square_meters: f64) -> f64 {
    square_meters / SQUARE_METERS_PER_HECTARE
}
