//! Wire and display geometry types.
//!
//! Two point orders coexist:
//! - [`GeoPoint`] is the wire/persistence order, serialized as `[longitude, latitude]`.
//! - [`DisplayPoint`] is the rendering-surface order, serialized as `[latitude, longitude]`.
//!
//! Raw coordinate arrays are classified exactly once, at ingestion, into
//! [`Coordinates::Ring`] or [`Coordinates::Polygon`]. Rings are implicitly
//! closed: the closing edge from the last vertex back to the first is never
//! stored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GeometryError;

/// A geographic point in wire order (`[lng, lat]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lng, p.lat]
    }
}

/// A geographic point in display order (`[lat, lng]`).
///
/// Never persisted; always derived from or converted to a wire [`Ring`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct DisplayPoint {
    pub lat: f64,
    pub lng: f64,
}

impl DisplayPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for DisplayPoint {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<DisplayPoint> for [f64; 2] {
    fn from(p: DisplayPoint) -> Self {
        [p.lat, p.lng]
    }
}

/// An implicitly closed sequence of wire points forming one polygon boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring(Vec<GeoPoint>);

impl Ring {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the last vertex duplicates the first (explicit closure).
    pub fn is_pre_closed(&self) -> bool {
        self.0.len() > 1 && self.0.first() == self.0.last()
    }

    /// Number of distinct vertices, compared by exact coordinate equality.
    pub fn distinct_vertices(&self) -> usize {
        let mut seen: Vec<GeoPoint> = Vec::with_capacity(self.0.len());
        for p in &self.0 {
            if !seen.contains(p) {
                seen.push(*p);
            }
        }
        seen.len()
    }

    /// Checks the ring contract before persistence.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if let Some(index) = self.0.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite { index });
        }
        if self.is_pre_closed() {
            return Err(GeometryError::PreClosed);
        }
        let distinct = self.distinct_vertices();
        if distinct < 3 {
            return Err(GeometryError::TooFewVertices { distinct });
        }
        Ok(())
    }
}

impl From<Vec<GeoPoint>> for Ring {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }
}

/// GeoJSON `Polygon` geometry. `rings[0]` is the outer ring, the rest are holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonWire", into = "PolygonWire")]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn from_ring(ring: Ring) -> Self {
        Self { rings: vec![ring] }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn outer(&self) -> Option<&Ring> {
        self.rings.first()
    }

    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }

    /// True when there is no outer ring or it has no vertices.
    pub fn is_empty(&self) -> bool {
        self.outer().map_or(true, Ring::is_empty)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.rings.is_empty() {
            return Err(GeometryError::EmptyPolygon);
        }
        self.rings.iter().try_for_each(Ring::validate)
    }

    /// Parses a raw geometry value leniently; any shape problem yields `None`.
    ///
    /// Accepts a GeoJSON geometry object, a bare ring, a bare ring-of-rings,
    /// or a JSON string holding any of those.
    pub fn from_value(value: &Value) -> Option<Self> {
        match Coordinates::from_value(value)? {
            Coordinates::Ring(ring) => Some(Self::from_ring(ring)),
            Coordinates::Polygon(polygon) => Some(polygon),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PolygonWire {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Ring>,
}

impl TryFrom<PolygonWire> for Polygon {
    type Error = String;

    fn try_from(wire: PolygonWire) -> Result<Self, Self::Error> {
        if wire.kind != "Polygon" {
            return Err(format!("expected geometry type Polygon, got {}", wire.kind));
        }
        Ok(Self {
            rings: wire.coordinates,
        })
    }
}

impl From<Polygon> for PolygonWire {
    fn from(polygon: Polygon) -> Self {
        Self {
            kind: "Polygon".to_string(),
            coordinates: polygon.rings,
        }
    }
}

/// Result of classifying a raw coordinate array at the ingestion boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    /// A single ring of `[lng, lat]` points.
    Ring(Ring),
    /// A ring-of-rings (outer ring followed by holes).
    Polygon(Polygon),
}

impl Coordinates {
    /// Classifies and parses raw coordinates.
    ///
    /// Returns `None` if the value is absent, not an array, empty, or if any
    /// point is not a pair of finite numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                if let Some(kind) = map.get("type").and_then(Value::as_str) {
                    if kind != "Polygon" {
                        return None;
                    }
                }
                Self::from_value(map.get("coordinates")?)
            }
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(text).ok()?;
                match parsed {
                    Value::String(_) => None,
                    other => Self::from_value(&other),
                }
            }
            Value::Array(items) => {
                let first = items.first()?;
                let nested = first
                    .as_array()
                    .and_then(|inner| inner.first())
                    .is_some_and(Value::is_array);
                if nested {
                    let rings = items
                        .iter()
                        .map(parse_ring)
                        .collect::<Option<Vec<_>>>()?;
                    Some(Coordinates::Polygon(Polygon::new(rings)))
                } else {
                    parse_ring(value).map(Coordinates::Ring)
                }
            }
            _ => None,
        }
    }
}

fn parse_ring(value: &Value) -> Option<Ring> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(parse_point)
        .collect::<Option<Vec<_>>>()
        .map(Ring::new)
}

fn parse_point(value: &Value) -> Option<GeoPoint> {
    match value.as_array()?.as_slice() {
        [lng, lat] => {
            let (lng, lat) = (lng.as_f64()?, lat.as_f64()?);
            let point = GeoPoint::new(lng, lat);
            point.is_finite().then_some(point)
        }
        _ => None,
    }
}

/// Serde helper for record fields holding backend geometry.
///
/// Malformed geometry never fails the enclosing record; it becomes `None`.
pub fn lenient_polygon<'de, D>(deserializer: D) -> Result<Option<Polygon>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(value) => {
            let polygon = Polygon::from_value(&value);
            if polygon.is_none() {
                tracing::warn!("Ignoring malformed geometry: {}", value);
            }
            polygon
        }
    })
}
