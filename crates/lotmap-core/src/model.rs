//! Lot, sublot, and crop records as exchanged with the backend store.

use serde::{Deserialize, Serialize};

use crate::geometry::{lenient_polygon, Polygon};

pub type LotId = i64;
pub type SublotId = i64;
pub type CropId = i64;

/// A top-level farm parcel with an optional geographic boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: LotId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_polygon")]
    pub geometry: Option<Polygon>,
}

impl Lot {
    pub fn has_geometry(&self) -> bool {
        has_geometry(self.geometry.as_ref())
    }
}

/// A subdivision of a [`Lot`] with its own optional boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sublot {
    pub id: SublotId,
    pub lot_id: LotId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_polygon")]
    pub geometry: Option<Polygon>,
}

impl Sublot {
    pub fn has_geometry(&self) -> bool {
        has_geometry(self.geometry.as_ref())
    }
}

/// A crop planted on a lot. Read-only here; only `crop_type` matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: CropId,
    pub lot_id: LotId,
    #[serde(default)]
    pub crop_type: String,
}

/// One page of crops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropPage {
    pub items: Vec<Crop>,
    /// Total number of crops across all pages, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Sublot geometry nested inside a [`MapDatum`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSublot {
    pub id: SublotId,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_polygon")]
    pub geometry: Option<Polygon>,
}

/// A lot enriched with its geometry and the geometries of its sublots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDatum {
    pub id: LotId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_polygon")]
    pub geometry: Option<Polygon>,
    #[serde(default)]
    pub sublots: Vec<MapSublot>,
}

/// Payload for creating a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLot {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub active: bool,
}

impl NewLot {
    /// A new, active lot with an empty description.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            active: true,
        }
    }
}

/// Payload for creating a sublot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSublot {
    pub description: String,
    pub location: String,
    pub lot_id: LotId,
}

/// Partial lot update. Only the active flag is patched by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl LotPatch {
    pub fn active(value: bool) -> Self {
        Self {
            active: Some(value),
        }
    }
}

fn has_geometry(geometry: Option<&Polygon>) -> bool {
    geometry.is_some_and(|g| !g.is_empty())
}
