//! Map data aggregation.
//!
//! [`MapDataAggregator`] merges the lot, sublot, crop, and map-data
//! collections pulled from the store into the views the map needs. It is
//! rebuilt from scratch on every refresh and never mutated in place.
//!
//! Geometry for a lot or sublot comes from its own record when present and
//! non-empty, otherwise from the matching map-data entry. Records with no
//! usable geometry contribute zero area and no vertices, but still count in
//! the summary. Sublots whose lot is unknown are orphaned: they stay in the
//! list views and summary counts and are left out of layers and bounds.

use lotmap_core::{
    Crop, DisplayPoint, Lot, LotId, MapDatum, Polygon, Sublot, SublotId,
};
use lotmap_geometry::{polygon_area_m2, polygon_to_display, GeoBounds};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::crop_type::{normalize_crop_type, CropCategory};

/// Number of lots in the default area ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Status and coverage counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub total_lots: usize,
    pub total_sublots: usize,
    pub active_lots: usize,
    pub inactive_lots: usize,
    /// Lots plus sublots with a non-empty geometry.
    pub with_coordinates: usize,
    /// Lots plus sublots without one.
    pub without_coordinates: usize,
}

/// One entry of the area ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLot {
    pub lot_id: LotId,
    pub name: String,
    pub active: bool,
    /// Outer-ring planar area; zero without geometry.
    pub area_m2: f64,
    pub crop_types: BTreeSet<CropCategory>,
}

/// Render data for one sublot, rings in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SublotLayer {
    pub sublot_id: SublotId,
    pub description: String,
    pub rings: Vec<Vec<DisplayPoint>>,
}

/// Render data for one lot and its sublots, rings in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct LotLayer {
    pub lot_id: LotId,
    pub name: String,
    pub active: bool,
    /// Outer ring first, then holes. Empty when the lot has no geometry.
    pub rings: Vec<Vec<DisplayPoint>>,
    pub sublots: Vec<SublotLayer>,
}

#[derive(Debug, Clone)]
struct ResolvedLot {
    id: LotId,
    name: String,
    active: bool,
    geometry: Option<Polygon>,
}

#[derive(Debug, Clone)]
struct ResolvedSublot {
    id: SublotId,
    lot_id: LotId,
    description: String,
    geometry: Option<Polygon>,
}

fn usable(geometry: Option<&Polygon>) -> Option<&Polygon> {
    geometry.filter(|g| !g.is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct MapDataAggregator {
    lots: Vec<Lot>,
    sublots: Vec<Sublot>,
    crops: Vec<Crop>,
    resolved_lots: Vec<ResolvedLot>,
    resolved_sublots: Vec<ResolvedSublot>,
    orphans: HashSet<SublotId>,
}

impl MapDataAggregator {
    pub fn new(
        lots: Vec<Lot>,
        sublots: Vec<Sublot>,
        crops: Vec<Crop>,
        map_data: Vec<MapDatum>,
    ) -> Self {
        let datum_by_lot: HashMap<LotId, &MapDatum> =
            map_data.iter().map(|d| (d.id, d)).collect();
        let map_sublots: HashMap<SublotId, (LotId, &lotmap_core::MapSublot)> = map_data
            .iter()
            .flat_map(|d| d.sublots.iter().map(move |s| (s.id, (d.id, s))))
            .collect();

        let mut resolved_lots: Vec<ResolvedLot> = lots
            .iter()
            .map(|lot| ResolvedLot {
                id: lot.id,
                name: lot.name.clone(),
                active: lot.active,
                geometry: usable(lot.geometry.as_ref())
                    .or_else(|| {
                        datum_by_lot
                            .get(&lot.id)
                            .and_then(|d| usable(d.geometry.as_ref()))
                    })
                    .cloned(),
            })
            .collect();

        let listed_lots: HashSet<LotId> = lots.iter().map(|l| l.id).collect();
        resolved_lots.extend(
            map_data
                .iter()
                .filter(|d| !listed_lots.contains(&d.id))
                .map(|d| ResolvedLot {
                    id: d.id,
                    name: d.name.clone(),
                    active: d.active,
                    geometry: usable(d.geometry.as_ref()).cloned(),
                }),
        );

        let mut resolved_sublots: Vec<ResolvedSublot> = sublots
            .iter()
            .map(|s| ResolvedSublot {
                id: s.id,
                lot_id: s.lot_id,
                description: s.description.clone(),
                geometry: usable(s.geometry.as_ref())
                    .or_else(|| {
                        map_sublots
                            .get(&s.id)
                            .and_then(|(_, ms)| usable(ms.geometry.as_ref()))
                    })
                    .cloned(),
            })
            .collect();

        let listed_sublots: HashSet<SublotId> = sublots.iter().map(|s| s.id).collect();
        for datum in &map_data {
            for ms in datum
                .sublots
                .iter()
                .filter(|ms| !listed_sublots.contains(&ms.id))
            {
                resolved_sublots.push(ResolvedSublot {
                    id: ms.id,
                    lot_id: datum.id,
                    description: ms.description.clone(),
                    geometry: usable(ms.geometry.as_ref()).cloned(),
                });
            }
        }

        let known_lots: HashSet<LotId> = resolved_lots.iter().map(|l| l.id).collect();
        let orphans: HashSet<SublotId> = resolved_sublots
            .iter()
            .filter(|s| !known_lots.contains(&s.lot_id))
            .map(|s| {
                tracing::warn!(
                    "Sublot {} references unknown lot {}; not rendered",
                    s.id,
                    s.lot_id
                );
                s.id
            })
            .collect();

        tracing::debug!(
            "Aggregated {} lots, {} sublots ({} orphaned), {} crops",
            resolved_lots.len(),
            resolved_sublots.len(),
            orphans.len(),
            crops.len()
        );

        Self {
            lots,
            sublots,
            crops,
            resolved_lots,
            resolved_sublots,
            orphans,
        }
    }

    /// Lot records as received, for list views.
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Sublot records as received, orphans included.
    pub fn sublots(&self) -> &[Sublot] {
        &self.sublots
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn is_orphaned(&self, sublot_id: SublotId) -> bool {
        self.orphans.contains(&sublot_id)
    }

    /// Resolved geometry of a lot, if it has any.
    pub fn lot_geometry(&self, lot_id: LotId) -> Option<&Polygon> {
        self.resolved_lots
            .iter()
            .find(|l| l.id == lot_id)
            .and_then(|l| l.geometry.as_ref())
    }

    fn rendered_sublots(&self) -> impl Iterator<Item = &ResolvedSublot> + '_ {
        self.resolved_sublots
            .iter()
            .filter(|s| !self.orphans.contains(&s.id))
    }

    /// Every display-order vertex of every rendered lot and sublot.
    pub fn bounding_points(&self) -> Vec<DisplayPoint> {
        let lot_geometries = self.resolved_lots.iter().filter_map(|l| l.geometry.as_ref());
        let sublot_geometries = self.rendered_sublots().filter_map(|s| s.geometry.as_ref());

        lot_geometries
            .chain(sublot_geometries)
            .flat_map(polygon_to_display)
            .flatten()
            .filter(DisplayPoint::is_finite)
            .collect()
    }

    /// Bounds of [`bounding_points`](Self::bounding_points).
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(&self.bounding_points())
    }

    pub fn summary(&self) -> MapSummary {
        let active_lots = self.resolved_lots.iter().filter(|l| l.active).count();
        let with_coordinates = self
            .resolved_lots
            .iter()
            .filter(|l| l.geometry.is_some())
            .count()
            + self
                .resolved_sublots
                .iter()
                .filter(|s| s.geometry.is_some())
                .count();
        let total = self.resolved_lots.len() + self.resolved_sublots.len();

        MapSummary {
            total_lots: self.resolved_lots.len(),
            total_sublots: self.resolved_sublots.len(),
            active_lots,
            inactive_lots: self.resolved_lots.len() - active_lots,
            with_coordinates,
            without_coordinates: total - with_coordinates,
        }
    }

    /// Normalized crop types grown on each lot. Blank crop types are ignored.
    pub fn crop_types_by_lot(&self) -> BTreeMap<LotId, BTreeSet<CropCategory>> {
        let mut by_lot: BTreeMap<LotId, BTreeSet<CropCategory>> = BTreeMap::new();
        for crop in &self.crops {
            if let Some(category) = normalize_crop_type(&crop.crop_type) {
                by_lot.entry(crop.lot_id).or_default().insert(category);
            }
        }
        by_lot
    }

    /// Distinct crop types for the ranking filter: canonical buckets first,
    /// then the rest alphabetically.
    pub fn crop_filter_options(&self) -> Vec<CropCategory> {
        self.crops
            .iter()
            .filter_map(|c| normalize_crop_type(&c.crop_type))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Lots ranked by outer-ring area, largest first.
    ///
    /// With a filter, only lots growing that crop type are ranked. Ties keep
    /// input order.
    pub fn top_by_area(&self, filter: Option<&CropCategory>, limit: usize) -> Vec<RankedLot> {
        let mut crop_types = self.crop_types_by_lot();
        let entries = self
            .resolved_lots
            .iter()
            .map(|lot| RankedLot {
                lot_id: lot.id,
                name: lot.name.clone(),
                active: lot.active,
                area_m2: lot.geometry.as_ref().map_or(0.0, polygon_area_m2),
                crop_types: crop_types.remove(&lot.id).unwrap_or_default(),
            })
            .filter(|entry| filter.map_or(true, |f| entry.crop_types.contains(f)))
            .collect();
        rank_by_area(entries, limit)
    }

    /// Render layers for every lot with geometry or with rendered sublots.
    pub fn layers(&self) -> Vec<LotLayer> {
        let mut sublots_by_lot: HashMap<LotId, Vec<SublotLayer>> = HashMap::new();
        for sublot in self.rendered_sublots() {
            if let Some(geometry) = &sublot.geometry {
                sublots_by_lot
                    .entry(sublot.lot_id)
                    .or_default()
                    .push(SublotLayer {
                        sublot_id: sublot.id,
                        description: sublot.description.clone(),
                        rings: polygon_to_display(geometry),
                    });
            }
        }

        self.resolved_lots
            .iter()
            .filter_map(|lot| {
                let sublots = sublots_by_lot.remove(&lot.id).unwrap_or_default();
                let rings = lot
                    .geometry
                    .as_ref()
                    .map(polygon_to_display)
                    .unwrap_or_default();
                if rings.is_empty() && sublots.is_empty() {
                    return None;
                }
                Some(LotLayer {
                    lot_id: lot.id,
                    name: lot.name.clone(),
                    active: lot.active,
                    rings,
                    sublots,
                })
            })
            .collect()
    }
}

/// Sorts descending by area and keeps the first `limit`. The sort is
/// stable, so equal areas keep their input order.
pub fn rank_by_area(mut entries: Vec<RankedLot>, limit: usize) -> Vec<RankedLot> {
    entries.sort_by(|a, b| b.area_m2.total_cmp(&a.area_m2));
    entries.truncate(limit);
    entries
}
