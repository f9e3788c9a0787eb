//! Persistence collaborator for lots, sublots, and crops.
//!
//! [`LotStore`] mirrors the backend's REST resources. The helpers
//! [`save_lot_geometry`] and [`save_sublot_geometry`] are the only path by
//! which geometry reaches the store, shared by drawing commits and manual
//! entry.

mod memory;

pub use memory::{InMemoryLotStore, StoreCall, StoreSnapshot};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::geometry::Polygon;
use crate::model::{
    CropPage, Lot, LotId, LotPatch, MapDatum, NewLot, NewSublot, Sublot, SublotId,
};

/// Backend store contract.
///
/// Every call is a single fire-once request; implementations must not retry.
#[async_trait]
pub trait LotStore: Send + Sync {
    /// Lots enriched with geometry and nested sublot geometries.
    async fn get_map_data(&self) -> StoreResult<Vec<MapDatum>>;

    async fn get_lots(&self) -> StoreResult<Vec<Lot>>;

    async fn get_sublots(&self) -> StoreResult<Vec<Sublot>>;

    /// One page of crops; `page` starts at 1.
    async fn get_crops(&self, page: u32, page_size: u32) -> StoreResult<CropPage>;

    /// Creates a lot and returns it with its assigned id.
    async fn create_lot(&self, lot: &NewLot) -> StoreResult<Lot>;

    async fn update_lot_coordinates(&self, lot_id: LotId, geometry: &Polygon) -> StoreResult<()>;

    async fn update_lot(&self, lot_id: LotId, patch: &LotPatch) -> StoreResult<Lot>;

    async fn create_sublot(&self, sublot: &NewSublot) -> StoreResult<Sublot>;

    async fn update_sublot_coordinates(
        &self,
        sublot_id: SublotId,
        geometry: &Polygon,
    ) -> StoreResult<()>;
}

/// Where a polygon should be attached.
#[derive(Debug, Clone, PartialEq)]
pub enum LotTarget {
    /// Replace the geometry of an existing lot.
    Existing(LotId),
    /// Create this lot first, then attach the geometry to it.
    New(NewLot),
}

/// Validates `geometry` and attaches it to the target lot.
///
/// For [`LotTarget::New`] the lot is created first and its assigned id is
/// used for the coordinate update. If that update fails the error is
/// [`StoreError::GeometryNotSaved`] carrying the new id. Returns the id of
/// the lot that received the geometry.
pub async fn save_lot_geometry(
    store: &dyn LotStore,
    target: &LotTarget,
    geometry: &Polygon,
) -> StoreResult<LotId> {
    geometry.validate()?;

    let lot_id = match target {
        LotTarget::Existing(id) => {
            store.update_lot_coordinates(*id, geometry).await?;
            *id
        }
        LotTarget::New(new_lot) => {
            let created = store.create_lot(new_lot).await?;
            tracing::info!("Created lot {} ({})", created.id, created.name);
            store
                .update_lot_coordinates(created.id, geometry)
                .await
                .map_err(|err| StoreError::GeometryNotSaved {
                    lot_id: created.id,
                    source: Box::new(err),
                })?;
            created.id
        }
    };

    tracing::info!("Updated coordinates of lot {}", lot_id);
    Ok(lot_id)
}

/// Creates a sublot and, when given, attaches geometry with the same
/// create-then-update pattern used for lots.
pub async fn save_sublot_geometry(
    store: &dyn LotStore,
    sublot: &NewSublot,
    geometry: Option<&Polygon>,
) -> StoreResult<Sublot> {
    if let Some(geometry) = geometry {
        geometry.validate()?;
    }

    let mut created = store.create_sublot(sublot).await?;
    tracing::info!("Created sublot {} on lot {}", created.id, created.lot_id);

    if let Some(geometry) = geometry {
        store
            .update_sublot_coordinates(created.id, geometry)
            .await?;
        created.geometry = Some(geometry.clone());
    }
    Ok(created)
}
