//! In-memory [`LotStore`] backed by a JSON snapshot.
//!
//! Used by the CLI for offline reports and by tests as a recording double:
//! every call is logged as a [`StoreCall`], and the store can be switched
//! offline or made to reject writes.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::LotStore;
use crate::error::{Error, Result, StoreError, StoreResult};
use crate::geometry::Polygon;
use crate::model::{
    Crop, CropPage, Lot, LotId, LotPatch, MapDatum, MapSublot, NewLot, NewSublot, Sublot,
    SublotId,
};

/// Serializable content of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub lots: Vec<Lot>,
    #[serde(default)]
    pub sublots: Vec<Sublot>,
    #[serde(default)]
    pub crops: Vec<Crop>,
}

/// A call received by the store, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetMapData,
    GetLots,
    GetSublots,
    GetCrops { page: u32, page_size: u32 },
    CreateLot { name: String },
    UpdateLotCoordinates { lot_id: LotId },
    UpdateLot { lot_id: LotId },
    CreateSublot { lot_id: LotId },
    UpdateSublotCoordinates { sublot_id: SublotId },
}

impl StoreCall {
    /// True for calls that modify the store.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            StoreCall::GetMapData
                | StoreCall::GetLots
                | StoreCall::GetSublots
                | StoreCall::GetCrops { .. }
        )
    }

    /// True for geometry writes on an existing lot or sublot.
    pub fn is_coordinate_update(&self) -> bool {
        matches!(
            self,
            StoreCall::UpdateLotCoordinates { .. } | StoreCall::UpdateSublotCoordinates { .. }
        )
    }
}

#[derive(Debug, Default)]
struct Flags {
    offline: bool,
    reject_writes: bool,
    reject_coordinate_updates: bool,
    page_cap: Option<u32>,
}

#[derive(Debug, Default)]
pub struct InMemoryLotStore {
    data: RwLock<StoreSnapshot>,
    calls: RwLock<Vec<StoreCall>>,
    flags: RwLock<Flags>,
}

impl InMemoryLotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    /// Load a snapshot file written by [`save_json_file`](Self::save_json_file)
    /// or exported from the backend.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded snapshot {} ({} lots, {} sublots, {} crops)",
            path.display(),
            snapshot.lots.len(),
            snapshot.sublots.len(),
            snapshot.crops.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn save_json_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.data.read())?;
        std::fs::write(path, content).map_err(Error::from)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.data.read().clone()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().clone()
    }

    /// Calls that modified (or tried to modify) the store.
    pub fn write_calls(&self) -> Vec<StoreCall> {
        self.calls
            .read()
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.write().clear();
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.flags.write().offline = offline;
    }

    /// While set, writes fail with [`StoreError::Rejected`]; reads succeed.
    pub fn set_reject_writes(&self, reject: bool) {
        self.flags.write().reject_writes = reject;
    }

    /// While set, coordinate updates fail with [`StoreError::Unavailable`];
    /// creates and other writes succeed.
    pub fn set_reject_coordinate_updates(&self, reject: bool) {
        self.flags.write().reject_coordinate_updates = reject;
    }

    /// Serve at most `cap` crops per page whatever size is requested, the
    /// way a backend with a server-side page limit does.
    pub fn set_page_cap(&self, cap: Option<u32>) {
        self.flags.write().page_cap = cap;
    }

    fn begin(&self, call: StoreCall) -> StoreResult<()> {
        let is_write = call.is_write();
        let is_coordinate_update = call.is_coordinate_update();
        self.calls.write().push(call);

        let flags = self.flags.read();
        if flags.offline {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        if is_write && flags.reject_writes {
            return Err(StoreError::Rejected {
                status: 503,
                message: "writes are disabled".to_string(),
            });
        }
        if is_coordinate_update && flags.reject_coordinate_updates {
            return Err(StoreError::Unavailable(
                "coordinate update timed out".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LotStore for InMemoryLotStore {
    async fn get_map_data(&self) -> StoreResult<Vec<MapDatum>> {
        self.begin(StoreCall::GetMapData)?;
        let data = self.data.read();
        Ok(data
            .lots
            .iter()
            .map(|lot| MapDatum {
                id: lot.id,
                name: lot.name.clone(),
                active: lot.active,
                geometry: lot.geometry.clone(),
                sublots: data
                    .sublots
                    .iter()
                    .filter(|s| s.lot_id == lot.id)
                    .map(|s| MapSublot {
                        id: s.id,
                        description: s.description.clone(),
                        geometry: s.geometry.clone(),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn get_lots(&self) -> StoreResult<Vec<Lot>> {
        self.begin(StoreCall::GetLots)?;
        Ok(self.data.read().lots.clone())
    }

    async fn get_sublots(&self) -> StoreResult<Vec<Sublot>> {
        self.begin(StoreCall::GetSublots)?;
        Ok(self.data.read().sublots.clone())
    }

    async fn get_crops(&self, page: u32, page_size: u32) -> StoreResult<CropPage> {
        self.begin(StoreCall::GetCrops { page, page_size })?;
        if page == 0 || page_size == 0 {
            return Err(StoreError::Rejected {
                status: 400,
                message: "page and page size start at 1".to_string(),
            });
        }

        let page_size = match self.flags.read().page_cap {
            Some(cap) => page_size.min(cap.max(1)),
            None => page_size,
        };
        let data = self.data.read();
        let start = (page as usize - 1).saturating_mul(page_size as usize);
        let items = data
            .crops
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(CropPage {
            items,
            total: Some(data.crops.len() as u64),
        })
    }

    async fn create_lot(&self, lot: &NewLot) -> StoreResult<Lot> {
        self.begin(StoreCall::CreateLot {
            name: lot.name.clone(),
        })?;
        if lot.name.trim().is_empty() {
            return Err(StoreError::Rejected {
                status: 400,
                message: "name is required".to_string(),
            });
        }

        let mut data = self.data.write();
        let id = data.lots.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        let created = Lot {
            id,
            name: lot.name.clone(),
            description: lot.description.clone(),
            active: lot.active,
            geometry: None,
        };
        data.lots.push(created.clone());
        Ok(created)
    }

    async fn update_lot_coordinates(&self, lot_id: LotId, geometry: &Polygon) -> StoreResult<()> {
        self.begin(StoreCall::UpdateLotCoordinates { lot_id })?;
        let mut data = self.data.write();
        let lot = data
            .lots
            .iter_mut()
            .find(|l| l.id == lot_id)
            .ok_or(StoreError::LotNotFound(lot_id))?;
        lot.geometry = Some(geometry.clone());
        Ok(())
    }

    async fn update_lot(&self, lot_id: LotId, patch: &LotPatch) -> StoreResult<Lot> {
        self.begin(StoreCall::UpdateLot { lot_id })?;
        let mut data = self.data.write();
        let lot = data
            .lots
            .iter_mut()
            .find(|l| l.id == lot_id)
            .ok_or(StoreError::LotNotFound(lot_id))?;
        if let Some(active) = patch.active {
            lot.active = active;
        }
        Ok(lot.clone())
    }

    async fn create_sublot(&self, sublot: &NewSublot) -> StoreResult<Sublot> {
        self.begin(StoreCall::CreateSublot {
            lot_id: sublot.lot_id,
        })?;
        let mut data = self.data.write();
        if !data.lots.iter().any(|l| l.id == sublot.lot_id) {
            return Err(StoreError::LotNotFound(sublot.lot_id));
        }

        let id = data.sublots.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let created = Sublot {
            id,
            lot_id: sublot.lot_id,
            description: sublot.description.clone(),
            location: sublot.location.clone(),
            geometry: None,
        };
        data.sublots.push(created.clone());
        Ok(created)
    }

    async fn update_sublot_coordinates(
        &self,
        sublot_id: SublotId,
        geometry: &Polygon,
    ) -> StoreResult<()> {
        self.begin(StoreCall::UpdateSublotCoordinates { sublot_id })?;
        let mut data = self.data.write();
        let sublot = data
            .sublots
            .iter_mut()
            .find(|s| s.id == sublot_id)
            .ok_or(StoreError::SublotNotFound(sublot_id))?;
        sublot.geometry = Some(geometry.clone());
        Ok(())
    }
}
