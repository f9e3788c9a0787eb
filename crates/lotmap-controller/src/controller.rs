//! Lot map orchestration.
//!
//! Refreshes pull every collection from the store and rebuild the
//! aggregator from scratch. Writes go straight to the store with no local
//! optimistic change; the view catches up on the refresh that follows a
//! confirmed write. Failed calls are reported through the notifier and
//! leave the last confirmed snapshot in place.

use lotmap_analytics::{CropCategory, MapDataAggregator, MapSummary, RankedLot};
use lotmap_core::{
    save_lot_geometry, save_sublot_geometry, AppEvent, Crop, DataEvent, DisplayPoint,
    DrawingEvent, EventBus, EventBusNotifier, Lot, LotId, LotPatch, LotStore, LotTarget, NewLot,
    NewSublot, Notifier, Polygon, StoreError, StoreResult, Sublot,
};
use lotmap_drawing::{DrawingError, DrawingPhase, DrawingSession, MapSurface, SurfaceLayer};
use lotmap_geometry::GeoBounds;
use lotmap_settings::{AnalyticsSettings, Config, StyleSettings};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ControllerResult;

/// Upper bound on crop pages pulled in one refresh.
pub const MAX_CROP_PAGES: u32 = 1_000;

/// Aggregated data tagged with the refresh that produced it.
struct Snapshot {
    generation: u64,
    data: Arc<MapDataAggregator>,
}

pub struct LotMapController {
    store: Arc<dyn LotStore>,
    surface: Arc<dyn MapSurface>,
    bus: Arc<EventBus>,
    notifier: Arc<dyn Notifier>,
    session: DrawingSession,
    snapshot: RwLock<Snapshot>,
    refresh_generation: AtomicU64,
    analytics: AnalyticsSettings,
    styles: StyleSettings,
    fit_padding: f64,
}

impl LotMapController {
    /// Notifications go to `bus` unless replaced with
    /// [`with_notifier`](Self::with_notifier).
    pub fn new(
        store: Arc<dyn LotStore>,
        surface: Arc<dyn MapSurface>,
        bus: Arc<EventBus>,
        config: &Config,
    ) -> Self {
        Self {
            session: DrawingSession::new(surface.clone(), config.styles.preview.clone()),
            notifier: Arc::new(EventBusNotifier::new(bus.clone())),
            store,
            surface,
            bus,
            snapshot: RwLock::new(Snapshot {
                generation: 0,
                data: Arc::new(MapDataAggregator::default()),
            }),
            refresh_generation: AtomicU64::new(0),
            analytics: config.analytics.clone(),
            styles: config.styles.clone(),
            fit_padding: config.map.fit_padding,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn drawing(&self) -> &DrawingSession {
        &self.session
    }

    // ----- data -----

    /// Re-pulls map data, lots, sublots, and every crop page, then rebuilds
    /// the aggregator and redraws the map.
    ///
    /// On failure the previous snapshot stays current. When refreshes
    /// overlap, the one started last wins: an older pull that finishes
    /// later is dropped and the current summary is returned.
    pub async fn refresh(&self) -> ControllerResult<MapSummary> {
        let generation = self.refresh_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let store = self.store.as_ref();
        let pulled = tokio::try_join!(
            store.get_map_data(),
            store.get_lots(),
            store.get_sublots(),
            self.fetch_all_crops(),
        );

        let (map_data, lots, sublots, crops) = match pulled {
            Ok(collections) => collections,
            Err(err) => {
                self.notifier
                    .error(&format!("Failed to refresh map data: {}", err));
                return Err(err.into());
            }
        };

        let (lot_count, sublot_count, crop_count) = (lots.len(), sublots.len(), crops.len());
        let aggregator = Arc::new(MapDataAggregator::new(lots, sublots, crops, map_data));
        let summary = aggregator.summary();
        {
            let mut snapshot = self.snapshot.write();
            if snapshot.generation > generation {
                tracing::debug!(
                    "Dropping refresh {} superseded by refresh {}",
                    generation,
                    snapshot.generation
                );
                return Ok(snapshot.data.summary());
            }
            *snapshot = Snapshot {
                generation,
                data: aggregator,
            };
        }

        tracing::info!(
            "Refreshed {} lots, {} sublots, {} crops",
            lot_count,
            sublot_count,
            crop_count
        );
        self.bus.publish(AppEvent::Data(DataEvent::Refreshed {
            lots: lot_count,
            sublots: sublot_count,
            crops: crop_count,
        }));
        self.render();
        Ok(summary)
    }

    async fn fetch_all_crops(&self) -> StoreResult<Vec<Crop>> {
        let page_size = self.analytics.crops_page_size.max(1);
        let mut crops = Vec::new();

        for page in 1..=MAX_CROP_PAGES {
            let result = self.store.get_crops(page, page_size).await?;
            let received = result.items.len();
            crops.extend(result.items);

            // A reported total is authoritative; the backend may cap pages
            // below the requested size.
            let done = match result.total {
                Some(total) => received == 0 || crops.len() as u64 >= total,
                None => received < page_size as usize,
            };
            if done {
                return Ok(crops);
            }
        }

        tracing::warn!(
            "Stopped crop paging after {} pages ({} crops)",
            MAX_CROP_PAGES,
            crops.len()
        );
        Ok(crops)
    }

    /// The last confirmed snapshot.
    pub fn snapshot(&self) -> Arc<MapDataAggregator> {
        self.snapshot.read().data.clone()
    }

    pub fn summary(&self) -> MapSummary {
        self.snapshot().summary()
    }

    /// Area ranking limited to the configured `top_n`.
    pub fn top_lots(&self, filter: Option<&CropCategory>) -> Vec<RankedLot> {
        self.snapshot().top_by_area(filter, self.analytics.top_n)
    }

    pub fn crop_filter_options(&self) -> Vec<CropCategory> {
        self.snapshot().crop_filter_options()
    }

    /// Fits the surface to every rendered vertex, with the configured
    /// padding. Returns the bounds used, or `None` when there is no
    /// geometry.
    pub fn fit_to_data(&self) -> Option<GeoBounds> {
        let bounds = self.snapshot().bounds()?.padded(self.fit_padding);
        self.surface.fit_bounds(&bounds);
        Some(bounds)
    }

    /// Redraws lot and sublot layers from the current snapshot.
    pub fn render(&self) {
        let snapshot = self.snapshot();
        self.surface.clear_layer(SurfaceLayer::Lots);
        self.surface.clear_layer(SurfaceLayer::Sublots);

        for layer in snapshot.layers() {
            if !layer.rings.is_empty() {
                self.surface.draw_rings(
                    SurfaceLayer::Lots,
                    &layer.rings,
                    self.styles.for_lot(layer.active),
                );
            }
            for sublot in &layer.sublots {
                self.surface
                    .draw_rings(SurfaceLayer::Sublots, &sublot.rings, &self.styles.sublot);
            }
        }
    }

    /// Sets a lot's active flag in the store.
    ///
    /// Nothing local changes until the store confirms; the refreshed
    /// snapshot then carries the new flag.
    pub async fn set_active(&self, lot_id: LotId, active: bool) -> ControllerResult<Lot> {
        match self.store.update_lot(lot_id, &LotPatch::active(active)).await {
            Ok(lot) => {
                let state = if lot.active { "active" } else { "inactive" };
                self.notifier
                    .success(&format!("Lot {} is now {}", lot.name, state));
                self.bus.publish(AppEvent::Data(DataEvent::LotActiveChanged {
                    lot_id,
                    active: lot.active,
                }));
                self.refresh_after_write().await;
                Ok(lot)
            }
            Err(err) => {
                self.notifier
                    .error(&format!("Failed to update lot {}: {}", lot_id, err));
                Err(err.into())
            }
        }
    }

    /// Creates a lot, attaching `geometry` when given through the same
    /// routine used by drawing commits.
    pub async fn create_lot(
        &self,
        new_lot: NewLot,
        geometry: Option<Polygon>,
    ) -> ControllerResult<LotId> {
        let name = new_lot.name.clone();
        let result = match &geometry {
            Some(geometry) => {
                save_lot_geometry(self.store.as_ref(), &LotTarget::New(new_lot), geometry).await
            }
            None => self.store.create_lot(&new_lot).await.map(|lot| lot.id),
        };

        match result {
            Ok(lot_id) => {
                self.notifier.success(&format!("Lot {} created", name));
                self.bus
                    .publish(AppEvent::Data(DataEvent::LotCreated { lot_id }));
                self.refresh_after_write().await;
                Ok(lot_id)
            }
            Err(err) => {
                match err.created_lot_id() {
                    Some(lot_id) => self.report_geometry_not_saved(&name, lot_id, &err).await,
                    None => self
                        .notifier
                        .error(&format!("Failed to create lot {}: {}", name, err)),
                }
                Err(err.into())
            }
        }
    }

    /// Creates a sublot with optional geometry.
    pub async fn create_sublot(
        &self,
        new_sublot: NewSublot,
        geometry: Option<Polygon>,
    ) -> ControllerResult<Sublot> {
        match save_sublot_geometry(self.store.as_ref(), &new_sublot, geometry.as_ref()).await {
            Ok(sublot) => {
                self.notifier
                    .success(&format!("Sublot created on lot {}", sublot.lot_id));
                self.bus.publish(AppEvent::Data(DataEvent::SublotCreated {
                    sublot_id: sublot.id,
                }));
                self.refresh_after_write().await;
                Ok(sublot)
            }
            Err(err) => {
                self.notifier
                    .error(&format!("Failed to create sublot: {}", err));
                Err(err.into())
            }
        }
    }

    /// The lot exists but has no geometry: say so, announce the lot, and
    /// refresh so the snapshot shows it.
    async fn report_geometry_not_saved(&self, name: &str, lot_id: LotId, err: &StoreError) {
        let reason = match err {
            StoreError::GeometryNotSaved { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        self.notifier.error(&format!(
            "Lot {} was created but its polygon was not saved: {}",
            name, reason
        ));
        self.bus
            .publish(AppEvent::Data(DataEvent::LotCreated { lot_id }));
        self.refresh_after_write().await;
    }

    async fn refresh_after_write(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!("Write confirmed but refresh failed: {}", err);
        }
    }

    // ----- drawing -----

    /// Starts a drawing session, cancelling any active one.
    pub fn start_drawing(&self) {
        if self.session.start() {
            self.bus.publish(AppEvent::Drawing(DrawingEvent::Cancelled));
        }
        self.bus.publish(AppEvent::Drawing(DrawingEvent::Started));
    }

    pub fn add_point(&self, point: DisplayPoint) -> ControllerResult<usize> {
        Ok(self.session.add_point(point)?)
    }

    pub fn undo_point(&self) -> Option<DisplayPoint> {
        self.session.undo_point()
    }

    pub fn request_commit(&self) -> ControllerResult<Polygon> {
        let polygon = self.session.request_commit()?;
        let vertices = polygon.outer().map_or(0, |r| r.len());
        self.bus
            .publish(AppEvent::Drawing(DrawingEvent::CommitRequested { vertices }));
        Ok(polygon)
    }

    /// Saves the drawn polygon on `target`.
    ///
    /// A store failure is notified and leaves the session awaiting commit so
    /// it can be retried. A second commit while one is pending is rejected
    /// without notification.
    pub async fn commit_drawing(&self, target: LotTarget) -> ControllerResult<LotId> {
        // A lot created by an earlier failed attempt was already announced.
        let creates_lot =
            matches!(target, LotTarget::New(_)) && self.session.created_lot().is_none();

        match self.session.commit(self.store.as_ref(), &target).await {
            Ok(lot_id) => {
                self.notifier
                    .success(&format!("Polygon saved on lot {}", lot_id));
                if creates_lot {
                    self.bus
                        .publish(AppEvent::Data(DataEvent::LotCreated { lot_id }));
                }
                self.bus
                    .publish(AppEvent::Drawing(DrawingEvent::Committed { lot_id }));
                self.refresh_after_write().await;
                Ok(lot_id)
            }
            Err(DrawingError::Persistence(err)) => {
                match (err.created_lot_id(), &target) {
                    (Some(lot_id), LotTarget::New(new_lot)) if creates_lot => {
                        self.report_geometry_not_saved(&new_lot.name, lot_id, &err)
                            .await;
                    }
                    _ => self
                        .notifier
                        .error(&format!("Failed to save polygon: {}", err)),
                }
                self.bus.publish(AppEvent::Drawing(DrawingEvent::CommitFailed {
                    reason: err.to_string(),
                }));
                Err(DrawingError::Persistence(err).into())
            }
            Err(err) => {
                tracing::warn!("Commit ignored: {}", err);
                Err(err.into())
            }
        }
    }

    /// Cancels the active drawing session. Returns false if none was active.
    pub fn cancel_drawing(&self) -> bool {
        let cancelled = self.session.cancel();
        if cancelled {
            self.bus.publish(AppEvent::Drawing(DrawingEvent::Cancelled));
        }
        cancelled
    }

    pub fn drawing_phase(&self) -> DrawingPhase {
        self.session.phase()
    }
}

impl std::fmt::Debug for LotMapController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotMapController")
            .field("session", &self.session)
            .field("summary", &self.summary())
            .finish()
    }
}
