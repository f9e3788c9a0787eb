use crate::harness::{default_harness, fixture, Harness};
use async_trait::async_trait;
use lotmap_analytics::CropCategory;
use lotmap_controller::{ControllerError, LotMapController};
use lotmap_core::{
    AppEvent, CropPage, DataEvent, EventBus, InMemoryLotStore, Lot, LotId, LotPatch, LotStore,
    MapDatum, NewLot, NewSublot, NotificationLevel, Polygon, StoreCall, StoreError, StoreResult,
    Sublot, SublotId,
};
use lotmap_drawing::{DrawCommand, HeadlessSurface, SurfaceLayer};
use lotmap_settings::Config;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn test_refresh_builds_summary() {
    let h = default_harness();
    let summary = h.controller.refresh().await.unwrap();

    assert_eq!(summary.total_lots, 3);
    assert_eq!(summary.total_sublots, 2);
    assert_eq!(summary.active_lots, 2);
    assert_eq!(summary.inactive_lots, 1);
    assert_eq!(summary.with_coordinates, 4);
    assert_eq!(summary.without_coordinates, 1);
    assert_eq!(h.controller.summary(), summary);

    assert!(matches!(
        h.events().last(),
        Some(AppEvent::Data(DataEvent::Refreshed {
            lots: 3,
            sublots: 2,
            crops: 3
        }))
    ));
    assert!(h.notifier.levels().is_empty());
}

#[tokio::test]
async fn test_refresh_pages_through_crops() {
    let mut config = Config::default();
    config.analytics.crops_page_size = 2;
    let h = Harness::new(fixture(), &config);

    h.controller.refresh().await.unwrap();

    let crop_calls: Vec<StoreCall> = h
        .store
        .calls()
        .into_iter()
        .filter(|c| matches!(c, StoreCall::GetCrops { .. }))
        .collect();
    assert_eq!(
        crop_calls,
        vec![
            StoreCall::GetCrops {
                page: 1,
                page_size: 2
            },
            StoreCall::GetCrops {
                page: 2,
                page_size: 2
            },
        ]
    );
    assert_eq!(h.controller.snapshot().crops().len(), 3);
}

#[tokio::test]
async fn test_refresh_stops_when_total_reached() {
    let mut config = Config::default();
    config.analytics.crops_page_size = 3;
    let h = Harness::new(fixture(), &config);

    h.controller.refresh().await.unwrap();

    // A full page that reaches the reported total needs no follow-up request
    let pages = h
        .store
        .calls()
        .into_iter()
        .filter(|c| matches!(c, StoreCall::GetCrops { .. }))
        .count();
    assert_eq!(pages, 1);
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_snapshot() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();
    let before = h.controller.summary();

    h.store.set_offline(true);
    let err = h.controller.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Store(StoreError::Unavailable(_))
    ));
    assert_eq!(h.controller.summary(), before);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Error]);
}

#[tokio::test]
async fn test_render_skips_orphans_and_styles_by_status() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();

    let config = Config::default();
    let lots = h.surface.commands_on(SurfaceLayer::Lots);
    assert_eq!(lots.len(), 3);
    assert_eq!(lots[0], DrawCommand::Clear(SurfaceLayer::Lots));
    match (&lots[1], &lots[2]) {
        (
            DrawCommand::Rings { style: first, .. },
            DrawCommand::Rings { style: second, .. },
        ) => {
            assert_eq!(first, &config.styles.active_lot);
            assert_eq!(second, &config.styles.inactive_lot);
        }
        other => panic!("Unexpected commands {:?}", other),
    }

    // Lot 1's sublot only; the orphan is not drawn
    let sublots = h.surface.commands_on(SurfaceLayer::Sublots);
    assert_eq!(sublots.len(), 2);
    match &sublots[1] {
        DrawCommand::Rings { rings, style, .. } => {
            assert_eq!(rings.len(), 1);
            assert_eq!(rings[0][0].lat, 4.605);
            assert_eq!(style, &config.styles.sublot);
        }
        other => panic!("Unexpected command {:?}", other),
    }
}

#[tokio::test]
async fn test_fit_to_data_uses_rendered_geometry() {
    let h = default_harness();
    assert!(h.controller.fit_to_data().is_none());

    h.controller.refresh().await.unwrap();
    let bounds = h.controller.fit_to_data().unwrap();

    // Padded around lots 1 and 2; the orphan at lng -60 is outside
    assert!(bounds.west < -74.10 && bounds.west > -74.2);
    assert!(bounds.east > -74.075 && bounds.east < -74.0);
    assert!(bounds.south < 4.60 && bounds.north > 4.61);
    assert_eq!(h.surface.commands().last(), Some(&DrawCommand::Fit(bounds)));
}

#[tokio::test]
async fn test_top_lots_and_filters() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();

    let top = h.controller.top_lots(None);
    let ids: Vec<_> = top.iter().map(|r| r.lot_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(top[2].area_m2, 0.0);

    let transitorios = h.controller.top_lots(Some(&CropCategory::Transitorios));
    assert_eq!(transitorios.len(), 1);
    assert_eq!(transitorios[0].lot_id, 2);

    assert_eq!(
        h.controller.crop_filter_options(),
        vec![
            CropCategory::Perennes,
            CropCategory::Transitorios,
            CropCategory::Semiperennes
        ]
    );
}

#[tokio::test]
async fn test_top_lots_respects_configured_limit() {
    let mut config = Config::default();
    config.analytics.top_n = 1;
    let h = Harness::new(fixture(), &config);
    h.controller.refresh().await.unwrap();

    let top = h.controller.top_lots(None);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].lot_id, 1);
}

#[tokio::test]
async fn test_refresh_pages_past_backend_page_cap() {
    let h = default_harness();
    h.store.set_page_cap(Some(2));

    h.controller.refresh().await.unwrap();

    // Each page comes back short, but the reported total says there is more
    assert_eq!(h.controller.snapshot().crops().len(), 3);
    let crop_calls: Vec<StoreCall> = h
        .store
        .calls()
        .into_iter()
        .filter(|c| matches!(c, StoreCall::GetCrops { .. }))
        .collect();
    assert_eq!(
        crop_calls,
        vec![
            StoreCall::GetCrops {
                page: 1,
                page_size: 100
            },
            StoreCall::GetCrops {
                page: 2,
                page_size: 100
            },
        ]
    );
    assert_eq!(
        h.controller.top_lots(Some(&CropCategory::Semiperennes))[0].lot_id,
        1
    );
}

/// Store whose first `get_lots` reads its data, then waits until released.
struct SlowLots {
    inner: InMemoryLotStore,
    armed: AtomicBool,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl LotStore for SlowLots {
    async fn get_map_data(&self) -> StoreResult<Vec<MapDatum>> {
        self.inner.get_map_data().await
    }

    async fn get_lots(&self) -> StoreResult<Vec<Lot>> {
        let lots = self.inner.get_lots().await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        lots
    }

    async fn get_sublots(&self) -> StoreResult<Vec<Sublot>> {
        self.inner.get_sublots().await
    }

    async fn get_crops(&self, page: u32, page_size: u32) -> StoreResult<CropPage> {
        self.inner.get_crops(page, page_size).await
    }

    async fn create_lot(&self, lot: &NewLot) -> StoreResult<Lot> {
        self.inner.create_lot(lot).await
    }

    async fn update_lot_coordinates(&self, lot_id: LotId, geometry: &Polygon) -> StoreResult<()> {
        self.inner.update_lot_coordinates(lot_id, geometry).await
    }

    async fn update_lot(&self, lot_id: LotId, patch: &LotPatch) -> StoreResult<Lot> {
        self.inner.update_lot(lot_id, patch).await
    }

    async fn create_sublot(&self, sublot: &NewSublot) -> StoreResult<Sublot> {
        self.inner.create_sublot(sublot).await
    }

    async fn update_sublot_coordinates(
        &self,
        sublot_id: SublotId,
        geometry: &Polygon,
    ) -> StoreResult<()> {
        self.inner.update_sublot_coordinates(sublot_id, geometry).await
    }
}

#[tokio::test]
async fn test_older_refresh_does_not_overwrite_newer() {
    let store = Arc::new(SlowLots {
        inner: InMemoryLotStore::from_snapshot(fixture()),
        armed: AtomicBool::new(true),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let controller = LotMapController::new(
        store.clone(),
        Arc::new(HeadlessSurface::new()),
        Arc::new(EventBus::new()),
        &Config::default(),
    );

    let stale = controller.refresh();
    let fresh = async {
        store.entered.notified().await;
        store
            .inner
            .update_lot(1, &LotPatch::active(false))
            .await
            .unwrap();
        let summary = controller.refresh().await.unwrap();
        store.release.notify_one();
        summary
    };
    let (stale, fresh) = tokio::join!(stale, fresh);

    assert_eq!(fresh.active_lots, 1);
    assert_eq!(stale.unwrap().active_lots, 1);
    assert_eq!(controller.summary().active_lots, 1);
}
