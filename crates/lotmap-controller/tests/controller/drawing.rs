use crate::harness::default_harness;
use lotmap_controller::ControllerError;
use lotmap_core::{
    AppEvent, DataEvent, DisplayPoint, DrawingEvent, LotTarget, NewLot, NotificationLevel,
    StoreCall,
};
use lotmap_drawing::{DrawingError, DrawingPhase, SurfaceLayer};

fn drawing_events(events: &[AppEvent]) -> Vec<DrawingEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Drawing(d) => Some(d.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_draw_and_commit_new_lot() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();

    h.controller.start_drawing();
    h.surface.click(DisplayPoint::new(4.62, -74.05));
    h.surface.click(DisplayPoint::new(4.62, -74.04));
    h.surface.click(DisplayPoint::new(4.63, -74.04));
    h.surface.click(DisplayPoint::new(4.63, -74.05));
    assert_eq!(h.controller.drawing().points().len(), 4);

    h.controller.request_commit().unwrap();
    let lot_id = h
        .controller
        .commit_drawing(LotTarget::New(NewLot::named("Dibujado")))
        .await
        .unwrap();

    assert_eq!(lot_id, 4);
    assert_eq!(h.controller.drawing_phase(), DrawingPhase::Idle);
    assert_eq!(h.controller.summary().total_lots, 4);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Success]);
    assert_eq!(
        drawing_events(&h.events()),
        vec![
            DrawingEvent::Started,
            DrawingEvent::CommitRequested { vertices: 4 },
            DrawingEvent::Committed { lot_id: 4 },
        ]
    );

    // The new lot is drawn with the rest after the refresh
    let lot_rings = h
        .surface
        .commands_on(SurfaceLayer::Lots)
        .into_iter()
        .rev()
        .take_while(|c| !matches!(c, lotmap_drawing::DrawCommand::Clear(_)))
        .count();
    assert_eq!(lot_rings, 3);
}

#[tokio::test]
async fn test_failed_commit_stays_pending() {
    let h = default_harness();
    h.controller.start_drawing();
    for point in [
        DisplayPoint::new(4.62, -74.05),
        DisplayPoint::new(4.62, -74.04),
        DisplayPoint::new(4.63, -74.04),
    ] {
        h.controller.add_point(point).unwrap();
    }
    h.controller.request_commit().unwrap();
    h.store.set_reject_writes(true);

    let err = h
        .controller
        .commit_drawing(LotTarget::Existing(1))
        .await
        .unwrap_err();

    assert!(err.is_persistence_failure());
    assert_eq!(h.controller.drawing_phase(), DrawingPhase::AwaitingCommit);
    assert_eq!(h.controller.drawing().points().len(), 3);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Error]);
    assert!(matches!(
        drawing_events(&h.events()).last(),
        Some(DrawingEvent::CommitFailed { .. })
    ));

    // Retry once the store accepts writes again
    h.store.set_reject_writes(false);
    let lot_id = h
        .controller
        .commit_drawing(LotTarget::Existing(1))
        .await
        .unwrap();
    assert_eq!(lot_id, 1);
    assert_eq!(
        h.store.write_calls(),
        vec![
            StoreCall::UpdateLotCoordinates { lot_id: 1 },
            StoreCall::UpdateLotCoordinates { lot_id: 1 },
        ]
    );
}

#[tokio::test]
async fn test_commit_without_request_is_not_notified() {
    let h = default_harness();
    h.controller.start_drawing();

    let err = h
        .controller
        .commit_drawing(LotTarget::Existing(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Drawing(DrawingError::InvalidTransition { .. })
    ));
    assert!(h.notifier.levels().is_empty());
    assert!(h.store.write_calls().is_empty());
}

#[tokio::test]
async fn test_restart_and_cancel_publish_events() {
    let h = default_harness();

    assert!(!h.controller.cancel_drawing());
    h.controller.start_drawing();
    h.controller
        .add_point(DisplayPoint::new(4.62, -74.05))
        .unwrap();
    h.controller.start_drawing();
    assert!(h.controller.drawing().points().is_empty());
    assert!(h.controller.cancel_drawing());

    assert_eq!(
        drawing_events(&h.events()),
        vec![
            DrawingEvent::Started,
            DrawingEvent::Cancelled,
            DrawingEvent::Started,
            DrawingEvent::Cancelled,
        ]
    );
    assert_eq!(h.surface.subscriber_count(), 0);
}

#[tokio::test]
async fn test_undo_and_too_few_points() {
    let h = default_harness();
    h.controller.start_drawing();
    h.controller
        .add_point(DisplayPoint::new(4.62, -74.05))
        .unwrap();
    h.controller
        .add_point(DisplayPoint::new(4.62, -74.04))
        .unwrap();
    assert_eq!(
        h.controller.undo_point(),
        Some(DisplayPoint::new(4.62, -74.04))
    );

    let err = h.controller.request_commit().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Drawing(DrawingError::NotEnoughPoints { have: 1 })
    ));
    assert_eq!(h.controller.drawing_phase(), DrawingPhase::Capturing);
}

#[tokio::test]
async fn test_commit_retry_after_partial_failure_creates_one_lot() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();
    h.controller.start_drawing();
    for point in [
        DisplayPoint::new(4.62, -74.05),
        DisplayPoint::new(4.62, -74.04),
        DisplayPoint::new(4.63, -74.04),
    ] {
        h.controller.add_point(point).unwrap();
    }
    h.controller.request_commit().unwrap();
    let target = LotTarget::New(NewLot::named("Potrero"));

    h.store.set_reject_coordinate_updates(true);
    let err = h
        .controller
        .commit_drawing(target.clone())
        .await
        .unwrap_err();
    assert!(err.is_persistence_failure());
    assert_eq!(h.controller.drawing_phase(), DrawingPhase::AwaitingCommit);
    assert_eq!(h.controller.summary().total_lots, 4);

    h.store.set_reject_coordinate_updates(false);
    let lot_id = h.controller.commit_drawing(target).await.unwrap();

    assert_eq!(lot_id, 4);
    assert_eq!(h.controller.summary().total_lots, 4);
    assert!(h.controller.snapshot().lot_geometry(4).is_some());
    assert_eq!(
        h.store.write_calls(),
        vec![
            StoreCall::CreateLot {
                name: "Potrero".to_string()
            },
            StoreCall::UpdateLotCoordinates { lot_id: 4 },
            StoreCall::UpdateLotCoordinates { lot_id: 4 },
        ]
    );

    let created = h
        .events()
        .iter()
        .filter(|e| matches!(e, AppEvent::Data(DataEvent::LotCreated { .. })))
        .count();
    assert_eq!(created, 1);
    assert_eq!(
        h.notifier.levels(),
        vec![NotificationLevel::Error, NotificationLevel::Success]
    );
}
