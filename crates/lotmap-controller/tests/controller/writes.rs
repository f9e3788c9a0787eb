use crate::harness::default_harness;
use lotmap_controller::ControllerError;
use lotmap_core::{
    AppEvent, DataEvent, GeoPoint, NewLot, NewSublot, NotificationLevel, Polygon, Ring,
    StoreCall, StoreError,
};

fn triangle() -> Polygon {
    Polygon::from_ring(Ring::new(vec![
        GeoPoint::new(-74.05, 4.62),
        GeoPoint::new(-74.04, 4.62),
        GeoPoint::new(-74.04, 4.63),
    ]))
}

#[tokio::test]
async fn test_set_active_confirmed_by_store() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();

    let lot = h.controller.set_active(2, true).await.unwrap();
    assert!(lot.active);

    // The refreshed snapshot carries the confirmed flag
    assert_eq!(h.controller.summary().active_lots, 3);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Success]);
    assert!(h.events().iter().any(|e| matches!(
        e,
        AppEvent::Data(DataEvent::LotActiveChanged {
            lot_id: 2,
            active: true
        })
    )));
}

#[tokio::test]
async fn test_set_active_failure_changes_nothing() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();
    h.store.set_reject_writes(true);

    let err = h.controller.set_active(1, false).await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Store(StoreError::Rejected { status: 503, .. })
    ));

    assert_eq!(h.controller.summary().active_lots, 2);
    assert!(h.store.snapshot().lots[0].active);
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Error]);
    assert!(!h
        .events()
        .iter()
        .any(|e| matches!(e, AppEvent::Data(DataEvent::LotActiveChanged { .. }))));
}

#[tokio::test]
async fn test_set_active_unknown_lot() {
    let h = default_harness();
    let err = h.controller.set_active(404, true).await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Store(StoreError::LotNotFound(404))
    ));
    let message = h.notifier.last().unwrap().message;
    assert!(message.contains("404"), "{}", message);
}

#[tokio::test]
async fn test_create_lot_with_geometry() {
    let h = default_harness();
    let lot_id = h
        .controller
        .create_lot(NewLot::named("Potrero 4"), Some(triangle()))
        .await
        .unwrap();

    assert_eq!(lot_id, 4);
    assert_eq!(
        h.store.write_calls(),
        vec![
            StoreCall::CreateLot {
                name: "Potrero 4".to_string()
            },
            StoreCall::UpdateLotCoordinates { lot_id: 4 },
        ]
    );
    assert_eq!(h.controller.summary().total_lots, 4);
    assert!(h.controller.snapshot().lot_geometry(4).is_some());
}

#[tokio::test]
async fn test_create_lot_without_geometry() {
    let h = default_harness();
    let lot_id = h
        .controller
        .create_lot(NewLot::named("Sin mapa"), None)
        .await
        .unwrap();

    assert_eq!(
        h.store.write_calls(),
        vec![StoreCall::CreateLot {
            name: "Sin mapa".to_string()
        }]
    );
    assert!(h.controller.snapshot().lot_geometry(lot_id).is_none());
}

#[tokio::test]
async fn test_create_lot_invalid_geometry_never_reaches_store() {
    let h = default_harness();
    let closed = Polygon::from_ring(Ring::new(vec![
        GeoPoint::new(-74.05, 4.62),
        GeoPoint::new(-74.04, 4.62),
        GeoPoint::new(-74.04, 4.63),
        GeoPoint::new(-74.05, 4.62),
    ]));

    let err = h
        .controller
        .create_lot(NewLot::named("Cerrado"), Some(closed))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Store(StoreError::InvalidGeometry(_))
    ));
    assert!(h.store.write_calls().is_empty());
    assert_eq!(h.notifier.levels(), vec![NotificationLevel::Error]);
}

#[tokio::test]
async fn test_create_sublot() {
    let h = default_harness();
    let sublot = h
        .controller
        .create_sublot(
            NewSublot {
                description: "Sur".to_string(),
                location: "S".to_string(),
                lot_id: 3,
            },
            Some(triangle()),
        )
        .await
        .unwrap();

    assert_eq!(sublot.id, 12);
    assert!(sublot.geometry.is_some());
    assert_eq!(
        h.store.write_calls(),
        vec![
            StoreCall::CreateSublot { lot_id: 3 },
            StoreCall::UpdateSublotCoordinates { sublot_id: 12 },
        ]
    );

    // Lot 3 has no geometry of its own but now has a rendered sublot
    let layers = h.controller.snapshot().layers();
    let lot3 = layers.iter().find(|l| l.lot_id == 3).unwrap();
    assert!(lot3.rings.is_empty());
    assert_eq!(lot3.sublots.len(), 1);
    assert!(h.events().iter().any(|e| matches!(
        e,
        AppEvent::Data(DataEvent::SublotCreated { sublot_id: 12 })
    )));
}

#[tokio::test]
async fn test_create_lot_geometry_not_saved() {
    let h = default_harness();
    h.controller.refresh().await.unwrap();
    h.store.set_reject_coordinate_updates(true);

    let err = h
        .controller
        .create_lot(NewLot::named("Potrero 5"), Some(triangle()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Store(StoreError::GeometryNotSaved { lot_id: 4, .. })
    ));
    let notification = h.notifier.last().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(
        notification
            .message
            .starts_with("Lot Potrero 5 was created but its polygon was not saved"),
        "{}",
        notification.message
    );

    // The lot exists without geometry and the snapshot shows it
    assert_eq!(h.controller.summary().total_lots, 4);
    assert!(h.controller.snapshot().lot_geometry(4).is_none());
    assert!(h.events().iter().any(|e| matches!(
        e,
        AppEvent::Data(DataEvent::LotCreated { lot_id: 4 })
    )));
}
