use lotmap_core::{
    save_lot_geometry, save_sublot_geometry, GeoPoint, GeometryError, InMemoryLotStore,
    LotStore, LotTarget, NewLot, NewSublot, Polygon, Ring, StoreCall, StoreError,
};

fn triangle() -> Polygon {
    Polygon::from_ring(Ring::new(vec![
        GeoPoint::new(-74.0, 4.0),
        GeoPoint::new(-73.99, 4.0),
        GeoPoint::new(-73.99, 4.01),
    ]))
}

#[tokio::test]
async fn test_new_lot_is_created_then_updated() {
    let store = InMemoryLotStore::new();
    let target = LotTarget::New(NewLot::named("Field 7"));

    let lot_id = save_lot_geometry(&store, &target, &triangle()).await.unwrap();

    assert_eq!(
        store.write_calls(),
        vec![
            StoreCall::CreateLot {
                name: "Field 7".to_string()
            },
            StoreCall::UpdateLotCoordinates { lot_id },
        ]
    );
    let lots = store.get_lots().await.unwrap();
    assert_eq!(lots[0].geometry, Some(triangle()));
}

#[tokio::test]
async fn test_existing_lot_only_updates() {
    let store = InMemoryLotStore::new();
    let lot = store.create_lot(&NewLot::named("Old")).await.unwrap();
    store.clear_calls();

    let lot_id = save_lot_geometry(&store, &LotTarget::Existing(lot.id), &triangle())
        .await
        .unwrap();

    assert_eq!(lot_id, lot.id);
    assert_eq!(
        store.write_calls(),
        vec![StoreCall::UpdateLotCoordinates { lot_id }]
    );
}

#[tokio::test]
async fn test_failed_update_after_create_reports_new_id() {
    let store = InMemoryLotStore::new();
    store.set_reject_coordinate_updates(true);
    let target = LotTarget::New(NewLot::named("Field 8"));

    let err = save_lot_geometry(&store, &target, &triangle())
        .await
        .unwrap_err();

    assert_eq!(err.created_lot_id(), Some(1));
    match err {
        StoreError::GeometryNotSaved { lot_id, source } => {
            assert_eq!(lot_id, 1);
            assert!(source.is_unavailable());
        }
        other => panic!("Unexpected error {:?}", other),
    }
    let lots = store.get_lots().await.unwrap();
    assert_eq!(lots.len(), 1);
    assert!(lots[0].geometry.is_none());
}

#[tokio::test]
async fn test_failed_update_on_existing_lot_is_plain() {
    let store = InMemoryLotStore::new();
    let lot = store.create_lot(&NewLot::named("Old")).await.unwrap();
    store.set_reject_coordinate_updates(true);

    let err = save_lot_geometry(&store, &LotTarget::Existing(lot.id), &triangle())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Unavailable(_)));
    assert_eq!(err.created_lot_id(), None);
}

#[tokio::test]
async fn test_invalid_geometry_never_reaches_store() {
    let store = InMemoryLotStore::new();
    let closed = Polygon::from_ring(Ring::new(vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(1.0, 0.0),
        GeoPoint::new(1.0, 1.0),
        GeoPoint::new(0.0, 0.0),
    ]));

    let err = save_lot_geometry(&store, &LotTarget::New(NewLot::named("X")), &closed)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::InvalidGeometry(GeometryError::PreClosed)
    ));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_sublot_with_and_without_geometry() {
    let store = InMemoryLotStore::new();
    let lot = store.create_lot(&NewLot::named("Parent")).await.unwrap();
    store.clear_calls();

    let new_sublot = NewSublot {
        description: "Row 1".to_string(),
        location: "west".to_string(),
        lot_id: lot.id,
    };

    let bare = save_sublot_geometry(&store, &new_sublot, None).await.unwrap();
    assert!(bare.geometry.is_none());
    assert_eq!(store.write_calls().len(), 1);

    let shaped = save_sublot_geometry(&store, &new_sublot, Some(&triangle()))
        .await
        .unwrap();
    assert_eq!(shaped.geometry, Some(triangle()));
    assert_eq!(
        store.write_calls().last(),
        Some(&StoreCall::UpdateSublotCoordinates {
            sublot_id: shaped.id
        })
    );
}

#[tokio::test]
async fn test_sublot_for_unknown_lot() {
    let store = InMemoryLotStore::new();
    let new_sublot = NewSublot {
        description: String::new(),
        location: String::new(),
        lot_id: 42,
    };

    assert!(matches!(
        save_sublot_geometry(&store, &new_sublot, Some(&triangle())).await,
        Err(StoreError::LotNotFound(42))
    ));
}
