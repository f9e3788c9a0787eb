use lotmap_core::{
    InMemoryLotStore, LotPatch, LotStore, NewLot, StoreCall, StoreError, StoreSnapshot,
};
use serde_json::json;
use tempfile::TempDir;

fn snapshot() -> StoreSnapshot {
    serde_json::from_value(json!({
        "lots": [
            {
                "id": 1,
                "name": "North",
                "active": true,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.0, 4.0], [-73.99, 4.0], [-73.99, 4.01]]]
                }
            },
            { "id": 2, "name": "South", "active": false, "geometry": "not geometry" }
        ],
        "sublots": [
            { "id": 10, "lotId": 1, "description": "A" },
            { "id": 11, "lotId": 2, "description": "B" }
        ],
        "crops": [
            { "id": 1, "lotId": 1, "cropType": "Perennes" },
            { "id": 2, "lotId": 1, "cropType": "Transitorio" },
            { "id": 3, "lotId": 2, "cropType": "semi perenne" }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_snapshot_ingestion_is_lenient() {
    let store = InMemoryLotStore::from_snapshot(snapshot());
    let lots = store.get_lots().await.unwrap();

    assert_eq!(lots.len(), 2);
    assert!(lots[0].has_geometry());
    assert!(lots[1].geometry.is_none());
}

#[tokio::test]
async fn test_map_data_nests_sublots() {
    let store = InMemoryLotStore::from_snapshot(snapshot());
    let map_data = store.get_map_data().await.unwrap();

    assert_eq!(map_data.len(), 2);
    assert_eq!(map_data[0].sublots.len(), 1);
    assert_eq!(map_data[0].sublots[0].id, 10);
    assert_eq!(map_data[1].sublots[0].id, 11);
}

#[tokio::test]
async fn test_crop_paging() {
    let store = InMemoryLotStore::from_snapshot(snapshot());

    let first = store.get_crops(1, 2).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total, Some(3));

    let second = store.get_crops(2, 2).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, 3);

    let past_end = store.get_crops(5, 2).await.unwrap();
    assert!(past_end.items.is_empty());

    assert!(matches!(
        store.get_crops(0, 2).await,
        Err(StoreError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_page_cap_limits_page_size() {
    let store = InMemoryLotStore::from_snapshot(snapshot());
    store.set_page_cap(Some(2));

    let first = store.get_crops(1, 100).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total, Some(3));

    // Offsets follow the capped size
    let second = store.get_crops(2, 100).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, 3);
}

#[tokio::test]
async fn test_reject_coordinate_updates_allows_creates() {
    let store = InMemoryLotStore::from_snapshot(snapshot());
    store.set_reject_coordinate_updates(true);

    let lot = store.create_lot(&NewLot::named("East")).await.unwrap();
    assert_eq!(lot.id, 3);
    assert!(store
        .update_lot(1, &LotPatch::active(false))
        .await
        .is_ok());

    let polygon = store.get_lots().await.unwrap()[0].geometry.clone().unwrap();
    assert!(matches!(
        store.update_lot_coordinates(3, &polygon).await,
        Err(StoreError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_create_and_patch_lot() {
    let store = InMemoryLotStore::from_snapshot(snapshot());

    let created = store.create_lot(&NewLot::named("East")).await.unwrap();
    assert_eq!(created.id, 3);
    assert!(created.active);
    assert!(created.geometry.is_none());

    let patched = store.update_lot(3, &LotPatch::active(false)).await.unwrap();
    assert!(!patched.active);

    assert!(matches!(
        store.update_lot(99, &LotPatch::active(true)).await,
        Err(StoreError::LotNotFound(99))
    ));
    assert!(matches!(
        store.create_lot(&NewLot::named("  ")).await,
        Err(StoreError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_offline_store_records_attempts() {
    let store = InMemoryLotStore::from_snapshot(snapshot());
    store.set_offline(true);

    let err = store.get_lots().await.unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(store.calls(), vec![StoreCall::GetLots]);

    store.set_offline(false);
    store.clear_calls();
    assert!(store.get_lots().await.is_ok());
    assert!(store.write_calls().is_empty());
}

#[tokio::test]
async fn test_reject_writes_allows_reads() {
    let store = InMemoryLotStore::from_snapshot(snapshot());
    store.set_reject_writes(true);

    assert!(store.get_sublots().await.is_ok());
    assert!(matches!(
        store.update_lot(1, &LotPatch::active(false)).await,
        Err(StoreError::Rejected { status: 503, .. })
    ));
    assert!(store.get_lots().await.unwrap()[0].active);
}

#[test]
fn test_snapshot_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");

    let store = InMemoryLotStore::from_snapshot(snapshot());
    store.save_json_file(&path).unwrap();

    let loaded = InMemoryLotStore::from_json_file(&path).unwrap();
    assert_eq!(loaded.snapshot(), store.snapshot());
}

#[test]
fn test_missing_snapshot_file() {
    let dir = TempDir::new().unwrap();
    assert!(InMemoryLotStore::from_json_file(&dir.path().join("absent.json")).is_err());
}
