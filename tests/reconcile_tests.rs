use bytes::Bytes;
use chrono::Duration;
use content_manager::object_store::{LocalStore, ObjectStore};
use content_manager::reconcile::sweep_orphans;
use content_manager::storage::Database;
use serde_json::{json, Map};

fn fixtures() -> (tempfile::TempDir, Database, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    let store = LocalStore::new(dir.path().join("uploads")).unwrap();
    (dir, db, store)
}

async fn seed_news_with_photo(db: &Database, store: &LocalStore, key: &str) {
    store.put(key, Bytes::from("referenced")).await.unwrap();
    let mut fields = Map::new();
    fields.insert("title".to_string(), json!({"uz": "T", "ru": "Т", "en": "T"}));
    fields.insert(
        "description".to_string(),
        json!({"uz": "D", "ru": "Д", "en": "D"}),
    );
    fields.insert("photo".to_string(), json!(key));
    db.insert_record("news", fields).unwrap();
}

#[tokio::test]
async fn test_sweep_deletes_only_orphans() {
    let (_dir, db, store) = fixtures();

    seed_news_with_photo(&db, &store, "referenced.png").await;
    store.put("orphan.png", Bytes::from("orphan")).await.unwrap();

    // Let mtimes fall behind the cutoff
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let stats = sweep_orphans(&db, &store, Duration::zero()).await.unwrap();
    assert_eq!(stats.scanned, 2);
    assert_eq!(stats.deleted, 1);

    assert!(store.exists("referenced.png").await.unwrap());
    assert!(!store.exists("orphan.png").await.unwrap());
}

#[tokio::test]
async fn test_sweep_respects_grace_period() {
    let (_dir, db, store) = fixtures();

    store.put("fresh-orphan.png", Bytes::from("fresh")).await.unwrap();

    let stats = sweep_orphans(&db, &store, Duration::hours(1)).await.unwrap();
    assert_eq!(stats.scanned, 1);
    assert_eq!(stats.deleted, 0);

    // A just-written blob may belong to an in-flight upload
    assert!(store.exists("fresh-orphan.png").await.unwrap());
}

#[tokio::test]
async fn test_sweep_on_empty_store() {
    let (_dir, db, store) = fixtures();

    let stats = sweep_orphans(&db, &store, Duration::zero()).await.unwrap();
    assert_eq!(stats.scanned, 0);
    assert_eq!(stats.deleted, 0);
}
