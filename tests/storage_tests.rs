use chrono::Utc;
use content_manager::storage::models::{LocalizedText, PageRecord, PageType, UserRecord};
use content_manager::storage::Database;
use serde_json::{json, Map, Value};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn news_fields(title_uz: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        "title".to_string(),
        json!({"uz": title_uz, "ru": "Новость", "en": "News"}),
    );
    fields.insert(
        "description".to_string(),
        json!({"uz": "Tavsif", "ru": "Описание", "en": "Description"}),
    );
    fields
}

// ============================================================================
// Generic content records
// ============================================================================

#[test]
fn test_insert_and_get_record() {
    let (_dir, db) = test_db();

    let record = db.insert_record("news", news_fields("Yangilik")).unwrap();
    assert!(!record.id.is_empty());
    assert_eq!(record.created_at, record.updated_at);

    let retrieved = db
        .get_record("news", &record.id)
        .unwrap()
        .expect("record should exist");
    assert_eq!(retrieved.id, record.id);
    assert_eq!(
        retrieved.fields.get("title").unwrap()["uz"],
        json!("Yangilik")
    );
    assert_eq!(
        retrieved.fields.get("description").unwrap()["en"],
        json!("Description")
    );
}

#[test]
fn test_get_record_not_found() {
    let (_dir, db) = test_db();
    assert!(db.get_record("news", "nonexistent").unwrap().is_none());
}

#[test]
fn test_update_record_merges_fields() {
    let (_dir, db) = test_db();
    let record = db.insert_record("news", news_fields("Eski")).unwrap();

    let mut patch = Map::new();
    patch.insert(
        "title".to_string(),
        json!({"uz": "Yangi", "ru": "Новый", "en": "New"}),
    );

    let updated = db
        .update_record("news", &record.id, patch)
        .unwrap()
        .expect("record should exist");

    // Patched key overwritten, absent key preserved
    assert_eq!(updated.fields.get("title").unwrap()["uz"], json!("Yangi"));
    assert_eq!(
        updated.fields.get("description").unwrap()["uz"],
        json!("Tavsif")
    );
    assert!(updated.updated_at >= updated.created_at);
}

#[test]
fn test_update_record_not_found() {
    let (_dir, db) = test_db();
    assert!(db
        .update_record("news", "nonexistent", Map::new())
        .unwrap()
        .is_none());
}

#[test]
fn test_delete_record_returns_removed() {
    let (_dir, db) = test_db();
    let mut fields = news_fields("O'chiriladigan");
    fields.insert("photo".to_string(), json!("abc.png"));
    let record = db.insert_record("news", fields).unwrap();

    let removed = db
        .delete_record("news", &record.id)
        .unwrap()
        .expect("record should exist");
    assert_eq!(removed.fields.get("photo").unwrap(), &json!("abc.png"));

    assert!(db.get_record("news", &record.id).unwrap().is_none());
}

#[test]
fn test_delete_record_idempotent() {
    let (_dir, db) = test_db();
    let record = db.insert_record("news", news_fields("Bir marta")).unwrap();

    assert!(db.delete_record("news", &record.id).unwrap().is_some());
    // Second delete neither errors nor resurrects anything
    assert!(db.delete_record("news", &record.id).unwrap().is_none());
    assert!(db.get_record("news", &record.id).unwrap().is_none());
}

#[test]
fn test_list_records() {
    let (_dir, db) = test_db();
    db.insert_record("news", news_fields("A")).unwrap();
    db.insert_record("news", news_fields("B")).unwrap();

    assert_eq!(db.list_records("news").unwrap().len(), 2);
    assert!(db.list_records("faq").unwrap().is_empty());
}

#[test]
fn test_collections_are_isolated() {
    let (_dir, db) = test_db();
    let record = db.insert_record("news", news_fields("Faqat news")).unwrap();

    assert!(db.get_record("announcement", &record.id).unwrap().is_none());
    assert!(db.list_records("announcement").unwrap().is_empty());
}

#[test]
fn test_referenced_media_keys() {
    let (_dir, db) = test_db();

    let mut with_photo = news_fields("Rasmli");
    with_photo.insert("photo".to_string(), json!("photo-1.png"));
    db.insert_record("news", with_photo).unwrap();

    let mut gallery = Map::new();
    gallery.insert("title".to_string(), json!({"uz": "Galereya", "ru": "", "en": ""}));
    gallery.insert("photos".to_string(), json!(["g-1.jpg", "g-2.jpg"]));
    db.insert_record("gallery", gallery).unwrap();

    let keys = db.referenced_media_keys().unwrap();
    assert!(keys.contains("photo-1.png"));
    assert!(keys.contains("g-1.jpg"));
    assert!(keys.contains("g-2.jpg"));
    assert_eq!(keys.len(), 3);
}

// ============================================================================
// Pages
// ============================================================================

fn sample_page(id: &str, slug: &str, parent: Option<&str>) -> PageRecord {
    let now = Utc::now();
    PageRecord {
        id: id.to_string(),
        title: LocalizedText {
            uz: format!("{slug} uz"),
            ru: format!("{slug} ru"),
            en: format!("{slug} en"),
        },
        slug: slug.to_string(),
        page_type: PageType::Static,
        icon: None,
        order: 0,
        is_active: true,
        key: String::new(),
        parent: parent.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_insert_and_get_page() {
    let (_dir, db) = test_db();
    db.insert_page(&sample_page("p1", "about", None)).unwrap();

    let page = db.get_page("p1").unwrap().expect("page should exist");
    assert_eq!(page.slug, "about");
    assert_eq!(page.title.uz, "about uz");
    assert!(db.slug_exists("about").unwrap());
    assert!(!db.slug_exists("missing").unwrap());
}

#[test]
fn test_update_page_reindexes_slug() {
    let (_dir, db) = test_db();
    db.insert_page(&sample_page("p1", "old-slug", None)).unwrap();

    let mut page = db.get_page("p1").unwrap().unwrap();
    page.slug = "new-slug".to_string();
    assert!(db.update_page(&page).unwrap());

    assert!(!db.slug_exists("old-slug").unwrap());
    assert!(db.slug_exists("new-slug").unwrap());
}

#[test]
fn test_update_page_not_found() {
    let (_dir, db) = test_db();
    assert!(!db.update_page(&sample_page("ghost", "ghost", None)).unwrap());
}

#[test]
fn test_delete_page_cleans_slug_index() {
    let (_dir, db) = test_db();
    db.insert_page(&sample_page("p1", "doomed", None)).unwrap();

    assert!(db.delete_page("p1").unwrap());
    assert!(db.get_page("p1").unwrap().is_none());
    assert!(!db.slug_exists("doomed").unwrap());

    assert!(!db.delete_page("p1").unwrap());
}

// ============================================================================
// Users
// ============================================================================

fn sample_user(id: &str, username: &str) -> UserRecord {
    let now = Utc::now();
    UserRecord {
        id: id.to_string(),
        full_name: "Admin".to_string(),
        username: username.to_string(),
        password_hash: "$argon2id$fake".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_insert_user_and_lookup() {
    let (_dir, db) = test_db();
    assert!(db.insert_user(&sample_user("u1", "sarvar")).unwrap());

    let user = db
        .get_user_by_username("sarvar")
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.id, "u1");

    assert!(db.get_user_by_username("nouser").unwrap().is_none());
    assert_eq!(db.count_users().unwrap(), 1);
}

#[test]
fn test_insert_user_duplicate_username() {
    let (_dir, db) = test_db();
    assert!(db.insert_user(&sample_user("u1", "sarvar")).unwrap());
    assert!(!db.insert_user(&sample_user("u2", "sarvar")).unwrap());
    assert_eq!(db.count_users().unwrap(), 1);
}

// ============================================================================
// Purge
// ============================================================================

#[test]
fn test_purge_all() {
    let (_dir, db) = test_db();
    db.insert_record("news", news_fields("P1")).unwrap();
    db.insert_record("faq", {
        let mut f = Map::new();
        f.insert("question".to_string(), json!({"uz": "?", "ru": "?", "en": "?"}));
        f.insert("answer".to_string(), json!({"uz": "!", "ru": "!", "en": "!"}));
        f
    })
    .unwrap();
    db.insert_page(&sample_page("p1", "purge-me", None)).unwrap();
    db.insert_user(&sample_user("u1", "sarvar")).unwrap();

    let stats = db.purge_all().unwrap();
    assert_eq!(stats.records, 2);
    assert_eq!(stats.pages, 1);
    assert_eq!(stats.users, 1);

    assert!(db.list_records("news").unwrap().is_empty());
    assert!(db.list_pages().unwrap().is_empty());
    assert!(!db.slug_exists("purge-me").unwrap());
    assert!(db.get_user_by_username("sarvar").unwrap().is_none());
}
