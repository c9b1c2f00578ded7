use chrono::Utc;
use content_manager::auth::{
    self, authenticate, hash_password, verify_password, AuthError, TokenSigner,
};
use content_manager::storage::models::UserRecord;
use content_manager::storage::Database;

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn seed_user(db: &Database, username: &str, password: &str) -> UserRecord {
    let now = Utc::now();
    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: "Sarvar Admin".to_string(),
        username: username.to_string(),
        password_hash: hash_password(password).unwrap(),
        created_at: now,
        updated_at: now,
    };
    assert!(db.insert_user(&user).unwrap());
    user
}

fn signer() -> TokenSigner {
    TokenSigner::new("test-secret", auth::DEFAULT_TOKEN_TTL_SECS)
}

#[test]
fn test_hash_and_verify_password() {
    let hash = hash_password("123456").unwrap();
    assert_ne!(hash, "123456");
    assert!(hash.starts_with("$argon2"));

    assert!(verify_password("123456", &hash));
    assert!(!verify_password("wrong", &hash));
    assert!(!verify_password("123456", "not-a-hash"));
}

#[test]
fn test_hashes_are_salted() {
    let first = hash_password("123456").unwrap();
    let second = hash_password("123456").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_authenticate_success() {
    let (_dir, db) = test_db();
    let seeded = seed_user(&db, "sarvar", "123456");
    let signer = signer();

    let (user, token) = authenticate(&db, &signer, "sarvar", "123456").unwrap();
    assert_eq!(user.id, seeded.id);

    let claims = signer.verify(&token).unwrap();
    assert_eq!(claims.username, "sarvar");
    assert_eq!(claims.sub, seeded.id);
    // Fixed 1-day expiry
    assert_eq!(claims.exp - claims.iat, auth::DEFAULT_TOKEN_TTL_SECS);
}

#[test]
fn test_wrong_password_and_unknown_user_fail_alike() {
    let (_dir, db) = test_db();
    seed_user(&db, "sarvar", "123456");
    let signer = signer();

    let wrong_password = authenticate(&db, &signer, "sarvar", "wrong").unwrap_err();
    let unknown_user = authenticate(&db, &signer, "nouser", "x").unwrap_err();

    // Same error kind for both, so responses never reveal account existence
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[test]
fn test_verify_rejects_tampered_token() {
    let (_dir, db) = test_db();
    seed_user(&db, "sarvar", "123456");
    let signer = signer();

    let (_, token) = authenticate(&db, &signer, "sarvar", "123456").unwrap();

    let other_signer = TokenSigner::new("different-secret", auth::DEFAULT_TOKEN_TTL_SECS);
    assert!(matches!(
        other_signer.verify(&token),
        Err(AuthError::InvalidToken)
    ));

    assert!(matches!(
        signer.verify("not.a.token"),
        Err(AuthError::InvalidToken)
    ));
}

#[test]
fn test_verify_rejects_expired_token() {
    let (_dir, db) = test_db();
    let user = seed_user(&db, "sarvar", "123456");

    // A signer with a negative TTL issues already-expired tokens
    let expired_signer = TokenSigner::new("test-secret", -3600);
    let token = expired_signer.issue(&user).unwrap();

    assert!(matches!(
        signer().verify(&token),
        Err(AuthError::InvalidToken)
    ));
}

#[test]
fn test_bearer_token_extraction() {
    assert_eq!(auth::bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    assert_eq!(auth::bearer_token("Bearer "), None);
    assert_eq!(auth::bearer_token("Basic abc"), None);
    assert_eq!(auth::bearer_token(""), None);
}
