mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A stored blob as seen by the reconciler.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub key: String,
    pub modified: DateTime<Utc>,
}

/// Abstraction over blob storage backends.
/// Keys are generated names -- the raw blobs are meaningless without the
/// records that reference them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;
    /// Enumerate every stored blob (for orphan reconciliation).
    async fn list(&self) -> Result<Vec<ObjectInfo>, ObjectStoreError>;
}
