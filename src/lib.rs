//! content-manager - A multilingual content management API
//!
//! This crate provides the backend for an agency informational site:
//! - Multilingual (uz/ru/en) content entities driven by a schema registry
//! - File uploads with replacement/cleanup policy and orphan reconciliation
//! - Two-level navigation pages with derived roles
//! - Username/password admin auth issuing signed session tokens
//! - redb embedded database for documents (ACID, MVCC, crash-safe)

pub mod api;
pub mod auth;
pub mod config;
pub mod media;
pub mod nav;
pub mod object_store;
pub mod reconcile;
pub mod schema;
pub mod storage;

use std::sync::Arc;

use auth::TokenSigner;
use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
    pub tokens: TokenSigner,
}
