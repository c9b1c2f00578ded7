use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, Envelope};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub records_deleted: u64,
    pub pages_deleted: u64,
    pub users_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<Envelope<HealthResponse>> {
    Envelope::ok(
        "ok",
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<PurgeResponse>>, ApiError> {
    let stats = state.db.purge_all().map_err(ApiError::internal)?;

    tracing::warn!(
        records = stats.records,
        pages = stats.pages,
        users = stats.users,
        "Purged all data"
    );

    Ok(Envelope::ok(
        "Purged",
        PurgeResponse {
            records_deleted: stats.records,
            pages_deleted: stats.pages,
            users_deleted: stats.users,
        },
    ))
}
