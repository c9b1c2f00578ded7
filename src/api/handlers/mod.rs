mod admin;
mod content;
mod pages;
mod static_files;
mod users;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

pub use admin::{admin_purge, health};
pub use content::{
    active_localized, active_raw, create_record, delete_record, list_localized, list_raw,
    update_record,
};
pub use pages::{
    additional_leaves, create_page, delete_page, get_additional, get_main, get_main_one,
    list_raw as list_pages_raw, main_leaves, menu, update_page,
};
pub use static_files::serve_static;
pub use users::{create_user, login};

use crate::api::response::ApiError;
use crate::auth;
use crate::AppState;

/// Bearer-token guard for mutating routes. The verified claims are attached
/// to the request for downstream logging.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(auth::bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
