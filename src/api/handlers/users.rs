use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::response::{ApiError, AppJson, Envelope};
use crate::auth::{self, AuthError};
use crate::storage::models::UserRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account view returned to clients. The password hash never leaves the
/// store.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        UserResponse {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an admin account.
///
/// Bootstrap rule: the route is open only while the store holds no accounts;
/// afterwards it requires a valid token like any other mutation.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Envelope<UserResponse>>), ApiError> {
    let existing_users = state.db.count_users().map_err(ApiError::internal)?;
    if existing_users > 0 {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(auth::bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
    }

    if req.username.trim().is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::bad_request(
            "password must be at least 6 characters",
        ));
    }

    let password_hash = auth::hash_password(&req.password).map_err(ApiError::internal)?;

    let now = Utc::now();
    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: req.full_name,
        username: req.username,
        password_hash,
        created_at: now,
        updated_at: now,
    };

    if !state.db.insert_user(&user).map_err(ApiError::internal)? {
        return Err(ApiError::conflict(format!(
            "username '{}' is already taken",
            user.username
        )));
    }

    tracing::info!(username = %user.username, "Created admin account");
    Ok((StatusCode::CREATED, Envelope::ok("Created", user.into())))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    match auth::authenticate(&state.db, &state.tokens, &req.username, &req.password) {
        Ok((user, token)) => Ok(Envelope::ok(
            "Logged in",
            LoginResponse {
                token,
                user: user.into(),
            },
        )),
        Err(AuthError::InvalidCredentials) => {
            Err(ApiError::unauthorized("Invalid username or password"))
        }
        Err(e) => Err(ApiError::internal(e)),
    }
}
