use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::api::response::{ApiError, AppJson, Envelope};
use crate::nav::{self, MenuEntry};
use crate::schema::Lang;
use crate::storage::models::{LocalizedText, PageRecord, PageType};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub title: LocalizedText,
    pub slug: String,
    pub page_type: PageType,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    #[serde(default)]
    pub title: Option<LocalizedText>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub page_type: Option<PageType>,
    #[serde(default, deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent: Option<Option<String>>,
}

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ============================================================================
// Write handlers
// ============================================================================

/// Two-level invariant, checked against the current page set before any
/// write that assigns a parent.
fn check_two_levels(
    state: &AppState,
    page_id: Option<&str>,
    parent_id: &str,
) -> Result<(), ApiError> {
    let pages = state.db.list_pages().map_err(ApiError::internal)?;
    nav::validate_parent(&pages, page_id, parent_id)
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

pub async fn create_page(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreatePageRequest>,
) -> Result<(StatusCode, Json<Envelope<PageRecord>>), ApiError> {
    if req.slug.trim().is_empty() {
        return Err(ApiError::bad_request("slug must not be empty"));
    }

    if state
        .db
        .slug_exists(&req.slug)
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::conflict(format!(
            "slug '{}' is already in use",
            req.slug
        )));
    }

    if let Some(ref parent) = req.parent {
        check_two_levels(&state, None, parent)?;
    }

    let now = Utc::now();
    let page = PageRecord {
        id: uuid::Uuid::new_v4().to_string(),
        title: req.title,
        slug: req.slug,
        page_type: req.page_type,
        icon: req.icon,
        order: req.order,
        is_active: req.is_active,
        key: req.key,
        parent: req.parent,
        created_at: now,
        updated_at: now,
    };

    state.db.insert_page(&page).map_err(ApiError::internal)?;

    tracing::debug!(page_id = %page.id, slug = %page.slug, "Created page");
    Ok((StatusCode::CREATED, Envelope::ok("Created", page)))
}

pub async fn update_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdatePageRequest>,
) -> Result<Json<Envelope<PageRecord>>, ApiError> {
    let mut page = state
        .db
        .get_page(&id)
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Page not found"))?;

    if let Some(ref new_slug) = req.slug {
        if new_slug.trim().is_empty() {
            return Err(ApiError::bad_request("slug must not be empty"));
        }
        if *new_slug != page.slug
            && state
                .db
                .slug_exists(new_slug)
                .map_err(ApiError::internal)?
        {
            return Err(ApiError::conflict(format!(
                "slug '{new_slug}' is already in use"
            )));
        }
    }

    if let Some(Some(ref parent)) = req.parent {
        check_two_levels(&state, Some(&id), parent)?;
    }

    if let Some(title) = req.title {
        page.title = title;
    }
    if let Some(slug) = req.slug {
        page.slug = slug;
    }
    if let Some(page_type) = req.page_type {
        page.page_type = page_type;
    }
    if let Some(icon) = req.icon {
        page.icon = icon;
    }
    if let Some(order) = req.order {
        page.order = order;
    }
    if let Some(is_active) = req.is_active {
        page.is_active = is_active;
    }
    if let Some(key) = req.key {
        page.key = key;
    }
    if let Some(parent) = req.parent {
        page.parent = parent;
    }
    page.updated_at = Utc::now();

    if !state.db.update_page(&page).map_err(ApiError::internal)? {
        return Err(ApiError::not_found("Page not found"));
    }

    tracing::debug!(page_id = %id, "Updated page");
    Ok(Envelope::ok("Updated", page))
}

pub async fn delete_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    if !state.db.delete_page(&id).map_err(ApiError::internal)? {
        return Err(ApiError::not_found("Page not found"));
    }

    tracing::debug!(page_id = %id, "Deleted page");
    Ok(Envelope::message("Deleted"))
}

// ============================================================================
// Read handlers
// ============================================================================

/// The public two-level menu, built from active pages only.
pub async fn menu(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
) -> Result<Json<Envelope<Vec<MenuEntry>>>, ApiError> {
    let lang = Lang::resolve(&lang);
    let pages: Vec<PageRecord> = state
        .db
        .list_pages()
        .map_err(ApiError::internal)?
        .into_iter()
        .filter(|p| p.is_active)
        .collect();

    let entries = nav::build_menu(&pages, lang);
    if entries.is_empty() {
        Ok(Envelope::empty("No pages found", entries))
    } else {
        Ok(Envelope::ok("Success", entries))
    }
}

/// Raw page list, all languages, for the admin editing UI.
pub async fn list_raw(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<PageRecord>>>, ApiError> {
    let pages = state.db.list_pages().map_err(ApiError::internal)?;
    if pages.is_empty() {
        Ok(Envelope::empty("No pages found", pages))
    } else {
        Ok(Envelope::ok("Success", pages))
    }
}

pub async fn get_main(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<PageRecord>>>, ApiError> {
    let pages = state.db.list_pages().map_err(ApiError::internal)?;
    let main: Vec<PageRecord> = nav::top_level(&pages).into_iter().cloned().collect();
    Ok(Envelope::ok("Success", main))
}

pub async fn get_additional(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<PageRecord>>>, ApiError> {
    let pages = state.db.list_pages().map_err(ApiError::internal)?;
    let additional: Vec<PageRecord> = nav::children(&pages).into_iter().cloned().collect();
    Ok(Envelope::ok("Success", additional))
}

pub async fn get_main_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<PageRecord>>, ApiError> {
    let page = state
        .db
        .get_page(&id)
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Page not found"))?;
    Ok(Envelope::ok("Success", page))
}

/// Top-level pages not used as any parent — the editable main-navigation
/// leaves, excluding grouping containers.
pub async fn main_leaves(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<PageRecord>>>, ApiError> {
    let pages = state.db.list_pages().map_err(ApiError::internal)?;
    let leaves: Vec<PageRecord> = nav::top_level_leaves(&pages).into_iter().cloned().collect();
    Ok(Envelope::ok("Success", leaves))
}

/// Child pages not themselves used as a parent.
pub async fn additional_leaves(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<PageRecord>>>, ApiError> {
    let pages = state.db.list_pages().map_err(ApiError::internal)?;
    let leaves: Vec<PageRecord> = nav::child_leaves(&pages).into_iter().cloned().collect();
    Ok(Envelope::ok("Success", leaves))
}
