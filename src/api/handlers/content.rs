use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::api::response::{ApiError, Envelope};
use crate::media;
use crate::schema::{self, EntitySchema, Lang, MediaField, MediaKind, ScalarKind};
use crate::AppState;

// ============================================================================
// Multipart parsing
// ============================================================================

/// An uploaded file staged in memory: nothing touches the object store until
/// the whole form has parsed and validated.
struct Upload {
    field: &'static MediaField,
    key: String,
    data: Bytes,
}

struct ParsedForm {
    fields: Map<String, Value>,
    uploads: Vec<Upload>,
    /// Paths to detach per list-media field (`removed_photos` etc.).
    removed: HashMap<String, Vec<String>>,
}

impl ParsedForm {
    fn upload_keys(&self, field_name: &str) -> Vec<String> {
        self.uploads
            .iter()
            .filter(|u| u.field.name == field_name)
            .map(|u| u.key.clone())
            .collect()
    }

    fn all_keys(&self) -> Vec<String> {
        self.uploads.iter().map(|u| u.key.clone()).collect()
    }
}

fn resolve(entity: &str) -> Result<&'static EntitySchema, ApiError> {
    schema::lookup(entity).ok_or_else(|| ApiError::not_found(format!("Unknown entity '{entity}'")))
}

async fn parse_form(
    schema: &'static EntitySchema,
    mut multipart: Multipart,
) -> Result<ParsedForm, ApiError> {
    let mut form = ParsedForm {
        fields: Map::new(),
        uploads: Vec::new(),
        removed: HashMap::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if let Some(media_field) = schema.media_field(&name) {
            let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
                // A single-media field may also arrive as a plain text path
                // (a caller echoing back the stored value).
                if media_field.kind != MediaKind::Single {
                    return Err(ApiError::bad_request(format!("'{name}' must be a file field")));
                }
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid '{name}': {e}")))?;
                form.fields.insert(name, Value::String(text));
                continue;
            };

            let ext = file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .ok_or_else(|| {
                    ApiError::bad_request(format!("'{file_name}' has no file extension"))
                })?;

            if !media_field.class.allows_extension(&ext) {
                return Err(ApiError::bad_request(format!(
                    "'{name}' does not accept '.{ext}' files"
                )));
            }

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read '{name}': {e}")))?;

            if data.len() as u64 > media_field.class.max_bytes() {
                return Err(ApiError::payload_too_large(format!(
                    "'{name}' exceeds the maximum size of {} bytes",
                    media_field.class.max_bytes()
                )));
            }

            form.uploads.push(Upload {
                field: media_field,
                key: format!("{}.{ext}", uuid::Uuid::new_v4()),
                data,
            });
        } else if let Some(list_name) = removed_list_target(schema, &name) {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid '{name}': {e}")))?;
            let paths: Vec<String> = serde_json::from_str(&text).map_err(|e| {
                ApiError::bad_request(format!("'{name}' must be a JSON array of paths: {e}"))
            })?;
            form.removed.insert(list_name.to_string(), paths);
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid '{name}': {e}")))?;
            let value = parse_text_field(schema, &name, &text)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// `removed_<field>` matches a list-media field of the schema.
fn removed_list_target(schema: &EntitySchema, name: &str) -> Option<&'static str> {
    let target = name.strip_prefix("removed_")?;
    schema
        .media
        .iter()
        .find(|m| m.kind == MediaKind::Many && m.name == target)
        .map(|m| m.name)
}

fn parse_text_field(schema: &EntitySchema, name: &str, text: &str) -> Result<Value, ApiError> {
    if schema.localized.iter().any(|g| g.name == name) {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            ApiError::bad_request(format!("'{name}' must be a JSON object with uz/ru/en keys: {e}"))
        })?;
        if !value.is_object() {
            return Err(ApiError::bad_request(format!(
                "'{name}' must be a JSON object with uz/ru/en keys"
            )));
        }
        return Ok(value);
    }

    if let Some(scalar) = schema.scalars.iter().find(|s| s.name == name) {
        if let ScalarKind::Bool { .. } = scalar.kind {
            return text
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| ApiError::bad_request(format!("'{name}' must be true or false")));
        }
    }

    // Unknown fields pass through as strings; validation drops them.
    Ok(Value::String(text.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<Value>>), ApiError> {
    let schema = resolve(&entity)?;
    let form = parse_form(schema, multipart).await?;

    let mut fields = form.fields.clone();
    for media_field in schema.media {
        let keys = form.upload_keys(media_field.name);
        match media_field.kind {
            MediaKind::Single => {
                if let Some(key) = keys.into_iter().next_back() {
                    fields.insert(media_field.name.to_string(), Value::String(key));
                }
            }
            MediaKind::Many => {
                if !keys.is_empty() {
                    fields.insert(
                        media_field.name.to_string(),
                        Value::Array(keys.into_iter().map(Value::String).collect()),
                    );
                }
            }
        }
    }

    let fields = schema::validate_fields(schema, fields, true)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    // Phase 1: store the uploaded blobs
    for upload in &form.uploads {
        state
            .object_store
            .put(&upload.key, upload.data.clone())
            .await
            .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;
    }

    // Phase 2: insert the document; clean up the blobs if that fails
    let record = match state.db.insert_record(schema.name, fields) {
        Ok(record) => record,
        Err(e) => {
            media::delete_blobs(state.object_store.as_ref(), &form.all_keys()).await;
            return Err(ApiError::internal(e));
        }
    };

    tracing::debug!(entity = schema.name, id = %record.id, "Created record");

    Ok((
        StatusCode::CREATED,
        Envelope::ok("Created", Value::Object(schema::raw_view(&record))),
    ))
}

pub async fn update_record(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let schema = resolve(&entity)?;
    let form = parse_form(schema, multipart).await?;

    let existing = state
        .db
        .get_record(schema.name, &id)
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    let mut fields = form.fields.clone();
    let mut orphaned: Vec<String> = Vec::new();

    for media_field in schema.media {
        match media_field.kind {
            MediaKind::Single => {
                // A fresh upload wins over a text-provided path.
                let new_key = form
                    .upload_keys(media_field.name)
                    .into_iter()
                    .next_back()
                    .or_else(|| {
                        form.fields
                            .get(media_field.name)
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    });
                let old_key = existing
                    .fields
                    .get(media_field.name)
                    .and_then(Value::as_str);

                match media::plan_single(old_key, new_key.as_deref()) {
                    media::SingleMediaAction::Keep | media::SingleMediaAction::Unchanged => {}
                    media::SingleMediaAction::Replace { delete, store } => {
                        orphaned.extend(delete);
                        fields.insert(media_field.name.to_string(), Value::String(store));
                    }
                }
            }
            MediaKind::Many => {
                let appended = form.upload_keys(media_field.name);
                let removed = form
                    .removed
                    .get(media_field.name)
                    .cloned()
                    .unwrap_or_default();
                if appended.is_empty() && removed.is_empty() {
                    continue;
                }

                let current: Vec<String> = existing
                    .fields
                    .get(media_field.name)
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();

                let plan = media::plan_list(&current, &removed, &appended);
                orphaned.extend(plan.to_delete);
                fields.insert(
                    media_field.name.to_string(),
                    Value::Array(plan.final_list.into_iter().map(Value::String).collect()),
                );
            }
        }
    }

    let fields = schema::validate_fields(schema, fields, false)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    for upload in &form.uploads {
        state
            .object_store
            .put(&upload.key, upload.data.clone())
            .await
            .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;
    }

    // Detached blobs go before the document write; failures only warn.
    media::delete_blobs(state.object_store.as_ref(), &orphaned).await;

    let updated = match state.db.update_record(schema.name, &id, fields) {
        Ok(Some(record)) => record,
        Ok(None) => {
            media::delete_blobs(state.object_store.as_ref(), &form.all_keys()).await;
            return Err(ApiError::not_found("Record not found"));
        }
        Err(e) => {
            media::delete_blobs(state.object_store.as_ref(), &form.all_keys()).await;
            return Err(ApiError::internal(e));
        }
    };

    tracing::debug!(entity = schema.name, id = %id, "Updated record");
    Ok(Envelope::ok(
        "Updated",
        Value::Object(schema::raw_view(&updated)),
    ))
}

pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let schema = resolve(&entity)?;

    let removed = state
        .db
        .delete_record(schema.name, &id)
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    media::delete_blobs(state.object_store.as_ref(), &removed.media_keys(schema)).await;

    tracing::debug!(entity = schema.name, id = %id, "Deleted record");
    Ok(Envelope::message("Deleted"))
}

pub async fn list_localized(
    State(state): State<Arc<AppState>>,
    Path((entity, lang)): Path<(String, String)>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let schema = resolve(&entity)?;
    let lang = Lang::resolve(&lang);

    let mut records = state
        .db
        .list_records(schema.name)
        .map_err(ApiError::internal)?;
    schema::sort_for_listing(schema, &mut records);

    let items: Vec<Value> = records
        .iter()
        .map(|r| Value::Object(schema::localize(r, schema, lang)))
        .collect();

    if items.is_empty() {
        Ok(Envelope::empty("No records found", items))
    } else {
        Ok(Envelope::ok("Success", items))
    }
}

pub async fn list_raw(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let schema = resolve(&entity)?;

    let mut records = state
        .db
        .list_records(schema.name)
        .map_err(ApiError::internal)?;
    schema::sort_for_listing(schema, &mut records);

    let items: Vec<Value> = records
        .iter()
        .map(|r| Value::Object(schema::raw_view(r)))
        .collect();

    if items.is_empty() {
        Ok(Envelope::empty("No records found", items))
    } else {
        Ok(Envelope::ok("Success", items))
    }
}

pub async fn active_localized(
    State(state): State<Arc<AppState>>,
    Path((entity, lang)): Path<(String, String)>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let schema = resolve(&entity)?;
    if !schema.has_active {
        return Err(ApiError::not_found(format!(
            "'{entity}' has no active-record endpoint"
        )));
    }
    let lang = Lang::resolve(&lang);

    let records = state
        .db
        .list_records(schema.name)
        .map_err(ApiError::internal)?;

    match schema::most_recent_active(&records) {
        Some(record) => Ok(Envelope::ok(
            "Success",
            Value::Object(schema::localize(record, schema, lang)),
        )),
        None => Ok(Envelope::none("No active record")),
    }
}

pub async fn active_raw(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let schema = resolve(&entity)?;
    if !schema.has_active {
        return Err(ApiError::not_found(format!(
            "'{entity}' has no active-record endpoint"
        )));
    }

    let records = state
        .db
        .list_records(schema.name)
        .map_err(ApiError::internal)?;

    match schema::most_recent_active(&records) {
        Some(record) => Ok(Envelope::ok(
            "Success",
            Value::Object(schema::raw_view(record)),
        )),
        None => Ok(Envelope::none("No active record")),
    }
}
