use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{EntitySchema, Lang};

/// A content document stored in redb.
///
/// `fields` holds the schema-validated field map: localized groups as
/// `{uz, ru, en}` objects, single media fields as path strings, list media
/// fields as path arrays, scalars as strings/booleans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: Map<String, Value>,
}

impl ContentRecord {
    /// Every blob key referenced by this record's media fields.
    pub fn media_keys(&self, schema: &EntitySchema) -> Vec<String> {
        let mut keys = Vec::new();
        for field in schema.media {
            match self.fields.get(field.name) {
                Some(Value::String(key)) => keys.push(key.clone()),
                Some(Value::Array(items)) => {
                    keys.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)));
                }
                _ => {}
            }
        }
        keys
    }
}

/// A multilingual text value, stored as a genuine keyed mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub uz: String,
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Uz => &self.uz,
            Lang::Ru => &self.ru,
            Lang::En => &self.en,
        }
    }
}

/// What a navigation page links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Static,
    News,
    Gallery,
    Documents,
}

/// A navigation node. Roles (top-level / child / grouping) are derived from
/// `parent` references at read time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    pub title: LocalizedText,
    pub slug: String,
    pub page_type: PageType,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_active: bool,
    /// Tag linking the page to the content queried under it.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An admin account. The password is stored only as an argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
