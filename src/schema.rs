//! Entity schema registry.
//!
//! Every content type is a row in [`REGISTRY`] rather than a hand-written
//! module: the generic storage and handler code is parameterized by these
//! descriptors (field groups, media descriptors, ordering and active-record
//! behavior).

use serde_json::{Map, Value};
use thiserror::Error;

use crate::storage::models::ContentRecord;

// ============================================================================
// Languages
// ============================================================================

/// Site languages. Anything unrecognized resolves to Uzbek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Uz,
    Ru,
    En,
}

impl Lang {
    pub fn parse(s: &str) -> Option<Lang> {
        match s {
            "uz" => Some(Lang::Uz),
            "ru" => Some(Lang::Ru),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    /// Resolve a request-supplied language code, falling back to `uz`.
    pub fn resolve(s: &str) -> Lang {
        Lang::parse(s).unwrap_or(Lang::Uz)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Uz => "uz",
            Lang::Ru => "ru",
            Lang::En => "en",
        }
    }
}

pub const LANGS: [Lang; 3] = [Lang::Uz, Lang::Ru, Lang::En];

// ============================================================================
// Field descriptors
// ============================================================================

/// A multilingual text group, stored as a `{uz, ru, en}` object.
#[derive(Debug, Clone, Copy)]
pub struct LocalizedField {
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// One nullable path string (`photo`, `video`, `file`).
    Single,
    /// An ordered list of path strings (`photos`).
    Many,
}

/// Upload class: decides the accepted extensions and the size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    Video,
    ImageOrVideo,
    Document,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "ppt", "pptx"];

const MIB: u64 = 1024 * 1024;

impl MediaClass {
    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        match self {
            MediaClass::Image => IMAGE_EXTENSIONS.contains(&ext.as_str()),
            MediaClass::Video => VIDEO_EXTENSIONS.contains(&ext.as_str()),
            MediaClass::ImageOrVideo => {
                IMAGE_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
            }
            MediaClass::Document => DOCUMENT_EXTENSIONS.contains(&ext.as_str()),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        match self {
            MediaClass::Image | MediaClass::Document => 10 * MIB,
            MediaClass::Video | MediaClass::ImageOrVideo => 200 * MIB,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MediaField {
    pub name: &'static str,
    pub kind: MediaKind,
    pub class: MediaClass,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum ScalarKind {
    Text,
    Bool {
        default: bool,
    },
    Choice {
        options: &'static [&'static str],
        default: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ScalarField {
    pub name: &'static str,
    pub kind: ScalarKind,
    pub required: bool,
}

// ============================================================================
// Entity schema
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    /// Collection/table name, also the URL segment under `/api/`.
    pub name: &'static str,
    pub localized: &'static [LocalizedField],
    pub media: &'static [MediaField],
    pub scalars: &'static [ScalarField],
    /// Listings sorted by creation time, newest first.
    pub recency_ordered: bool,
    /// Exposes `getActive/:lang` and `getOne` (banner, contact).
    pub has_active: bool,
}

const fn localized(name: &'static str, required: bool) -> LocalizedField {
    LocalizedField { name, required }
}

const fn media(
    name: &'static str,
    kind: MediaKind,
    class: MediaClass,
    required: bool,
) -> MediaField {
    MediaField {
        name,
        kind,
        class,
        required,
    }
}

const fn text(name: &'static str, required: bool) -> ScalarField {
    ScalarField {
        name,
        kind: ScalarKind::Text,
        required,
    }
}

const ACTIVE_FLAG: ScalarField = ScalarField {
    name: "is_active",
    kind: ScalarKind::Bool { default: false },
    required: false,
};

pub const SOCIAL_KEYS: &[&str] = &[
    "facebook",
    "telegram",
    "youtube",
    "instagram",
    "location",
    "notfound",
];

pub const REGISTRY: &[EntitySchema] = &[
    EntitySchema {
        name: "news",
        localized: &[localized("title", true), localized("description", true)],
        media: &[media("photo", MediaKind::Single, MediaClass::Image, false)],
        scalars: &[],
        recency_ordered: true,
        has_active: false,
    },
    EntitySchema {
        name: "announcement",
        localized: &[localized("title", true), localized("description", true)],
        media: &[media("photo", MediaKind::Single, MediaClass::Image, false)],
        scalars: &[],
        recency_ordered: true,
        has_active: false,
    },
    EntitySchema {
        name: "activity",
        localized: &[localized("title", true), localized("description", true)],
        media: &[media("photos", MediaKind::Many, MediaClass::Image, false)],
        scalars: &[],
        recency_ordered: true,
        has_active: false,
    },
    EntitySchema {
        name: "banner",
        localized: &[],
        media: &[
            media("photo", MediaKind::Single, MediaClass::Image, true),
            media("video", MediaKind::Single, MediaClass::Video, false),
        ],
        scalars: &[ACTIVE_FLAG],
        recency_ordered: false,
        has_active: true,
    },
    EntitySchema {
        name: "leader",
        localized: &[
            localized("full_name", true),
            localized("position", true),
            localized("description", false),
        ],
        media: &[media("photo", MediaKind::Single, MediaClass::Image, false)],
        scalars: &[text("phone", false), text("email", false)],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "program",
        localized: &[localized("title", true), localized("description", true)],
        media: &[
            media("photo", MediaKind::Single, MediaClass::Image, false),
            media("file", MediaKind::Single, MediaClass::Document, false),
        ],
        scalars: &[],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "technology",
        localized: &[localized("title", true), localized("description", true)],
        media: &[media("photo", MediaKind::Single, MediaClass::Image, false)],
        scalars: &[],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "contact",
        localized: &[localized("address", true), localized("working_hours", false)],
        media: &[],
        scalars: &[
            text("phone", false),
            text("phone_fax", false),
            text("email", false),
            ACTIVE_FLAG,
        ],
        recency_ordered: false,
        has_active: true,
    },
    EntitySchema {
        name: "faq",
        localized: &[localized("question", true), localized("answer", true)],
        media: &[],
        scalars: &[],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "location",
        localized: &[localized("name", true), localized("address", false)],
        media: &[],
        scalars: &[text("link", false)],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "open-data",
        localized: &[localized("title", true)],
        media: &[media("file", MediaKind::Single, MediaClass::Document, true)],
        scalars: &[],
        recency_ordered: true,
        has_active: false,
    },
    EntitySchema {
        name: "social-network",
        localized: &[],
        media: &[],
        scalars: &[
            text("name", true),
            text("link", true),
            ScalarField {
                name: "key",
                kind: ScalarKind::Choice {
                    options: SOCIAL_KEYS,
                    default: "notfound",
                },
                required: false,
            },
        ],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "general-about",
        localized: &[localized("title", true), localized("description", true)],
        media: &[media("photo", MediaKind::Single, MediaClass::Image, false)],
        scalars: &[],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "general-communication",
        localized: &[localized("title", true), localized("description", true)],
        media: &[],
        scalars: &[],
        recency_ordered: false,
        has_active: false,
    },
    EntitySchema {
        name: "gallery",
        localized: &[localized("title", true)],
        media: &[media("photos", MediaKind::Many, MediaClass::ImageOrVideo, false)],
        scalars: &[],
        recency_ordered: true,
        has_active: false,
    },
];

/// Look up an entity schema by its URL segment / collection name.
pub fn lookup(name: &str) -> Option<&'static EntitySchema> {
    REGISTRY.iter().find(|s| s.name == name)
}

impl EntitySchema {
    pub fn media_field(&self, name: &str) -> Option<&MediaField> {
        self.media.iter().find(|m| m.name == name)
    }
}

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("field '{0}' is required")]
    Missing(&'static str),
    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("field '{field}' must be one of {options:?}, got '{value}'")]
    InvalidChoice {
        field: String,
        options: &'static [&'static str],
        value: String,
    },
}

/// Validate an incoming field map against the schema and normalize it for
/// storage. Unknown fields are dropped (the store is schema-strict).
///
/// With `require_all` set (creation), required fields must be present and
/// bool/choice scalars receive their declared defaults; without it (partial
/// update), absent fields are simply left untouched.
pub fn validate_fields(
    schema: &EntitySchema,
    mut incoming: Map<String, Value>,
    require_all: bool,
) -> Result<Map<String, Value>, ValidationError> {
    let mut out = Map::new();

    for group in schema.localized {
        match incoming.remove(group.name) {
            Some(Value::Object(langs)) => {
                let mut normalized = Map::new();
                for lang in LANGS {
                    match langs.get(lang.as_str()) {
                        Some(Value::String(s)) => {
                            normalized.insert(lang.as_str().to_string(), Value::String(s.clone()));
                        }
                        Some(Value::Null) | None => {
                            normalized.insert(lang.as_str().to_string(), Value::Null);
                        }
                        Some(_) => {
                            return Err(ValidationError::WrongType {
                                field: format!("{}.{}", group.name, lang.as_str()),
                                expected: "a string",
                            });
                        }
                    }
                }
                out.insert(group.name.to_string(), Value::Object(normalized));
            }
            Some(_) => {
                return Err(ValidationError::WrongType {
                    field: group.name.to_string(),
                    expected: "an object with uz/ru/en keys",
                });
            }
            None if require_all && group.required => {
                return Err(ValidationError::Missing(group.name));
            }
            None => {}
        }
    }

    for field in schema.media {
        match (field.kind, incoming.remove(field.name)) {
            (MediaKind::Single, Some(Value::String(path))) => {
                out.insert(field.name.to_string(), Value::String(path));
            }
            (MediaKind::Single, Some(Value::Null)) => {
                out.insert(field.name.to_string(), Value::Null);
            }
            (MediaKind::Many, Some(Value::Array(paths))) => {
                if paths.iter().any(|p| !p.is_string()) {
                    return Err(ValidationError::WrongType {
                        field: field.name.to_string(),
                        expected: "an array of path strings",
                    });
                }
                out.insert(field.name.to_string(), Value::Array(paths));
            }
            (_, Some(_)) => {
                return Err(ValidationError::WrongType {
                    field: field.name.to_string(),
                    expected: match field.kind {
                        MediaKind::Single => "a path string",
                        MediaKind::Many => "an array of path strings",
                    },
                });
            }
            (_, None) if require_all && field.required => {
                return Err(ValidationError::Missing(field.name));
            }
            (MediaKind::Many, None) if require_all => {
                out.insert(field.name.to_string(), Value::Array(Vec::new()));
            }
            (_, None) => {}
        }
    }

    for scalar in schema.scalars {
        match (scalar.kind, incoming.remove(scalar.name)) {
            (ScalarKind::Text, Some(Value::String(s))) => {
                out.insert(scalar.name.to_string(), Value::String(s));
            }
            (ScalarKind::Bool { .. }, Some(Value::Bool(b))) => {
                out.insert(scalar.name.to_string(), Value::Bool(b));
            }
            (ScalarKind::Choice { options, .. }, Some(Value::String(s))) => {
                if !options.contains(&s.as_str()) {
                    return Err(ValidationError::InvalidChoice {
                        field: scalar.name.to_string(),
                        options,
                        value: s,
                    });
                }
                out.insert(scalar.name.to_string(), Value::String(s));
            }
            (kind, Some(_)) => {
                return Err(ValidationError::WrongType {
                    field: scalar.name.to_string(),
                    expected: match kind {
                        ScalarKind::Text => "a string",
                        ScalarKind::Bool { .. } => "a boolean",
                        ScalarKind::Choice { .. } => "a string",
                    },
                });
            }
            (_, None) if require_all && scalar.required => {
                return Err(ValidationError::Missing(scalar.name));
            }
            (ScalarKind::Bool { default }, None) if require_all => {
                out.insert(scalar.name.to_string(), Value::Bool(default));
            }
            (ScalarKind::Choice { default, .. }, None) if require_all => {
                out.insert(scalar.name.to_string(), Value::String(default.to_string()));
            }
            (_, None) => {}
        }
    }

    if !incoming.is_empty() {
        let dropped: Vec<&String> = incoming.keys().collect();
        tracing::debug!(entity = schema.name, ?dropped, "Dropped unknown fields");
    }

    Ok(out)
}

// ============================================================================
// Projection
// ============================================================================

/// Project a record into its single-language view.
///
/// Localized groups collapse to the string for the resolved language (a
/// missing translation projects to null); media fields, scalars and
/// timestamps pass through untouched. The source record is not modified.
pub fn localize(record: &ContentRecord, schema: &EntitySchema, lang: Lang) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("id".to_string(), Value::String(record.id.clone()));

    for (name, value) in &record.fields {
        let is_localized = schema.localized.iter().any(|g| g.name == name.as_str());
        if is_localized {
            let translation = value
                .as_object()
                .and_then(|langs| langs.get(lang.as_str()))
                .cloned()
                .unwrap_or(Value::Null);
            out.insert(name.clone(), translation);
        } else {
            out.insert(name.clone(), value.clone());
        }
    }

    out.insert(
        "created_at".to_string(),
        Value::String(record.created_at.to_rfc3339()),
    );
    out.insert(
        "updated_at".to_string(),
        Value::String(record.updated_at.to_rfc3339()),
    );
    out
}

/// Raw (all-languages) view for admin editing UIs.
pub fn raw_view(record: &ContentRecord) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("id".to_string(), Value::String(record.id.clone()));
    for (name, value) in &record.fields {
        out.insert(name.clone(), value.clone());
    }
    out.insert(
        "created_at".to_string(),
        Value::String(record.created_at.to_rfc3339()),
    );
    out.insert(
        "updated_at".to_string(),
        Value::String(record.updated_at.to_rfc3339()),
    );
    out
}

// ============================================================================
// Listing order and active selection
// ============================================================================

/// Apply the schema's listing order: recency-ordered collections show the
/// newest record first, others keep store iteration order.
pub fn sort_for_listing(schema: &EntitySchema, records: &mut [ContentRecord]) {
    if schema.recency_ordered {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

/// The current active record: most recently created among those with
/// `is_active = true`. Deterministic even when several records are active.
pub fn most_recent_active(records: &[ContentRecord]) -> Option<&ContentRecord> {
    records
        .iter()
        .filter(|r| r.fields.get("is_active") == Some(&Value::Bool(true)))
        .max_by_key(|r| r.created_at)
}
