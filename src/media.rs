//! File-replacement policy.
//!
//! Updates never force the caller to resend an old media path: an absent
//! value keeps the stored blob, a differing value replaces it (the old blob
//! is deleted), an equal value is a no-op. Blob deletion is always
//! best-effort — the owning document write is the operation of record.

use crate::object_store::ObjectStore;

/// Decision for a single-media field (`photo`, `video`, `file`) on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleMediaAction {
    /// No new value supplied: the stored path is retained, no disk action.
    Keep,
    /// The new value equals the stored one: nothing to do.
    Unchanged,
    /// A new path takes over; `delete` names the now-orphaned old blob.
    Replace {
        delete: Option<String>,
        store: String,
    },
}

pub fn plan_single(old: Option<&str>, new: Option<&str>) -> SingleMediaAction {
    match new {
        None => SingleMediaAction::Keep,
        Some(new) if old == Some(new) => SingleMediaAction::Unchanged,
        Some(new) => SingleMediaAction::Replace {
            delete: old.map(str::to_string),
            store: new.to_string(),
        },
    }
}

/// Plan for a list-media field (`photos`) on update: the final stored list
/// is (existing − removed) + appended, and only blobs actually detached are
/// scheduled for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMediaPlan {
    pub to_delete: Vec<String>,
    pub final_list: Vec<String>,
}

pub fn plan_list(existing: &[String], removed: &[String], appended: &[String]) -> ListMediaPlan {
    let (detached, mut kept): (Vec<String>, Vec<String>) = existing
        .iter()
        .cloned()
        .partition(|path| removed.contains(path));

    kept.extend(appended.iter().cloned());

    ListMediaPlan {
        to_delete: detached,
        final_list: kept,
    }
}

/// Delete blobs best-effort: a missing or undeletable blob is logged and
/// never surfaced to the caller.
pub async fn delete_blobs(store: &dyn ObjectStore, keys: &[String]) {
    for key in keys {
        if let Err(e) = store.delete(key).await {
            tracing::warn!(blob = %key, error = %e, "Failed to delete blob");
        }
    }
}
