//! Navigation tree builder.
//!
//! Pages form a two-level hierarchy through a nullable `parent` reference.
//! Roles are derived, never stored: a page with a parent is a *child*; a
//! parentless page referenced as someone's parent is a *grouping* page;
//! a parentless page never referenced is a *plain top-level* page.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::schema::Lang;
use crate::storage::models::{PageRecord, PageType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("a page cannot be its own parent")]
    SelfParent,
    #[error("parent page does not exist")]
    MissingParent,
    #[error("parent page is itself a child; pages nest at most two levels")]
    ParentIsChild,
    #[error("page has children and cannot become a child itself")]
    HasChildren,
}

/// Write-time guard for the two-level invariant: a page may only sit under a
/// top-level page, and a page with children can never itself become a child.
pub fn validate_parent(
    pages: &[PageRecord],
    page_id: Option<&str>,
    parent_id: &str,
) -> Result<(), HierarchyError> {
    if page_id == Some(parent_id) {
        return Err(HierarchyError::SelfParent);
    }

    let parent = pages
        .iter()
        .find(|p| p.id == parent_id)
        .ok_or(HierarchyError::MissingParent)?;
    if parent.parent.is_some() {
        return Err(HierarchyError::ParentIsChild);
    }

    if let Some(id) = page_id {
        if pages.iter().any(|p| p.parent.as_deref() == Some(id)) {
            return Err(HierarchyError::HasChildren);
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MenuChild {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub page_type: PageType,
    pub icon: Option<String>,
    pub order: i32,
    pub key: String,
    /// Localized title of the grouping page this child sits under.
    pub parent_title: String,
}

#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub page_type: PageType,
    pub icon: Option<String>,
    pub order: i32,
    pub key: String,
    pub children: Vec<MenuChild>,
}

/// Build the two-level menu from a flat page set: top-level entries sorted
/// by `order`, each carrying its (possibly empty) ordered children, titles
/// projected to the requested language.
pub fn build_menu(pages: &[PageRecord], lang: Lang) -> Vec<MenuEntry> {
    let mut top_level: Vec<&PageRecord> = pages.iter().filter(|p| p.parent.is_none()).collect();
    let mut children: Vec<&PageRecord> = pages.iter().filter(|p| p.parent.is_some()).collect();
    top_level.sort_by_key(|p| p.order);
    children.sort_by_key(|p| p.order);

    top_level
        .into_iter()
        .map(|parent| MenuEntry {
            id: parent.id.clone(),
            title: parent.title.get(lang).to_string(),
            slug: parent.slug.clone(),
            page_type: parent.page_type,
            icon: parent.icon.clone(),
            order: parent.order,
            key: parent.key.clone(),
            children: children
                .iter()
                .filter(|c| c.parent.as_deref() == Some(parent.id.as_str()))
                .map(|c| MenuChild {
                    id: c.id.clone(),
                    title: c.title.get(lang).to_string(),
                    slug: c.slug.clone(),
                    page_type: c.page_type,
                    icon: c.icon.clone(),
                    order: c.order,
                    key: c.key.clone(),
                    parent_title: parent.title.get(lang).to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Ids appearing in the distinct set of all non-null `parent` values.
pub fn parent_ids(pages: &[PageRecord]) -> HashSet<&str> {
    pages
        .iter()
        .filter_map(|p| p.parent.as_deref())
        .collect()
}

/// Top-level pages (parent = null), sorted by `order`.
pub fn top_level(pages: &[PageRecord]) -> Vec<&PageRecord> {
    let mut result: Vec<&PageRecord> = pages.iter().filter(|p| p.parent.is_none()).collect();
    result.sort_by_key(|p| p.order);
    result
}

/// Child pages (parent != null), sorted by `order`.
pub fn children(pages: &[PageRecord]) -> Vec<&PageRecord> {
    let mut result: Vec<&PageRecord> = pages.iter().filter(|p| p.parent.is_some()).collect();
    result.sort_by_key(|p| p.order);
    result
}

/// Top-level pages that are NOT used as any page's parent — the leaf
/// entries of the main navigation, excluding pure grouping containers.
pub fn top_level_leaves(pages: &[PageRecord]) -> Vec<&PageRecord> {
    let parents = parent_ids(pages);
    top_level(pages)
        .into_iter()
        .filter(|p| !parents.contains(p.id.as_str()))
        .collect()
}

/// Child pages that are NOT themselves used as a parent. With the two-level
/// invariant enforced at write time every child qualifies; the filter guards
/// data written before that rule existed.
pub fn child_leaves(pages: &[PageRecord]) -> Vec<&PageRecord> {
    let parents = parent_ids(pages);
    children(pages)
        .into_iter()
        .filter(|p| !parents.contains(p.id.as_str()))
        .collect()
}
