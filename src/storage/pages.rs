use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::PageRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Navigation-page operations
    // ========================================================================

    /// Store a page and its slug index entry
    pub fn insert_page(&self, page: &PageRecord) -> Result<(), DatabaseError> {
        debug_assert!(!page.id.is_empty(), "page id must not be empty");
        debug_assert!(!page.slug.is_empty(), "page slug must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PAGES)?;
            let data = rmp_serde::to_vec_named(page)?;
            table.insert(page.id.as_str(), data.as_slice())?;

            let mut slug_table = write_txn.open_table(PAGE_SLUGS)?;
            slug_table.insert(page.slug.as_str(), page.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a page by its id
    pub fn get_page(&self, id: &str) -> Result<Option<PageRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PAGES)?;

        match table.get(id)? {
            Some(data) => {
                let page: PageRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(page))
            }
            None => Ok(None),
        }
    }

    /// Check if a slug is already in use
    pub fn slug_exists(&self, slug: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PAGE_SLUGS)?;
        Ok(table.get(slug)?.is_some())
    }

    /// All pages, in store iteration order.
    pub fn list_pages(&self) -> Result<Vec<PageRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PAGES)?;

        let mut pages = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let page: PageRecord = rmp_serde::from_slice(value.value())?;
            pages.push(page);
        }

        Ok(pages)
    }

    /// Replace a stored page, fixing the slug index if the slug changed.
    /// Returns false if the id does not resolve.
    pub fn update_page(&self, page: &PageRecord) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let old_slug = {
            let table = write_txn.open_table(PAGES)?;
            let old_slug = match table.get(page.id.as_str())? {
                Some(data) => {
                    let existing: PageRecord = rmp_serde::from_slice(data.value())?;
                    Some(existing.slug)
                }
                None => None,
            };
            old_slug
        };

        let updated = match old_slug {
            Some(old_slug) => {
                {
                    let mut table = write_txn.open_table(PAGES)?;
                    let data = rmp_serde::to_vec_named(page)?;
                    table.insert(page.id.as_str(), data.as_slice())?;
                }
                if old_slug != page.slug {
                    let mut slug_table = write_txn.open_table(PAGE_SLUGS)?;
                    slug_table.remove(old_slug.as_str())?;
                    slug_table.insert(page.slug.as_str(), page.id.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a page and its slug index entry
    pub fn delete_page(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let slug = {
            let table = write_txn.open_table(PAGES)?;
            let slug = match table.get(id)? {
                Some(data) => {
                    let page: PageRecord = rmp_serde::from_slice(data.value())?;
                    Some(page.slug)
                }
                None => None,
            };
            slug
        };

        let deleted = match slug {
            Some(slug) => {
                {
                    let mut table = write_txn.open_table(PAGES)?;
                    table.remove(id)?;
                }
                {
                    let mut slug_table = write_txn.open_table(PAGE_SLUGS)?;
                    slug_table.remove(slug.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}
