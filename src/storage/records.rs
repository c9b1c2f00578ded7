use std::collections::HashSet;

use chrono::Utc;
use redb::ReadableTable;
use serde_json::{Map, Value};

use super::db::{Database, DatabaseError};
use super::models::ContentRecord;
use super::tables::content_table;
use crate::schema::REGISTRY;

impl Database {
    // ========================================================================
    // Generic content-record operations
    // ========================================================================

    /// Insert a new document into a collection. The store assigns the id and
    /// both timestamps.
    pub fn insert_record(
        &self,
        collection: &'static str,
        fields: Map<String, Value>,
    ) -> Result<ContentRecord, DatabaseError> {
        let now = Utc::now();
        let record = ContentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            fields,
        };

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(content_table(collection))?;
            let data = rmp_serde::to_vec_named(&record)?;
            table.insert(record.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(record)
    }

    /// Get a document by its id
    pub fn get_record(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<ContentRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(content_table(collection))?;

        match table.get(id)? {
            Some(data) => {
                let record: ContentRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Merge the given fields into an existing document: provided keys
    /// overwrite, absent keys are preserved. Returns `None` if the id does
    /// not resolve.
    pub fn update_record(
        &self,
        collection: &'static str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<ContentRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(content_table(collection))?;
            let existing = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice::<ContentRecord>(data.value())?),
                None => None,
            };
            existing
        };

        let updated = match existing {
            Some(mut record) => {
                for (key, value) in fields {
                    record.fields.insert(key, value);
                }
                record.updated_at = Utc::now();

                let data = rmp_serde::to_vec_named(&record)?;
                let mut table = write_txn.open_table(content_table(collection))?;
                table.insert(id, data.as_slice())?;
                Some(record)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Remove a document, returning it so the caller can clean up any blobs
    /// it referenced. Returns `None` if the id does not resolve.
    pub fn delete_record(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<ContentRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let removed = {
            let mut table = write_txn.open_table(content_table(collection))?;
            let removed = match table.remove(id)? {
                Some(data) => Some(rmp_serde::from_slice::<ContentRecord>(data.value())?),
                None => None,
            };
            removed
        };

        write_txn.commit()?;
        Ok(removed)
    }

    /// All documents of a collection, in store iteration order.
    pub fn list_records(
        &self,
        collection: &'static str,
    ) -> Result<Vec<ContentRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(content_table(collection))?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let record: ContentRecord = rmp_serde::from_slice(value.value())?;
            records.push(record);
        }

        Ok(records)
    }

    /// Every blob key referenced by any live document, across all
    /// collections. Used by the orphan reconciler.
    pub fn referenced_media_keys(&self) -> Result<HashSet<String>, DatabaseError> {
        let mut keys = HashSet::new();
        for schema in REGISTRY {
            for record in self.list_records(schema.name)? {
                keys.extend(record.media_keys(schema));
            }
        }
        Ok(keys)
    }
}
