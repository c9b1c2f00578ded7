use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::UserRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Admin-account operations
    // ========================================================================

    /// Store an account. Returns false (and stores nothing) if the username
    /// is already taken — uniqueness is checked inside the write transaction.
    pub fn insert_user(&self, user: &UserRecord) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let inserted = {
            let mut name_table = write_txn.open_table(USER_NAMES)?;
            let taken = name_table.get(user.username.as_str())?.is_some();
            if taken {
                false
            } else {
                name_table.insert(user.username.as_str(), user.id.as_str())?;
                let mut table = write_txn.open_table(USERS)?;
                let data = rmp_serde::to_vec_named(user)?;
                table.insert(user.id.as_str(), data.as_slice())?;
                true
            }
        };

        write_txn.commit()?;
        Ok(inserted)
    }

    /// Exact-match username lookup (resolves username -> id -> account)
    pub fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let name_table = read_txn.open_table(USER_NAMES)?;

        let id = match name_table.get(username)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let users_table = read_txn.open_table(USERS)?;
        match users_table.get(id.as_str())? {
            Some(data) => {
                let user: UserRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Number of stored accounts (drives the first-account bootstrap rule)
    pub fn count_users(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let mut count = 0;
        for result in table.iter()? {
            result?;
            count += 1;
        }
        Ok(count)
    }
}
