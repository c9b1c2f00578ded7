use redb::TableDefinition;

/// Navigation pages: id -> PageRecord (msgpack)
pub const PAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("pages");

/// Slug index: slug -> page id (for uniqueness checks and slug lookups)
pub const PAGE_SLUGS: TableDefinition<&str, &str> = TableDefinition::new("page_slugs");

/// Admin accounts: id -> UserRecord (msgpack)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Username index: username -> user id
pub const USER_NAMES: TableDefinition<&str, &str> = TableDefinition::new("user_names");

/// Content collections share one layout: id -> ContentRecord (msgpack).
/// The table name is the collection name from the schema registry.
pub fn content_table(
    name: &'static str,
) -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}
