//! Relational JSON-blob schema.
//!
//! Every entity kind owns one two-column table: `id` is the primary key and
//! `data` holds the whole entity serialized as JSON (ID included).

use super::DbResult;
use crate::model::ENTITY_COLLECTIONS;
use rusqlite::Connection;

/// Creates the `(id, data)` table for every entity kind if it does not exist.
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    for table in ENTITY_COLLECTIONS {
        conn.execute_batch(&create_table_sql(table))?;
    }
    Ok(())
}

pub fn create_table_sql(table: &str) -> String {
    format!("CREATE TABLE IF NOT EXISTS {table} (id TEXT PRIMARY KEY, data TEXT NOT NULL);")
}
