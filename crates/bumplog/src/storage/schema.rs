//! `SQLite` schema definitions for bumplog.
//!
//! The database is a plain key-value table plus a metadata table for the
//! layout version.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// SQL statement to create the key-value table.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_KV_TABLE, CREATE_METADATA_TABLE];

/// Table layout version written by this release.
pub const LAYOUT_VERSION: i32 = 1;

/// Metadata key holding the layout version.
const LAYOUT_VERSION_KEY: &str = "layout_version";

/// Create the tables if missing and check the recorded layout version.
///
/// A fresh database is stamped with [`LAYOUT_VERSION`]. The snapshot stored in
/// the `kv` table is opaque here.
///
/// # Errors
///
/// Returns an error if table creation fails, or if the recorded version is
/// unreadable or newer than [`LAYOUT_VERSION`].
pub fn initialize(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    conn.execute(
        "INSERT OR IGNORE INTO metadata (key, value) VALUES (?1, ?2)",
        (LAYOUT_VERSION_KEY, LAYOUT_VERSION.to_string()),
    )?;
    let recorded: String = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [LAYOUT_VERSION_KEY],
        |row| row.get(0),
    )?;

    match recorded.parse::<i32>() {
        Ok(version) if version <= LAYOUT_VERSION => Ok(()),
        Ok(version) => Err(Error::DatabaseLayout {
            message: format!(
                "version {version} is newer than supported version {LAYOUT_VERSION}"
            ),
        }),
        Err(_) => Err(Error::DatabaseLayout {
            message: format!("invalid layout version: {recorded}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_kv_table_contains_required_columns() {
        assert!(CREATE_KV_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_KV_TABLE.contains("value TEXT NOT NULL"));
        assert!(CREATE_KV_TABLE.contains("updated_at"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }

    fn initialized_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn recorded_version(conn: &Connection) -> String {
        conn.query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [LAYOUT_VERSION_KEY],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn set_recorded_version(conn: &Connection, value: &str) {
        conn.execute(
            "UPDATE metadata SET value = ?2 WHERE key = ?1",
            (LAYOUT_VERSION_KEY, value),
        )
        .unwrap();
    }

    #[test]
    fn test_initialize_creates_tables_and_stamps_version() {
        let conn = initialized_db();

        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('kv', 'metadata')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
        assert_eq!(recorded_version(&conn), LAYOUT_VERSION.to_string());
    }

    #[test]
    fn test_initialize_twice_keeps_data() {
        let conn = initialized_db();
        conn.execute("INSERT INTO kv (key, value) VALUES ('events', '[]')", [])
            .unwrap();

        initialize(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT value FROM kv WHERE key = 'events'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "[]");
    }

    #[test]
    fn test_initialize_rejects_newer_layout() {
        let conn = initialized_db();
        set_recorded_version(&conn, &(LAYOUT_VERSION + 1).to_string());

        let err = initialize(&conn).unwrap_err();
        assert!(matches!(err, Error::DatabaseLayout { .. }));
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_initialize_rejects_unreadable_version() {
        let conn = initialized_db();
        set_recorded_version(&conn, "banana");

        let err = initialize(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid layout version"));
    }
}
