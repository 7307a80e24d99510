//! SQLite PRAGMA configuration for store connections.
//!
//! Must be called on every connection immediately after opening.

use rusqlite::Connection;

use warden_core::StorageResult;

/// Configure a read-write connection.
///
/// - WAL for concurrent readers during writes (file-backed databases)
/// - busy_timeout for lock contention
/// - foreign_keys so report deletes cascade into the projections
/// - NORMAL synchronous for the WAL durability trade-off
pub fn configure_connection(conn: &Connection, busy_timeout_ms: u32) -> StorageResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        ",
    )?;
    conn.pragma_update(None, "busy_timeout", busy_timeout_ms)?;
    Ok(())
}

/// Configure a read-only connection: same PRAGMAs plus `query_only = ON`
/// to prevent accidental writes through this connection.
pub fn configure_readonly_connection(conn: &Connection, busy_timeout_ms: u32) -> StorageResult<()> {
    configure_connection(conn, busy_timeout_ms)?;
    conn.pragma_update(None, "query_only", "ON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_journal_mode() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn, 5_000).unwrap();

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        // In-memory databases report "memory" instead of "wal"
        assert!(
            journal_mode == "wal" || journal_mode == "memory",
            "expected wal or memory, got: {}",
            journal_mode
        );
    }

    #[test]
    fn sets_busy_timeout() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn, 2_500).unwrap();

        let timeout: i64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 2_500);
    }

    #[test]
    fn sets_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn, 5_000).unwrap();

        let fk: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn readonly_sets_query_only() {
        let conn = Connection::open_in_memory().unwrap();
        configure_readonly_connection(&conn, 5_000).unwrap();

        let query_only: i64 = conn
            .pragma_query_value(None, "query_only", |row| row.get(0))
            .unwrap();
        assert_eq!(query_only, 1);
    }
}
