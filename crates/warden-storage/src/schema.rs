//! Schema lifecycle: table creation, teardown, and the version marker that
//! decides between keeping and rebuilding the table set.
//!
//! The schema is rebuilt destructively on version mismatch. Stored reports
//! are projections of an external source of truth, so a rebuild costs one
//! resync, not data.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use warden_core::StorageResult;

use crate::dialect::Dialect;

pub const TABLE_REPORT: &str = "policy_report";
pub const TABLE_RESULT: &str = "policy_report_result";
pub const TABLE_FILTER: &str = "policy_report_filter";
pub const TABLE_RESOURCE: &str = "policy_report_resource";
pub const TABLE_CONFIG: &str = "policy_report_config";

/// Every table owned by the store, children first.
pub const TABLE_NAMES: [&str; 5] = [
    TABLE_RESULT,
    TABLE_FILTER,
    TABLE_RESOURCE,
    TABLE_REPORT,
    TABLE_CONFIG,
];

const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS policy_report_config (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    version TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS policy_report (
    id        TEXT NOT NULL PRIMARY KEY,
    type      TEXT NOT NULL,
    name      TEXT NOT NULL,
    namespace TEXT NOT NULL DEFAULT '',
    source    TEXT NOT NULL DEFAULT '',
    labels    TEXT NOT NULL DEFAULT '{}',
    skip      INTEGER NOT NULL DEFAULT 0,
    pass      INTEGER NOT NULL DEFAULT 0,
    warn      INTEGER NOT NULL DEFAULT 0,
    fail      INTEGER NOT NULL DEFAULT 0,
    error     INTEGER NOT NULL DEFAULT 0,
    created   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS policy_report_result (
    id                   TEXT NOT NULL PRIMARY KEY,
    policy_report_id     TEXT NOT NULL REFERENCES policy_report (id) ON DELETE CASCADE,
    resource_id          TEXT NOT NULL DEFAULT '',
    resource_api_version TEXT NOT NULL DEFAULT '',
    resource_kind        TEXT NOT NULL DEFAULT '',
    resource_name        TEXT NOT NULL DEFAULT '',
    resource_namespace   TEXT NOT NULL DEFAULT '',
    resource_uid         TEXT NOT NULL DEFAULT '',
    policy               TEXT NOT NULL DEFAULT '',
    rule                 TEXT NOT NULL DEFAULT '',
    message              TEXT NOT NULL DEFAULT '',
    scored               INTEGER NOT NULL DEFAULT 0,
    result               TEXT NOT NULL DEFAULT '',
    severity             TEXT NOT NULL DEFAULT '',
    category             TEXT NOT NULL DEFAULT '',
    source               TEXT NOT NULL DEFAULT '',
    properties           TEXT NOT NULL DEFAULT '{}',
    created              INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS policy_report_filter (
    id               TEXT NOT NULL PRIMARY KEY,
    policy_report_id TEXT NOT NULL REFERENCES policy_report (id) ON DELETE CASCADE,
    namespace        TEXT NOT NULL DEFAULT '',
    kind             TEXT NOT NULL DEFAULT '',
    policy           TEXT NOT NULL DEFAULT '',
    result           TEXT NOT NULL DEFAULT '',
    severity         TEXT NOT NULL DEFAULT '',
    category         TEXT NOT NULL DEFAULT '',
    source           TEXT NOT NULL DEFAULT '',
    count            INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS policy_report_resource (
    id                   TEXT NOT NULL,
    policy_report_id     TEXT NOT NULL REFERENCES policy_report (id) ON DELETE CASCADE,
    resource_api_version TEXT NOT NULL DEFAULT '',
    resource_kind        TEXT NOT NULL DEFAULT '',
    resource_name        TEXT NOT NULL DEFAULT '',
    resource_namespace   TEXT NOT NULL DEFAULT '',
    resource_uid         TEXT NOT NULL DEFAULT '',
    source               TEXT NOT NULL DEFAULT '',
    category             TEXT NOT NULL DEFAULT '',
    pass                 INTEGER NOT NULL DEFAULT 0,
    warn                 INTEGER NOT NULL DEFAULT 0,
    fail                 INTEGER NOT NULL DEFAULT 0,
    error                INTEGER NOT NULL DEFAULT 0,
    skip                 INTEGER NOT NULL DEFAULT 0,
    info                 INTEGER NOT NULL DEFAULT 0,
    low                  INTEGER NOT NULL DEFAULT 0,
    medium               INTEGER NOT NULL DEFAULT 0,
    high                 INTEGER NOT NULL DEFAULT 0,
    critical             INTEGER NOT NULL DEFAULT 0,
    unknown              INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (id, policy_report_id, source, category)
);

CREATE INDEX IF NOT EXISTS idx_result_report ON policy_report_result (policy_report_id);
CREATE INDEX IF NOT EXISTS idx_result_resource ON policy_report_result (resource_id);
CREATE INDEX IF NOT EXISTS idx_filter_report ON policy_report_filter (policy_report_id);
CREATE INDEX IF NOT EXISTS idx_resource_report ON policy_report_resource (policy_report_id);
";

const DROP_SCHEMA: &str = "
DROP TABLE IF EXISTS policy_report_result;
DROP TABLE IF EXISTS policy_report_filter;
DROP TABLE IF EXISTS policy_report_resource;
DROP TABLE IF EXISTS policy_report;
DROP TABLE IF EXISTS policy_report_config;
";

/// Create all tables and indexes, keeping whatever already exists.
pub fn create_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(CREATE_SCHEMA)?;
    debug!("created database schema");
    Ok(())
}

/// Drop all tables, children before parents.
pub fn drop_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(DROP_SCHEMA)?;
    debug!("dropped database schema");
    Ok(())
}

pub fn table_exists(conn: &Connection, dialect: Dialect, name: &str) -> StorageResult<bool> {
    let count: i64 = conn.query_row(dialect.table_exists_sql(), params![name], |row| row.get(0))?;
    Ok(count > 0)
}

/// Version string persisted by the last schema rebuild, if any.
pub fn stored_version(conn: &Connection) -> StorageResult<Option<String>> {
    let version = conn
        .query_row(
            "SELECT version FROM policy_report_config ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version)
}

/// Record the running version as the persisted schema version.
pub fn persist_version(conn: &Connection, version: &str) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO policy_report_config (version) VALUES (?)",
        params![version],
    )?;
    Ok(())
}

/// Whether a stored version demands a rebuild before the running version
/// can use the schema.
pub fn version_mismatch(stored: Option<&str>, running: &str) -> bool {
    match stored {
        None => true,
        Some(stored) => stored != running,
    }
}

/// Decide whether `prepare` must drop and recreate the table set.
///
/// Embedded engines rebuild unconditionally. Versioned engines rebuild when
/// the marker table is missing or carries a different version.
pub fn requires_upgrade(conn: &Connection, dialect: Dialect, version: &str) -> StorageResult<bool> {
    if !dialect.versioned_schema() {
        return Ok(true);
    }

    if !table_exists(conn, dialect, TABLE_CONFIG)? {
        return Ok(true);
    }

    // An unreadable marker is treated like a missing one.
    let stored = match stored_version(conn) {
        Ok(stored) => stored,
        Err(err) => {
            debug!(error = %err, "failed to read stored schema version");
            return Ok(true);
        }
    };

    Ok(version_mismatch(stored.as_deref(), version))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory database");
        crate::pragmas::configure_connection(&conn, 5000).expect("configure connection");
        conn
    }

    #[test]
    fn create_schema_builds_all_tables() {
        let conn = connection();
        create_schema(&conn).expect("create schema");

        for name in TABLE_NAMES {
            assert!(
                table_exists(&conn, Dialect::Sqlite, name).expect("probe table"),
                "missing table {name}"
            );
        }
    }

    #[test]
    fn create_schema_is_repeatable() {
        let conn = connection();
        create_schema(&conn).expect("first create");
        create_schema(&conn).expect("second create");
    }

    #[test]
    fn drop_schema_removes_all_tables() {
        let conn = connection();
        create_schema(&conn).expect("create schema");
        drop_schema(&conn).expect("drop schema");

        for name in TABLE_NAMES {
            assert!(!table_exists(&conn, Dialect::Sqlite, name).expect("probe table"));
        }
    }

    #[test]
    fn version_round_trip() {
        let conn = connection();
        create_schema(&conn).expect("create schema");

        assert_eq!(stored_version(&conn).expect("stored version"), None);

        persist_version(&conn, "1.0").expect("persist version");
        assert_eq!(
            stored_version(&conn).expect("stored version").as_deref(),
            Some("1.0")
        );

        persist_version(&conn, "2.0").expect("persist version");
        assert_eq!(
            stored_version(&conn).expect("stored version").as_deref(),
            Some("2.0")
        );
    }

    #[test]
    fn version_mismatch_decision() {
        assert!(version_mismatch(None, "1.0"));
        assert!(version_mismatch(Some("1.0"), "2.0"));
        assert!(!version_mismatch(Some("2.0"), "2.0"));
    }

    #[test]
    fn embedded_engine_always_requires_upgrade() {
        let conn = connection();
        create_schema(&conn).expect("create schema");
        persist_version(&conn, "1.0").expect("persist version");

        assert!(requires_upgrade(&conn, Dialect::Sqlite, "1.0").expect("requires upgrade"));
    }
}
