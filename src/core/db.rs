//! Connection construction and schema management.
//!
//! `initialize` creates the base tables and seeds the shift enumeration;
//! `reconcile` applies the one additive schema patch (the courses `visible`
//! column). Both are idempotent and run on every process start. There is no
//! version table: column presence is the detection mechanism.

use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;

pub fn db_connect(db_path: &str) -> Result<Connection, error::DrillbookError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::DrillbookError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::DrillbookError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::DrillbookError::RusqliteError)?;
    Ok(conn)
}

/// Create all tables if absent and seed the default shifts.
pub fn initialize(conn: &Connection) -> Result<(), error::DrillbookError> {
    conn.execute(schemas::DB_SCHEMA_AGENTS, [])?;
    conn.execute(schemas::DB_SCHEMA_COURSES, [])?;
    conn.execute(schemas::DB_SCHEMA_SHIFTS, [])?;
    conn.execute(schemas::DB_SCHEMA_ACTIVITIES, [])?;
    conn.execute(schemas::DB_SCHEMA_ASSIGNMENTS, [])?;
    conn.execute(schemas::DB_SCHEMA_INDEX_ACTIVITIES_COURSE, [])?;
    conn.execute(schemas::DB_SCHEMA_INDEX_ACTIVITIES_MONITOR, [])?;
    conn.execute(schemas::DB_SCHEMA_INDEX_ASSIGNMENTS_AGENT, [])?;

    for shift in schemas::DEFAULT_SHIFTS {
        conn.execute("INSERT OR IGNORE INTO shifts (name) VALUES (?1)", [shift])?;
    }

    Ok(())
}

/// Additive patch for database files created before the `visible` column
/// existed. Pre-existing course rows get the column default (visible).
pub fn reconcile(conn: &Connection) -> Result<(), error::DrillbookError> {
    if !column_exists(conn, "courses", "visible")? {
        conn.execute("ALTER TABLE courses ADD COLUMN visible INTEGER DEFAULT 1", [])?;
    }
    Ok(())
}

pub fn column_exists(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<bool, error::DrillbookError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// True when the error is a UNIQUE or PRIMARY KEY constraint violation, the
/// signal the store translates into a `DuplicateKey` refusal.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}
