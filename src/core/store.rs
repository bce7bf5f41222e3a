//! Store handle: where the drillbook database lives on disk.
//!
//! Resolution order: explicit `--dir` flag, then the `DRILLBOOK_HOME`
//! environment variable, then the current working directory. Every command
//! opens its own connection against the resolved path and drops it when the
//! command finishes; connections are never shared across commands.

use crate::core::db;
use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

/// Handle to a drillbook workspace root.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute or caller-relative path to the directory holding the database.
    pub root: PathBuf,
}

impl Store {
    pub fn resolve(dir: Option<PathBuf>) -> Store {
        let root = dir
            .or_else(|| std::env::var_os("DRILLBOOK_HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Store { root }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(schemas::DB_NAME)
    }

    /// Open a connection, creating the root directory on first use.
    pub fn open(&self) -> Result<Connection, error::DrillbookError> {
        fs::create_dir_all(&self.root).map_err(error::DrillbookError::IoError)?;
        let db_path = self.db_path();
        let path_str = db_path.to_str().ok_or_else(|| {
            error::DrillbookError::PathError(format!(
                "store path is not valid UTF-8: {}",
                db_path.display()
            ))
        })?;
        db::db_connect(path_str)
    }
}
