//! Embedded SQLite store: connection handle, schema creation and batch loading.

pub mod loader;
pub mod records;
pub mod schema;

use crate::utils::error::{EtlError, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// A single SQLite connection. Not shared between writers.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
    initialized: bool,
}

impl Store {
    /// Opens the database file, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| EtlError::store(format!("opening {}", path.display()), e))?;

        tracing::debug!("Opened SQLite store at {}", path.display());

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
            initialized: false,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| EtlError::store("opening in-memory store", e))?;
        Ok(Self {
            conn,
            path: None,
            initialized: false,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True once the schema manager has verified every required table.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map(|name| name.is_some())
            .map_err(|e| EtlError::store(format!("checking existence of table {}", table), e))
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(|e| EtlError::store("listing tables", e))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| EtlError::store("listing tables", e))?;

        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        // Table names come from the fixed entity catalogue, never from input.
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        self.conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| EtlError::store(format!("counting rows in {}", table), e))
    }
}
