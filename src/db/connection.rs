use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

/// Handle to the playlist database. The workflow owns exactly one and hands
/// it back through [`RecordStore::close`] on shutdown.
pub struct RecordStore {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Open (creating if needed) the SQLite file at `path` and make sure the
    /// `songs` table exists. Missing parent directories are created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        ensure_schema(&conn)?;
        info!(path = %path.display(), "opened playlist database");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Private throwaway database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        ensure_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Location of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and release the connection.
    pub fn close(self) -> Result<(), StoreError> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, source)| StoreError::Close(source))?;
        if let Some(path) = path {
            info!(path = %path.display(), "closed playlist database");
        }
        Ok(())
    }
}

/// Create the single `songs` table if it is missing. The surrogate `id` only
/// preserves insertion order; it never leaves this module.
fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            duration TEXT,
            preview BLOB,
            rating INTEGER
        )",
        [],
    )
    .map_err(StoreError::Schema)?;

    Ok(())
}
