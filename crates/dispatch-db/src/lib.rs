pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Storage capability shared by every relay component.
///
/// Owned by the process bootstrap and handed to components as
/// `Arc<Database>`; nothing in this crate keeps a global handle. Every
/// public query is a single statement, so one guarded connection is enough.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the relay database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // WAL lets readers proceed while an insert is in flight
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::from_connection(conn)?;
        info!("Relay database ready at {}", path.display());
        Ok(db)
    }

    /// Private in-memory database. Gone when dropped.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // users(id) is referenced by alerts and messages
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` against the connection. Errors from `f` pass through.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("Relay database lock poisoned: {}", e))?;
        f(&conn)
    }
}
