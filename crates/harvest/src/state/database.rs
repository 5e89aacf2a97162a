use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::{migrations, StateError};

/// Shared handle to the state database.
///
/// Cloning is cheap (inner `Arc`). Every access goes through the `Mutex`;
/// a single job runs sequentially, so there is no contention in practice.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at `path` and runs pending migrations.
    pub fn open(path: &Path) -> Result<Self, StateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StateError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&mut conn)?;

        log::info!("State database opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StateError> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Locked access for single statements.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StateError>
    where
        F: FnOnce(&Connection) -> Result<T, StateError>,
    {
        let conn = self.conn.lock().map_err(|_| StateError::LockPoisoned)?;
        f(&conn)
    }

    /// Runs `f` inside one transaction, committed only if `f` succeeds.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, StateError>
    where
        F: FnOnce(&Connection) -> Result<T, StateError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StateError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
