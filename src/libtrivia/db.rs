use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Result};
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Key-value store for serialized game state. Each game variant saves one
/// blob under its own key.
pub(crate) trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    fn init(&self) -> Result<()> {
        info!("[DB INIT] Creating table SaveState");
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS SaveState (
                  key TEXT NOT NULL PRIMARY KEY,
                  value TEXT NOT NULL
                )",
            (),
        )?;
        info!("[DB INIT] Database ready");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> Result<SqliteStore> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }
}

impl Storage for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut statement = self
            .conn
            .prepare("SELECT value FROM SaveState WHERE key = :key LIMIT 1")?;
        statement
            .query_row(&[(":key", &key)], |row| row.get(0))
            .optional()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.conn.execute(
            "INSERT INTO SaveState(key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        ) {
            Ok(_) => {
                debug!("[DB] Saved state under key '{}'", key);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while saving state under '{}': {:?}", key, err);
                Err(err)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self
            .conn
            .execute("DELETE FROM SaveState WHERE key = ?1", params![key])
        {
            Ok(_) => {
                debug!("[DB] Deleted state under key '{}'", key);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while deleting state under '{}': {:?}", key, err);
                Err(err)
            }
        }
    }
}

pub(crate) fn create_or_open(src: &Path) -> Result<SqliteStore> {
    if src.exists() {
        info!("[DB] Opening existing save database");
    } else {
        info!("[DB] Creating new save database");
    }
    let now = Instant::now();
    let store = SqliteStore {
        conn: Connection::open(src)?,
    };
    store.init()?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(store)
}

pub(crate) fn close_store(store: SqliteStore) -> Result<()> {
    info!("[DB] Closing Database");
    match store.conn.close() {
        Ok(_) => Ok(()),
        Err((conn, _)) => {
            error!("[DB] Cannot close connection. Retrying...");
            conn.close().map_err(|(_, err)| err)
        }
    }
}

/// In-memory store so the game logic can be exercised without a database
/// file.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[cfg(test)]
impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
