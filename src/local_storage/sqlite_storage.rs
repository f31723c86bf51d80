use super::versioned_schema::{Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION};
use super::{LocalStorage, StorageError};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const LOCAL_STORAGE_TABLE_V_0: Table = Table {
    name: "local_storage",
    columns: &[
        Column {
            name: "key",
            sql_type: &SqlType::Text,
            is_primary_key: true,
            non_null: true,
        },
        Column {
            name: "value",
            sql_type: &SqlType::Text,
            is_primary_key: false,
            non_null: true,
        },
    ],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[LOCAL_STORAGE_TABLE_V_0],
}];

/// [`LocalStorage`] persisted in a single sqlite table.
#[derive(Clone)]
pub struct SqliteLocalStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLocalStorage {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open local storage at {:?}", db_path))?
        } else {
            info!("Creating local storage at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create local storage at {:?}", db_path))?;
            latest_schema()?.create(&conn)?;
            conn
        };

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read local storage version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "{:?} is not a local storage database (version {})",
                db_path,
                db_version
            );
        }
        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            bail!("Local storage version {} is too new", db_version);
        }
        VERSIONED_SCHEMAS
            .get(db_version as usize)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Ok(SqliteLocalStorage {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("local storage lock poisoned".to_string()))
    }
}

fn latest_schema() -> Result<&'static VersionedSchema> {
    VERSIONED_SCHEMAS
        .last()
        .context("No local storage schema defined")
}

impl LocalStorage for SqliteLocalStorage {
    fn read_text(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|err| StorageError::Read {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }

    fn write_text(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map(|_| ())
        .map_err(|err| StorageError::Write {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }

    fn remove_key(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])
            .map(|_| ())
            .map_err(|err| StorageError::Remove {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tmp_storage() -> (SqliteLocalStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteLocalStorage::new(temp_dir.path().join("local.db")).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn write_then_read() {
        let (storage, _temp_dir) = create_tmp_storage();

        assert_eq!(storage.read_text("user").unwrap(), None);
        storage.write_text("user", "{}").unwrap();
        assert_eq!(storage.read_text("user").unwrap(), Some("{}".to_string()));

        storage.write_text("user", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.read_text("user").unwrap(),
            Some("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let (storage, _temp_dir) = create_tmp_storage();

        storage.write_text("k", "v").unwrap();
        storage.remove_key("k").unwrap();
        storage.remove_key("k").unwrap();
        assert_eq!(storage.read_text("k").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("local.db");

        {
            let storage = SqliteLocalStorage::new(&path).unwrap();
            storage.write_text("access_token", "abc").unwrap();
        }

        let reopened = SqliteLocalStorage::new(&path).unwrap();
        assert_eq!(
            reopened.read_text("access_token").unwrap(),
            Some("abc".to_string())
        );
    }

    #[test]
    fn refuses_foreign_database() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE whatever (id INTEGER)", [])
                .unwrap();
        }

        assert!(SqliteLocalStorage::new(&path).is_err());
    }
}
