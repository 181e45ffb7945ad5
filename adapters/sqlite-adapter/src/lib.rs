//! sqlite-adapter — SQLite implementation of the MappingStore port.
//!
//! Purpose
//! - Provide a lightweight, file-based store to run the system locally
//!   without external dependencies.
//! - Implements the `MappingStore` trait from the `domain` crate.
//! - Code uniqueness is enforced by the PRIMARY KEY; a constraint violation
//!   on insert is surfaced as `CoreError::Conflict`, which is the signal the
//!   creation protocol absorbs when a concurrent insert races ahead.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - The connection is opened once at startup and shared behind a mutex;
//!   nothing connects or disconnects per request.

use std::path::Path;
use std::sync::Mutex;

use domain::{CoreError, Mapping, MappingStore, ShortCode};
use rusqlite::{params, Connection};

/// SQLite-backed mapping store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Construct from env var `DB_PATH` (defaults to `./data/mappings.db`).
    pub fn from_env() -> Result<Self, CoreError> {
        let path = std::env::var("DB_PATH").unwrap_or_else(|_| "./data/mappings.db".to_string());
        // Ensure directory exists
        if let Some(dir) = std::path::Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        Self::new(path)
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS mappings (
            code TEXT PRIMARY KEY,
            long_url TEXT NOT NULL
        );
        "#,
    )
    .map_err(map_sqerr)?;
    Ok(())
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError {
    CoreError::Store(format!("sqlite error: {e}"))
}

impl MappingStore for SqliteStore {
    fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>, CoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        let mut stmt = conn
            .prepare("SELECT code, long_url FROM mappings WHERE code = ?1")
            .map_err(map_sqerr)?;
        let mut rows = stmt.query(params![code.as_str()]).map_err(map_sqerr)?;
        if let Some(row) = rows.next().map_err(map_sqerr)? {
            let code_str: String = row.get(0).map_err(map_sqerr)?;
            let long_url: String = row.get(1).map_err(map_sqerr)?;
            let code = ShortCode::new(code_str)
                .map_err(|e| CoreError::Store(format!("bad code in db: {e}")))?;
            Ok(Some(Mapping::new(code, long_url)))
        } else {
            Ok(None)
        }
    }

    fn insert_unique(&self, mapping: Mapping) -> Result<(), CoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        let res = conn.execute(
            "INSERT INTO mappings(code, long_url) VALUES (?1, ?2)",
            params![mapping.code.as_str(), mapping.long_url],
        );
        match res {
            Ok(_) => Ok(()),
            Err(e) => {
                if let rusqlite::Error::SqliteFailure(err, _) = &e {
                    if err.code == rusqlite::ErrorCode::ConstraintViolation {
                        return Err(CoreError::Conflict);
                    }
                }
                Err(map_sqerr(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::service::ShortenerService;

    fn tmp_db() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        let store = SqliteStore::new(path).unwrap();
        (store, dir)
    }

    fn mk_mapping(code: &str, url: &str) -> Mapping {
        Mapping::new(ShortCode::new(code).unwrap(), url.to_string())
    }

    #[test]
    fn insert_find_roundtrip() {
        let (store, _dir) = tmp_db();
        let mapping = mk_mapping("abc123_-XY", "https://example.com");
        store.insert_unique(mapping.clone()).unwrap();
        let got = store.find_by_code(&mapping.code).unwrap().unwrap();
        assert_eq!(got.long_url, "https://example.com");
        assert_eq!(got.code, mapping.code);
    }

    #[test]
    fn insert_duplicate_is_conflict() {
        let (store, _dir) = tmp_db();
        let mapping = mk_mapping("dupdupdup0", "https://example.com");
        store.insert_unique(mapping.clone()).unwrap();
        let err = store
            .insert_unique(mk_mapping("dupdupdup0", "https://other.example.org"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict));
        // The original mapping survives the rejected insert.
        let got = store.find_by_code(&mapping.code).unwrap().unwrap();
        assert_eq!(got.long_url, "https://example.com");
    }

    #[test]
    fn find_missing_is_none() {
        let (store, _dir) = tmp_db();
        let code = ShortCode::new("absentcode").unwrap();
        assert!(store.find_by_code(&code).unwrap().is_none());
    }

    #[test]
    fn service_idempotence_holds_on_sqlite() {
        let (store, _dir) = tmp_db();
        let svc = ShortenerService::new(store);
        let first = svc.shorten("https://example.com/page").unwrap();
        let second = svc.shorten("https://example.com/page").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            svc.resolve(first.as_str()).unwrap(),
            "https://example.com/page"
        );
    }
}
