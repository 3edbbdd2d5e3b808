use rusqlite::Connection;
use std::cell::RefCell;
use std::fs;

use crate::errors::ServerError;

// One connection per server worker thread.
thread_local! {
    static DB_CONN: RefCell<Option<Connection>> = RefCell::new(None);
}

/// Handle to the provider document store. Cheap to clone; each worker
/// thread lazily opens its own connection on first use.
#[derive(Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection, ServerError> {
        let conn = Connection::open(&self.path)
            .map_err(|e| ServerError::DbError(format!("Open DB failed: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| ServerError::DbError(format!("Set WAL failed: {e}")))?;
        Ok(conn)
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        let inner_result = DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                if slot.is_none() {
                    *slot = Some(self.open()?);
                }
                let conn = slot.as_mut().unwrap();
                f(conn)
            })
            .map_err(|_| ServerError::InternalError)?;
        inner_result
    }
}

/// Initialize the store from a SQL schema file.
pub fn init_db(db: &Database, schema_path: &str) -> Result<(), ServerError> {
    let schema_sql = fs::read_to_string(schema_path)
        .map_err(|e| ServerError::DbError(format!("Failed to read schema file: {e}")))?;

    db.with_conn(|conn| {
        conn.execute_batch(&schema_sql)
            .map_err(|e| ServerError::DbError(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    println!("✅ Provider store initialized from {}", schema_path);
    Ok(())
}
