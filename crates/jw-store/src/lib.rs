//! SQLite persistence for users and saved-search alerts.
//!
//! This crate implements the `jw-core` `UserRegistry` and `AlertStore` ports.
//! Each operation is one short statement batch on a mutex-guarded connection.

mod alerts;
mod schema;
mod users;

use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use jw_core::{errors::Error, Result};

/// Main database wrapper. One connection, serialized through a mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database named by `DATABASE_URL` and ensure the schema.
    ///
    /// Accepts a plain path, `sqlite://path`, `sqlite:path`, or `sqlite::memory:`.
    pub fn open(database_url: &str) -> Result<Self> {
        let conn = match sqlite_path(database_url) {
            None => Connection::open_in_memory().map_err(map_err)?,
            Some(path) => {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Connection::open(path).map_err(map_err)?
            }
        };
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().map_err(map_err)?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::init(&conn).map_err(map_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Storage("database mutex poisoned".to_string()))
    }
}

/// `None` means an in-memory database.
fn sqlite_path(database_url: &str) -> Option<&str> {
    let url = database_url.trim();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

pub(crate) fn map_err(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}

pub(crate) fn parse_ts(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}
