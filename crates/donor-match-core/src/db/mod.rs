//! Database layer for donor matching.

mod schema;
mod patients;
mod donors;
mod families;

pub use schema::*;
#[allow(unused_imports)]
pub use patients::*;
#[allow(unused_imports)]
pub use donors::*;
#[allow(unused_imports)]
pub use families::*;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Invalid stored value: {0}")]
    InvalidData(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse a stored timestamp. Accepts RFC 3339 and bare `YYYY-MM-DD` dates
/// (taken as midnight UTC).
pub(crate) fn parse_timestamp(value: &str) -> DbResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DbError::InvalidData(format!("Unparseable timestamp: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("donors.db");
        {
            let db = Database::open(&path).unwrap();
            db.upsert_donor(&crate::models::Donor::new("Kiran".into(), "O-".into(), "Pune".into()))
                .unwrap();
        }
        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.list_available_donors().unwrap().len(), 1);
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"donors".to_string()));
        assert!(tables.contains(&"donor_families".to_string()));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let full = parse_timestamp("2026-01-15T10:30:00Z").unwrap();
        assert_eq!(full.to_rfc3339(), "2026-01-15T10:30:00+00:00");

        let offset = parse_timestamp("2026-01-15T12:30:00+02:00").unwrap();
        assert_eq!(offset, full);

        let date_only = parse_timestamp("2026-01-15").unwrap();
        assert_eq!(date_only.to_rfc3339(), "2026-01-15T00:00:00+00:00");

        assert!(matches!(
            parse_timestamp("last tuesday"),
            Err(DbError::InvalidData(_))
        ));
    }
}
