//! Connection bootstrap: open, enable foreign keys, apply the schema.

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::error::StorageError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS patients (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    national_id TEXT,
    birth_date  TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evaluations (
    id              TEXT PRIMARY KEY,
    patient_id      TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    administered_at TEXT NOT NULL,
    payload         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_national_id ON patients(national_id);
CREATE INDEX IF NOT EXISTS idx_evaluations_patient_id ON evaluations(patient_id);
CREATE INDEX IF NOT EXISTS idx_evaluations_administered_at ON evaluations(administered_at);
";

/// Open (or create) the database file and apply the schema.
///
/// Returned connections always have `foreign_keys=ON`; cascade deletes
/// depend on it.
pub fn open(path: impl AsRef<Path>) -> Result<Connection, StorageError> {
    let conn = Connection::open(path.as_ref())?;
    bootstrap(&conn)?;
    info!(path = %path.as_ref().display(), "database opened");
    Ok(conn)
}

/// In-memory database with the same schema, for tests.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    bootstrap(&conn)?;
    Ok(conn)
}

fn bootstrap(conn: &Connection) -> Result<(), StorageError> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
    }

    #[test]
    fn foreign_keys_are_enabled() {
        let conn = open_in_memory().unwrap();
        let on: bool = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert!(on);
    }

    #[test]
    fn opening_a_file_twice_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiscv.db");
        {
            let conn = open(&path).unwrap();
            conn.execute(
                "INSERT INTO patients (id, name, birth_date, created_at)
                 VALUES ('p1', 'A', '2017-03-15', '2025-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }
        let conn = open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
