//! Patient CRUD and search.

use jiff::Timestamp;
use jiff::civil::Date;
use rusqlite::{Connection, Row, params};
use tracing::info;
use uuid::Uuid;

use wiscv_core::models::Patient;

use crate::error::StorageError;

fn patient_from_row(row: &Row<'_>) -> Result<Patient, StorageError> {
    let id: String = row.get("id")?;
    let birth_date: String = row.get("birth_date")?;
    let created_at: String = row.get("created_at")?;
    Ok(Patient {
        id: Uuid::parse_str(&id).map_err(|e| StorageError::decode("id", e))?,
        name: row.get("name")?,
        national_id: row.get("national_id")?,
        birth_date: birth_date
            .parse::<Date>()
            .map_err(|e| StorageError::decode("birth_date", e))?,
        notes: row.get("notes")?,
        created_at: created_at
            .parse::<Timestamp>()
            .map_err(|e| StorageError::decode("created_at", e))?,
    })
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO patients (id, name, national_id, birth_date, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.national_id,
            patient.birth_date.to_string(),
            patient.notes,
            patient.created_at.to_string(),
        ],
    )?;
    info!(patient_id = %patient.id, "patient created");
    Ok(())
}

pub fn get_patient(conn: &Connection, id: Uuid) -> Result<Patient, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, national_id, birth_date, notes, created_at
         FROM patients WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id.to_string()])?;
    match rows.next()? {
        Some(row) => patient_from_row(row),
        None => Err(StorageError::PatientNotFound(id)),
    }
}

/// Patients whose name or national id contains `query`, ordered by name.
/// An empty query lists everyone.
pub fn search_patients(conn: &Connection, query: &str) -> Result<Vec<Patient>, StorageError> {
    let pattern = format!("%{query}%");
    let mut stmt = conn.prepare(
        "SELECT id, name, national_id, birth_date, notes, created_at
         FROM patients
         WHERE name LIKE ?1 OR national_id LIKE ?1
         ORDER BY name",
    )?;
    let mut rows = stmt.query(params![pattern])?;
    let mut patients = Vec::new();
    while let Some(row) = rows.next()? {
        patients.push(patient_from_row(row)?);
    }
    Ok(patients)
}

/// Update the mutable fields of a patient record.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE patients SET name = ?2, national_id = ?3, birth_date = ?4, notes = ?5
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.national_id,
            patient.birth_date.to_string(),
            patient.notes,
        ],
    )?;
    if changed == 0 {
        return Err(StorageError::PatientNotFound(patient.id));
    }
    info!(patient_id = %patient.id, "patient updated");
    Ok(())
}

/// Delete a patient; their evaluations go with them via `ON DELETE CASCADE`.
pub fn delete_patient(conn: &Connection, id: Uuid) -> Result<(), StorageError> {
    let changed = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(StorageError::PatientNotFound(id));
    }
    info!(patient_id = %id, "patient deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use jiff::civil::date;

    fn sample(name: &str) -> Patient {
        Patient::new(name, date(2017, 3, 15))
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_in_memory().unwrap();
        let patient = sample("Lucía P.")
            .with_national_id("44.123.456")
            .with_notes("referred by school");
        insert_patient(&conn, &patient).unwrap();

        let loaded = get_patient(&conn, patient.id).unwrap();
        assert_eq!(loaded.name, "Lucía P.");
        assert_eq!(loaded.national_id.as_deref(), Some("44.123.456"));
        assert_eq!(loaded.birth_date, date(2017, 3, 15));
        assert_eq!(loaded.notes, "referred by school");
    }

    #[test]
    fn get_missing_patient_is_not_found() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(
            get_patient(&conn, Uuid::new_v4()),
            Err(StorageError::PatientNotFound(_))
        ));
    }

    #[test]
    fn search_matches_name_and_national_id() {
        let conn = open_in_memory().unwrap();
        insert_patient(&conn, &sample("Ana Gómez").with_national_id("11222333")).unwrap();
        insert_patient(&conn, &sample("Bruno Díaz").with_national_id("99888777")).unwrap();

        assert_eq!(search_patients(&conn, "Gómez").unwrap().len(), 1);
        assert_eq!(search_patients(&conn, "99888").unwrap().len(), 1);
        let all = search_patients(&conn, "").unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by name.
        assert_eq!(all[0].name, "Ana Gómez");
    }

    #[test]
    fn update_rewrites_mutable_fields() {
        let conn = open_in_memory().unwrap();
        let mut patient = sample("Ana");
        insert_patient(&conn, &patient).unwrap();
        patient.name = "Ana María".to_string();
        patient.notes = "new school".to_string();
        update_patient(&conn, &patient).unwrap();

        let loaded = get_patient(&conn, patient.id).unwrap();
        assert_eq!(loaded.name, "Ana María");
        assert_eq!(loaded.notes, "new school");
    }

    #[test]
    fn update_and_delete_of_missing_patients_fail() {
        let conn = open_in_memory().unwrap();
        let ghost = sample("Nobody");
        assert!(update_patient(&conn, &ghost).is_err());
        assert!(delete_patient(&conn, ghost.id).is_err());
    }
}
