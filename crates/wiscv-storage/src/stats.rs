//! Aggregate counters shown on the session dashboard.

use jiff::Timestamp;
use rusqlite::Connection;
use serde::Serialize;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub patients: u64,
    pub evaluations: u64,
    pub latest_evaluation: Option<Timestamp>,
}

pub fn stats(conn: &Connection) -> Result<Stats, StorageError> {
    let patients: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    let evaluations: i64 =
        conn.query_row("SELECT COUNT(*) FROM evaluations", [], |row| row.get(0))?;
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(administered_at) FROM evaluations",
        [],
        |row| row.get(0),
    )?;
    let latest_evaluation = match latest {
        Some(s) => Some(
            s.parse::<Timestamp>()
                .map_err(|e| StorageError::decode("administered_at", e))?,
        ),
        None => None,
    };
    Ok(Stats {
        patients: patients as u64,
        evaluations: evaluations as u64,
        latest_evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::evaluations::insert_evaluation;
    use crate::patients::insert_patient;
    use jiff::civil::date;
    use std::collections::BTreeMap;
    use wiscv_core::Age;
    use wiscv_core::models::{Evaluation, EvaluationRecord, Patient};

    #[test]
    fn counts_and_latest_timestamp() {
        let conn = open_in_memory().unwrap();
        assert_eq!(
            stats(&conn).unwrap(),
            Stats {
                patients: 0,
                evaluations: 0,
                latest_evaluation: None
            }
        );

        let patient = Patient::new("Ana", date(2017, 3, 15));
        insert_patient(&conn, &patient).unwrap();
        let record = EvaluationRecord {
            age: Age::new(8, 6).unwrap(),
            confidence: Default::default(),
            subtests: BTreeMap::new(),
            composites: BTreeMap::new(),
            observations: None,
        };
        let mut evaluation = Evaluation::new(patient.id, record);
        evaluation.administered_at = "2025-06-02T10:00:00Z".parse().unwrap();
        insert_evaluation(&conn, &evaluation).unwrap();

        let s = stats(&conn).unwrap();
        assert_eq!(s.patients, 1);
        assert_eq!(s.evaluations, 1);
        assert_eq!(s.latest_evaluation, Some(evaluation.administered_at));
    }
}
