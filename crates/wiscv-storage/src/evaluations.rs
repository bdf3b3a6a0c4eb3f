//! Evaluation persistence. Evaluations are insert-only: there is no update
//! path, and they disappear only when their patient is deleted.

use jiff::Timestamp;
use rusqlite::{Connection, Row, params};
use tracing::{info, warn};
use uuid::Uuid;

use wiscv_core::models::{Evaluation, EvaluationRecord};

use crate::error::StorageError;

/// Serialize the payload, falling back to a simplified record if the full
/// one cannot be encoded. The fallback keeps the scores and drops the rest
/// so the session is never lost to a serialization defect.
fn payload_json(evaluation: &Evaluation) -> Result<String, StorageError> {
    match serde_json::to_string(&evaluation.record) {
        Ok(json) => Ok(json),
        Err(err) => {
            warn!(
                evaluation_id = %evaluation.id,
                error = %err,
                "full payload not encodable; storing simplified record"
            );
            let simplified = EvaluationRecord {
                age: evaluation.record.age,
                confidence: evaluation.record.confidence,
                subtests: evaluation.record.subtests.clone(),
                composites: evaluation.record.composites.clone(),
                observations: None,
            };
            Ok(serde_json::to_string(&simplified)?)
        }
    }
}

pub fn insert_evaluation(conn: &Connection, evaluation: &Evaluation) -> Result<(), StorageError> {
    let payload = payload_json(evaluation)?;
    conn.execute(
        "INSERT INTO evaluations (id, patient_id, administered_at, payload)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            evaluation.id.to_string(),
            evaluation.patient_id.to_string(),
            evaluation.administered_at.to_string(),
            payload,
        ],
    )?;
    info!(
        evaluation_id = %evaluation.id,
        patient_id = %evaluation.patient_id,
        "evaluation stored"
    );
    Ok(())
}

fn evaluation_from_row(row: &Row<'_>) -> Result<Evaluation, StorageError> {
    let id: String = row.get("id")?;
    let patient_id: String = row.get("patient_id")?;
    let administered_at: String = row.get("administered_at")?;
    let payload: String = row.get("payload")?;
    Ok(Evaluation {
        id: Uuid::parse_str(&id).map_err(|e| StorageError::decode("id", e))?,
        patient_id: Uuid::parse_str(&patient_id)
            .map_err(|e| StorageError::decode("patient_id", e))?,
        administered_at: administered_at
            .parse::<Timestamp>()
            .map_err(|e| StorageError::decode("administered_at", e))?,
        record: serde_json::from_str(&payload)?,
    })
}

/// All evaluations for a patient, newest first.
pub fn evaluations_for_patient(
    conn: &Connection,
    patient_id: Uuid,
) -> Result<Vec<Evaluation>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, administered_at, payload
         FROM evaluations WHERE patient_id = ?1
         ORDER BY administered_at DESC",
    )?;
    let mut rows = stmt.query(params![patient_id.to_string()])?;
    let mut evaluations = Vec::new();
    while let Some(row) = rows.next()? {
        evaluations.push(evaluation_from_row(row)?);
    }
    Ok(evaluations)
}

pub fn get_evaluation(conn: &Connection, id: Uuid) -> Result<Evaluation, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, administered_at, payload
         FROM evaluations WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id.to_string()])?;
    match rows.next()? {
        Some(row) => evaluation_from_row(row),
        None => Err(StorageError::EvaluationNotFound(id)),
    }
}
