//! The command surface a desktop shell invokes. Every command returns
//! `Result<T, String>`: failures are messages for the UI, never panics, and
//! the form stays editable after any of them.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::MutexGuard;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wiscv_core::models::{
    CompositeResult, ConfidenceLevel, Evaluation, EvaluationRecord, Patient, SubtestEntry,
};
use wiscv_core::{Age, CompositeIndex, Subtest};
use wiscv_norms::score_profile;
use wiscv_predict::{EvolutionPredictor, Prognosis};
use wiscv_report::{Report, interpretive_text, render_profile_chart, render_report};
use wiscv_storage::{Connection, evaluations, patients, stats};

use crate::state::SessionState;

/// A per-field error, keyed by subtest code or index abbreviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// What the form shows after scoring: converted entries, derived
/// composites, and any per-field failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredForm {
    pub age: Age,
    pub confidence: ConfidenceLevel,
    pub subtests: BTreeMap<Subtest, SubtestEntry>,
    pub composites: BTreeMap<CompositeIndex, CompositeResult>,
    pub failures: Vec<FieldError>,
}

fn lock(state: &SessionState) -> Result<MutexGuard<'_, Connection>, String> {
    state
        .conn
        .lock()
        .map_err(|_| "database lock poisoned".to_string())
}

fn parse_id(s: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|e| format!("invalid id '{s}': {e}"))
}

pub fn create_patient(
    state: &SessionState,
    name: &str,
    national_id: Option<String>,
    birth_date: &str,
    notes: Option<String>,
) -> Result<Patient, String> {
    if name.trim().is_empty() {
        return Err("patient name must not be empty".to_string());
    }
    let birth_date: jiff::civil::Date = birth_date
        .parse()
        .map_err(|e| format!("invalid birth date '{birth_date}': {e}"))?;
    let mut patient = Patient::new(name.trim(), birth_date);
    patient.national_id = national_id;
    patient.notes = notes.unwrap_or_default();

    let conn = lock(state)?;
    patients::insert_patient(&conn, &patient).map_err(|e| e.to_string())?;
    Ok(patient)
}

pub fn update_patient(state: &SessionState, patient: &Patient) -> Result<(), String> {
    let conn = lock(state)?;
    patients::update_patient(&conn, patient).map_err(|e| e.to_string())
}

pub fn delete_patient(state: &SessionState, patient_id: &str) -> Result<(), String> {
    let id = parse_id(patient_id)?;
    let conn = lock(state)?;
    patients::delete_patient(&conn, id).map_err(|e| e.to_string())
}

pub fn get_patient(state: &SessionState, patient_id: &str) -> Result<Patient, String> {
    let id = parse_id(patient_id)?;
    let conn = lock(state)?;
    patients::get_patient(&conn, id).map_err(|e| e.to_string())
}

pub fn search_patients(state: &SessionState, query: &str) -> Result<Vec<Patient>, String> {
    let conn = lock(state)?;
    patients::search_patients(&conn, query).map_err(|e| e.to_string())
}

/// Score a form of raw scores keyed by subtest code. Unknown codes and
/// per-subtest conversion failures are reported by name, not fatal; an
/// unparseable or out-of-range age is fatal because nothing can be scored.
pub fn score_form(
    state: &SessionState,
    age: &str,
    raw_scores: &BTreeMap<String, u32>,
    confidence: Option<ConfidenceLevel>,
) -> Result<ScoredForm, String> {
    let age: Age = age.parse().map_err(|e| format!("{e}"))?;
    let confidence = confidence.unwrap_or(state.config.default_confidence);

    let mut failures = Vec::new();
    let mut parsed = BTreeMap::new();
    for (code, &raw) in raw_scores {
        match Subtest::from_str(code) {
            Ok(subtest) => {
                parsed.insert(subtest, raw);
            }
            Err(err) => failures.push(FieldError {
                field: code.clone(),
                message: err.to_string(),
            }),
        }
    }

    let profile = score_profile(&state.norms, age, &parsed, confidence);
    failures.extend(profile.failures.iter().map(|f| FieldError {
        field: f.context.clone(),
        message: f.message.clone(),
    }));

    Ok(ScoredForm {
        age: profile.age,
        confidence: profile.confidence,
        subtests: profile.subtests,
        composites: profile.composites,
        failures,
    })
}

pub fn save_evaluation(
    state: &SessionState,
    patient_id: &str,
    form: ScoredForm,
    observations: Option<String>,
) -> Result<Evaluation, String> {
    let id = parse_id(patient_id)?;
    let record = EvaluationRecord {
        age: form.age,
        confidence: form.confidence,
        subtests: form.subtests,
        composites: form.composites,
        observations,
    };

    let conn = lock(state)?;
    // Surface a patient-not-found before the FK violation would.
    patients::get_patient(&conn, id).map_err(|e| e.to_string())?;
    let evaluation = Evaluation::new(id, record);
    evaluations::insert_evaluation(&conn, &evaluation).map_err(|e| e.to_string())?;
    Ok(evaluation)
}

/// Evaluations for a patient, newest first.
pub fn list_evaluations(state: &SessionState, patient_id: &str) -> Result<Vec<Evaluation>, String> {
    let id = parse_id(patient_id)?;
    let conn = lock(state)?;
    evaluations::evaluations_for_patient(&conn, id).map_err(|e| e.to_string())
}

pub fn load_evaluation(state: &SessionState, evaluation_id: &str) -> Result<Evaluation, String> {
    let id = parse_id(evaluation_id)?;
    let conn = lock(state)?;
    evaluations::get_evaluation(&conn, id).map_err(|e| e.to_string())
}

pub fn session_stats(state: &SessionState) -> Result<stats::Stats, String> {
    let conn = lock(state)?;
    stats::stats(&conn).map_err(|e| e.to_string())
}

fn evaluation_with_patient(
    state: &SessionState,
    evaluation_id: &str,
) -> Result<(Evaluation, Patient), String> {
    let id = parse_id(evaluation_id)?;
    let conn = lock(state)?;
    let evaluation = evaluations::get_evaluation(&conn, id).map_err(|e| e.to_string())?;
    let patient = patients::get_patient(&conn, evaluation.patient_id).map_err(|e| e.to_string())?;
    Ok((evaluation, patient))
}

pub fn export_chart(state: &SessionState, evaluation_id: &str, path: &str) -> Result<(), String> {
    let (evaluation, patient) = evaluation_with_patient(state, evaluation_id)?;
    render_profile_chart(
        Path::new(path),
        &format!("{}: WISC-V profile", patient.name),
        &evaluation.record.composites,
    )
    .map_err(|e| e.to_string())
}

pub fn export_report(state: &SessionState, evaluation_id: &str, path: &str) -> Result<(), String> {
    let (evaluation, patient) = evaluation_with_patient(state, evaluation_id)?;
    let record = &evaluation.record;

    let chart_path = std::env::temp_dir().join(format!("wiscv-chart-{}.png", evaluation.id));
    render_profile_chart(
        &chart_path,
        &format!("{}: WISC-V profile", patient.name),
        &record.composites,
    )
    .map_err(|e| e.to_string())?;

    let narrative = interpretive_text(&patient.name, record.age, record.confidence, &record.composites)
        .map_err(|e| e.to_string())?;

    let administered_on = evaluation
        .administered_at
        .to_zoned(jiff::tz::TimeZone::UTC)
        .date()
        .to_string();
    let report = Report {
        patient_name: &patient.name,
        national_id: patient.national_id.as_deref(),
        age: record.age,
        administered_on,
        confidence: record.confidence,
        subtests: &record.subtests,
        composites: &record.composites,
        chart: Some(&chart_path),
        narrative: &narrative,
    };
    let result = render_report(Path::new(path), &report).map_err(|e| e.to_string());
    let _ = std::fs::remove_file(&chart_path);
    result
}

/// Train over every stored history and forecast this patient's composites
/// `horizon_months` ahead. The model is refit per call; training sets are
/// tens of rows, not worth caching.
pub fn predict_evolution(
    state: &SessionState,
    patient_id: &str,
    horizon_months: u32,
) -> Result<Prognosis, String> {
    let id = parse_id(patient_id)?;
    let conn = lock(state)?;
    let mut histories = Vec::new();
    let mut target = None;
    for patient in patients::search_patients(&conn, "").map_err(|e| e.to_string())? {
        let mut history =
            evaluations::evaluations_for_patient(&conn, patient.id).map_err(|e| e.to_string())?;
        history.reverse(); // stored newest first, trained oldest first
        if patient.id == id {
            target = Some(history.clone());
        }
        histories.push(history);
    }
    drop(conn);

    let history = target.ok_or_else(|| format!("patient not found: {id}"))?;
    let predictor = EvolutionPredictor::train(&histories).map_err(|e| e.to_string())?;
    predictor
        .predict(&history, horizon_months)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionState {
        SessionState::in_memory().unwrap()
    }

    fn raw_form() -> BTreeMap<String, u32> {
        let mut raw = BTreeMap::new();
        raw.insert("CC".to_string(), 25);
        raw.insert("BAL".to_string(), 23);
        raw
    }

    #[test]
    fn create_patient_validates_input() {
        let state = state();
        assert!(create_patient(&state, "  ", None, "2017-03-15", None).is_err());
        assert!(create_patient(&state, "Ana", None, "not-a-date", None).is_err());
        let patient = create_patient(
            &state,
            "Ana Gómez",
            Some("44.123.456".to_string()),
            "2017-03-15",
            None,
        )
        .unwrap();
        assert_eq!(get_patient(&state, &patient.id.to_string()).unwrap().name, "Ana Gómez");
    }

    #[test]
    fn score_form_reports_unknown_codes_without_failing() {
        let state = state();
        let mut raw = raw_form();
        raw.insert("XYZ".to_string(), 10);
        let form = score_form(&state, "8:6", &raw, None).unwrap();
        assert_eq!(form.subtests.len(), 2);
        assert_eq!(form.failures.len(), 1);
        assert_eq!(form.failures[0].field, "XYZ");
        assert_eq!(form.confidence, ConfidenceLevel::NinetyFive);
    }

    #[test]
    fn score_form_rejects_out_of_range_ages() {
        let state = state();
        assert!(score_form(&state, "5:11", &raw_form(), None).is_ok());
        // Age parses; conversions fail per subtest instead of fatally.
        let form = score_form(&state, "5:11", &raw_form(), None).unwrap();
        assert!(form.subtests.is_empty());
        assert_eq!(form.failures.len(), 2);
        // A malformed age string is fatal.
        assert!(score_form(&state, "eight", &raw_form(), None).is_err());
    }

    #[test]
    fn save_and_list_evaluations() {
        let state = state();
        let patient = create_patient(&state, "Ana", None, "2017-03-15", None).unwrap();
        let form = score_form(&state, "8:6", &raw_form(), None).unwrap();
        let saved = save_evaluation(
            &state,
            &patient.id.to_string(),
            form,
            Some("focused".to_string()),
        )
        .unwrap();

        let listed = list_evaluations(&state, &patient.id.to_string()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(
            load_evaluation(&state, &saved.id.to_string())
                .unwrap()
                .record
                .observations
                .as_deref(),
            Some("focused")
        );

        let stats = session_stats(&state).unwrap();
        assert_eq!(stats.patients, 1);
        assert_eq!(stats.evaluations, 1);
    }

    #[test]
    fn saving_against_a_missing_patient_is_a_message_not_a_panic() {
        let state = state();
        let form = score_form(&state, "8:6", &raw_form(), None).unwrap();
        let err = save_evaluation(&state, &Uuid::new_v4().to_string(), form, None).unwrap_err();
        assert!(err.contains("patient not found"));
    }

    #[test]
    fn prediction_without_history_reports_insufficient_data() {
        let state = state();
        let patient = create_patient(&state, "Ana", None, "2017-03-15", None).unwrap();
        let err = predict_evolution(&state, &patient.id.to_string(), 12).unwrap_err();
        assert!(err.contains("not enough training data"));
    }
}
