//! End-to-end session flow over an in-memory database and bundled norms:
//! create a patient, score a form, persist, export artifacts, delete.

use std::collections::BTreeMap;

use wiscv_core::CompositeIndex;
use wiscv_session::SessionState;
use wiscv_session::commands;

fn raw_form() -> BTreeMap<String, u32> {
    let mut raw = BTreeMap::new();
    raw.insert("CC".to_string(), 25); // scaled 12 in the bundled 8:6-8:11 band
    raw.insert("BAL".to_string(), 23); // scaled 15
    raw
}

#[test]
fn full_session_round_trip() {
    let state = SessionState::in_memory().unwrap();
    let out = tempfile::tempdir().unwrap();

    let patient = commands::create_patient(
        &state,
        "Ana Gómez",
        Some("44.123.456".to_string()),
        "2017-03-15",
        Some("referred by school".to_string()),
    )
    .unwrap();

    let form = commands::score_form(&state, "8:6", &raw_form(), None).unwrap();
    assert!(form.failures.is_empty());
    assert_eq!(form.subtests.len(), 2);
    assert!(form.composites.contains_key(&CompositeIndex::Ive));
    assert!(form.composites.contains_key(&CompositeIndex::Irf));

    let evaluation = commands::save_evaluation(
        &state,
        &patient.id.to_string(),
        form,
        Some("settled quickly".to_string()),
    )
    .unwrap();

    let chart_path = out.path().join("profile.png");
    commands::export_chart(
        &state,
        &evaluation.id.to_string(),
        chart_path.to_str().unwrap(),
    )
    .unwrap();
    assert!(chart_path.exists());

    let pdf_path = out.path().join("report.pdf");
    commands::export_report(
        &state,
        &evaluation.id.to_string(),
        pdf_path.to_str().unwrap(),
    )
    .unwrap();
    let pdf = std::fs::read(&pdf_path).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    // Deleting the patient cascades to the stored evaluation.
    commands::delete_patient(&state, &patient.id.to_string()).unwrap();
    let stats = commands::session_stats(&state).unwrap();
    assert_eq!(stats.patients, 0);
    assert_eq!(stats.evaluations, 0);
}

#[test]
fn conversion_failures_surface_by_name_and_leave_the_form_usable() {
    let state = SessionState::in_memory().unwrap();

    let mut raw = raw_form();
    raw.insert("BAL".to_string(), 18); // gap in the bundled BAL column
    raw.insert("VOC".to_string(), 30); // no VOC column in the bundled band

    let form = commands::score_form(&state, "8:6", &raw, None).unwrap();
    assert_eq!(form.subtests.len(), 1);
    let fields: Vec<&str> = form.failures.iter().map(|f| f.field.as_str()).collect();
    assert!(fields.contains(&"BAL"));
    assert!(fields.contains(&"VOC"));

    // Rescore after fixing the entries: no failures.
    let form = commands::score_form(&state, "8:6", &raw_form(), None).unwrap();
    assert!(form.failures.is_empty());
}
