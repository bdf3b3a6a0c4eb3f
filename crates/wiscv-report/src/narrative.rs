//! Fixed interpretive text for reports, rendered from a built-in template.

use std::collections::BTreeMap;

use serde::Serialize;
use tera::{Context, Tera};

use wiscv_core::models::{CompositeResult, ConfidenceLevel};
use wiscv_core::{Age, Classification, CompositeIndex};

use crate::error::ReportError;

const TEMPLATE: &str = include_str!("../templates/interpretation.tera");

#[derive(Serialize)]
struct IndexLine {
    abbr: &'static str,
    name: &'static str,
    value: u8,
    percentile: String,
    classification: &'static str,
}

#[derive(Serialize)]
struct NarrativeContext {
    patient: String,
    age: String,
    confidence: &'static str,
    cit: Option<IndexLine>,
    indices: Vec<IndexLine>,
}

fn index_line(index: CompositeIndex, result: &CompositeResult) -> IndexLine {
    IndexLine {
        abbr: index.abbreviation(),
        name: index.name(),
        value: result.score.value,
        percentile: result.score.percentile.clone(),
        classification: Classification::of(result.score.value).label(),
    }
}

/// Render the interpretive paragraphs for a scored evaluation.
pub fn interpretive_text(
    patient_name: &str,
    age: Age,
    confidence: ConfidenceLevel,
    composites: &BTreeMap<CompositeIndex, CompositeResult>,
) -> Result<String, ReportError> {
    let context = NarrativeContext {
        patient: patient_name.to_string(),
        age: age.to_string(),
        confidence: confidence.label(),
        cit: composites
            .get(&CompositeIndex::Cit)
            .map(|r| index_line(CompositeIndex::Cit, r)),
        indices: CompositeIndex::PRIMARY
            .iter()
            .filter_map(|i| composites.get(i).map(|r| index_line(*i, r)))
            .collect(),
    };

    let mut tera = Tera::default();
    tera.add_raw_template("interpretation", TEMPLATE)
        .map_err(|e| ReportError::TemplateRender(e.to_string()))?;
    let value = serde_json::to_value(&context)?;
    let context =
        Context::from_value(value).map_err(|e| ReportError::TemplateRender(e.to_string()))?;
    Ok(tera.render("interpretation", &context)?)
}
