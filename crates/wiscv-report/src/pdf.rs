//! PDF report generation via `printpdf`: header, score tables, the embedded
//! profile chart, and the interpretive narrative.

use std::collections::BTreeMap;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::info;

use wiscv_core::models::{CompositeResult, ConfidenceLevel, SubtestEntry};
use wiscv_core::{Age, Classification, CompositeIndex, Subtest};

use crate::error::ReportError;

/// Everything a rendered report needs, already computed upstream.
pub struct Report<'a> {
    pub patient_name: &'a str,
    pub national_id: Option<&'a str>,
    pub age: Age,
    pub administered_on: String,
    pub confidence: ConfidenceLevel,
    pub subtests: &'a BTreeMap<Subtest, SubtestEntry>,
    pub composites: &'a BTreeMap<CompositeIndex, CompositeResult>,
    /// Pre-rendered profile chart PNG, embedded when present.
    pub chart: Option<&'a Path>,
    pub narrative: &'a str,
}

struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl Cursor<'_> {
    fn text(&self, s: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(s, size, Mm(x), self.y, font);
    }

    /// Move down, breaking to a fresh page when the bottom margin is reached.
    fn advance(&mut self, dy: f32) {
        self.y -= Mm(dy);
        if self.y < Mm(18.0) {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(210.0), Mm(297.0), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(280.0);
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y < Mm(18.0 + needed) {
            self.break_page();
        }
    }
}

/// Render the full report to `path`.
pub fn render_report(path: &Path, report: &Report<'_>) -> Result<(), ReportError> {
    let bytes = report_bytes(report)?;
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), "PDF report written");
    Ok(())
}

pub fn report_bytes(report: &Report<'_>) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new("WISC-V Evaluation Report", Mm(210.0), Mm(297.0), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

    let mut cur = Cursor {
        doc: &doc,
        layer: doc.get_page(page1).get_layer(layer1),
        y: Mm(280.0),
    };

    cur.text("WISC-V Evaluation Report", 16.0, 20.0, &bold);
    cur.advance(8.0);
    cur.text(&format!("Patient: {}", report.patient_name), 10.0, 20.0, &font);
    if let Some(id) = report.national_id {
        cur.text(&format!("ID: {id}"), 10.0, 120.0, &font);
    }
    cur.advance(5.0);
    cur.text(&format!("Chronological age: {}", report.age), 10.0, 20.0, &font);
    cur.text(
        &format!("Administered: {}", report.administered_on),
        10.0,
        120.0,
        &font,
    );
    cur.advance(5.0);
    cur.text(
        &format!("Confidence intervals: {}", report.confidence.label()),
        10.0,
        20.0,
        &font,
    );
    cur.advance(10.0);

    // Subtest table.
    cur.text("SUBTEST SCORES", 11.0, 20.0, &bold);
    cur.advance(6.0);
    cur.text("Subtest", 9.0, 20.0, &bold);
    cur.text("Raw", 9.0, 110.0, &bold);
    cur.text("Scaled", 9.0, 130.0, &bold);
    cur.advance(5.0);
    for (subtest, entry) in report.subtests {
        cur.text(
            &format!("{} ({})", subtest.name(), subtest.code()),
            9.0,
            20.0,
            &font,
        );
        cur.text(&entry.raw.to_string(), 9.0, 110.0, &font);
        cur.text(&entry.scaled.to_string(), 9.0, 130.0, &font);
        cur.advance(4.5);
    }
    cur.advance(5.0);

    // Composite table.
    cur.ensure_space(40.0);
    cur.text("COMPOSITE SCORES", 11.0, 20.0, &bold);
    cur.advance(6.0);
    cur.text("Index", 9.0, 20.0, &bold);
    cur.text("Sum", 9.0, 85.0, &bold);
    cur.text("Score", 9.0, 100.0, &bold);
    cur.text("Percentile", 9.0, 115.0, &bold);
    cur.text(&format!("CI {}", report.confidence.label()), 9.0, 138.0, &bold);
    cur.text("Classification", 9.0, 160.0, &bold);
    cur.advance(5.0);
    for (index, result) in report.composites {
        cur.text(
            &format!("{} ({})", index.name(), index.abbreviation()),
            9.0,
            20.0,
            &font,
        );
        cur.text(&result.sum.to_string(), 9.0, 85.0, &font);
        cur.text(&result.score.value.to_string(), 9.0, 100.0, &font);
        cur.text(&result.score.percentile, 9.0, 115.0, &font);
        cur.text(
            result.score.confidence_interval(report.confidence),
            9.0,
            138.0,
            &font,
        );
        cur.text(
            Classification::of(result.score.value).label(),
            9.0,
            160.0,
            &font,
        );
        cur.advance(4.5);
    }
    cur.advance(6.0);

    // Profile chart, 900x600 px at 300 dpi scaled x2 -> 152 x 102 mm.
    if let Some(chart_path) = report.chart {
        cur.ensure_space(110.0);
        let dynamic = printpdf::image_crate::open(chart_path)
            .map_err(|e| ReportError::Pdf(format!("chart image unreadable: {e}")))?;
        let image = Image::from_dynamic_image(&dynamic);
        cur.y -= Mm(102.0);
        image.add_to_layer(
            cur.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(28.0)),
                translate_y: Some(cur.y),
                scale_x: Some(2.0),
                scale_y: Some(2.0),
                dpi: Some(300.0),
                ..Default::default()
            },
        );
        cur.advance(8.0);
    }

    // Interpretive text.
    cur.ensure_space(30.0);
    cur.text("INTERPRETATION", 11.0, 20.0, &bold);
    cur.advance(6.0);
    for paragraph in report.narrative.split('\n') {
        if paragraph.trim().is_empty() {
            cur.advance(2.0);
            continue;
        }
        for line in wrap_text(paragraph, 95) {
            cur.text(&line, 9.0, 20.0, &font);
            cur.advance(4.5);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiscv_core::models::CompositeScore;

    fn sample_report<'a>(
        subtests: &'a BTreeMap<Subtest, SubtestEntry>,
        composites: &'a BTreeMap<CompositeIndex, CompositeResult>,
    ) -> Report<'a> {
        Report {
            patient_name: "Ana Gómez",
            national_id: Some("44.123.456"),
            age: Age::new(8, 6).unwrap(),
            administered_on: "2025-06-02".to_string(),
            confidence: ConfidenceLevel::NinetyFive,
            subtests,
            composites,
            chart: None,
            narrative: "The Full Scale composite of 104 falls in the Average range.\n\nScores are reported with 95% confidence intervals.",
        }
    }

    #[test]
    fn produces_a_pdf_document() {
        let mut subtests = BTreeMap::new();
        subtests.insert(Subtest::Cc, SubtestEntry { raw: 25, scaled: 12 });
        subtests.insert(Subtest::An, SubtestEntry { raw: 19, scaled: 10 });
        let mut composites = BTreeMap::new();
        composites.insert(
            CompositeIndex::Icv,
            CompositeResult {
                sum: 20,
                score: CompositeScore {
                    value: 100,
                    percentile: "50".to_string(),
                    conf_90: "95-106".to_string(),
                    conf_95: "94-107".to_string(),
                },
            },
        );
        let bytes = report_bytes(&sample_report(&subtests, &composites)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_subtest_lists_spill_onto_a_second_page() {
        let mut subtests = BTreeMap::new();
        for subtest in Subtest::ALL {
            subtests.insert(subtest, SubtestEntry { raw: 20, scaled: 10 });
        }
        let composites = BTreeMap::new();
        let report = Report {
            narrative: &"A long interpretive paragraph. ".repeat(80),
            ..sample_report(&subtests, &composites)
        };
        let bytes = report_bytes(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrapping_respects_the_line_width() {
        let text = "one two three four five six seven eight nine ten";
        for line in wrap_text(text, 20) {
            assert!(line.len() <= 20);
        }
        assert_eq!(wrap_text("", 20), vec![String::new()]);
    }
}
