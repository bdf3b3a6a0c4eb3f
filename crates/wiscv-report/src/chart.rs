//! Profile chart rendering: the five primary indices as a line-with-markers
//! series over a 40–160 scale, with classification bands shaded behind it
//! and the Full Scale composite as a dashed reference line.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::FontStyle;
use tracing::info;

use wiscv_core::models::CompositeResult;
use wiscv_core::{Classification, CompositeIndex};

use crate::error::ReportError;

// Bundled so chart text renders without any system font lookup.
static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static FONT_REGISTRATION: Once = Once::new();

fn ensure_font() {
    FONT_REGISTRATION.call_once(|| {
        if plotters::style::register_font("sans-serif", FontStyle::Normal, FONT_BYTES).is_err() {
            tracing::warn!("bundled font failed to register; chart labels may be blank");
        }
    });
}

fn band_color(classification: Classification) -> RGBColor {
    match classification {
        Classification::VerySuperior => RGBColor(46, 125, 50),
        Classification::Superior => RGBColor(102, 187, 106),
        Classification::HighAverage => RGBColor(174, 213, 129),
        Classification::Average => RGBColor(255, 241, 118),
        Classification::LowAverage => RGBColor(255, 183, 77),
        Classification::Borderline => RGBColor(255, 138, 101),
        Classification::ExtremelyLow => RGBColor(229, 115, 115),
    }
}

/// Render the composite profile to a PNG file.
///
/// Only indices present in `composites` are plotted; the x axis always shows
/// the five primary positions so charts from partial administrations line up.
pub fn render_profile_chart(
    path: &Path,
    title: &str,
    composites: &BTreeMap<CompositeIndex, CompositeResult>,
) -> Result<(), ReportError> {
    ensure_font();

    let root = BitMapBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| ReportError::Chart(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(18)
        .x_label_area_size(48)
        .y_label_area_size(46)
        .build_cartesian_2d(-0.5f64..4.5f64, 40f64..160f64)
        .map_err(|e| ReportError::Chart(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Composite score")
        .y_labels(13)
        .x_labels(5)
        .x_label_formatter(&|x| {
            let i = x.round() as isize;
            if (x - i as f64).abs() < 0.01 && (0..5).contains(&i) {
                CompositeIndex::PRIMARY[i as usize].abbreviation().to_string()
            } else {
                String::new()
            }
        })
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| ReportError::Chart(e.to_string()))?;

    for classification in Classification::ALL {
        let (lo, hi) = classification.range();
        let top = (f64::from(hi) + 1.0).min(160.0);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-0.5, f64::from(lo)), (4.5, top)],
                band_color(classification).mix(0.12).filled(),
            )))
            .map_err(|e| ReportError::Chart(e.to_string()))?;
    }

    // Population mean reference.
    chart
        .draw_series(LineSeries::new(
            [(-0.5, 100.0), (4.5, 100.0)],
            BLACK.mix(0.35),
        ))
        .map_err(|e| ReportError::Chart(e.to_string()))?;

    let profile: Vec<(f64, f64)> = CompositeIndex::PRIMARY
        .iter()
        .enumerate()
        .filter_map(|(i, index)| {
            composites
                .get(index)
                .map(|r| (i as f64, f64::from(r.score.value)))
        })
        .collect();

    let blue = RGBColor(25, 118, 210);
    chart
        .draw_series(LineSeries::new(profile.clone(), blue.stroke_width(2)))
        .map_err(|e| ReportError::Chart(e.to_string()))?
        .label("Index profile")
        .legend(move |(x, y)| PathElement::new([(x, y), (x + 18, y)], blue.stroke_width(2)));
    chart
        .draw_series(
            profile
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, blue.filled())),
        )
        .map_err(|e| ReportError::Chart(e.to_string()))?;

    if let Some(cit) = composites.get(&CompositeIndex::Cit) {
        let y = f64::from(cit.score.value);
        let red = RGBColor(198, 40, 40);
        chart
            .draw_series(DashedLineSeries::new(
                [(-0.5, y), (4.5, y)],
                8,
                5,
                red.stroke_width(2).into(),
            ))
            .map_err(|e| ReportError::Chart(e.to_string()))?
            .label(format!("CIT = {}", cit.score.value))
            .legend(move |(x, y)| PathElement::new([(x, y), (x + 18, y)], red.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()
        .map_err(|e| ReportError::Chart(e.to_string()))?;

    root.present().map_err(|e| ReportError::Chart(e.to_string()))?;
    info!(path = %path.display(), "profile chart written");
    Ok(())
}
