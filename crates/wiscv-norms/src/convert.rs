//! Sum-to-composite conversion: exact lookup, linear interpolation between
//! bracketing rows, and boundary extrapolation.
//!
//! Percentile bands and confidence intervals are categorical table entries;
//! they are always carried from a tabulated row, never interpolated.

use wiscv_core::models::CompositeScore;

use crate::tables::CompositeRow;

/// Composite scores are bounded to the published scale.
pub const COMPOSITE_MIN: u8 = 40;
pub const COMPOSITE_MAX: u8 = 160;

/// Slope multiplier applied when extrapolating above the highest tabulated
/// sum. Undocumented scoring policy carried over from established practice;
/// clinically unvalidated. Do not tune without domain sign-off.
pub const HIGH_EXTRAPOLATION_DAMPING: f64 = 0.7;

/// Percentile string marking the extreme upper tail of the tables.
const UPPER_TAIL_MARKER: &str = "99.9";

fn score_from_row(row: &CompositeRow) -> CompositeScore {
    CompositeScore {
        value: row.value,
        percentile: row.percentile.clone(),
        conf_90: row.conf_90.clone(),
        conf_95: row.conf_95.clone(),
    }
}

fn clamp_composite(value: f64) -> u8 {
    value
        .round()
        .clamp(f64::from(COMPOSITE_MIN), f64::from(COMPOSITE_MAX)) as u8
}

fn slope(a: &CompositeRow, b: &CompositeRow) -> f64 {
    f64::from(b.value as i16 - a.value as i16) / f64::from(b.sum as i32 - a.sum as i32)
}

/// Interior interpolation shared by the index and full-scale converters.
/// Caller guarantees `rows` is sorted ascending by sum and brackets `sum`.
fn interpolate(rows: &[CompositeRow], sum: u16) -> CompositeScore {
    for pair in rows.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if (lo.sum..=hi.sum).contains(&sum) {
            let ratio = f64::from(sum - lo.sum) / f64::from(hi.sum - lo.sum);
            let value = f64::from(lo.value) + ratio * f64::from(hi.value as i16 - lo.value as i16);
            // Percentile and CI come from the lower bracketing row.
            return CompositeScore {
                value: clamp_composite(value),
                ..score_from_row(lo)
            };
        }
    }
    // Unreachable for bracketed sums; fall back to the last row.
    score_from_row(rows.last().expect("validated tables have rows"))
}

/// Index-scale conversion: extrapolates past both table ends.
pub(crate) fn convert_composite(rows: &[CompositeRow], sum: u16) -> CompositeScore {
    if let Some(row) = rows.iter().find(|r| r.sum == sum) {
        return score_from_row(row);
    }

    let first = &rows[0];
    let last = &rows[rows.len() - 1];

    if sum < first.sum {
        let slope = slope(first, &rows[1]);
        let value = f64::from(first.value) - slope * f64::from(first.sum - sum);
        return CompositeScore {
            value: clamp_composite(value),
            ..score_from_row(first)
        };
    }

    if sum > last.sum {
        let damped = slope(&rows[rows.len() - 2], last) * HIGH_EXTRAPOLATION_DAMPING;
        let value = f64::from(last.value) + damped * f64::from(sum - last.sum);
        // Never below the last tabulated value, never above the scale cap.
        let value = clamp_composite(value).max(last.value);
        let percentile = if last.percentile.contains(UPPER_TAIL_MARKER) {
            format!(">{UPPER_TAIL_MARKER}")
        } else {
            last.percentile.clone()
        };
        return CompositeScore {
            value,
            percentile,
            conf_90: last.conf_90.clone(),
            conf_95: last.conf_95.clone(),
        };
    }

    interpolate(rows, sum)
}

/// Full-scale (CIT) conversion: boundary sums take the boundary row
/// verbatim, with no extrapolation and no damping on this table.
pub(crate) fn convert_fsiq(rows: &[CompositeRow], sum: u16) -> CompositeScore {
    if let Some(row) = rows.iter().find(|r| r.sum == sum) {
        return score_from_row(row);
    }
    let first = &rows[0];
    let last = &rows[rows.len() - 1];
    if sum < first.sum {
        return score_from_row(first);
    }
    if sum > last.sum {
        return score_from_row(last);
    }
    interpolate(rows, sum)
}
