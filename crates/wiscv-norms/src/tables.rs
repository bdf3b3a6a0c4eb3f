//! Typed normative tables, validated at load time.
//!
//! The on-disk schema mirrors the published conversion tables: one raw-score
//! file per age band, one file of composite tables keyed by index
//! abbreviation, and one flat full-scale (CIT) table. Table authors are not
//! trusted; overlapping or unsorted ranges are rejected when loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wiscv_core::{CompositeIndex, Subtest};

use crate::age_band::AgeBand;
use crate::error::NormError;

/// A raw-score cell for one subtest in one table row: a single raw score, an
/// inclusive span, or not applicable (`"-"` or empty on the printed table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCell {
    NotApplicable,
    Single(u32),
    Span { lo: u32, hi: u32 },
}

impl RangeCell {
    pub fn contains(&self, raw: u32) -> bool {
        match *self {
            RangeCell::NotApplicable => false,
            RangeCell::Single(v) => raw == v,
            RangeCell::Span { lo, hi } => (lo..=hi).contains(&raw),
        }
    }

    fn bounds(&self) -> Option<(u32, u32)> {
        match *self {
            RangeCell::NotApplicable => None,
            RangeCell::Single(v) => Some((v, v)),
            RangeCell::Span { lo, hi } => Some((lo, hi)),
        }
    }
}

impl Serialize for RangeCell {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            RangeCell::NotApplicable => serializer.serialize_str("-"),
            RangeCell::Single(v) => serializer.serialize_str(&v.to_string()),
            RangeCell::Span { lo, hi } => serializer.serialize_str(&format!("{lo}-{hi}")),
        }
    }
}

impl<'de> Deserialize<'de> for RangeCell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u32),
            Str(String),
        }

        use serde::de::Error as _;
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(RangeCell::Single(v)),
            Repr::Str(s) => {
                let s = s.trim();
                if s.is_empty() || s == "-" {
                    return Ok(RangeCell::NotApplicable);
                }
                if let Some((lo, hi)) = s.split_once('-') {
                    let lo: u32 = lo
                        .trim()
                        .parse()
                        .map_err(|_| D::Error::custom(format!("bad range cell '{s}'")))?;
                    let hi: u32 = hi
                        .trim()
                        .parse()
                        .map_err(|_| D::Error::custom(format!("bad range cell '{s}'")))?;
                    if lo > hi {
                        return Err(D::Error::custom(format!("inverted range cell '{s}'")));
                    }
                    return Ok(RangeCell::Span { lo, hi });
                }
                let v: u32 = s
                    .parse()
                    .map_err(|_| D::Error::custom(format!("bad range cell '{s}'")))?;
                Ok(RangeCell::Single(v))
            }
        }
    }
}

/// One row of a raw-to-scaled table: the scaled value and the raw-score cell
/// per subtest column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScoreRow {
    pub scaled: u8,
    #[serde(flatten)]
    pub cells: BTreeMap<Subtest, RangeCell>,
}

/// The raw-to-scaled conversion table for one age band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScoreTable {
    pub band: AgeBand,
    pub rows: Vec<RawScoreRow>,
}

impl RawScoreTable {
    /// Load-time validation: scaled values strictly ascending, every scaled
    /// value in 1..=19, and per subtest the defined ranges are ascending and
    /// non-overlapping in row order.
    pub fn validate(&self) -> Result<(), NormError> {
        let table = format!("raw scores {}", self.band);
        let invalid = |reason: String| NormError::InvalidTable {
            table: table.clone(),
            reason,
        };

        if self.rows.is_empty() {
            return Err(NormError::EmptyTable { table });
        }
        for pair in self.rows.windows(2) {
            if pair[1].scaled <= pair[0].scaled {
                return Err(invalid(format!(
                    "scaled values not ascending at {}",
                    pair[1].scaled
                )));
            }
        }
        for row in &self.rows {
            if !(1..=19).contains(&row.scaled) {
                return Err(invalid(format!("scaled value {} outside 1..=19", row.scaled)));
            }
        }
        for subtest in self.columns() {
            let mut prev_hi: Option<u32> = None;
            for row in &self.rows {
                let Some((lo, hi)) = row.cells.get(&subtest).and_then(RangeCell::bounds) else {
                    continue;
                };
                if let Some(prev) = prev_hi
                    && lo <= prev
                {
                    return Err(invalid(format!(
                        "{} ranges overlap or are unsorted near raw {lo}",
                        subtest.code()
                    )));
                }
                prev_hi = Some(hi);
            }
        }
        Ok(())
    }

    /// Subtests that have at least one defined cell in this band.
    pub fn columns(&self) -> Vec<Subtest> {
        let mut columns: Vec<Subtest> = self
            .rows
            .iter()
            .flat_map(|r| r.cells.keys().copied())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }

    pub fn has_column(&self, subtest: Subtest) -> bool {
        self.rows.iter().any(|r| {
            r.cells
                .get(&subtest)
                .is_some_and(|c| *c != RangeCell::NotApplicable)
        })
    }

    /// First row whose cell for `subtest` contains `raw`, scanned in order.
    pub fn lookup(&self, subtest: Subtest, raw: u32) -> Option<u8> {
        self.rows
            .iter()
            .find(|row| row.cells.get(&subtest).is_some_and(|c| c.contains(raw)))
            .map(|row| row.scaled)
    }
}

/// One row of a composite (or full-scale) conversion table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRow {
    pub sum: u16,
    pub value: u8,
    pub percentile: String,
    pub conf_90: String,
    pub conf_95: String,
}

/// Sum-of-scaled-scores to composite conversion for one index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeTable {
    pub name: String,
    pub rows: Vec<CompositeRow>,
}

/// On-disk shape of the composites file: one table per index abbreviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeTableFile {
    pub tables: BTreeMap<CompositeIndex, CompositeTable>,
}

/// The single flat full-scale (CIT) table, keyed by the 7-subtest sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsiqTable {
    pub rows: Vec<CompositeRow>,
}

/// Shared validation for sum-keyed tables: at least two rows (boundary
/// extrapolation needs a slope) and sums strictly ascending.
pub(crate) fn validate_sum_rows(table: &str, rows: &[CompositeRow]) -> Result<(), NormError> {
    if rows.len() < 2 {
        return Err(NormError::InvalidTable {
            table: table.to_string(),
            reason: format!("needs at least 2 rows, has {}", rows.len()),
        });
    }
    for pair in rows.windows(2) {
        if pair[1].sum <= pair[0].sum {
            return Err(NormError::InvalidTable {
                table: table.to_string(),
                reason: format!("sums not strictly ascending at {}", pair[1].sum),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> RangeCell {
        serde_json::from_value(serde_json::Value::String(s.to_string())).unwrap()
    }

    #[test]
    fn range_cells_parse_all_printed_forms() {
        assert_eq!(cell("-"), RangeCell::NotApplicable);
        assert_eq!(cell(""), RangeCell::NotApplicable);
        assert_eq!(cell("5"), RangeCell::Single(5));
        assert_eq!(cell("12-14"), RangeCell::Span { lo: 12, hi: 14 });
        assert_eq!(cell("20-20"), RangeCell::Span { lo: 20, hi: 20 });
        let from_int: RangeCell = serde_json::from_str("7").unwrap();
        assert_eq!(from_int, RangeCell::Single(7));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let parsed: Result<RangeCell, _> =
            serde_json::from_value(serde_json::Value::String("14-12".to_string()));
        assert!(parsed.is_err());
    }

    #[test]
    fn containment() {
        assert!(cell("12-14").contains(12));
        assert!(cell("12-14").contains(14));
        assert!(!cell("12-14").contains(15));
        assert!(cell("5").contains(5));
        assert!(!cell("-").contains(0));
    }

    #[test]
    fn overlapping_subtest_ranges_fail_validation() {
        let json = serde_json::json!({
            "band": "8:6-8:11",
            "rows": [
                { "scaled": 1, "CC": "0-5" },
                { "scaled": 2, "CC": "4-8" }
            ]
        });
        let table: RawScoreTable = serde_json::from_value(json).unwrap();
        assert!(matches!(
            table.validate(),
            Err(NormError::InvalidTable { .. })
        ));
    }

    #[test]
    fn unsorted_scaled_values_fail_validation() {
        let json = serde_json::json!({
            "band": "8:6-8:11",
            "rows": [
                { "scaled": 2, "CC": "0-3" },
                { "scaled": 1, "CC": "4-5" }
            ]
        });
        let table: RawScoreTable = serde_json::from_value(json).unwrap();
        assert!(table.validate().is_err());
    }

    #[test]
    fn unknown_column_names_fail_to_parse() {
        let json = serde_json::json!({
            "band": "8:6-8:11",
            "rows": [ { "scaled": 1, "ZZZ": "0-3" } ]
        });
        let parsed: Result<RawScoreTable, _> = serde_json::from_value(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn sum_rows_must_ascend() {
        let rows = vec![
            CompositeRow {
                sum: 10,
                value: 90,
                percentile: "25".into(),
                conf_90: "85-96".into(),
                conf_95: "84-97".into(),
            },
            CompositeRow {
                sum: 10,
                value: 92,
                percentile: "30".into(),
                conf_90: "87-98".into(),
                conf_95: "86-99".into(),
            },
        ];
        assert!(validate_sum_rows("ICV", &rows).is_err());
    }
}
