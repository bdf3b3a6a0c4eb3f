use serde::{Deserialize, Serialize};

/// Confidence-interval level shown on forms and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Ninety,
    #[default]
    NinetyFive,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::Ninety => "90%",
            ConfidenceLevel::NinetyFive => "95%",
        }
    }
}

/// One scored subtest: the entered raw score and its age-normed scaled score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtestEntry {
    pub raw: u32,
    pub scaled: u8,
}

/// A converted composite: standard score plus the tabulated percentile band
/// and confidence intervals.
///
/// The percentile is a categorical band string (`"<0.1"`, `"50"`, `">99.9"`),
/// never a computed number. The tables define it per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub value: u8,
    pub percentile: String,
    pub conf_90: String,
    pub conf_95: String,
}

impl CompositeScore {
    pub fn confidence_interval(&self, level: ConfidenceLevel) -> &str {
        match level {
            ConfidenceLevel::Ninety => &self.conf_90,
            ConfidenceLevel::NinetyFive => &self.conf_95,
        }
    }
}

/// A composite score together with the scaled-score sum it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub sum: u16,
    pub score: CompositeScore,
}
