use serde::{Deserialize, Serialize};

/// Qualitative descriptor for a composite score (mean 100, SD 15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    VerySuperior,
    Superior,
    HighAverage,
    Average,
    LowAverage,
    Borderline,
    ExtremelyLow,
}

impl Classification {
    pub fn of(composite: u8) -> Self {
        match composite {
            130.. => Classification::VerySuperior,
            120..=129 => Classification::Superior,
            110..=119 => Classification::HighAverage,
            90..=109 => Classification::Average,
            80..=89 => Classification::LowAverage,
            70..=79 => Classification::Borderline,
            ..=69 => Classification::ExtremelyLow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::VerySuperior => "Very Superior",
            Classification::Superior => "Superior",
            Classification::HighAverage => "High Average",
            Classification::Average => "Average",
            Classification::LowAverage => "Low Average",
            Classification::Borderline => "Borderline",
            Classification::ExtremelyLow => "Extremely Low",
        }
    }

    /// Inclusive composite range covered by this band, used for chart shading.
    pub fn range(&self) -> (u8, u8) {
        match self {
            Classification::VerySuperior => (130, 160),
            Classification::Superior => (120, 129),
            Classification::HighAverage => (110, 119),
            Classification::Average => (90, 109),
            Classification::LowAverage => (80, 89),
            Classification::Borderline => (70, 79),
            Classification::ExtremelyLow => (40, 69),
        }
    }

    pub const ALL: [Classification; 7] = [
        Classification::VerySuperior,
        Classification::Superior,
        Classification::HighAverage,
        Classification::Average,
        Classification::LowAverage,
        Classification::Borderline,
        Classification::ExtremelyLow,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_the_composite_scale_without_gaps() {
        for score in 40u8..=160 {
            let c = Classification::of(score);
            let (lo, hi) = c.range();
            assert!(lo <= score && score <= hi, "score {score} outside {c:?}");
        }
    }

    #[test]
    fn boundary_scores() {
        assert_eq!(Classification::of(130), Classification::VerySuperior);
        assert_eq!(Classification::of(129), Classification::Superior);
        assert_eq!(Classification::of(100), Classification::Average);
        assert_eq!(Classification::of(69), Classification::ExtremelyLow);
    }
}
