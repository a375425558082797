use serde::{Deserialize, Serialize};

const EXCELLENT_FLOOR: f64 = 81.0;
const GOOD_FLOOR: f64 = 61.0;
const AVERAGE_FLOOR: f64 = 41.0;
const POOR_FLOOR: f64 = 21.0;

/// Discrete performance tier derived from a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Average,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl PerformanceCategory {
    /// Thresholds are checked from the top tier down; every lower bound is inclusive.
    pub fn classify(score: f64) -> Self {
        if score >= EXCELLENT_FLOOR {
            Self::Excellent
        } else if score >= GOOD_FLOOR {
            Self::Good
        } else if score >= AVERAGE_FLOOR {
            Self::Average
        } else if score >= POOR_FLOOR {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PerformanceCategory::Excellent => "Excellent",
            PerformanceCategory::Good => "Good",
            PerformanceCategory::Average => "Average",
            PerformanceCategory::Poor => "Poor",
            PerformanceCategory::VeryPoor => "Very Poor",
        }
    }

    pub const fn requires_coaching(self) -> bool {
        matches!(
            self,
            PerformanceCategory::Poor | PerformanceCategory::VeryPoor
        )
    }
}

impl std::fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bounds_are_inclusive() {
        assert_eq!(PerformanceCategory::classify(81.0), PerformanceCategory::Excellent);
        assert_eq!(PerformanceCategory::classify(80.99), PerformanceCategory::Good);
        assert_eq!(PerformanceCategory::classify(61.0), PerformanceCategory::Good);
        assert_eq!(PerformanceCategory::classify(60.99), PerformanceCategory::Average);
        assert_eq!(PerformanceCategory::classify(41.0), PerformanceCategory::Average);
        assert_eq!(PerformanceCategory::classify(21.0), PerformanceCategory::Poor);
        assert_eq!(PerformanceCategory::classify(20.99), PerformanceCategory::VeryPoor);
    }

    #[test]
    fn every_score_maps_to_a_tier() {
        assert_eq!(PerformanceCategory::classify(150.0), PerformanceCategory::Excellent);
        assert_eq!(PerformanceCategory::classify(-4.0), PerformanceCategory::VeryPoor);
        assert_eq!(PerformanceCategory::classify(f64::NAN), PerformanceCategory::VeryPoor);
    }

    #[test]
    fn serializes_display_labels() {
        let json = serde_json::to_string(&PerformanceCategory::VeryPoor).expect("serializes");
        assert_eq!(json, "\"Very Poor\"");
        let parsed: PerformanceCategory = serde_json::from_str("\"Good\"").expect("parses");
        assert_eq!(parsed, PerformanceCategory::Good);
    }

    #[test]
    fn coaching_flag_covers_bottom_tiers() {
        assert!(PerformanceCategory::Poor.requires_coaching());
        assert!(PerformanceCategory::VeryPoor.requires_coaching());
        assert!(!PerformanceCategory::Average.requires_coaching());
    }
}
