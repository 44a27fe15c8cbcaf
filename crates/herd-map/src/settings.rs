//! Matching scores, thresholds and confidence bands.

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// Score of a direct registry or corpus hit without its own confidence.
pub const EXACT_SCORE: f64 = 0.99;
/// Score of a synonym regex hit.
pub const REGEX_SCORE: f64 = 0.92;
/// Minimum similarity accepted by the fuzzy stage.
pub const FUZZY_THRESHOLD: f64 = 0.88;

/// Scores assigned by each stage of the match cascade.
///
/// Every field falls back to its default when absent from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    pub exact_score: f64,
    pub regex_score: f64,
    /// Inclusive lower bound for fuzzy candidates.
    pub fuzzy_threshold: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            exact_score: EXACT_SCORE,
            regex_score: REGEX_SCORE,
            fuzzy_threshold: FUZZY_THRESHOLD,
        }
    }
}

impl MatchSettings {
    /// Checks that every score lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("exact_score", self.exact_score),
            ("regex_score", self.regex_score),
            ("fuzzy_threshold", self.fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MappingError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }
}

/// Confidence level categories for reviewing detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    /// At or above the low threshold, below medium.
    Low,
    /// At or above the medium threshold, below high.
    Medium,
    /// At or above the high threshold.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Boundaries between confidence levels.
///
/// The defaults line up with the cascade: exact hits are high, regex hits
/// medium, and fuzzy hits land anywhere from low upwards.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.90,
            low: FUZZY_THRESHOLD,
        }
    }
}

impl ConfidenceThresholds {
    /// Categorizes a score; `None` below the low threshold.
    #[must_use]
    pub fn categorize(&self, score: f64) -> Option<ConfidenceLevel> {
        if score >= self.high {
            Some(ConfidenceLevel::High)
        } else if score >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if score >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cascade_constants() {
        let settings = MatchSettings::default();
        assert_eq!(settings.exact_score, 0.99);
        assert_eq!(settings.regex_score, 0.92);
        assert_eq!(settings.fuzzy_threshold, 0.88);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let settings = MatchSettings {
            fuzzy_threshold: 1.5,
            ..MatchSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(MappingError::InvalidSetting {
                name: "fuzzy_threshold",
                value: 1.5
            })
        );
        let nan = MatchSettings {
            regex_score: f64::NAN,
            ..MatchSettings::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn cascade_scores_fall_in_expected_bands() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(thresholds.categorize(0.99), Some(ConfidenceLevel::High));
        assert_eq!(thresholds.categorize(0.92), Some(ConfidenceLevel::Medium));
        assert_eq!(thresholds.categorize(0.88), Some(ConfidenceLevel::Low));
        assert_eq!(thresholds.categorize(0.0), None);
    }
}
