use serde::{Deserialize, Serialize};

/// An observed header spelling associated with a canonical key.
///
/// Sourced from the bundled reference table or from a user-supplied legend
/// bank; both share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasSuggestion {
    /// Header string as it was observed, unnormalized.
    pub alias_original: String,
    pub suggested_canonical_key: String,
    /// Where the pair came from (tool name, file, reviewer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<String>,
    /// Confidence (0.0 to 1.0) to report on an exact alias hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AliasSuggestion {
    pub fn new(alias_original: impl Into<String>, suggested_canonical_key: impl Into<String>) -> Self {
        Self {
            alias_original: alias_original.into(),
            suggested_canonical_key: suggested_canonical_key.into(),
            source_hint: None,
            confidence: None,
        }
    }

    pub fn with_source_hint(mut self, hint: impl Into<String>) -> Self {
        self.source_hint = Some(hint.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
