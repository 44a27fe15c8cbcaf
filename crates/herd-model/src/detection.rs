use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the match cascade that produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Regex,
    Fuzzy,
    Unmapped,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Regex => "regex",
            MatchMethod::Fuzzy => "fuzzy",
            MatchMethod::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision for one input header.
///
/// Created fresh by every detection run and never mutated; reviewer
/// overrides live in [`crate::Selections`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRow {
    /// The header as seen in the current file.
    pub alias_original: String,
    /// Canonical key, or empty when unmapped.
    pub suggested: String,
    pub method: MatchMethod,
    /// Confidence of the stage that fired (0.0 to 1.0).
    pub score: f64,
    /// Names of the inventory sheets that contain a column normalizing
    /// like this header, in inventory order.
    ///
    /// These are sheet names rather than canonical keys: the canonical key
    /// is already in `suggested`, and the sheets say where else the header
    /// was seen.
    #[serde(default)]
    pub occurrences: Vec<String>,
}

impl DetectionRow {
    pub fn unmapped(alias_original: impl Into<String>) -> Self {
        Self {
            alias_original: alias_original.into(),
            suggested: String::new(),
            method: MatchMethod::Unmapped,
            score: 0.0,
            occurrences: Vec::new(),
        }
    }

    pub fn is_mapped(&self) -> bool {
        !self.suggested.is_empty()
    }
}

/// Columns of one source sheet, as handed to inventory aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetColumns {
    pub name: String,
    pub columns: Vec<String>,
}

impl SheetColumns {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Descriptive metadata about a known source sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub sheet: String,
    /// Raw column list, comma separated.
    pub columns: String,
}

impl InventoryRow {
    pub const COLUMN_SEPARATOR: &'static str = ", ";

    /// Split the raw column string back into individual column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .split([',', ';', '|', '\t'])
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
