use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Domain grouping for canonical columns.
///
/// Used for display and for ordering the registry listing; it plays no part
/// in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    /// Farm, animal and registration identifiers.
    Identification,
    /// Sire, dam and maternal grandsire references.
    Pedigree,
    /// Milk, fat and protein yields as recorded on farm.
    Production,
    /// Predicted transmitting abilities.
    Pta,
    /// Composite selection indexes (TPI, NM$, ...).
    Index,
    /// Linear type traits and composites.
    Type,
    /// Health and fitness traits.
    Health,
    /// Fertility and calving traits.
    Reproduction,
    /// Management data (dates, lactation, pen).
    Management,
    /// Anything not covered above.
    Other,
}

impl ColumnCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnCategory::Identification => "identification",
            ColumnCategory::Pedigree => "pedigree",
            ColumnCategory::Production => "production",
            ColumnCategory::Pta => "pta",
            ColumnCategory::Index => "index",
            ColumnCategory::Type => "type",
            ColumnCategory::Health => "health",
            ColumnCategory::Reproduction => "reproduction",
            ColumnCategory::Management => "management",
            ColumnCategory::Other => "other",
        }
    }
}

impl fmt::Display for ColumnCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnCategory {
    type Err = ModelError;

    /// Parse a category name, case-insensitive, with or without separators.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "identification" | "id" => Ok(ColumnCategory::Identification),
            "pedigree" => Ok(ColumnCategory::Pedigree),
            "production" => Ok(ColumnCategory::Production),
            "pta" | "genetic" | "genetics" => Ok(ColumnCategory::Pta),
            "index" | "indexes" | "indices" => Ok(ColumnCategory::Index),
            "type" | "conformation" => Ok(ColumnCategory::Type),
            "health" => Ok(ColumnCategory::Health),
            "reproduction" | "fertility" => Ok(ColumnCategory::Reproduction),
            "management" => Ok(ColumnCategory::Management),
            "other" | "" => Ok(ColumnCategory::Other),
            _ => Err(ModelError::UnknownCategory(s.to_string())),
        }
    }
}

/// A column of the target vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalColumn {
    /// Stable identifier, e.g. `farm_name`.
    pub canonical_key: String,
    /// Display label.
    pub label: String,
    pub category: ColumnCategory,
    /// Whether an import is considered incomplete without this column.
    #[serde(default)]
    pub required: bool,
    /// Known alternate spellings. Order carries no meaning for matching
    /// other than regex tie-breaks.
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl CanonicalColumn {
    pub fn new(canonical_key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            canonical_key: canonical_key.into(),
            label: label.into(),
            category: ColumnCategory::Other,
            required: false,
            synonyms: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: ColumnCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    /// Key, label and synonyms, in that order.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_key.as_str())
            .chain(std::iter::once(self.label.as_str()))
            .chain(self.synonyms.iter().map(String::as_str))
    }
}

/// The ordered, immutable set of canonical columns.
///
/// Column order is preserved from the source and is the iteration order
/// used for regex tie-breaking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CanonicalColumn>", into = "Vec<CanonicalColumn>")]
pub struct CanonicalRegistry {
    columns: Vec<CanonicalColumn>,
    by_key: BTreeMap<String, usize>,
}

impl CanonicalRegistry {
    /// Build a registry, rejecting empty or duplicate keys.
    pub fn new(mut columns: Vec<CanonicalColumn>) -> Result<Self> {
        let mut by_key = BTreeMap::new();
        for (idx, column) in columns.iter_mut().enumerate() {
            let key = column.canonical_key.trim().to_string();
            if key.is_empty() {
                return Err(ModelError::EmptyCanonicalKey);
            }
            if by_key.insert(key.clone(), idx).is_some() {
                return Err(ModelError::DuplicateCanonicalKey(key));
            }
            column.canonical_key = key;
        }
        Ok(Self { columns, by_key })
    }

    pub fn columns(&self) -> &[CanonicalColumn] {
        &self.columns
    }

    pub fn get(&self, canonical_key: &str) -> Option<&CanonicalColumn> {
        self.by_key
            .get(canonical_key)
            .and_then(|idx| self.columns.get(*idx))
    }

    pub fn contains(&self, canonical_key: &str) -> bool {
        self.by_key.contains_key(canonical_key)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalColumn> {
        self.columns.iter()
    }

    /// Columns flagged as required.
    pub fn required_columns(&self) -> impl Iterator<Item = &CanonicalColumn> {
        self.columns.iter().filter(|c| c.required)
    }
}

impl<'a> IntoIterator for &'a CanonicalRegistry {
    type Item = &'a CanonicalColumn;
    type IntoIter = std::slice::Iter<'a, CanonicalColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl TryFrom<Vec<CanonicalColumn>> for CanonicalRegistry {
    type Error = ModelError;

    fn try_from(columns: Vec<CanonicalColumn>) -> std::result::Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<CanonicalRegistry> for Vec<CanonicalColumn> {
    fn from(registry: CanonicalRegistry) -> Self {
        registry.columns
    }
}
