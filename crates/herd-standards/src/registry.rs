//! Canonical column registry loading.
//!
//! The registry is a CSV table with the columns `canonical_key`, `label`,
//! `category`, `required` and `synonyms` (pipe separated). The bundled
//! registry is compiled into the crate; a custom one can be loaded from disk.

use std::path::Path;

use tracing::{debug, warn};

use herd_model::{CanonicalColumn, CanonicalRegistry, ColumnCategory};

use crate::csv_utils::{get_field, get_optional, read_csv_rows};
use crate::error::{Result, StandardsError};

const BUNDLED_REGISTRY: &str = include_str!("../data/canonical_columns.csv");
const BUNDLED_REGISTRY_NAME: &str = "bundled canonical_columns.csv";

const SYNONYM_SEPARATOR: char = '|';

/// Load the registry shipped with the crate.
pub fn load_default_registry() -> Result<CanonicalRegistry> {
    parse_registry(BUNDLED_REGISTRY, BUNDLED_REGISTRY_NAME)
}

/// Load a registry CSV from disk.
pub fn load_registry(path: &Path) -> Result<CanonicalRegistry> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    parse_registry(&text, &path.display().to_string())
}

/// Parse registry CSV text.
///
/// Unknown categories fall back to [`ColumnCategory::Other`]. Duplicate or
/// empty keys are rejected.
pub fn parse_registry(text: &str, source_name: &str) -> Result<CanonicalRegistry> {
    let parsed = read_csv_rows(text, source_name)?;
    for column in ["canonical_key", "label"] {
        if !parsed.has_column(column) {
            return Err(StandardsError::MissingColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut columns = Vec::with_capacity(parsed.rows.len());
    for (idx, row) in parsed.rows.iter().enumerate() {
        let key = get_field(row, "canonical_key");
        let label = get_optional(row, "label").unwrap_or_else(|| key.clone());
        let category = match get_optional(row, "category") {
            Some(raw) => raw.parse::<ColumnCategory>().unwrap_or_else(|_| {
                warn!(source = source_name, canonical_key = %key, category = %raw, "unknown category");
                ColumnCategory::Other
            }),
            None => ColumnCategory::Other,
        };
        let required = match get_optional(row, "required") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| StandardsError::InvalidValue {
                source_name: source_name.to_string(),
                row: idx + 2,
                field: "required".to_string(),
                value: raw.clone(),
            })?,
            None => false,
        };
        let synonyms = split_synonyms(&get_field(row, "synonyms"));
        columns.push(
            CanonicalColumn::new(key, label)
                .with_category(category)
                .with_required(required)
                .with_synonyms(synonyms),
        );
    }

    let registry =
        CanonicalRegistry::new(columns).map_err(|source| StandardsError::InvalidRegistry {
            source_name: source_name.to_string(),
            source,
        })?;
    debug!(source = source_name, columns = registry.len(), "loaded canonical registry");
    Ok(registry)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "req" | "sim" => Some(true),
        "false" | "no" | "n" | "0" | "perm" | "nao" | "não" => Some(false),
        _ => None,
    }
}

fn split_synonyms(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for synonym in raw.split(SYNONYM_SEPARATOR).map(str::trim) {
        if synonym.is_empty() || out.iter().any(|s| s == synonym) {
            continue;
        }
        out.push(synonym.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("Req"), Some(true));
        assert_eq!(parse_flag(" no "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn splits_and_dedupes_synonyms() {
        assert_eq!(
            split_synonyms("brinco| tag ||brinco"),
            vec!["brinco".to_string(), "tag".to_string()]
        );
    }

    #[test]
    fn rejects_invalid_required_flag() {
        let text = "canonical_key,label,required\nfarm_name,Farm,perhaps\n";
        let err = parse_registry(text, "inline").unwrap_err();
        assert!(matches!(err, StandardsError::InvalidValue { row: 2, .. }));
    }

    #[test]
    fn unknown_category_falls_back_to_other() {
        let text = "canonical_key,label,category\nweather,Weather,climate\n";
        let registry = parse_registry(text, "inline").expect("parse registry");
        assert_eq!(
            registry.get("weather").map(|c| c.category),
            Some(ColumnCategory::Other)
        );
    }
}
