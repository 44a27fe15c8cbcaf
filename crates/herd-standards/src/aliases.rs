//! Alias reference table and legend bank loading.
//!
//! Both sources share one CSV layout: `alias_original`,
//! `suggested_canonical_key`, and optionally `source_hint` and `confidence`.
//! Rows missing either required field are dropped without error; validating
//! the uploaded file itself is left to the caller.

use std::path::Path;

use tracing::{debug, warn};

use herd_model::AliasSuggestion;

use crate::csv_utils::{CsvRows, get_optional, read_csv_rows};
use crate::error::{Result, StandardsError};

const BUNDLED_ALIASES: &str = include_str!("../data/alias_reference.csv");
const BUNDLED_ALIASES_NAME: &str = "bundled alias_reference.csv";

const ALIAS_COLUMNS: &[&str] = &["alias_original", "alias", "header"];
const KEY_COLUMNS: &[&str] = &["suggested_canonical_key", "canonical_key", "canonical"];
const HINT_COLUMNS: &[&str] = &["source_hint", "source"];
const CONFIDENCE_COLUMNS: &[&str] = &["confidence", "score"];

/// Load the alias reference table shipped with the crate.
pub fn load_default_aliases() -> Result<Vec<AliasSuggestion>> {
    parse_alias_table(BUNDLED_ALIASES, BUNDLED_ALIASES_NAME)
}

/// Load a user-supplied legend bank from disk.
pub fn load_legend_bank(path: &Path) -> Result<Vec<AliasSuggestion>> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    parse_alias_table(&text, &path.display().to_string())
}

/// Parse alias CSV text.
///
/// Fails only when the table has no alias or canonical key column at all.
pub fn parse_alias_table(text: &str, source_name: &str) -> Result<Vec<AliasSuggestion>> {
    let parsed = read_csv_rows(text, source_name)?;
    let alias_col = required_column(&parsed, ALIAS_COLUMNS, source_name)?;
    let key_col = required_column(&parsed, KEY_COLUMNS, source_name)?;
    let hint_col = parsed.find_column(HINT_COLUMNS);
    let confidence_col = parsed.find_column(CONFIDENCE_COLUMNS);

    let mut suggestions = Vec::with_capacity(parsed.rows.len());
    let mut dropped = 0usize;
    for row in &parsed.rows {
        let (Some(alias), Some(key)) = (get_optional(row, alias_col), get_optional(row, key_col))
        else {
            dropped += 1;
            continue;
        };
        let confidence = confidence_col
            .and_then(|col| get_optional(row, col))
            .and_then(|raw| {
                let parsed = parse_confidence(&raw);
                if parsed.is_none() {
                    warn!(source = source_name, alias = %alias, value = %raw, "ignoring invalid confidence");
                }
                parsed
            });
        suggestions.push(AliasSuggestion {
            alias_original: alias,
            suggested_canonical_key: key,
            source_hint: hint_col.and_then(|col| get_optional(row, col)),
            confidence,
        });
    }

    debug!(
        source = source_name,
        aliases = suggestions.len(),
        dropped,
        "loaded alias table"
    );
    Ok(suggestions)
}

fn required_column<'a>(
    parsed: &CsvRows,
    candidates: &[&'a str],
    source_name: &str,
) -> Result<&'a str> {
    parsed
        .find_column(candidates)
        .ok_or_else(|| StandardsError::MissingColumn {
            source_name: source_name.to_string(),
            column: candidates[0].to_string(),
        })
}

/// Parse a confidence as a fraction, accepting percentages (`"95"`, `"95%"`).
fn parse_confidence(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (number, percent) = match trimmed.strip_suffix('%') {
        Some(stripped) => (stripped.trim(), true),
        None => (trimmed, false),
    };
    let value: f64 = number.replace(',', ".").parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if percent || value > 1.0 {
        return (value <= 100.0).then_some(value / 100.0);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_accepts_fractions_and_percentages() {
        assert_eq!(parse_confidence("0.95"), Some(0.95));
        assert_eq!(parse_confidence("0,9"), Some(0.9));
        assert_eq!(parse_confidence("80%"), Some(0.8));
        assert_eq!(parse_confidence("50"), Some(0.5));
        assert_eq!(parse_confidence("250"), None);
        assert_eq!(parse_confidence("-1"), None);
        assert_eq!(parse_confidence("high"), None);
    }

    #[test]
    fn rows_missing_required_fields_are_dropped() {
        let text = "alias_original,suggested_canonical_key,source_hint,confidence\n\
                    Brinco,animal_id,ideagri,0.97\n\
                    ,farm_name,,\n\
                    Leite,,,\n";
        let aliases = parse_alias_table(text, "inline").expect("parse aliases");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].alias_original, "Brinco");
        assert_eq!(aliases[0].source_hint.as_deref(), Some("ideagri"));
        assert_eq!(aliases[0].confidence, Some(0.97));
    }

    #[test]
    fn accepts_alternate_column_names() {
        let text = "Header,Canonical\nNº Animal,animal_id\n";
        let aliases = parse_alias_table(text, "inline").expect("parse aliases");
        assert_eq!(aliases, vec![AliasSuggestion::new("Nº Animal", "animal_id")]);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let err = parse_alias_table("alias_original,notes\nBrinco,x\n", "inline").unwrap_err();
        assert!(matches!(err, StandardsError::MissingColumn { .. }));
    }
}
