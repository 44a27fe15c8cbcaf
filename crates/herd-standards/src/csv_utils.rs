//! Shared CSV helpers for registry and alias tables.

use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Result, StandardsError};

/// A parsed table: lower-cased headers plus one map per record.
pub(crate) struct CsvRows {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl CsvRows {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// First of `candidates` present as a header.
    pub fn find_column<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_column(c))
    }
}

/// Read CSV text into row maps keyed by normalized header.
///
/// Headers are trimmed, stripped of a UTF-8 BOM and lower-cased; values
/// are trimmed. Short records are padded with empty strings.
pub(crate) fn read_csv_rows(text: &str, source_name: &str) -> Result<CsvRows> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StandardsError::csv(source_name, &e))?
        .iter()
        .map(header_key)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StandardsError::csv(source_name, &e))?;
        if is_blank(&record) {
            continue;
        }
        let mut row = BTreeMap::new();
        for (idx, key) in headers.iter().enumerate() {
            let value = record.get(idx).unwrap_or("").to_string();
            row.insert(key.clone(), value);
        }
        rows.push(row);
    }
    Ok(CsvRows { headers, rows })
}

fn header_key(raw: &str) -> String {
    raw.trim_matches('\u{feff}').trim().to_lowercase()
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|v| v.trim().is_empty())
}

/// Get a field value from a row, returning empty string if not present.
pub(crate) fn get_field(row: &BTreeMap<String, String>, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

/// Get an optional field value from a row (None if empty or missing).
pub(crate) fn get_optional(row: &BTreeMap<String, String>, key: &str) -> Option<String> {
    row.get(key).filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_normalized_and_bom_stripped() {
        let parsed = read_csv_rows("\u{feff} Alias_Original ,Key\nBrinco,animal_id\n", "test")
            .expect("parse csv");
        assert_eq!(parsed.headers, vec!["alias_original", "key"]);
        assert_eq!(get_field(&parsed.rows[0], "alias_original"), "Brinco");
    }

    #[test]
    fn short_records_are_padded_and_blank_lines_skipped() {
        let parsed = read_csv_rows("a,b,c\n1\n,,\n", "test").expect("parse csv");
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(get_optional(&parsed.rows[0], "a").as_deref(), Some("1"));
        assert_eq!(get_optional(&parsed.rows[0], "c"), None);
    }
}
