//! CSV header handling.

use std::collections::HashSet;

/// Header row of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    /// Column names as written, trimmed; may contain blanks and duplicates.
    pub raw: Vec<String>,
    /// Unique, non-empty column names used as row keys.
    pub columns: Vec<String>,
    /// Field delimiter the file was read with.
    pub delimiter: u8,
}

impl CsvHeaders {
    pub fn new(raw: Vec<String>, delimiter: u8) -> Self {
        let columns = disambiguate_headers(&raw);
        Self {
            raw,
            columns,
            delimiter,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether any header had to be renamed.
    pub fn was_disambiguated(&self) -> bool {
        self.raw != self.columns
    }
}

/// Normalizes a header value by trimming whitespace and a leading BOM.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

/// Makes headers unique and non-empty.
///
/// Blank headers become `column_N` (1-based position). Repeated headers
/// keep their first occurrence and get ` (2)`, ` (3)`, ... on later ones,
/// skipping any suffix that is already taken.
pub fn disambiguate_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let trimmed: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let name = normalize_header(h.as_ref());
            if name.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(trimmed.len());
    for (idx, name) in trimmed.iter().enumerate() {
        if taken.insert(name.clone()) {
            out.push(name.clone());
            continue;
        }
        let mut n = 2usize;
        let unique = loop {
            let candidate = format!("{name} ({n})");
            // Later headers keep their own spelling when they are unique.
            if !taken.contains(&candidate) && !trimmed[idx + 1..].contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// Picks the delimiter that occurs most often in a header line.
///
/// Quoted sections are ignored. Ties and lines without any candidate fall
/// back to a comma.
pub fn sniff_delimiter(line: &str) -> u8 {
    let mut counts = [(b',', 0usize), (b';', 0), (b'\t', 0), (b'|', 0)];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(entry) = counts.iter_mut().find(|(d, _)| *d == byte) {
            entry.1 += 1;
        }
    }
    counts
        .iter()
        .fold((b',', 0), |best, &(d, c)| if c > best.1 { (d, c) } else { best })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Brinco  "), "Brinco");
        assert_eq!(normalize_header("\u{feff}Fazenda"), "Fazenda");
    }

    #[test]
    fn test_disambiguate_duplicates_and_blanks() {
        let headers = disambiguate_headers(&["Leite", "", "Leite", "leite", " Leite "]);
        assert_eq!(
            headers,
            vec!["Leite", "column_2", "Leite (2)", "leite", "Leite (3)"]
        );
    }

    #[test]
    fn test_disambiguate_skips_existing_suffix() {
        let headers = disambiguate_headers(&["Obs", "Obs", "Obs (2)"]);
        assert_eq!(headers, vec!["Obs", "Obs (3)", "Obs (2)"]);
    }

    #[test]
    fn test_headers_track_renames() {
        let headers = CsvHeaders::new(vec!["A".into(), "B".into()], b',');
        assert!(!headers.was_disambiguated());
        let headers = CsvHeaders::new(vec!["A".into(), "A".into()], b',');
        assert!(headers.was_disambiguated());
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("Brinco;Nome;Leite"), b';');
        assert_eq!(sniff_delimiter("Brinco\tNome"), b'\t');
        assert_eq!(sniff_delimiter("\"Nome; completo\",Leite"), b',');
        assert_eq!(sniff_delimiter("Brinco"), b',');
    }
}
