//! CSV file reading into headers and raw rows.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use herd_model::{CellValue, RawRow};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

use super::header::{CsvHeaders, normalize_header, sniff_delimiter};

/// Maximum file size for CSV loading (200 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 200 * 1024 * 1024;

/// How a source CSV is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvReadOptions {
    /// 1-based line holding the column names; earlier lines are titles.
    pub header_row: usize,
    /// Field delimiter; sniffed from the header line when unset.
    pub delimiter: Option<char>,
    pub max_file_size: u64,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            header_row: 1,
            delimiter: None,
            max_file_size: MAX_CSV_FILE_SIZE,
        }
    }
}

/// A source file read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub headers: CsvHeaders,
    /// Rows keyed by the disambiguated header names.
    pub rows: Vec<RawRow>,
}

impl SourceTable {
    /// Unique header names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.headers.columns
    }
}

/// Check file size against a limit.
pub fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::from_io(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Rejects files starting with a UTF-16 byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    let mut buffer = [0u8; 4];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::from_io(path, e))?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Reads the first N lines from a file, BOM stripped.
fn read_first_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    let reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(n);
    for line_result in reader.lines().take(n) {
        let line = line_result.map_err(|e| IngestError::from_io(path, e))?;
        let cleaned = line.strip_prefix('\u{feff}').unwrap_or(&line).to_string();
        lines.push(cleaned);
    }
    Ok(lines)
}

fn resolve_delimiter(path: &Path, options: &CsvReadOptions) -> Result<u8> {
    if let Some(delimiter) = options.delimiter {
        return u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: format!("delimiter '{delimiter}' is not a single ASCII character"),
            });
    }
    let header_row = options.header_row.max(1);
    let lines = read_first_lines(path, header_row)?;
    Ok(lines
        .get(header_row - 1)
        .map_or(b',', |line| sniff_delimiter(line)))
}

fn open_reader(path: &Path, options: &CsvReadOptions) -> Result<(csv::Reader<File>, u8)> {
    check_file_size(path, options.max_file_size)?;
    validate_encoding(path)?;
    let delimiter = resolve_delimiter(path, options)?;
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;
    Ok((reader, delimiter))
}

fn csv_error(path: &Path, error: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn read_header_record(
    path: &Path,
    records: &mut csv::StringRecordsIter<'_, File>,
    options: &CsvReadOptions,
    delimiter: u8,
) -> Result<CsvHeaders> {
    let mut header = None;
    for _ in 0..options.header_row.max(1) {
        match records.next() {
            Some(record) => header = Some(record.map_err(|e| csv_error(path, &e))?),
            None => {
                return Err(IngestError::EmptyCsv {
                    path: path.to_path_buf(),
                });
            }
        }
    }
    let raw: Vec<String> = header
        .map(|record| record.iter().map(normalize_header).collect())
        .unwrap_or_default();
    if raw.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    Ok(CsvHeaders::new(raw, delimiter))
}

/// Reads only the header row of a CSV file.
pub fn read_csv_headers(path: &Path, options: &CsvReadOptions) -> Result<CsvHeaders> {
    let (mut reader, delimiter) = open_reader(path, options)?;
    let mut records = reader.records();
    read_header_record(path, &mut records, options, delimiter)
}

/// Reads a CSV file into headers and rows.
///
/// Cells are trimmed and kept as text; empty cells become `Null`. Short rows
/// are padded with `Null`, extra cells are dropped, and rows with no
/// non-empty cell are skipped.
pub fn read_csv_table(path: &Path, options: &CsvReadOptions) -> Result<SourceTable> {
    let (mut reader, delimiter) = open_reader(path, options)?;
    let mut records = reader.records();
    let headers = read_header_record(path, &mut records, options, delimiter)?;
    if headers.was_disambiguated() {
        warn!(
            path = %path.display(),
            raw = ?headers.raw,
            columns = ?headers.columns,
            "renamed blank or duplicate headers"
        );
    }

    let mut rows = Vec::new();
    let mut overflowing = 0usize;
    for record in records {
        let record = record.map_err(|e| csv_error(path, &e))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() > headers.len() {
            overflowing += 1;
        }
        let row: RawRow = headers
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let value = match record.get(idx).map(str::trim) {
                    Some(text) if !text.is_empty() => CellValue::Text(text.to_string()),
                    _ => CellValue::Null,
                };
                (column.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    if overflowing > 0 {
        warn!(
            path = %path.display(),
            rows = overflowing,
            "dropped cells beyond the header width"
        );
    }
    if rows.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        delimiter = %char::from(delimiter),
        "read CSV table"
    );
    Ok(SourceTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_headers_with_bom() {
        let file = create_temp_csv("\u{feff}Brinco,Fazenda\nBR-1,Sta Rita\n".as_bytes());
        let headers = read_csv_headers(file.path(), &CsvReadOptions::default()).unwrap();
        assert_eq!(headers.columns, vec!["Brinco", "Fazenda"]);
    }

    #[test]
    fn test_read_table_semicolon_with_title_row() {
        let file = create_temp_csv(
            "Relatorio de producao;;\nBrinco;Leite;Obs\nBR-1; 31,5 ;\n;;\nBR-2;28\n".as_bytes(),
        );
        let options = CsvReadOptions {
            header_row: 2,
            ..CsvReadOptions::default()
        };
        let table = read_csv_table(file.path(), &options).unwrap();
        assert_eq!(table.columns(), ["Brinco", "Leite", "Obs"]);
        assert_eq!(table.headers.delimiter, b';');
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Leite"], CellValue::from("31,5"));
        assert_eq!(table.rows[0]["Obs"], CellValue::Null);
        assert_eq!(table.rows[1]["Obs"], CellValue::Null);
    }

    #[test]
    fn test_utf16_is_rejected() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'A', 0]);
        let err = validate_encoding(file.path()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_file() {
        let file = create_temp_csv(b"");
        let err = read_csv_headers(file.path(), &CsvReadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyCsv { .. }));
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let file = create_temp_csv(b"Brinco,Leite\n");
        let err = read_csv_table(file.path(), &CsvReadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyCsv { .. }));
    }

    #[test]
    fn test_size_limit() {
        let file = create_temp_csv(b"Brinco\nBR-1\n");
        let err = check_file_size(file.path(), 4).unwrap_err();
        assert!(matches!(err, IngestError::FileTooLarge { max_size: 4, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv_table(Path::new("/nao/existe.csv"), &CsvReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
