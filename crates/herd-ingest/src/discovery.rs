//! Source file discovery and sheet inventories.

use std::path::{Path, PathBuf};

use herd_model::SheetColumns;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::table::{CsvReadOptions, read_csv_headers};

/// Lists all CSV files in a directory, sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_csv(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Sheet name for a source file: its stem, or the full name as fallback.
pub fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads the header row of every file, expanding directories.
///
/// Each file becomes one sheet named after its stem.
pub fn read_sheet_columns(paths: &[PathBuf], options: &CsvReadOptions) -> Result<Vec<SheetColumns>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(list_csv_files(path)?);
        } else {
            files.push(path.clone());
        }
    }

    let mut sheets = Vec::with_capacity(files.len());
    for file in &files {
        let headers = read_csv_headers(file, options)?;
        debug!(path = %file.display(), columns = headers.len(), "read sheet headers");
        sheets.push(SheetColumns::new(sheet_name(file), headers.raw));
    }
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vacas.csv"), "Brinco,Leite\nBR-1,30\n").unwrap();
        std::fs::write(dir.path().join("touros.CSV"), "NAAB;Nome\n7HO1;Alpha\n").unwrap();
        std::fs::write(dir.path().join("notas.txt"), "not a sheet").unwrap();
        dir
    }

    #[test]
    fn test_list_csv_files() {
        let dir = create_test_dir();
        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|f| sheet_name(f)).collect();
        assert_eq!(names, vec!["touros", "vacas"]);
    }

    #[test]
    fn test_list_missing_dir() {
        let err = list_csv_files(Path::new("/nao/existe")).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_read_sheet_columns_from_directory() {
        let dir = create_test_dir();
        let sheets =
            read_sheet_columns(&[dir.path().to_path_buf()], &CsvReadOptions::default()).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "touros");
        assert_eq!(sheets[0].columns, vec!["NAAB", "Nome"]);
        assert_eq!(sheets[1].columns, vec!["Brinco", "Leite"]);
    }
}
