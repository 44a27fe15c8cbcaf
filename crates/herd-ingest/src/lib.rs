//! Source file ingestion for herd spreadsheets.
//!
//! Reads CSV exports into header lists and [`herd_model::RawRow`]s for the
//! mapping pipeline. Cells are never type-inferred: every value is either
//! text or null.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use herd_ingest::{CsvReadOptions, read_csv_table};
//!
//! let table = read_csv_table(Path::new("rebanho.csv"), &CsvReadOptions::default())?;
//! println!("{} columns, {} rows", table.columns().len(), table.rows.len());
//! ```

mod discovery;
mod error;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use table::{
    CsvHeaders, CsvReadOptions, MAX_CSV_FILE_SIZE, SourceTable, check_file_size,
    disambiguate_headers, normalize_header, read_csv_headers, read_csv_table, sniff_delimiter,
    validate_encoding,
};

// === File Discovery ===
pub use discovery::{list_csv_files, read_sheet_columns, sheet_name};
