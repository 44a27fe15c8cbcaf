//! Source table reading.

mod header;
mod reader;

pub use header::{CsvHeaders, disambiguate_headers, normalize_header, sniff_delimiter};
pub use reader::{
    CsvReadOptions, MAX_CSV_FILE_SIZE, SourceTable, check_file_size, read_csv_headers,
    read_csv_table, validate_encoding,
};
