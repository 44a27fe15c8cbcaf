//! CLI argument definitions for herdmap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "herdmap",
    version,
    about = "Map herd spreadsheet headers to canonical columns",
    long_about = "Detect which canonical column each spreadsheet header refers to.\n\n\
                  Headers are matched by exact spelling, synonym patterns and\n\
                  approximate similarity; reviewers can override any suggestion\n\
                  with a selections file before converting."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace logs (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the canonical columns.
    Columns(ColumnsArgs),

    /// Suggest a canonical column for every header of a file.
    Detect(DetectArgs),

    /// Show rows before and after mapping.
    Preview(PreviewArgs),

    /// Write a CSV keyed by canonical columns.
    Convert(ConvertArgs),
}

/// Inputs shared by every command that matches headers.
#[derive(Args, Clone, Default)]
pub struct MatchArgs {
    /// Canonical registry CSV (default: bundled registry).
    #[arg(long = "registry", value_name = "CSV")]
    pub registry: Option<PathBuf>,

    /// Legend bank CSV with extra alias mappings (repeatable).
    #[arg(long = "legend", value_name = "CSV")]
    pub legends: Vec<PathBuf>,

    /// TOML file with [matching] scores and [csv] reading options.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// 1-based row holding the column names (overrides config).
    #[arg(long = "header-row", value_name = "N")]
    pub header_row: Option<usize>,

    /// Field delimiter (overrides config; sniffed when unset).
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// Canonical registry CSV (default: bundled registry).
    #[arg(long = "registry", value_name = "CSV")]
    pub registry: Option<PathBuf>,

    /// Only list required columns.
    #[arg(long = "required")]
    pub required: bool,
}

#[derive(Parser)]
pub struct DetectArgs {
    /// Source CSV file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Known sheet CSV or directory of CSVs for occurrence lookup (repeatable).
    #[arg(long = "inventory", value_name = "PATH")]
    pub inventory: Vec<PathBuf>,

    /// Only process the first N headers.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Print detections as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,

    /// Show the rule and best fuzzy candidate behind each detection.
    #[arg(long = "explain")]
    pub explain: bool,
}

#[derive(Parser)]
pub struct PreviewArgs {
    /// Source CSV file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// JSON object of header → canonical key overrides ("" keeps the original).
    #[arg(long = "selections", value_name = "JSON")]
    pub selections: Option<PathBuf>,

    /// Number of rows to show.
    #[arg(long = "rows", value_name = "N", default_value_t = 5)]
    pub rows: usize,

    /// Carry unmapped headers into the output under a cleaned key.
    #[arg(long = "keep-unmapped")]
    pub keep_unmapped: bool,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Source CSV file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output CSV path.
    #[arg(long = "output", short = 'o', value_name = "CSV")]
    pub output: PathBuf,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// JSON object of header → canonical key overrides ("" keeps the original).
    #[arg(long = "selections", value_name = "JSON")]
    pub selections: Option<PathBuf>,

    /// Carry unmapped headers into the output under a cleaned key.
    #[arg(long = "keep-unmapped")]
    pub keep_unmapped: bool,

    /// Write output even when several headers map to one canonical key.
    ///
    /// The last header in file order wins for each conflicting key. With
    /// --keep-unmapped, columns whose cleaned key is taken are left out.
    #[arg(long = "allow-conflicts")]
    pub allow_conflicts: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
