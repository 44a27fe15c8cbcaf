//! Steps shared by the herdmap commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use herd_ingest::{CsvReadOptions, SourceTable, read_csv_table, read_sheet_columns};
use herd_map::{
    DetectOptions, DetectionEngine, MappingConflict, MappingOutcome, PreviewOptions, ReviewState,
    SkippedColumn, SuggestionCorpus, apply_mapping_with, build_inventory, output_columns,
};
use herd_model::{CanonicalRegistry, CellValue, DetectionRow, PreviewRow, RawRow, Selections};
use herd_standards::{load_default_aliases, load_default_registry, load_legend_bank, load_registry};
use tracing::{debug, info, trace};

use crate::config::HerdConfig;
use crate::logging::redact_value;

/// Inputs for building a detection engine.
#[derive(Debug, Clone, Default)]
pub struct EngineInputs {
    pub registry: Option<PathBuf>,
    pub legends: Vec<PathBuf>,
    pub config: HerdConfig,
}

/// Bundled or custom registry.
pub fn load_canonical_registry(path: Option<&Path>) -> Result<CanonicalRegistry> {
    match path {
        Some(path) => {
            load_registry(path).with_context(|| format!("load registry {}", path.display()))
        }
        None => load_default_registry().context("load bundled registry"),
    }
}

/// Registry, bundled aliases and legend banks combined into one engine.
pub fn build_engine(inputs: &EngineInputs) -> Result<DetectionEngine> {
    let registry = load_canonical_registry(inputs.registry.as_deref())?;
    let aliases = load_default_aliases().context("load bundled aliases")?;
    let mut legend = Vec::new();
    for path in &inputs.legends {
        let entries =
            load_legend_bank(path).with_context(|| format!("load legend {}", path.display()))?;
        info!(path = %path.display(), entries = entries.len(), "loaded legend bank");
        legend.extend(entries);
    }
    let corpus = SuggestionCorpus::from_sources(&aliases, &legend);
    debug!(
        columns = registry.len(),
        aliases = corpus.len(),
        "building detection engine"
    );
    DetectionEngine::new(registry, corpus)
        .with_settings(inputs.config.matching)
        .context("apply matching settings")
}

/// Reads a selections file: a JSON object of header → canonical key.
pub fn load_selections(path: &Path) -> Result<Selections> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read selections {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse selections {}", path.display()))
}

/// A source file with its detections.
#[derive(Debug, Clone)]
pub struct DetectedFile {
    pub table: SourceTable,
    pub detections: Vec<DetectionRow>,
}

/// Reads `path` and runs detection over its headers.
pub fn detect_file(
    engine: &DetectionEngine,
    path: &Path,
    csv: &CsvReadOptions,
    options: &DetectOptions,
) -> Result<DetectedFile> {
    let table =
        read_csv_table(path, csv).with_context(|| format!("read source {}", path.display()))?;
    let detections = engine.detect(table.columns(), options);
    info!(
        path = %path.display(),
        headers = table.columns().len(),
        rows = table.rows.len(),
        mapped = detections.iter().filter(|d| d.is_mapped()).count(),
        "detected headers"
    );
    Ok(DetectedFile { table, detections })
}

/// Builds detect options with an inventory read from the given paths.
pub fn detect_options(
    inventory: &[PathBuf],
    csv: &CsvReadOptions,
    limit: Option<usize>,
) -> Result<DetectOptions> {
    let sheets = read_sheet_columns(inventory, csv).context("read inventory sheets")?;
    Ok(DetectOptions {
        inventory: build_inventory(&sheets),
        external_mappings: Vec::new(),
        limit,
    })
}

/// Review state with the selections file applied.
pub fn review(
    engine: &DetectionEngine,
    detections: Vec<DetectionRow>,
    selections: Option<&Path>,
) -> Result<ReviewState> {
    let mut state = ReviewState::new(engine.shared_registry(), detections);
    if let Some(path) = selections {
        let selections = load_selections(path)?;
        state
            .apply_selections(&selections)
            .with_context(|| format!("apply selections {}", path.display()))?;
    }
    Ok(state)
}

/// Mapping outcome plus the output column order.
#[derive(Debug, Clone)]
pub struct MappedFile {
    pub columns: Vec<String>,
    pub outcome: MappingOutcome,
}

/// Applies the reviewed mappings to `rows`.
pub fn map_rows(state: &ReviewState, rows: &[RawRow], options: &PreviewOptions) -> MappedFile {
    let outcome = apply_mapping_with(rows, state.detections(), state.selections(), options);
    for (idx, row) in outcome.rows.iter().take(1).enumerate() {
        for (key, value) in &row.after {
            let text = value.to_string();
            trace!(row = idx, column = %key, value = %redact_value(&text), "mapped cell");
        }
    }
    MappedFile {
        columns: output_columns(state.detections(), state.selections(), options),
        outcome,
    }
}

/// Result of a convert run.
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub output: PathBuf,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub conflicts: Vec<MappingConflict>,
    pub skipped: Vec<SkippedColumn>,
}

/// Maps every row and writes the canonical CSV.
///
/// Refuses to write when several headers claim one key, or when a kept
/// unmapped column would be left out, unless `allow_conflicts` is set.
pub fn convert(
    state: &ReviewState,
    rows: &[RawRow],
    output: &Path,
    options: &PreviewOptions,
    allow_conflicts: bool,
) -> Result<ConvertSummary> {
    let mapped = map_rows(state, rows, options);
    if mapped.outcome.has_conflicts() && !allow_conflicts {
        let details = mapped
            .outcome
            .conflicts
            .iter()
            .map(|c| format!("{} <- {}", c.canonical_key, c.headers.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        bail!("conflicting mappings ({details}); resolve them or pass --allow-conflicts");
    }
    if mapped.outcome.has_skipped() && !allow_conflicts {
        let details = mapped
            .outcome
            .skipped
            .iter()
            .map(|s| format!("{} -> {} (taken by {})", s.header, s.cleaned_key, s.claimed_by))
            .collect::<Vec<_>>()
            .join("; ");
        bail!(
            "unmapped columns would be left out ({details}); map them or pass --allow-conflicts"
        );
    }
    if mapped.columns.is_empty() {
        bail!("no header is mapped; nothing to write");
    }
    write_csv(output, &mapped.columns, &mapped.outcome.rows)?;
    info!(
        path = %output.display(),
        rows = mapped.outcome.rows.len(),
        columns = mapped.columns.len(),
        "wrote canonical CSV"
    );
    Ok(ConvertSummary {
        output: output.to_path_buf(),
        rows_written: mapped.outcome.rows.len(),
        columns: mapped.columns,
        conflicts: mapped.outcome.conflicts,
        skipped: mapped.outcome.skipped,
    })
}

/// Writes the `after` side of each row under `columns`; nulls are blank.
pub fn write_csv(path: &Path, columns: &[String], rows: &[PreviewRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer
        .write_record(columns)
        .with_context(|| format!("write header to {}", path.display()))?;
    for row in rows {
        let record = columns.iter().map(|column| match row.after.get(column) {
            Some(CellValue::Null) | None => String::new(),
            Some(value) => value.to_string(),
        });
        writer
            .write_record(record)
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}
