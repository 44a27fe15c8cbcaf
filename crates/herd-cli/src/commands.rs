use anyhow::{Context, Result};
use herd_map::{MatchTrace, PreviewOptions};
use tracing::info_span;

use herd_cli::config::HerdConfig;
use herd_cli::pipeline::{
    ConvertSummary, EngineInputs, build_engine, convert, detect_file, detect_options,
    load_canonical_registry, map_rows, review,
};

use crate::cli::{ColumnsArgs, ConvertArgs, DetectArgs, MatchArgs, PreviewArgs};
use crate::summary::{
    print_columns, print_conflicts, print_detections, print_mappings, print_preview,
    print_review_summary, print_skipped,
};

/// Loads the config file and applies command-line overrides.
fn engine_inputs(args: &MatchArgs) -> Result<EngineInputs> {
    let mut config = HerdConfig::load_or_default(args.config.as_deref())?;
    if let Some(header_row) = args.header_row {
        config.csv.header_row = header_row;
    }
    if let Some(delimiter) = args.delimiter {
        config.csv.delimiter = Some(delimiter);
    }
    Ok(EngineInputs {
        registry: args.registry.clone(),
        legends: args.legends.clone(),
        config,
    })
}

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let registry = load_canonical_registry(args.registry.as_deref())?;
    print_columns(registry.iter().filter(|c| !args.required || c.required));
    Ok(())
}

pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let span = info_span!("detect", file = %args.file.display());
    let _guard = span.enter();

    let inputs = engine_inputs(&args.matching)?;
    let engine = build_engine(&inputs)?;
    let options = detect_options(&args.inventory, &inputs.config.csv, args.limit)?;
    let detected = detect_file(&engine, &args.file, &inputs.config.csv, &options)?;

    let traces: Option<Vec<MatchTrace>> = args.explain.then(|| {
        detected
            .detections
            .iter()
            .map(|row| engine.explain(&row.alias_original))
            .collect()
    });

    if args.json {
        let json = match &traces {
            Some(traces) => serde_json::to_string_pretty(traces),
            None => serde_json::to_string_pretty(&detected.detections),
        }
        .context("serialize detections")?;
        println!("{json}");
        return Ok(());
    }

    print_detections(&detected.detections, traces.as_deref());
    let state = review(&engine, detected.detections, None)?;
    print_review_summary(&state.summary());
    print_conflicts(&state.conflicts());
    Ok(())
}

/// Returns whether the preview has conflicts or left-out columns.
pub fn run_preview(args: &PreviewArgs) -> Result<bool> {
    let span = info_span!("preview", file = %args.file.display());
    let _guard = span.enter();

    let inputs = engine_inputs(&args.matching)?;
    let engine = build_engine(&inputs)?;
    let detected = detect_file(
        &engine,
        &args.file,
        &inputs.config.csv,
        &Default::default(),
    )?;
    let state = review(&engine, detected.detections, args.selections.as_deref())?;
    let options = PreviewOptions {
        keep_unmapped: args.keep_unmapped,
    };
    let mapped = map_rows(&state, &detected.table.rows, &options);

    print_mappings(&state);
    print_preview(&mapped.columns, &mapped.outcome.rows, args.rows);
    print_review_summary(&state.summary());
    print_conflicts(&mapped.outcome.conflicts);
    print_skipped(&mapped.outcome.skipped);
    Ok(mapped.outcome.has_conflicts() || mapped.outcome.has_skipped())
}

pub fn run_convert(args: &ConvertArgs) -> Result<ConvertSummary> {
    let span = info_span!("convert", file = %args.file.display());
    let _guard = span.enter();

    let inputs = engine_inputs(&args.matching)?;
    let engine = build_engine(&inputs)?;
    let detected = detect_file(
        &engine,
        &args.file,
        &inputs.config.csv,
        &Default::default(),
    )?;
    let state = review(&engine, detected.detections, args.selections.as_deref())?;
    let options = PreviewOptions {
        keep_unmapped: args.keep_unmapped,
    };
    convert(
        &state,
        &detected.table.rows,
        &args.output,
        &options,
        args.allow_conflicts,
    )
}
