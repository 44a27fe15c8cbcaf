use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use herd_map::{
    ConfidenceLevel, ConfidenceThresholds, MappingConflict, MatchTrace, ReviewState, ReviewSummary,
    SkippedColumn, effective_canonical,
};
use herd_model::{CanonicalColumn, DetectionRow, MatchMethod, PreviewRow};

use herd_cli::pipeline::ConvertSummary;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

pub fn print_columns<'a>(columns: impl Iterator<Item = &'a CanonicalColumn>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Category"),
        header_cell("Required"),
        header_cell("Synonyms"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Center);
    for column in columns {
        table.add_row(vec![
            Cell::new(&column.canonical_key).add_attribute(Attribute::Bold),
            Cell::new(&column.label),
            dim_cell(column.category),
            if column.required {
                Cell::new("yes").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            Cell::new(column.synonyms.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_detections(rows: &[DetectionRow], traces: Option<&[MatchTrace]>) {
    let thresholds = ConfidenceThresholds::default();
    let mut table = Table::new();
    let mut header = vec![
        header_cell("Header"),
        header_cell("Suggested"),
        header_cell("Method"),
        header_cell("Score"),
        header_cell("Confidence"),
        header_cell("Sheets"),
    ];
    if traces.is_some() {
        header.push(header_cell("Evidence"));
        header.push(header_cell("Best fuzzy"));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);

    for (idx, row) in rows.iter().enumerate() {
        let mut cells = vec![
            Cell::new(&row.alias_original),
            if row.is_mapped() {
                Cell::new(&row.suggested).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
            method_cell(row.method),
            Cell::new(format!("{:.3}", row.score)),
            level_cell(thresholds.categorize(row.score)),
            if row.occurrences.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(row.occurrences.join(", "))
            },
        ];
        if let Some(trace) = traces.and_then(|t| t.get(idx)) {
            cells.push(match &trace.evidence {
                Some(evidence) => Cell::new(evidence),
                None => dim_cell("-"),
            });
            cells.push(match &trace.best_fuzzy {
                Some(best) => Cell::new(format!(
                    "{} -> {} ({:.3})",
                    best.alias_original, best.canonical_key, best.score
                )),
                None => dim_cell("-"),
            });
        }
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn print_mappings(state: &ReviewState) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Maps to"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut table);
    for row in state.detections() {
        let key = effective_canonical(row, state.selections());
        let source = if state.is_overridden(&row.alias_original) {
            Cell::new("override").fg(Color::Magenta)
        } else {
            method_cell(row.method)
        };
        table.add_row(vec![
            Cell::new(&row.alias_original),
            if key.is_empty() {
                dim_cell("(kept out)")
            } else {
                Cell::new(key).add_attribute(Attribute::Bold)
            },
            source,
        ]);
    }
    println!("{table}");
}

pub fn print_preview(columns: &[String], rows: &[PreviewRow], limit: usize) {
    if columns.is_empty() {
        println!("No mapped columns to preview.");
        return;
    }
    let mut table = Table::new();
    table.set_header(columns.iter().map(|c| header_cell(c)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for row in rows.iter().take(limit) {
        table.add_row(
            columns
                .iter()
                .map(|column| match row.after.get(column) {
                    Some(value) if !value.is_null() => Cell::new(value),
                    _ => dim_cell("-"),
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    if rows.len() > limit {
        println!("... {} more rows", rows.len() - limit);
    }
}

pub fn print_conflicts(conflicts: &[MappingConflict]) {
    if conflicts.is_empty() {
        return;
    }
    eprintln!("Conflicts (last header wins):");
    for conflict in conflicts {
        eprintln!(
            "- {} <- {}",
            conflict.canonical_key,
            conflict.headers.join(", ")
        );
    }
}

pub fn print_skipped(skipped: &[SkippedColumn]) {
    if skipped.is_empty() {
        return;
    }
    eprintln!("Left out (cleaned key already taken):");
    for column in skipped {
        eprintln!(
            "- {} -> {} (taken by {})",
            column.header, column.cleaned_key, column.claimed_by
        );
    }
}

pub fn print_review_summary(summary: &ReviewSummary) {
    let by_method = summary
        .by_method
        .iter()
        .map(|(method, count)| format!("{method}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "Headers: {} | mapped: {} | unmapped: {} | overridden: {} | required: {}/{} | conflicts: {}",
        summary.total,
        summary.mapped,
        summary.unmapped,
        summary.overridden,
        summary.required_mapped,
        summary.required_total,
        summary.conflicts
    );
    if !by_method.is_empty() {
        println!("Detected by: {by_method}");
    }
}

pub fn print_convert_summary(result: &ConvertSummary) {
    println!("Output: {}", result.output.display());
    println!(
        "Rows: {} | columns: {}",
        result.rows_written,
        result.columns.len()
    );
    print_conflicts(&result.conflicts);
    print_skipped(&result.skipped);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn method_cell(method: MatchMethod) -> Cell {
    let color = match method {
        MatchMethod::Exact => Color::Green,
        MatchMethod::Regex => Color::Blue,
        MatchMethod::Fuzzy => Color::Yellow,
        MatchMethod::Unmapped => Color::DarkGrey,
    };
    Cell::new(method).fg(color)
}

fn level_cell(level: Option<ConfidenceLevel>) -> Cell {
    match level {
        Some(ConfidenceLevel::High) => Cell::new("high").fg(Color::Green),
        Some(ConfidenceLevel::Medium) => Cell::new("medium").fg(Color::Yellow),
        Some(ConfidenceLevel::Low) => Cell::new("low").fg(Color::Red),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
