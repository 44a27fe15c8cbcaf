//! Rewrites raw rows from original headers to canonical keys.

use std::collections::{BTreeSet, HashMap};

use herd_model::{CellValue, DetectionRow, PreviewRow, RawRow, Selections};
use serde::Serialize;
use tracing::{debug, warn};

use crate::normalize::clean_header_key;
use crate::state::effective_canonical;

/// Several headers resolved to the same canonical key.
///
/// The row transformer still writes every header; the last one in
/// detection order is the value that survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingConflict {
    pub canonical_key: String,
    /// Headers in detection order.
    pub headers: Vec<String>,
}

/// An unmapped header left out of the output because its cleaned key was
/// already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedColumn {
    pub header: String,
    pub cleaned_key: String,
    /// Header whose column holds the key.
    pub claimed_by: String,
}

/// Transformed rows plus any conflicts found while mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingOutcome {
    pub rows: Vec<PreviewRow>,
    pub conflicts: Vec<MappingConflict>,
    /// Only filled when unmapped headers are kept.
    pub skipped: Vec<SkippedColumn>,
}

impl MappingOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Whether some source column is missing from `rows`.
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewOptions {
    /// Copy unmapped headers into the output under their cleaned key.
    pub keep_unmapped: bool,
}

/// Canonical keys reached by more than one header, in order of first use.
pub fn find_conflicts(detections: &[DetectionRow], selections: &Selections) -> Vec<MappingConflict> {
    let mut order: Vec<&str> = Vec::new();
    let mut headers: HashMap<&str, Vec<String>> = HashMap::new();
    for row in detections {
        let key = effective_canonical(row, selections);
        if key.is_empty() {
            continue;
        }
        let entry = headers.entry(key).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        entry.push(row.alias_original.clone());
    }
    order
        .into_iter()
        .filter_map(|key| {
            let list = headers.remove(key)?;
            (list.len() > 1).then(|| MappingConflict {
                canonical_key: key.to_string(),
                headers: list,
            })
        })
        .collect()
}

/// Canonical output columns in detection order, without duplicates.
pub fn mapped_columns(detections: &[DetectionRow], selections: &Selections) -> Vec<String> {
    output_columns(detections, selections, &PreviewOptions::default())
}

/// Output columns as written by [`apply_mapping_with`] with `options`.
pub fn output_columns(
    detections: &[DetectionRow],
    selections: &Selections,
    options: &PreviewOptions,
) -> Vec<String> {
    let (plan, _) = plan(detections, selections, options);
    let mut seen = BTreeSet::new();
    plan.into_iter()
        .filter_map(|(_, target)| seen.insert(target.clone()).then_some(target))
        .collect()
}

/// Maps every row with the effective key of each detection.
pub fn apply_mapping(
    rows: &[RawRow],
    detections: &[DetectionRow],
    selections: &Selections,
) -> MappingOutcome {
    apply_mapping_with(rows, detections, selections, &PreviewOptions::default())
}

/// Same as [`apply_mapping`]; used when rendering a preview.
pub fn preview(
    rows: &[RawRow],
    detections: &[DetectionRow],
    selections: &Selections,
) -> MappingOutcome {
    apply_mapping(rows, detections, selections)
}

/// [`apply_mapping`] with options.
///
/// Headers without an effective key are dropped unless
/// `keep_unmapped` is set, in which case they are copied under their
/// cleaned key when that key is still free. Headers whose cleaned key is
/// taken are listed in [`MappingOutcome::skipped`].
pub fn apply_mapping_with(
    rows: &[RawRow],
    detections: &[DetectionRow],
    selections: &Selections,
    options: &PreviewOptions,
) -> MappingOutcome {
    let conflicts = find_conflicts(detections, selections);
    for conflict in &conflicts {
        warn!(
            canonical_key = %conflict.canonical_key,
            headers = ?conflict.headers,
            "multiple headers map to one canonical key"
        );
    }

    let (plan, skipped) = plan(detections, selections, options);
    for column in &skipped {
        warn!(
            header = %column.header,
            cleaned_key = %column.cleaned_key,
            claimed_by = %column.claimed_by,
            "unmapped column left out: cleaned key already taken"
        );
    }
    let rows: Vec<PreviewRow> = rows
        .iter()
        .map(|row| {
            let mut after = RawRow::new();
            for (header, target) in &plan {
                let value = row.get(*header).cloned().unwrap_or(CellValue::Null);
                after.insert(target.clone(), value);
            }
            PreviewRow {
                before: row.clone(),
                after,
            }
        })
        .collect();

    debug!(
        rows = rows.len(),
        columns = plan.len(),
        conflicts = conflicts.len(),
        skipped = skipped.len(),
        "mapped rows"
    );
    MappingOutcome {
        rows,
        conflicts,
        skipped,
    }
}

/// (header, output key) pairs in write order, plus the unmapped headers
/// that found their cleaned key taken.
///
/// Canonical writes follow detection order so later headers overwrite
/// earlier ones. Kept unmapped headers go last and never take a key
/// already claimed by a canonical column or an earlier unmapped header.
fn plan<'a>(
    detections: &'a [DetectionRow],
    selections: &Selections,
    options: &PreviewOptions,
) -> (Vec<(&'a str, String)>, Vec<SkippedColumn>) {
    let mut plan: Vec<(&str, String)> = Vec::new();
    let mut claimed: HashMap<String, &str> = HashMap::new();
    for row in detections {
        let key = effective_canonical(row, selections);
        if !key.is_empty() {
            claimed
                .entry(key.to_string())
                .or_insert(row.alias_original.as_str());
            plan.push((row.alias_original.as_str(), key.to_string()));
        }
    }
    let mut skipped = Vec::new();
    if options.keep_unmapped {
        for row in detections {
            if !effective_canonical(row, selections).is_empty() {
                continue;
            }
            let key = clean_header_key(&row.alias_original);
            if key.is_empty() {
                continue;
            }
            if let Some(owner) = claimed.get(&key) {
                skipped.push(SkippedColumn {
                    header: row.alias_original.clone(),
                    cleaned_key: key,
                    claimed_by: (*owner).to_string(),
                });
                continue;
            }
            claimed.insert(key.clone(), row.alias_original.as_str());
            plan.push((row.alias_original.as_str(), key));
        }
    }
    (plan, skipped)
}

#[cfg(test)]
mod tests {
    use herd_model::MatchMethod;

    use super::*;

    fn detection(header: &str, suggested: &str) -> DetectionRow {
        DetectionRow {
            alias_original: header.to_string(),
            suggested: suggested.to_string(),
            method: if suggested.is_empty() {
                MatchMethod::Unmapped
            } else {
                MatchMethod::Exact
            },
            score: if suggested.is_empty() { 0.0 } else { 0.99 },
            occurrences: Vec::new(),
        }
    }

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), CellValue::from(*v)))
            .collect()
    }

    #[test]
    fn missing_cells_become_null() {
        let detections = vec![detection("Brinco", "animal_id"), detection("Leite", "milk_yield")];
        let outcome = apply_mapping(&[row(&[("Brinco", "12")])], &detections, &Selections::new());
        let after = &outcome.rows[0].after;
        assert_eq!(after.get("animal_id"), Some(&CellValue::from("12")));
        assert_eq!(after.get("milk_yield"), Some(&CellValue::Null));
    }

    #[test]
    fn unmapped_headers_are_dropped_by_default() {
        let detections = vec![detection("Obs", "")];
        let outcome = apply_mapping(&[row(&[("Obs", "x")])], &detections, &Selections::new());
        assert!(outcome.rows[0].after.is_empty());
        assert_eq!(outcome.rows[0].before.len(), 1);
    }

    #[test]
    fn keep_unmapped_never_overwrites_canonical_columns() {
        let detections = vec![
            detection("Milk Yield!", ""),
            detection("Leite", "milk_yield"),
            detection("% Gordura", ""),
        ];
        let options = PreviewOptions {
            keep_unmapped: true,
        };
        let rows = [row(&[("Milk Yield!", "a"), ("Leite", "30"), ("% Gordura", "3.8")])];
        let outcome = apply_mapping_with(&rows, &detections, &Selections::new(), &options);
        let after = &outcome.rows[0].after;
        assert_eq!(after.get("milk_yield"), Some(&CellValue::from("30")));
        assert_eq!(after.get("percent_gordura"), Some(&CellValue::from("3.8")));
        assert_eq!(after.len(), 2);
        assert_eq!(
            output_columns(&detections, &Selections::new(), &options),
            vec!["milk_yield", "percent_gordura"]
        );
        assert_eq!(
            outcome.skipped,
            vec![SkippedColumn {
                header: "Milk Yield!".into(),
                cleaned_key: "milk_yield".into(),
                claimed_by: "Leite".into(),
            }]
        );
    }

    #[test]
    fn colliding_unmapped_headers_are_reported() {
        let detections = vec![
            detection("Obs", ""),
            detection("Obs.", ""),
            detection("Leite", "milk_yield"),
        ];
        let options = PreviewOptions {
            keep_unmapped: true,
        };
        let rows = [row(&[("Obs", "a"), ("Obs.", "b"), ("Leite", "30")])];
        let outcome = apply_mapping_with(&rows, &detections, &Selections::new(), &options);
        assert_eq!(outcome.rows[0].after.get("obs"), Some(&CellValue::from("a")));
        assert!(outcome.conflicts.is_empty());
        assert!(outcome.has_skipped());
        assert_eq!(outcome.skipped[0].header, "Obs.");
        assert_eq!(outcome.skipped[0].claimed_by, "Obs");

        let outcome = apply_mapping(&rows, &detections, &Selections::new());
        assert!(!outcome.has_skipped());
    }

    #[test]
    fn conflicts_list_headers_in_detection_order() {
        let detections = vec![
            detection("Brinco", "animal_id"),
            detection("Leite", "milk_yield"),
            detection("Tag", "animal_id"),
        ];
        let conflicts = find_conflicts(&detections, &Selections::new());
        assert_eq!(
            conflicts,
            vec![MappingConflict {
                canonical_key: "animal_id".into(),
                headers: vec!["Brinco".into(), "Tag".into()],
            }]
        );
        assert_eq!(
            mapped_columns(&detections, &Selections::new()),
            vec!["animal_id", "milk_yield"]
        );
    }
}
