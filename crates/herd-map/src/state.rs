//! Reviewer overrides on top of a detection run.
//!
//! Detections are never edited. Every decision a reviewer makes lives in a
//! [`Selections`] map and the effective mapping is recomputed from both.

use std::collections::BTreeMap;
use std::sync::Arc;

use herd_model::{CanonicalRegistry, DetectionRow, MatchMethod, Selections};

use crate::error::{MappingError, Result};
use crate::transform::{MappingConflict, find_conflicts};

/// The key a header maps to once selections are applied.
///
/// A selection wins over the suggestion, including an explicit empty
/// selection, which means "keep original, do not map".
pub fn effective_canonical<'a>(row: &'a DetectionRow, selections: &'a Selections) -> &'a str {
    selections
        .get(&row.alias_original)
        .map_or(row.suggested.as_str(), String::as_str)
}

/// Review state for one source file.
#[derive(Debug, Clone)]
pub struct ReviewState {
    registry: Arc<CanonicalRegistry>,
    detections: Vec<DetectionRow>,
    selections: Selections,
}

impl ReviewState {
    pub fn new(registry: Arc<CanonicalRegistry>, detections: Vec<DetectionRow>) -> Self {
        Self {
            registry,
            detections,
            selections: Selections::new(),
        }
    }

    /// Starts over with the detections of a new file.
    pub fn reset(&mut self, detections: Vec<DetectionRow>) {
        self.detections = detections;
        self.selections.clear();
    }

    pub fn detections(&self) -> &[DetectionRow] {
        &self.detections
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn detection(&self, header: &str) -> Option<&DetectionRow> {
        self.detections.iter().find(|d| d.alias_original == header)
    }

    /// Pins the engine's suggestion for a header.
    pub fn accept(&mut self, header: &str) -> Result<()> {
        let suggested = self.require(header)?.suggested.clone();
        self.selections.insert(header.to_string(), suggested);
        Ok(())
    }

    /// Maps a header to a registry key; an empty key keeps the original.
    pub fn select(&mut self, header: &str, canonical_key: &str) -> Result<()> {
        let key = self.checked_key(header, canonical_key)?;
        self.selections.insert(header.to_string(), key);
        Ok(())
    }

    /// Leaves a header unmapped regardless of its suggestion.
    pub fn keep_original(&mut self, header: &str) -> Result<()> {
        self.select(header, "")
    }

    /// Drops any selection for a header; returns whether one existed.
    pub fn clear(&mut self, header: &str) -> bool {
        self.selections.remove(header).is_some()
    }

    /// Applies a whole selections map; nothing changes if any entry is invalid.
    pub fn apply_selections(&mut self, selections: &Selections) -> Result<()> {
        let checked = selections
            .iter()
            .map(|(header, key)| -> Result<(String, String)> {
                Ok((header.clone(), self.checked_key(header, key)?))
            })
            .collect::<Result<Vec<_>>>()?;
        self.selections.extend(checked);
        Ok(())
    }

    /// Trimmed key for `header`, if both are known.
    fn checked_key(&self, header: &str, canonical_key: &str) -> Result<String> {
        self.require(header)?;
        let key = canonical_key.trim();
        if !key.is_empty() && !self.registry.contains(key) {
            return Err(MappingError::UnknownCanonicalKey {
                header: header.to_string(),
                key: key.to_string(),
            });
        }
        Ok(key.to_string())
    }

    pub fn effective(&self, header: &str) -> Option<&str> {
        self.detection(header)
            .map(|row| effective_canonical(row, &self.selections))
    }

    /// (header, canonical key) for every mapped header, in detection order.
    pub fn effective_mappings(&self) -> Vec<(&str, &str)> {
        self.detections
            .iter()
            .map(|row| {
                (
                    row.alias_original.as_str(),
                    effective_canonical(row, &self.selections),
                )
            })
            .filter(|(_, key)| !key.is_empty())
            .collect()
    }

    pub fn is_overridden(&self, header: &str) -> bool {
        self.detection(header).is_some_and(|row| {
            self.selections
                .get(header)
                .is_some_and(|selected| *selected != row.suggested)
        })
    }

    pub fn conflicts(&self) -> Vec<MappingConflict> {
        find_conflicts(&self.detections, &self.selections)
    }

    /// Ready for export: no canonical key is claimed twice.
    pub fn is_final(&self) -> bool {
        self.conflicts().is_empty()
    }

    pub fn summary(&self) -> ReviewSummary {
        let mappings = self.effective_mappings();
        let mut by_method = BTreeMap::new();
        for row in &self.detections {
            *by_method.entry(row.method).or_insert(0) += 1;
        }
        let required_total = self.registry.required_columns().count();
        let required_mapped = self
            .registry
            .required_columns()
            .filter(|c| mappings.iter().any(|(_, key)| *key == c.canonical_key))
            .count();

        ReviewSummary {
            total: self.detections.len(),
            mapped: mappings.len(),
            unmapped: self.detections.len() - mappings.len(),
            overridden: self
                .detections
                .iter()
                .filter(|row| self.is_overridden(&row.alias_original))
                .count(),
            required_total,
            required_mapped,
            conflicts: self.conflicts().len(),
            by_method,
        }
    }

    fn require(&self, header: &str) -> Result<&DetectionRow> {
        self.detection(header)
            .ok_or_else(|| MappingError::UnknownHeader(header.to_string()))
    }
}

/// Counts for a review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub total: usize,
    /// Headers with a non-empty effective key.
    pub mapped: usize,
    pub unmapped: usize,
    /// Headers whose selection differs from the suggestion.
    pub overridden: usize,
    /// Required registry columns.
    pub required_total: usize,
    /// Required registry columns reached by some header.
    pub required_mapped: usize,
    pub conflicts: usize,
    /// Detections per cascade stage, before overrides.
    pub by_method: BTreeMap<MatchMethod, usize>,
}

#[cfg(test)]
mod tests {
    use herd_model::CanonicalColumn;

    use super::*;

    fn state() -> ReviewState {
        let registry = CanonicalRegistry::new(vec![
            CanonicalColumn::new("farm_name", "Farm").with_required(true),
            CanonicalColumn::new("animal_id", "Animal").with_required(true),
            CanonicalColumn::new("milk_yield", "Milk"),
        ])
        .expect("registry");
        let mut unmapped = DetectionRow::unmapped("Obs");
        unmapped.occurrences.push("vacas".into());
        let detections = vec![
            DetectionRow {
                alias_original: "Brinco".into(),
                suggested: "animal_id".into(),
                method: MatchMethod::Exact,
                score: 0.99,
                occurrences: vec![],
            },
            DetectionRow {
                alias_original: "Leite dia".into(),
                suggested: "milk_yield".into(),
                method: MatchMethod::Fuzzy,
                score: 0.9,
                occurrences: vec![],
            },
            unmapped,
        ];
        ReviewState::new(Arc::new(registry), detections)
    }

    #[test]
    fn empty_selection_means_keep_original() {
        let row = DetectionRow {
            alias_original: "Brinco".into(),
            suggested: "animal_id".into(),
            method: MatchMethod::Exact,
            score: 0.99,
            occurrences: vec![],
        };
        let mut selections = Selections::new();
        assert_eq!(effective_canonical(&row, &selections), "animal_id");
        selections.insert("Brinco".into(), String::new());
        assert_eq!(effective_canonical(&row, &selections), "");
    }

    #[test]
    fn select_validates_header_and_key() {
        let mut state = state();
        assert_eq!(
            state.select("Missing", "farm_name"),
            Err(MappingError::UnknownHeader("Missing".into()))
        );
        assert!(matches!(
            state.select("Obs", "weather"),
            Err(MappingError::UnknownCanonicalKey { .. })
        ));
        state.select("Obs", "farm_name").expect("valid selection");
        assert_eq!(state.effective("Obs"), Some("farm_name"));
        assert!(state.is_overridden("Obs"));
    }

    #[test]
    fn accept_is_not_an_override() {
        let mut state = state();
        state.accept("Brinco").expect("accept");
        assert_eq!(state.selections().get("Brinco").map(String::as_str), Some("animal_id"));
        assert!(!state.is_overridden("Brinco"));
        assert!(state.clear("Brinco"));
        assert!(!state.clear("Brinco"));
    }

    #[test]
    fn conflicts_block_finalization() {
        let mut state = state();
        assert!(state.is_final());
        state.select("Leite dia", "animal_id").expect("select");
        assert!(!state.is_final());
        assert_eq!(state.conflicts()[0].headers, vec!["Brinco", "Leite dia"]);
        state.keep_original("Leite dia").expect("keep original");
        assert!(state.is_final());
        assert_eq!(state.effective_mappings(), vec![("Brinco", "animal_id")]);
    }

    #[test]
    fn summary_counts() {
        let mut state = state();
        state.select("Obs", "farm_name").expect("select");
        let summary = state.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.mapped, 3);
        assert_eq!(summary.unmapped, 0);
        assert_eq!(summary.overridden, 1);
        assert_eq!(summary.required_total, 2);
        assert_eq!(summary.required_mapped, 2);
        assert_eq!(summary.by_method.get(&MatchMethod::Unmapped), Some(&1));

        state.reset(vec![DetectionRow::unmapped("Nova")]);
        assert!(state.selections().is_empty());
        assert_eq!(state.summary().mapped, 0);
    }

    #[test]
    fn invalid_selections_leave_state_untouched() {
        let mut state = state();
        let selections: Selections = [
            ("Brinco".to_string(), "farm_name".to_string()),
            ("Obs".to_string(), "weather".to_string()),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            state.apply_selections(&selections),
            Err(MappingError::UnknownCanonicalKey { .. })
        ));
        assert!(state.selections().is_empty());
        assert_eq!(state.effective("Brinco"), Some("animal_id"));

        let valid: Selections = [("Obs".to_string(), " milk_yield ".to_string())]
            .into_iter()
            .collect();
        state.apply_selections(&valid).expect("valid selections");
        assert_eq!(state.effective("Obs"), Some("milk_yield"));
    }
}
