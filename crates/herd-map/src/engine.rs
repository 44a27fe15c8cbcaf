//! The detection engine: one match cascade per header.

use std::sync::Arc;

use herd_model::{AliasSuggestion, CanonicalRegistry, DetectionRow, InventoryRow, MatchMethod};
use serde::Serialize;
use tracing::{debug, trace};

use crate::corpus::SuggestionCorpus;
use crate::error::Result;
use crate::fuzzy::similarity;
use crate::index::MatchIndex;
use crate::inventory::OccurrenceIndex;
use crate::normalize::normalize_text;
use crate::settings::MatchSettings;

/// Per-call inputs besides the headers.
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Known sheets used to fill [`DetectionRow::occurrences`].
    pub inventory: Vec<InventoryRow>,
    /// Extra alias pairs for this call only, appended after the corpus.
    pub external_mappings: Vec<AliasSuggestion>,
    /// Maximum number of headers to process.
    pub limit: Option<usize>,
}

/// The best fuzzy candidate for a header, whether or not it passed the
/// threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyCandidate {
    pub alias_original: String,
    pub canonical_key: String,
    pub score: f64,
}

/// How a header was matched, for `--explain` style diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchTrace {
    pub header: String,
    pub normalized: String,
    pub method: MatchMethod,
    pub suggested: String,
    pub score: f64,
    /// Spelling, corpus alias or synonym that fired.
    pub evidence: Option<String>,
    pub best_fuzzy: Option<FuzzyCandidate>,
}

struct Decision {
    canonical_key: String,
    method: MatchMethod,
    score: f64,
    evidence: String,
}

/// Engine for matching spreadsheet headers to canonical columns.
///
/// Stages run in a fixed order and the first hit wins:
/// 1. key, label or synonym equal to the normalized header (`exact`)
/// 2. corpus alias equal to the normalized header (`exact`)
/// 3. synonym regex, first in registry order (`regex`)
/// 4. best Jaro-Winkler corpus alias at or above the threshold (`fuzzy`)
///
/// Anything else is `unmapped`. The engine is immutable; legend banks
/// produce a new engine sharing the registry.
///
/// # Example
///
/// ```ignore
/// let engine = DetectionEngine::new(registry, corpus);
/// let rows = engine.detect(&["Brinco", "kg_leite"], &DetectOptions::default());
/// ```
#[derive(Debug, Clone)]
pub struct DetectionEngine {
    registry: Arc<CanonicalRegistry>,
    corpus: Arc<SuggestionCorpus>,
    index: Arc<MatchIndex>,
    settings: MatchSettings,
}

impl DetectionEngine {
    pub fn new(registry: CanonicalRegistry, corpus: SuggestionCorpus) -> Self {
        let index = MatchIndex::build(&registry, &corpus);
        Self {
            registry: Arc::new(registry),
            corpus: Arc::new(corpus),
            index: Arc::new(index),
            settings: MatchSettings::default(),
        }
    }

    /// Replaces the stage scores after validating them.
    pub fn with_settings(mut self, settings: MatchSettings) -> Result<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// A new engine whose corpus is this one's followed by `legend`.
    pub fn with_legend_bank(&self, legend: &[AliasSuggestion]) -> Self {
        let corpus = self.extended_corpus(legend);
        let index = MatchIndex::build(&self.registry, &corpus);
        Self {
            registry: Arc::clone(&self.registry),
            corpus: Arc::new(corpus),
            index: Arc::new(index),
            settings: self.settings,
        }
    }

    pub fn registry(&self) -> &CanonicalRegistry {
        &self.registry
    }

    /// Registry handle for review state built from this engine's output.
    pub fn shared_registry(&self) -> Arc<CanonicalRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn corpus(&self) -> &SuggestionCorpus {
        &self.corpus
    }

    pub fn index(&self) -> &MatchIndex {
        &self.index
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Runs the cascade over `headers`, one row per processed header.
    pub fn detect<S: AsRef<str>>(&self, headers: &[S], options: &DetectOptions) -> Vec<DetectionRow> {
        let extended;
        let index = if options.external_mappings.is_empty() {
            self.index.as_ref()
        } else {
            extended = MatchIndex::build(
                &self.registry,
                &self.extended_corpus(&options.external_mappings),
            );
            &extended
        };
        let occurrences = OccurrenceIndex::from_inventory(&options.inventory);
        let limit = options.limit.unwrap_or(usize::MAX);

        let rows: Vec<DetectionRow> = headers
            .iter()
            .take(limit)
            .map(|header| {
                let header = header.as_ref();
                let normalized = normalize_text(header);
                let mut row = match self.decide(index, &normalized) {
                    Some(decision) => DetectionRow {
                        alias_original: header.to_string(),
                        suggested: decision.canonical_key,
                        method: decision.method,
                        score: decision.score,
                        occurrences: Vec::new(),
                    },
                    None => DetectionRow::unmapped(header),
                };
                if !normalized.is_empty() {
                    row.occurrences = occurrences.sheets_for(&normalized).to_vec();
                }
                trace!(
                    header = %row.alias_original,
                    normalized = %normalized,
                    method = %row.method,
                    suggested = %row.suggested,
                    score = row.score,
                    "detected header"
                );
                row
            })
            .collect();

        let mapped = rows.iter().filter(|r| r.is_mapped()).count();
        debug!(
            headers = rows.len(),
            mapped,
            unmapped = rows.len() - mapped,
            "detection complete"
        );
        rows
    }

    /// Runs the cascade for one header and reports how it got there.
    pub fn explain(&self, header: &str) -> MatchTrace {
        let normalized = normalize_text(header);
        let best_fuzzy = if normalized.is_empty() {
            None
        } else {
            self.best_fuzzy(&self.index, &normalized)
        };
        let decision = self.decide(&self.index, &normalized);
        let (method, suggested, score, evidence) = match decision {
            Some(d) => (d.method, d.canonical_key, d.score, Some(d.evidence)),
            None => (MatchMethod::Unmapped, String::new(), 0.0, None),
        };
        MatchTrace {
            header: header.to_string(),
            normalized,
            method,
            suggested,
            score,
            evidence,
            best_fuzzy,
        }
    }

    fn extended_corpus(&self, extra: &[AliasSuggestion]) -> SuggestionCorpus {
        let mut corpus = SuggestionCorpus::clone(&self.corpus);
        corpus.extend(extra.iter().cloned());
        corpus
    }

    fn decide(&self, index: &MatchIndex, normalized: &str) -> Option<Decision> {
        if normalized.is_empty() {
            return None;
        }

        if let Some(key) = index.direct(normalized) {
            return Some(Decision {
                canonical_key: key.to_string(),
                method: MatchMethod::Exact,
                score: self.settings.exact_score,
                evidence: normalized.to_string(),
            });
        }

        if let Some(alias) = index.alias(normalized) {
            return Some(Decision {
                canonical_key: alias.canonical_key.clone(),
                method: MatchMethod::Exact,
                score: alias.confidence.unwrap_or(self.settings.exact_score),
                evidence: alias.alias_original.clone(),
            });
        }

        if let Some(pattern) = index.first_pattern(normalized) {
            return Some(Decision {
                canonical_key: pattern.canonical_key.clone(),
                method: MatchMethod::Regex,
                score: self.settings.regex_score,
                evidence: pattern.synonym.clone(),
            });
        }

        self.best_fuzzy(index, normalized)
            .filter(|candidate| candidate.score >= self.settings.fuzzy_threshold)
            .map(|candidate| Decision {
                canonical_key: candidate.canonical_key,
                method: MatchMethod::Fuzzy,
                score: candidate.score,
                evidence: candidate.alias_original,
            })
    }

    /// Highest-scoring corpus alias; ties keep the earlier alias.
    fn best_fuzzy(&self, index: &MatchIndex, normalized: &str) -> Option<FuzzyCandidate> {
        let mut best: Option<FuzzyCandidate> = None;
        for alias in index.aliases() {
            let score = similarity(normalized, &alias.normalized);
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(FuzzyCandidate {
                    alias_original: alias.alias_original.clone(),
                    canonical_key: alias.canonical_key.clone(),
                    score,
                });
            }
        }
        best
    }
}
