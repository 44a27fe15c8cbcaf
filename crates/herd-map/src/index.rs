//! Precomputed lookup tables for the match cascade.

use std::collections::HashMap;

use herd_model::CanonicalRegistry;
use tracing::debug;

use crate::corpus::SuggestionCorpus;
use crate::normalize::normalize_text;
use crate::patterns::{SynonymPattern, build_synonym_patterns};

/// A corpus alias resolved against the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedAlias {
    pub alias_original: String,
    pub normalized: String,
    /// Registry key the alias points at.
    pub canonical_key: String,
    /// In (0, 1]; `None` falls back to the exact-stage score.
    pub confidence: Option<f64>,
    pub source_hint: Option<String>,
}

/// Read-only lookup tables built once from a registry and a corpus.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    direct: HashMap<String, String>,
    patterns: Vec<SynonymPattern>,
    aliases: Vec<IndexedAlias>,
    alias_lookup: HashMap<String, usize>,
}

impl MatchIndex {
    /// Builds every lookup eagerly.
    ///
    /// Direct spellings (key, label and synonyms) keep the first registry
    /// column on collision. Corpus entries whose key does not normalize to a
    /// registry key are dropped.
    pub fn build(registry: &CanonicalRegistry, corpus: &SuggestionCorpus) -> Self {
        let mut direct = HashMap::new();
        for column in registry {
            for spelling in column.spellings() {
                let normalized = normalize_text(spelling);
                if normalized.is_empty() {
                    continue;
                }
                direct
                    .entry(normalized)
                    .or_insert_with(|| column.canonical_key.clone());
            }
        }

        let keys_by_normalized: HashMap<String, &str> = registry
            .iter()
            .map(|c| (normalize_text(&c.canonical_key), c.canonical_key.as_str()))
            .collect();

        let mut aliases = Vec::with_capacity(corpus.len());
        let mut alias_lookup = HashMap::new();
        let mut dropped = 0usize;
        for suggestion in corpus {
            let key = normalize_text(&suggestion.suggested_canonical_key);
            let Some(canonical_key) = keys_by_normalized.get(&key) else {
                debug!(
                    alias = %suggestion.alias_original,
                    key = %suggestion.suggested_canonical_key,
                    "dropping alias for unknown canonical key"
                );
                dropped += 1;
                continue;
            };
            let normalized = normalize_text(&suggestion.alias_original);
            alias_lookup
                .entry(normalized.clone())
                .or_insert(aliases.len());
            aliases.push(IndexedAlias {
                alias_original: suggestion.alias_original.clone(),
                normalized,
                canonical_key: (*canonical_key).to_string(),
                confidence: usable_confidence(suggestion.confidence),
                source_hint: suggestion.source_hint.clone(),
            });
        }

        let patterns = build_synonym_patterns(registry);
        debug!(
            spellings = direct.len(),
            patterns = patterns.len(),
            aliases = aliases.len(),
            dropped,
            "built match index"
        );
        Self {
            direct,
            patterns,
            aliases,
            alias_lookup,
        }
    }

    /// Registry key whose key, label or synonym normalizes to `normalized`.
    pub fn direct(&self, normalized: &str) -> Option<&str> {
        self.direct.get(normalized).map(String::as_str)
    }

    /// First corpus alias normalizing to `normalized`.
    pub fn alias(&self, normalized: &str) -> Option<&IndexedAlias> {
        self.alias_lookup
            .get(normalized)
            .and_then(|idx| self.aliases.get(*idx))
    }

    /// First synonym pattern matching the normalized header.
    pub fn first_pattern(&self, normalized: &str) -> Option<&SynonymPattern> {
        self.patterns.iter().find(|p| p.is_match(normalized))
    }

    pub fn patterns(&self) -> &[SynonymPattern] {
        &self.patterns
    }

    /// Resolved corpus aliases in corpus order.
    pub fn aliases(&self) -> &[IndexedAlias] {
        &self.aliases
    }
}

/// Drops confidences that are not finite or not positive and caps the rest at 1.
fn usable_confidence(confidence: Option<f64>) -> Option<f64> {
    confidence
        .filter(|c| c.is_finite() && *c > 0.0)
        .map(|c| c.min(1.0))
}
