//! The deduplicated list of observed header aliases.

use std::collections::HashSet;

use herd_model::AliasSuggestion;

use crate::normalize::normalize_text;

/// Alias suggestions from the bundled reference table and legend banks.
///
/// Pairs are unique by normalized alias and normalized canonical key; the
/// first occurrence wins, so bundled entries take precedence over legend
/// banks appended after them.
#[derive(Debug, Clone, Default)]
pub struct SuggestionCorpus {
    entries: Vec<AliasSuggestion>,
    seen: HashSet<(String, String)>,
}

impl SuggestionCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the bundled list and external mappings, in that order.
    pub fn from_sources(bundled: &[AliasSuggestion], external: &[AliasSuggestion]) -> Self {
        let mut corpus = Self::new();
        corpus.extend(bundled.iter().cloned());
        corpus.extend(external.iter().cloned());
        corpus
    }

    /// Adds a suggestion; returns `false` if it was blank or a duplicate.
    pub fn push(&mut self, suggestion: AliasSuggestion) -> bool {
        let alias = normalize_text(&suggestion.alias_original);
        let key = normalize_text(&suggestion.suggested_canonical_key);
        if alias.is_empty() || key.is_empty() {
            return false;
        }
        if !self.seen.insert((alias, key)) {
            return false;
        }
        self.entries.push(suggestion);
        true
    }

    pub fn entries(&self) -> &[AliasSuggestion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AliasSuggestion> {
        self.entries.iter()
    }
}

impl Extend<AliasSuggestion> for SuggestionCorpus {
    fn extend<T: IntoIterator<Item = AliasSuggestion>>(&mut self, iter: T) {
        for suggestion in iter {
            self.push(suggestion);
        }
    }
}

impl<'a> IntoIterator for &'a SuggestionCorpus {
    type Item = &'a AliasSuggestion;
    type IntoIter = std::slice::Iter<'a, AliasSuggestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<AliasSuggestion> for SuggestionCorpus {
    fn from_iter<T: IntoIterator<Item = AliasSuggestion>>(iter: T) -> Self {
        let mut corpus = Self::new();
        corpus.extend(iter);
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins_on_normalized_pair() {
        let corpus = SuggestionCorpus::from_sources(
            &[AliasSuggestion::new("Fazenda", "farm_name").with_confidence(0.97)],
            &[
                AliasSuggestion::new(" fazenda ", "Farm Name").with_confidence(0.5),
                AliasSuggestion::new("Fazenda", "herd_name"),
            ],
        );
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.entries()[0].confidence, Some(0.97));
        assert_eq!(corpus.entries()[1].suggested_canonical_key, "herd_name");
    }

    #[test]
    fn blank_entries_are_dropped() {
        let corpus: SuggestionCorpus = [
            AliasSuggestion::new("", "farm_name"),
            AliasSuggestion::new("Lote", "  "),
            AliasSuggestion::new("Lote", "farm_name"),
        ]
        .into_iter()
        .collect();
        assert_eq!(corpus.len(), 1);
    }
}
