//! Synonym regexes for the second matching stage.

use herd_model::CanonicalRegistry;
use regex::Regex;
use tracing::warn;

use crate::normalize::normalize_text;

/// Separator class tolerated between and around synonym tokens.
const SEPARATOR: &str = r"[\s_-]";

/// A compiled synonym for one canonical column.
#[derive(Debug, Clone)]
pub struct SynonymPattern {
    pub canonical_key: String,
    /// The synonym as written in the registry.
    pub synonym: String,
    regex: Regex,
}

impl SynonymPattern {
    /// Compiles a synonym into a token-bounded pattern.
    ///
    /// Returns `None` for synonyms that normalize to nothing.
    pub fn new(canonical_key: &str, synonym: &str) -> Option<Result<Self, regex::Error>> {
        let source = synonym_regex_source(synonym)?;
        Some(Regex::new(&source).map(|regex| Self {
            canonical_key: canonical_key.to_string(),
            synonym: synonym.to_string(),
            regex,
        }))
    }

    /// Tests an already normalized header.
    pub fn is_match(&self, normalized_header: &str) -> bool {
        self.regex.is_match(normalized_header)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Regex source for a synonym: its normalized tokens joined by optional
/// separators, bounded by a separator or the ends of the header.
pub fn synonym_regex_source(synonym: &str) -> Option<String> {
    let normalized = normalize_text(synonym);
    if normalized.is_empty() {
        return None;
    }
    let body = normalized
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(&format!("{SEPARATOR}*"));
    Some(format!("(?:^|{SEPARATOR}){body}(?:{SEPARATOR}|$)"))
}

/// Compiles every synonym in registry order, then synonym order.
///
/// Synonyms that fail to compile are skipped with a warning.
pub fn build_synonym_patterns(registry: &CanonicalRegistry) -> Vec<SynonymPattern> {
    let mut patterns = Vec::new();
    for column in registry {
        for synonym in &column.synonyms {
            match SynonymPattern::new(&column.canonical_key, synonym) {
                Some(Ok(pattern)) => patterns.push(pattern),
                Some(Err(error)) => warn!(
                    canonical_key = %column.canonical_key,
                    synonym = %synonym,
                    %error,
                    "skipping synonym pattern"
                ),
                None => {}
            }
        }
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(synonym: &str) -> SynonymPattern {
        SynonymPattern::new("key", synonym)
            .expect("non-empty synonym")
            .expect("valid regex")
    }

    #[test]
    fn matches_synonym_inside_longer_header() {
        let p = pattern("kg_leite");
        assert!(p.is_match(&normalize_text("Produção kg leite (dia)")));
        assert!(p.is_match("kgleite"));
        assert!(p.is_match("kg leite"));
    }

    #[test]
    fn requires_token_boundaries() {
        let p = pattern("fat");
        assert!(p.is_match("pta fat"));
        assert!(!p.is_match("fatness"));
        assert!(!p.is_match("nonfat"));
    }

    #[test]
    fn escapes_literal_tokens() {
        let source = synonym_regex_source("NM$").expect("source");
        assert!(source.contains("nm"));
        assert!(pattern("a.b").is_match("a b"));
        assert!(!pattern("a.b").is_match("axb"));
    }

    #[test]
    fn blank_synonyms_produce_no_pattern() {
        assert!(SynonymPattern::new("key", " -- ").is_none());
    }
}
