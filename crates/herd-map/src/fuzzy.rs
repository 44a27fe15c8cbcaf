//! Approximate string similarity for header matching.
//!
//! Jaro-Winkler: characters match within a window of half the longer
//! length minus one, matched characters out of order count as
//! transpositions, and a shared prefix of up to four characters earns a
//! 0.1-per-character bonus. Short near-identical headers score higher than
//! long ones with the same absolute edit distance.

use rapidfuzz::distance::jaro_winkler;

/// Similarity in `[0, 1]`; `1.0` means identical.
///
/// Two empty strings are identical; one empty string matches nothing.
pub fn similarity(a: &str, b: &str) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }
    if a == b {
        return 1.0;
    }
    jaro_winkler::similarity(a.chars(), b.chars()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(similarity("fazenda", "fazenda"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn empty_against_non_empty_scores_zero() {
        assert_eq!(similarity("", "brinco"), 0.0);
        assert_eq!(similarity("brinco", ""), 0.0);
    }

    #[test]
    fn single_typo_in_short_header_stays_above_fuzzy_threshold() {
        let score = similarity("fzenda", "fazenda");
        assert!(score >= 0.88, "got {score}");
        assert!(score < 1.0);
    }

    #[test]
    fn shared_prefix_is_rewarded() {
        let prefixed = similarity("brincoo", "brinco");
        let suffixed = similarity("obrinco", "brinco");
        assert!(prefixed > suffixed, "{prefixed} <= {suffixed}");
    }

    #[test]
    fn unrelated_headers_score_low() {
        assert!(similarity("xyz unrelated", "fazenda") < 0.6);
    }

    #[test]
    fn symmetric_on_samples() {
        for (a, b) in [
            ("fzenda", "fazenda"),
            ("leite kg", "kg leite"),
            ("pta fat", "pta gordura"),
        ] {
            assert!((similarity(a, b) - similarity(b, a)).abs() < 1e-12);
        }
    }
}
