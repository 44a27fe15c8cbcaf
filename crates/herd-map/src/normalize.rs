//! Text normalization for header comparison.
//!
//! Two families share the same folding rules and differ only in their
//! separator: [`normalize_text`] (space) is used for all matching, and
//! [`clean_header_key`] (underscore) produces machine-safe keys.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Reserved symbols rewritten to words before a header becomes a key.
const SYMBOL_WORDS: &[(char, &str)] = &[
    ('$', "dollar"),
    ('%', "percent"),
    ('#', "number"),
    ('+', "plus"),
    ('&', "and"),
    ('/', "per"),
    ('\\', "per"),
];

/// Normalizes text for comparison.
///
/// Trims, lower-cases, strips diacritics and collapses every run of
/// non-alphanumeric characters into a single space.
pub fn normalize_text(raw: &str) -> String {
    fold(raw, ' ')
}

/// Builds a machine-safe key from a header.
///
/// Reserved symbols are spelled out (`%` → `percent`), a leading `-` is read
/// as a sign (`minus`), then the result is folded like [`normalize_text`]
/// with `_` as separator.
pub fn clean_header_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut spelled = String::with_capacity(trimmed.len() + 8);
    let mut rest = trimmed;
    if let Some(stripped) = trimmed.strip_prefix('-') {
        spelled.push_str(" minus ");
        rest = stripped;
    }
    for ch in rest.chars() {
        match SYMBOL_WORDS.iter().find(|(symbol, _)| *symbol == ch) {
            Some((_, word)) => {
                spelled.push(' ');
                spelled.push_str(word);
                spelled.push(' ');
            }
            None => spelled.push(ch),
        }
    }
    fold(&spelled, '_')
}

fn fold(raw: &str, separator: char) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_separator = false;
    for ch in lowered.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push(separator);
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_case_and_symbols() {
        assert_eq!(normalize_text("  Produção  de Leite (kg) "), "producao de leite kg");
        assert_eq!(normalize_text("Nº Lactação"), "nº lactacao");
        assert_eq!(normalize_text("kg_leite"), "kg leite");
        assert_eq!(normalize_text("PTA-Fat"), "pta fat");
    }

    #[test]
    fn empty_and_symbol_only_inputs_normalize_to_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text("--//--"), "");
    }

    #[test]
    fn clean_key_spells_out_reserved_symbols() {
        assert_eq!(clean_header_key("NM$"), "nm_dollar");
        assert_eq!(clean_header_key("% Gordura"), "percent_gordura");
        assert_eq!(clean_header_key("Nº #"), "nº_number");
        assert_eq!(clean_header_key("Kg/Dia"), "kg_per_dia");
        assert_eq!(clean_header_key("P&D + Extra"), "p_and_d_plus_extra");
        assert_eq!(clean_header_key("Data-Parto"), "data_parto");
    }

    #[test]
    fn clean_key_reads_leading_dash_as_sign() {
        assert_eq!(clean_header_key("-DPR"), "minus_dpr");
        assert_eq!(clean_header_key(" - "), "minus");
    }

    #[test]
    fn both_families_are_idempotent_on_samples() {
        for sample in ["Nome da Fazenda", "NM$ (2024)", "-PTA %", "Ação/Reação", "a__b--c"] {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once);
            let key = clean_header_key(sample);
            assert_eq!(clean_header_key(&key), key);
        }
    }
}
