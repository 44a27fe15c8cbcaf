#![deny(unsafe_code)]

pub mod alias;
pub mod column;
pub mod detection;
pub mod error;
pub mod table;

pub use alias::AliasSuggestion;
pub use column::{CanonicalColumn, CanonicalRegistry, ColumnCategory};
pub use detection::{DetectionRow, InventoryRow, MatchMethod, SheetColumns};
pub use error::{ModelError, Result};
pub use table::{CellValue, PreviewRow, RawRow, Selections};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rejects_duplicate_keys() {
        let result = CanonicalRegistry::new(vec![
            CanonicalColumn::new("farm_name", "Farm"),
            CanonicalColumn::new(" farm_name ", "Farm again"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ModelError::DuplicateCanonicalKey("farm_name".to_string())
        );
    }

    #[test]
    fn registry_rejects_empty_key() {
        let result = CanonicalRegistry::new(vec![CanonicalColumn::new("  ", "Blank")]);
        assert_eq!(result.unwrap_err(), ModelError::EmptyCanonicalKey);
    }

    #[test]
    fn unmapped_row_has_empty_suggestion() {
        let row = DetectionRow::unmapped("Obs");
        assert!(!row.is_mapped());
        assert_eq!(row.method, MatchMethod::Unmapped);
        assert_eq!(row.score, 0.0);
    }
}
