//! Known-sheet inventory and header occurrence lookup.

use std::collections::HashMap;

use herd_model::{InventoryRow, SheetColumns};

use crate::normalize::normalize_text;

/// Flattens sheet column lists into inventory rows, one per sheet.
pub fn build_inventory(sheets: &[SheetColumns]) -> Vec<InventoryRow> {
    sheets
        .iter()
        .map(|sheet| InventoryRow {
            sheet: sheet.name.clone(),
            columns: sheet
                .columns
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(InventoryRow::COLUMN_SEPARATOR),
        })
        .collect()
}

/// Normalized column name → sheets that contain it, in inventory order.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndex {
    sheets: HashMap<String, Vec<String>>,
}

impl OccurrenceIndex {
    pub fn from_inventory(inventory: &[InventoryRow]) -> Self {
        let mut sheets: HashMap<String, Vec<String>> = HashMap::new();
        for row in inventory {
            for column in row.column_names() {
                let normalized = normalize_text(column);
                if normalized.is_empty() {
                    continue;
                }
                let entry = sheets.entry(normalized).or_default();
                if !entry.contains(&row.sheet) {
                    entry.push(row.sheet.clone());
                }
            }
        }
        Self { sheets }
    }

    /// Sheets containing a column that normalizes to `normalized`.
    pub fn sheets_for(&self, normalized: &str) -> &[String] {
        self.sheets
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_columns_with_separator() {
        let inventory = build_inventory(&[SheetColumns::new(
            "touros",
            vec!["Nome".into(), " ".into(), "NAAB".into()],
        )]);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].columns, "Nome, NAAB");
    }

    #[test]
    fn occurrences_follow_inventory_order_without_duplicates() {
        let inventory = vec![
            InventoryRow {
                sheet: "vacas".into(),
                columns: "Brinco, brinco , Leite".into(),
            },
            InventoryRow {
                sheet: "touros".into(),
                columns: "NAAB, BRINCO".into(),
            },
        ];
        let index = OccurrenceIndex::from_inventory(&inventory);
        assert_eq!(index.sheets_for("brinco"), ["vacas", "touros"]);
        assert!(index.sheets_for("naab code").is_empty());
    }
}
