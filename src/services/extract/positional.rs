use tracing::info;

use super::{is_blank_row, RecordExtractor};
use crate::models::{ExtractedRecord, SheetAnalysis};
use crate::normalize::clean_cell;
use crate::types::SheetGrid;
use crate::vocabulary::LayoutProfile;

/// Fallback for sheets without a recognizable header: reads the fixed
/// transaction offsets of the layout profile from every non-blank row.
pub struct PositionalExtractor<'a> {
    layout: &'a LayoutProfile,
}

impl<'a> PositionalExtractor<'a> {
    pub fn new(layout: &'a LayoutProfile) -> Self {
        Self { layout }
    }
}

impl RecordExtractor for PositionalExtractor<'_> {
    fn extract(&self, grid: &SheetGrid, _analysis: &SheetAnalysis) -> Vec<ExtractedRecord> {
        if grid.column_count() < 2 {
            return Vec::new();
        }
        let columns = self.layout.transaction_columns();
        let records: Vec<ExtractedRecord> = grid
            .rows()
            .filter(|row| !is_blank_row(row))
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|&(col, field)| {
                        row.get(col)
                            .filter(|c| !c.is_empty())
                            .map(|c| (field, clean_cell(c)))
                    })
                    .collect::<ExtractedRecord>()
            })
            .filter(|record| !record.is_empty())
            .collect();
        info!(sheet = grid.name(), records = records.len(), "positional extraction done");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::LogicalField;

    #[test]
    fn reads_fixed_offsets() {
        let layout = LayoutProfile::default();
        let grid = SheetGrid::from_strings(
            "P",
            &[
                &["Obat", "Paracetamol 500mg", "", "", "10", "Rp 1,500", "", "15000"],
                &["", "", "", "", "", "", "", ""],
                &["", "", "x", "", "", "", "", ""],
            ],
        );
        let analysis = SheetAnalysis::empty("P", 3, 8);
        let records = PositionalExtractor::new(&layout).extract(&grid, &analysis);
        // the third row only has a value outside the read offsets
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.get(LogicalField::JenisBiaya), Some("Obat"));
        assert_eq!(r.get(LogicalField::Keterangan), Some("Paracetamol 500mg"));
        assert_eq!(r.get(LogicalField::Jumlah), Some("10"));
        assert_eq!(r.get(LogicalField::Nilai), Some("1,500"));
        assert_eq!(r.get(LogicalField::SubTotal), Some("15000"));
    }

    #[test]
    fn narrow_sheets_yield_nothing() {
        let layout = LayoutProfile::default();
        let grid = SheetGrid::from_strings("P", &[&["only"]]);
        let analysis = SheetAnalysis::empty("P", 1, 1);
        assert!(PositionalExtractor::new(&layout).extract(&grid, &analysis).is_empty());
    }
}
