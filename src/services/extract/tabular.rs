use std::collections::BTreeMap;

use tracing::{debug, info};

use super::{is_blank_row, RecordExtractor};
use crate::models::{ExtractedRecord, SheetAnalysis};
use crate::normalize::clean_cell;
use crate::types::SheetGrid;
use crate::vocabulary::LogicalField;

/// Reads every non-blank row below the top header through the columns the
/// analyzer attributed to a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularExtractor;

impl RecordExtractor for TabularExtractor {
    fn extract(&self, grid: &SheetGrid, analysis: &SheetAnalysis) -> Vec<ExtractedRecord> {
        let Some(header) = analysis.top_header() else {
            return Vec::new();
        };

        // A field seen in several columns keeps the right-most one.
        let mut columns: BTreeMap<LogicalField, usize> = BTreeMap::new();
        for (&col, &field) in &analysis.detected_fields {
            if col < grid.column_count() {
                columns.insert(field, col);
            }
        }
        if columns.is_empty() {
            debug!(sheet = grid.name(), "no detected fields, nothing to extract");
            return Vec::new();
        }

        let records: Vec<ExtractedRecord> = grid
            .rows()
            .skip(header.row_index + 1)
            .filter(|row| !is_blank_row(row))
            .map(|row| {
                columns
                    .iter()
                    .map(|(&field, &col)| (field, clean_cell(&row[col])))
                    .collect::<ExtractedRecord>()
            })
            .collect();

        info!(
            sheet = grid.name(),
            header_row = header.row_index,
            records = records.len(),
            "tabular extraction done"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeaderCandidate;

    fn analysis_with(header_row: usize, fields: &[(usize, LogicalField)]) -> SheetAnalysis {
        let mut analysis = SheetAnalysis::empty("Rincian", 0, 0);
        analysis.header_candidates.push(HeaderCandidate {
            row_index: header_row,
            score: 1.0,
            content: Vec::new(),
        });
        analysis.detected_fields = fields.iter().copied().collect();
        analysis
    }

    #[test]
    fn one_record_per_non_blank_data_row() {
        let grid = SheetGrid::from_strings(
            "Rincian",
            &[
                &["Jenis Biaya", "Jumlah", "Nilai"],
                &["Obat", "2", "Rp 15,000"],
                &["", "", ""],
                &["Alkes", "1", "20000"],
            ],
        );
        let analysis = analysis_with(
            0,
            &[(0, LogicalField::JenisBiaya), (1, LogicalField::Jumlah), (2, LogicalField::Nilai)],
        );
        let records = TabularExtractor.extract(&grid, &analysis);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(LogicalField::Nilai), Some("15,000"));
        assert_eq!(records[1].get(LogicalField::JenisBiaya), Some("Alkes"));
    }

    #[test]
    fn repeated_field_uses_last_column() {
        let grid = SheetGrid::from_strings("R", &[&["Tanggal", "Tgl"], &["01/02/2024", "03/04/2024"]]);
        let analysis = analysis_with(0, &[(0, LogicalField::Tanggal), (1, LogicalField::Tanggal)]);
        let records = TabularExtractor.extract(&grid, &analysis);
        assert_eq!(records[0].get(LogicalField::Tanggal), Some("03/04/2024"));
    }

    #[test]
    fn no_fields_means_no_records() {
        let grid = SheetGrid::from_strings("R", &[&["a"], &["b"]]);
        let analysis = analysis_with(0, &[]);
        assert!(TabularExtractor.extract(&grid, &analysis).is_empty());
    }
}
