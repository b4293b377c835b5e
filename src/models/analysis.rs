use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::AnalysisIssue;
use crate::vocabulary::LogicalField;

/// A row hypothesized to hold field labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCandidate {
    pub row_index: usize,
    pub score: f64,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Numeric,
    NumericString,
    Currency,
    Date,
    Text,
    Unknown,
}

/// Storage type observed over the non-empty cells of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Number,
    Text,
    Date,
    Mixed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub column_index: usize,
    pub declared_type: DeclaredType,
    pub non_empty_count: usize,
    pub distinct_count: usize,
    pub pattern_type: PatternType,
}

impl ColumnProfile {
    /// Profile used when a column cannot be analyzed.
    pub fn unknown(column_index: usize) -> Self {
        Self {
            column_index,
            declared_type: DeclaredType::Unknown,
            non_empty_count: 0,
            distinct_count: 0,
            pattern_type: PatternType::Unknown,
        }
    }
}

/// Structural inference result for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetAnalysis {
    pub sheet_name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    /// Ranked by score, highest first; equal scores keep row order.
    pub header_candidates: Vec<HeaderCandidate>,
    pub data_rows: Vec<usize>,
    pub column_profiles: Vec<ColumnProfile>,
    pub detected_fields: BTreeMap<usize, LogicalField>,
    pub sample_data: BTreeMap<usize, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<AnalysisIssue>,
}

impl SheetAnalysis {
    pub fn empty(sheet_name: &str, total_rows: usize, total_columns: usize) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            total_rows,
            total_columns,
            header_candidates: Vec::new(),
            data_rows: Vec::new(),
            column_profiles: Vec::new(),
            detected_fields: BTreeMap::new(),
            sample_data: BTreeMap::new(),
            notes: Vec::new(),
        }
    }

    pub fn top_header(&self) -> Option<&HeaderCandidate> {
        self.header_candidates.first()
    }

    pub fn profile(&self, column: usize) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|p| p.column_index == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLocation {
    pub sheet: String,
    pub column: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub detected_field_count: usize,
}

/// Analysis of every usable sheet of one workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAnalysis {
    pub total_sheets: usize,
    pub sheets: Vec<SheetAnalysis>,
    /// Every place a field was detected; repeated fields are kept.
    pub global_detected_fields: BTreeMap<LogicalField, Vec<FieldLocation>>,
    pub summary: AnalysisSummary,
    /// Workbook-level notes (skipped sheets); per-sheet notes live on the sheet.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<AnalysisIssue>,
}

impl CombinedAnalysis {
    pub fn combine(sheets: Vec<SheetAnalysis>, notes: Vec<AnalysisIssue>) -> Self {
        let mut global_detected_fields: BTreeMap<LogicalField, Vec<FieldLocation>> = BTreeMap::new();
        for sheet in &sheets {
            for (&column, &field) in &sheet.detected_fields {
                global_detected_fields.entry(field).or_default().push(FieldLocation {
                    sheet: sheet.sheet_name.clone(),
                    column,
                });
            }
        }
        let summary = AnalysisSummary {
            total_rows: sheets.iter().map(|s| s.total_rows).sum(),
            total_columns: sheets.iter().map(|s| s.total_columns).max().unwrap_or(0),
            detected_field_count: global_detected_fields.len(),
        };
        Self {
            total_sheets: sheets.len(),
            sheets,
            global_detected_fields,
            summary,
            notes,
        }
    }

    /// All notes, workbook-level first, then per sheet.
    pub fn all_notes(&self) -> impl Iterator<Item = &AnalysisIssue> {
        self.notes
            .iter()
            .chain(self.sheets.iter().flat_map(|s| s.notes.iter()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with_fields(name: &str, rows: usize, cols: usize, fields: &[(usize, LogicalField)]) -> SheetAnalysis {
        let mut sheet = SheetAnalysis::empty(name, rows, cols);
        sheet.detected_fields = fields.iter().copied().collect();
        sheet
    }

    #[test]
    fn combine_tracks_repeated_fields_and_summary() {
        let a = sheet_with_fields("A", 10, 4, &[(0, LogicalField::NamaPasien), (3, LogicalField::Nilai)]);
        let b = sheet_with_fields("B", 5, 8, &[(1, LogicalField::Nilai)]);
        let combined = CombinedAnalysis::combine(vec![a, b], Vec::new());

        assert_eq!(combined.total_sheets, 2);
        assert_eq!(combined.summary.total_rows, 15);
        assert_eq!(combined.summary.total_columns, 8);
        assert_eq!(combined.summary.detected_field_count, 2);
        let nilai = &combined.global_detected_fields[&LogicalField::Nilai];
        assert_eq!(nilai.len(), 2);
        assert_eq!(nilai[1], FieldLocation { sheet: "B".into(), column: 1 });
    }

    #[test]
    fn report_serializes_to_json() {
        let combined = CombinedAnalysis::combine(
            vec![sheet_with_fields("A", 1, 1, &[(0, LogicalField::SubTotal)])],
            Vec::new(),
        );
        let json = combined.to_json().unwrap();
        assert!(json.contains("\"sub_total\""));
        assert!(json.contains("\"totalSheets\": 1"));
    }
}
