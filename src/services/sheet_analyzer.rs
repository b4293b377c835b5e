//! Per-sheet structure inference: header rows, data rows, column patterns
//! and field recognition from column content.

use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::AnalysisIssue;
use crate::models::{ColumnProfile, DeclaredType, HeaderCandidate, PatternType, SheetAnalysis};
use crate::normalize::json_safe_text;
use crate::types::{Cell, SheetGrid};
use crate::vocabulary::{LogicalField, Vocabulary};

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").expect("date regex"))
}

fn currency_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Rp\s*[\d,]+").expect("currency regex"))
}

fn digits_only() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("digits regex"))
}

/// Tunables for structure inference.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Only the first rows of a sheet are considered for headers.
    pub header_scan_rows: usize,
    /// Rows must score strictly above this to become header candidates.
    pub header_threshold: f64,
    /// Non-empty values kept per column for the diagnostic report.
    pub sample_rows: usize,
    /// Character lengths that look like a plausible label.
    pub label_length: Range<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            header_threshold: 0.6,
            sample_rows: 5,
            label_length: 4..50,
        }
    }
}

pub struct SheetAnalyzer<'a> {
    vocabulary: &'a Vocabulary,
    options: EngineOptions,
}

impl<'a> SheetAnalyzer<'a> {
    pub fn new(vocabulary: &'a Vocabulary, options: EngineOptions) -> Self {
        Self { vocabulary, options }
    }

    /// Analyze one sheet. Never fails: a column that cannot be profiled
    /// degrades to an unknown profile and a note on the analysis.
    pub fn analyze(&self, grid: &SheetGrid) -> SheetAnalysis {
        let mut analysis = SheetAnalysis::empty(grid.name(), grid.row_count(), grid.column_count());
        if grid.is_empty() {
            debug!(sheet = grid.name(), "sheet has no rows or columns");
            return analysis;
        }

        analysis.header_candidates = self.detect_header_rows(grid);
        analysis.data_rows = detect_data_rows(grid, &analysis.header_candidates);

        for column in 0..grid.column_count() {
            let cells: Vec<&Cell> = grid.column(column).filter(|c| !c.is_empty()).collect();
            if cells.is_empty() {
                continue;
            }
            match profile_column(column, &cells) {
                Ok(profile) => {
                    analysis.column_profiles.push(profile);
                    if let Some(field) = self.detect_field_from_content(&cells) {
                        analysis.detected_fields.insert(column, field);
                    }
                    let samples = cells
                        .iter()
                        .take(self.options.sample_rows)
                        .map(|c| json_safe_text(c))
                        .collect();
                    analysis.sample_data.insert(column, samples);
                }
                Err(reason) => {
                    let issue = AnalysisIssue::column(grid.name(), column, reason);
                    warn!(sheet = grid.name(), column, "column skipped: {}", issue.message);
                    analysis.column_profiles.push(ColumnProfile::unknown(column));
                    analysis.notes.push(issue);
                }
            }
        }

        debug!(
            sheet = grid.name(),
            headers = analysis.header_candidates.len(),
            data_rows = analysis.data_rows.len(),
            fields = analysis.detected_fields.len(),
            "sheet analyzed"
        );
        analysis
    }

    /// Header candidates within the inspection window, best first. The sort
    /// is stable, so equal scores keep the earlier row on top.
    pub fn detect_header_rows(&self, grid: &SheetGrid) -> Vec<HeaderCandidate> {
        let mut candidates: Vec<HeaderCandidate> = grid
            .rows()
            .take(self.options.header_scan_rows)
            .enumerate()
            .filter_map(|(row_index, row)| {
                let score = self.score_header_row(row);
                (score > self.options.header_threshold).then(|| HeaderCandidate {
                    row_index,
                    score,
                    content: row.iter().map(Cell::display_text).collect(),
                })
            })
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Average per-cell label likelihood: 1.0 for a field keyword, 0.5 for a
    /// structural keyword, 0.3 for a label-sized string.
    pub fn score_header_row(&self, row: &[Cell]) -> f64 {
        if row.is_empty() {
            return 0.0;
        }
        let total: f64 = row
            .iter()
            .map(|cell| {
                let text = cell.display_text().trim().to_lowercase();
                if text.is_empty() {
                    0.0
                } else if self.vocabulary.mentions_any_field(&text) {
                    1.0
                } else if self.vocabulary.mentions_structural_keyword(&text) {
                    0.5
                } else if self.options.label_length.contains(&text.chars().count()) {
                    0.3
                } else {
                    0.0
                }
            })
            .sum();
        total / row.len() as f64
    }

    fn detect_field_from_content(&self, cells: &[&Cell]) -> Option<LogicalField> {
        let combined = cells
            .iter()
            .map(|c| c.display_text())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        self.vocabulary.detect_field(&combined)
    }
}

/// Rows holding values. Without a header candidate every row counts;
/// otherwise every row but the top header is tested for digits or dates.
pub fn detect_data_rows(grid: &SheetGrid, header_candidates: &[HeaderCandidate]) -> Vec<usize> {
    let Some(header) = header_candidates.first() else {
        return (0..grid.row_count()).collect();
    };
    grid.rows()
        .enumerate()
        .filter(|(idx, row)| *idx != header.row_index && is_data_row(row))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn is_data_row(row: &[Cell]) -> bool {
    row.iter().any(|cell| match cell {
        Cell::Empty => false,
        Cell::Number(n) => n.is_finite(),
        Cell::Date(_) => true,
        Cell::Text(s) => s.chars().any(|c| c.is_ascii_digit()) || date_pattern().is_match(s),
    })
}

fn declared_type(cells: &[&Cell]) -> DeclaredType {
    let mut kinds = cells.iter().map(|c| match c {
        Cell::Number(_) => DeclaredType::Number,
        Cell::Date(_) => DeclaredType::Date,
        _ => DeclaredType::Text,
    });
    let Some(first) = kinds.next() else {
        return DeclaredType::Unknown;
    };
    if kinds.all(|k| k == first) {
        first
    } else {
        DeclaredType::Mixed
    }
}

fn profile_column(column: usize, cells: &[&Cell]) -> Result<ColumnProfile, String> {
    if let Some(pos) = cells.iter().position(|c| c.is_non_finite()) {
        return Err(format!("non-finite number at non-empty cell {pos}"));
    }

    let declared_type = declared_type(cells);
    let distinct: HashSet<String> = cells.iter().map(|c| c.display_text()).collect();
    let texts: Vec<&str> = cells
        .iter()
        .filter_map(|c| match c {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();

    let pattern_type = match declared_type {
        DeclaredType::Number => PatternType::Numeric,
        DeclaredType::Date => PatternType::Date,
        _ if texts.iter().any(|t| currency_pattern().is_match(t)) => PatternType::Currency,
        _ if texts.iter().any(|t| date_pattern().is_match(t)) => PatternType::Date,
        _ if texts.iter().any(|t| digits_only().is_match(t)) => PatternType::NumericString,
        _ => PatternType::Text,
    };

    Ok(ColumnProfile {
        column_index: column,
        declared_type,
        non_empty_count: cells.len(),
        distinct_count: distinct.len(),
        pattern_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(vocab: &Vocabulary) -> SheetAnalyzer<'_> {
        SheetAnalyzer::new(vocab, EngineOptions::default())
    }

    fn tabular_grid() -> SheetGrid {
        SheetGrid::from_strings(
            "Rincian",
            &[
                &["Jenis Biaya", "Keterangan", "Jumlah", "Nilai"],
                &["Biaya Obat", "Paracetamol 500 mg", "2", "Rp 10,000"],
                &["Biaya Visite", "Dokter Spesialis", "3", "Rp 700,000"],
            ],
        )
    }

    #[test]
    fn empty_sheet_yields_empty_analysis() {
        let vocab = Vocabulary::default();
        let analysis = analyzer(&vocab).analyze(&SheetGrid::new("Empty", Vec::new()));
        assert_eq!(analysis.total_rows, 0);
        assert!(analysis.header_candidates.is_empty());
        assert!(analysis.column_profiles.is_empty());

        let no_columns = SheetGrid::new("NoCols", vec![Vec::new(), Vec::new()]);
        let analysis = analyzer(&vocab).analyze(&no_columns);
        assert_eq!(analysis.total_rows, 2);
        assert_eq!(analysis.total_columns, 0);
        assert!(analysis.data_rows.is_empty());
    }

    #[test]
    fn header_row_is_detected_and_ranked_first() {
        let vocab = Vocabulary::default();
        let analysis = analyzer(&vocab).analyze(&tabular_grid());
        let top = analysis.top_header().expect("header");
        assert_eq!(top.row_index, 0);
        assert!((top.score - 1.0).abs() < 1e-9);
        assert_eq!(analysis.data_rows, vec![1, 2]);
    }

    #[test]
    fn header_scoring_is_deterministic() {
        let vocab = Vocabulary::default();
        let grid = SheetGrid::from_strings(
            "Dup",
            &[
                &["Nama Pasien", "Kelas"],
                &["Nomor Tagihan", "Tanggal"],
                &["x", "y"],
            ],
        );
        let first = analyzer(&vocab).detect_header_rows(&grid);
        let second = analyzer(&vocab).detect_header_rows(&grid);
        assert_eq!(first, second);
        assert_eq!(first.iter().map(|c| c.row_index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn header_scan_is_limited_to_window() {
        let vocab = Vocabulary::default();
        let filler: &[&str] = &["filler text here", ""];
        let mut rows = vec![filler; 12];
        rows.push(&["Nama Pasien", "Kelas"]);
        let grid = SheetGrid::from_strings("Late", &rows);
        assert!(analyzer(&vocab).detect_header_rows(&grid).is_empty());
    }

    #[test]
    fn scoring_weights() {
        let vocab = Vocabulary::default();
        let a = analyzer(&vocab);
        let row = |cells: &[&str]| cells.iter().map(|s| Cell::from(*s)).collect::<Vec<_>>();
        assert!((a.score_header_row(&row(&["nomor"])) - 0.5).abs() < 1e-9);
        assert!((a.score_header_row(&row(&["Dokter"])) - 0.3).abs() < 1e-9);
        assert!((a.score_header_row(&row(&["abc"])) - 0.0).abs() < 1e-9);
        assert!((a.score_header_row(&row(&["Nilai", ""])) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn column_patterns_and_fields() {
        let vocab = Vocabulary::default();
        let analysis = analyzer(&vocab).analyze(&tabular_grid());
        assert_eq!(analysis.profile(3).unwrap().pattern_type, PatternType::Currency);
        assert_eq!(analysis.profile(2).unwrap().pattern_type, PatternType::NumericString);
        assert_eq!(analysis.profile(0).unwrap().pattern_type, PatternType::Text);
        assert_eq!(analysis.profile(0).unwrap().distinct_count, 3);
        assert_eq!(analysis.detected_fields.get(&0), Some(&LogicalField::JenisBiaya));
        assert_eq!(analysis.detected_fields.get(&3), Some(&LogicalField::Nilai));
        assert_eq!(analysis.sample_data[&1].len(), 3);
    }

    #[test]
    fn numeric_and_date_columns() {
        let vocab = Vocabulary::default();
        let grid = SheetGrid::new(
            "Mixed",
            vec![
                vec![Cell::Number(1.0), Cell::text("25/08/2025")],
                vec![Cell::Number(2.0), Cell::text("26/08/2025")],
            ],
        );
        let analysis = analyzer(&vocab).analyze(&grid);
        assert_eq!(analysis.profile(0).unwrap().pattern_type, PatternType::Numeric);
        assert_eq!(analysis.profile(0).unwrap().declared_type, DeclaredType::Number);
        assert_eq!(analysis.profile(1).unwrap().pattern_type, PatternType::Date);
    }

    #[test]
    fn bad_column_does_not_abort_sheet() {
        let vocab = Vocabulary::default();
        let grid = SheetGrid::new(
            "Broken",
            vec![
                vec![Cell::text("Keterangan"), Cell::Number(f64::NAN)],
                vec![Cell::text("Obat"), Cell::Number(3.0)],
            ],
        );
        let analysis = analyzer(&vocab).analyze(&grid);
        assert_eq!(analysis.profile(1).unwrap().pattern_type, PatternType::Unknown);
        assert_eq!(analysis.notes.len(), 1);
        assert_eq!(analysis.notes[0].column, Some(1));
        assert_eq!(analysis.detected_fields.get(&0), Some(&LogicalField::Keterangan));
        assert!(!analysis.sample_data.contains_key(&1));
    }

    #[test]
    fn without_header_every_row_is_data() {
        let vocab = Vocabulary::default();
        let grid = SheetGrid::from_strings("Raw", &[&["x", "y"], &["", "z"]]);
        let analysis = analyzer(&vocab).analyze(&grid);
        assert!(analysis.header_candidates.is_empty());
        assert_eq!(analysis.data_rows, vec![0, 1]);
    }

    #[test]
    fn rows_without_digits_or_dates_are_not_data() {
        let vocab = Vocabulary::default();
        let discharge = chrono::NaiveDate::from_ymd_opt(2025, 8, 25)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let grid = SheetGrid::new(
            "Rincian",
            vec![
                vec![Cell::text("Jenis Biaya"), Cell::text("Keterangan")],
                vec![Cell::text("Visite Dokter"), Cell::text("Konsultasi")],
                vec![Cell::text("25/08/2025"), Cell::Empty],
                vec![Cell::Date(discharge), Cell::Empty],
            ],
        );
        let analysis = analyzer(&vocab).analyze(&grid);
        assert_eq!(analysis.top_header().map(|h| h.row_index), Some(0));
        assert!(!is_data_row(grid.row(1)));
        assert_eq!(analysis.data_rows, vec![2, 3]);
    }
}
