//! Pipeline orchestration: analysis, layout classification, extraction,
//! mapping and gap filling over a whole workbook.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AnalysisIssue, ProcessingError};
use crate::excel;
use crate::models::{CombinedAnalysis, ExtractedRecord, OutputTable};
use crate::services::{
    classify_layout, extractor_for, forward_fill, EngineOptions, OutputMapper, SheetAnalyzer,
    IDENTITY_COLUMNS,
};
use crate::types::{Cell, SheetGrid, Workbook};
use crate::vocabulary::{LayoutProfile, Vocabulary};

/// Result of a processing run: the filled output table and the analysis it
/// was derived from.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub table: OutputTable,
    pub analysis: CombinedAnalysis,
}

#[derive(Debug, Clone, Default)]
pub struct Processor {
    vocabulary: Vocabulary,
    layout: LayoutProfile,
    options: EngineOptions,
}

fn is_blank_sheet(grid: &SheetGrid) -> bool {
    grid.is_empty() || grid.rows().flatten().all(Cell::is_empty)
}

impl Processor {
    pub fn new(vocabulary: Vocabulary, layout: LayoutProfile, options: EngineOptions) -> Self {
        Self {
            vocabulary,
            layout,
            options,
        }
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Analyze every non-empty sheet. Empty sheets are skipped with a note and
    /// decoder notes are carried over; the run fails only when nothing is
    /// left to analyze.
    pub fn analyze_workbook(&self, workbook: &Workbook) -> Result<CombinedAnalysis, ProcessingError> {
        if workbook.sheets.is_empty() {
            if workbook.notes.is_empty() {
                return Err(ProcessingError::EmptyWorkbook);
            }
            return Err(ProcessingError::NoUsableSheets {
                skipped: workbook.notes.len(),
            });
        }
        let analyzer = SheetAnalyzer::new(&self.vocabulary, self.options.clone());
        let mut sheets = Vec::new();
        // sheets the decoder already left out
        let mut notes = workbook.notes.clone();
        for grid in &workbook.sheets {
            if is_blank_sheet(grid) {
                warn!(sheet = grid.name(), "sheet is empty, skipping");
                notes.push(AnalysisIssue::sheet(grid.name(), "sheet is empty; skipped"));
                continue;
            }
            sheets.push(analyzer.analyze(grid));
        }
        if sheets.is_empty() {
            return Err(ProcessingError::NoUsableSheets { skipped: notes.len() });
        }
        info!(
            analyzed = sheets.len(),
            skipped = notes.len(),
            "workbook analysis complete"
        );
        Ok(CombinedAnalysis::combine(sheets, notes))
    }

    /// Diagnostic report only; nothing is extracted.
    pub fn preview(&self, workbook: &Workbook) -> Result<CombinedAnalysis, ProcessingError> {
        self.analyze_workbook(workbook)
    }

    /// Records of every analyzed sheet, in workbook order.
    pub fn extract_records(&self, workbook: &Workbook, analysis: &CombinedAnalysis) -> Vec<ExtractedRecord> {
        let mut records = Vec::new();
        for sheet in &analysis.sheets {
            let Some(grid) = workbook.sheet(&sheet.sheet_name) else {
                continue;
            };
            let layout = classify_layout(grid, sheet);
            info!(sheet = grid.name(), ?layout, "layout classified");
            let extractor = extractor_for(layout, &self.vocabulary, &self.layout);
            records.extend(extractor.extract(grid, sheet));
        }
        records
    }

    /// Full pipeline, with date defaults taken from the local clock.
    pub fn process(&self, workbook: &Workbook) -> Result<ProcessingOutcome, ProcessingError> {
        self.process_on(workbook, Local::now().date_naive())
    }

    /// Full pipeline with an explicit processing date.
    pub fn process_on(
        &self,
        workbook: &Workbook,
        processing_date: NaiveDate,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        let analysis = self.analyze_workbook(workbook)?;
        let records = self.extract_records(workbook, &analysis);
        let mut table = OutputMapper::new(&self.vocabulary, processing_date).map(&records, &analysis);
        forward_fill(&mut table, &IDENTITY_COLUMNS);
        info!(records = records.len(), rows = table.len(), "processing complete");
        Ok(ProcessingOutcome { table, analysis })
    }

    /// Read `input`, process it and write the result into `output_dir`.
    /// Returns the path of the written workbook.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ProcessingError> {
        let workbook = excel::read_workbook(input)?;
        let outcome = self.process(&workbook)?;
        for note in outcome.analysis.all_notes() {
            warn!(%note, "analysis note");
        }
        let path = output_dir.join(excel::output_file_name(input, Local::now().naive_local()));
        excel::write_output(&outcome.table, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_without_sheets_is_an_error() {
        let err = Processor::default().analyze_workbook(&Workbook::default()).unwrap_err();
        assert!(matches!(err, ProcessingError::EmptyWorkbook));
    }

    #[test]
    fn only_empty_sheets_is_an_error() {
        let workbook = Workbook::new(vec![
            SheetGrid::new("A", Vec::new()),
            SheetGrid::from_strings("B", &[&["", ""]]),
        ]);
        let err = Processor::default().analyze_workbook(&workbook).unwrap_err();
        assert!(matches!(err, ProcessingError::NoUsableSheets { skipped: 2 }));
    }

    #[test]
    fn empty_sheets_are_skipped_with_a_note() {
        let workbook = Workbook::new(vec![
            SheetGrid::new("Kosong", Vec::new()),
            SheetGrid::from_strings("Data", &[&["Obat", "Paracetamol"]]),
        ]);
        let analysis = Processor::default().analyze_workbook(&workbook).unwrap();
        assert_eq!(analysis.total_sheets, 1);
        assert_eq!(analysis.sheets[0].sheet_name, "Data");
        assert_eq!(analysis.notes.len(), 1);
        assert_eq!(analysis.notes[0].sheet, "Kosong");
    }

    #[test]
    fn decoder_notes_are_carried_into_the_analysis() {
        let workbook = Workbook::with_notes(
            vec![SheetGrid::from_strings("Data", &[&["Obat", "Paracetamol"]])],
            vec![AnalysisIssue::sheet("Rusak", "could not decode sheet")],
        );
        let analysis = Processor::default().analyze_workbook(&workbook).unwrap();
        assert_eq!(analysis.total_sheets, 1);
        assert_eq!(analysis.notes.len(), 1);
        assert_eq!(analysis.notes[0].sheet, "Rusak");

        let nothing_decoded = Workbook::with_notes(Vec::new(), workbook.notes.clone());
        let err = Processor::default().analyze_workbook(&nothing_decoded).unwrap_err();
        assert!(matches!(err, ProcessingError::NoUsableSheets { skipped: 1 }));
    }
}
