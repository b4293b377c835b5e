use std::io;

use serde::Serialize;
use thiserror::Error;

/// Whole-document failure surfaced to the caller.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("the workbook contains no sheets")]
    EmptyWorkbook,
    #[error("no sheet could be analyzed ({skipped} skipped)")]
    NoUsableSheets { skipped: usize },
    #[error("could not open workbook '{path}': {reason}")]
    Open { path: String, reason: String },
    #[error("could not read sheet '{sheet}': {reason}")]
    SheetRead { sheet: String, reason: String },
    #[error("could not write output workbook: {0}")]
    Write(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ProcessingError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(err.to_string())
    }
}

/// Non-fatal problem found while inferring structure. The affected sheet or
/// column degrades to an empty result; the note is kept for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisIssue {
    pub sheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub message: String,
}

impl AnalysisIssue {
    pub fn sheet(sheet: &str, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            column: None,
            message: message.into(),
        }
    }

    pub fn column(sheet: &str, column: usize, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            column: Some(column),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AnalysisIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(col) => write!(f, "sheet '{}', column {}: {}", self.sheet, col, self.message),
            None => write!(f, "sheet '{}': {}", self.sheet, self.message),
        }
    }
}
