//! Sheet-wide layout decision. One signal per sheet: mixed layouts inside a
//! single sheet are classified as a whole.

use serde::Serialize;

use crate::models::SheetAnalysis;
use crate::types::SheetGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetLayout {
    /// Label/value pairs scattered across the first columns.
    KeyValue,
    /// One header row governs the rows below it.
    Tabular,
    /// No header detected; fixed column offsets are read.
    Positional,
}

const KEY_VALUE_SEPARATOR: &str = " : ";

/// True when any cell contains a standalone `" : "` separator.
pub fn is_key_value(grid: &SheetGrid) -> bool {
    grid.rows()
        .flatten()
        .any(|cell| !cell.is_empty() && cell.display_text().contains(KEY_VALUE_SEPARATOR))
}

pub fn classify(grid: &SheetGrid, analysis: &SheetAnalysis) -> SheetLayout {
    if is_key_value(grid) {
        SheetLayout::KeyValue
    } else if analysis.top_header().is_some() {
        SheetLayout::Tabular
    } else {
        SheetLayout::Positional
    }
}
