use chrono::NaiveDateTime;

use crate::error::AnalysisIssue;

/// Date rendering shared by cell text and the output date defaults.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// One decoded cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Raw string form of the cell, without any cleaning beyond number and
    /// date rendering. Integral numbers drop their fractional part and
    /// non-finite numbers render as an empty string.
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Date(dt) => dt.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn is_non_finite(&self) -> bool {
        matches!(self, Cell::Number(n) if !n.is_finite())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return String::new();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A named, rectangular grid of cells. Ragged input rows are padded with
/// empty cells so every row has `column_count()` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    /// Convenience constructor used by tests and fixtures: empty strings
    /// become empty cells, everything else is text.
    pub fn from_strings(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|s| Cell::from(*s)).collect())
            .collect();
        Self::new(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> &[Cell] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell at (row, column); out-of-range positions read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |r| r.get(column).unwrap_or(&EMPTY_CELL))
    }
}

/// Ordered collection of sheets as handed over by the decoder, plus a note
/// for every sheet the decoder had to leave out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<SheetGrid>,
    pub notes: Vec<AnalysisIssue>,
}

impl Workbook {
    pub fn new(sheets: Vec<SheetGrid>) -> Self {
        Self {
            sheets,
            notes: Vec::new(),
        }
    }

    pub fn with_notes(sheets: Vec<SheetGrid>, notes: Vec<AnalysisIssue>) -> Self {
        Self { sheets, notes }
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetGrid> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(SheetGrid::name).collect()
    }
}
