use tracing::{debug, info};

use super::RecordExtractor;
use crate::models::{ExtractedRecord, SheetAnalysis};
use crate::normalize::clean_cell;
use crate::types::{Cell, SheetGrid};
use crate::vocabulary::{LayoutProfile, LogicalField, Vocabulary};

/// Column captions that mark the transaction table header rather than a line.
const TRANSACTION_CAPTIONS: [&str; 2] = ["JUMLAH", "NILAI"];

/// Running record for a key-value sheet.
///
/// Empty until a label/value pair or a line is seen. A transaction or
/// total row merges its fields, emits the record and resets; end of input
/// emits whatever is left.
#[derive(Debug, Default)]
pub struct RecordAccumulator {
    current: ExtractedRecord,
    emitted: Vec<ExtractedRecord>,
}

impl RecordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accumulating(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn merge_pair(&mut self, field: LogicalField, value: String) {
        self.current.insert(field, value);
    }

    /// A transaction line closes the current record. With nothing
    /// accumulated, a record is built from the line alone with every
    /// transaction field present.
    pub fn on_transaction(&mut self, line: ExtractedRecord, layout: &LayoutProfile) {
        if self.is_accumulating() {
            self.current.merge(line);
            self.emit();
        } else {
            let minimal: ExtractedRecord = layout
                .transaction_columns()
                .iter()
                .map(|(_, field)| (*field, line.text(*field).to_string()))
                .collect();
            self.emitted.push(minimal);
        }
    }

    pub fn on_total(&mut self, total: ExtractedRecord) {
        self.current.merge(total);
        if self.is_accumulating() {
            self.emit();
        }
    }

    pub fn finish(mut self) -> Vec<ExtractedRecord> {
        if self.is_accumulating() {
            self.emit();
        }
        self.emitted
    }

    fn emit(&mut self) {
        self.emitted.push(std::mem::take(&mut self.current));
    }
}

pub struct KeyValueExtractor<'a> {
    vocabulary: &'a Vocabulary,
    layout: &'a LayoutProfile,
}

impl<'a> KeyValueExtractor<'a> {
    pub fn new(vocabulary: &'a Vocabulary, layout: &'a LayoutProfile) -> Self {
        Self { vocabulary, layout }
    }

    /// Recognized (field, value) pairs on one row.
    fn label_pairs(&self, row: &[Cell]) -> Vec<(LogicalField, String)> {
        let mut pairs = Vec::new();
        for &(label_col, value_col) in &self.layout.label_pairs {
            let (Some(label), Some(value)) = (row.get(label_col), row.get(value_col)) else {
                continue;
            };
            if label.is_empty() || value.is_empty() {
                continue;
            }
            let label = label.display_text();
            let value = value.display_text();
            let value = value.trim();
            if value.is_empty() || value == ":" {
                continue;
            }
            let value = value
                .strip_prefix(": ")
                .or_else(|| value.strip_prefix(':'))
                .unwrap_or(value)
                .trim();
            if let Some(field) = self.vocabulary.map_label(label.trim()) {
                pairs.push((field, value.to_string()));
            }
        }
        pairs
    }

    fn is_transaction_row(&self, row: &[Cell]) -> bool {
        let (Some(quantity), Some(rate)) = (row.get(self.layout.quantity), row.get(self.layout.rate)) else {
            return false;
        };
        if quantity.is_empty() || rate.is_empty() {
            return false;
        }
        let quantity = quantity.display_text();
        let rate = rate.display_text();
        let (quantity, rate) = (quantity.trim(), rate.trim());
        let is_caption =
            |s: &str| TRANSACTION_CAPTIONS.iter().any(|c| s.eq_ignore_ascii_case(c));
        if is_caption(quantity) || is_caption(rate) {
            return false;
        }
        let has_digit = |s: &str| s.chars().any(|c| c.is_ascii_digit());
        has_digit(quantity) && has_digit(rate)
    }

    fn is_total_row(&self, row: &[Cell]) -> bool {
        row.get(self.layout.cost_type)
            .map(|c| c.display_text().to_lowercase().contains("total"))
            .unwrap_or(false)
    }

    fn read_columns(row: &[Cell], columns: &[(usize, LogicalField)]) -> ExtractedRecord {
        columns
            .iter()
            .filter_map(|&(col, field)| {
                row.get(col)
                    .filter(|c| !c.is_empty())
                    .map(|c| (field, clean_cell(c)))
            })
            .collect()
    }
}

impl RecordExtractor for KeyValueExtractor<'_> {
    fn extract(&self, grid: &SheetGrid, _analysis: &SheetAnalysis) -> Vec<ExtractedRecord> {
        let mut acc = RecordAccumulator::new();

        for (row_idx, row) in grid.rows().enumerate() {
            for (field, value) in self.label_pairs(row) {
                debug!(sheet = grid.name(), row = row_idx, %field, value = %value, "label pair");
                acc.merge_pair(field, value);
            }

            if self.is_transaction_row(row) {
                debug!(sheet = grid.name(), row = row_idx, "transaction row");
                let line = Self::read_columns(row, &self.layout.transaction_columns());
                acc.on_transaction(line, self.layout);
            } else if self.is_total_row(row) {
                debug!(sheet = grid.name(), row = row_idx, "total row");
                let total = Self::read_columns(row, &self.layout.total_columns());
                acc.on_total(total);
            }
        }

        let records = acc.finish();
        info!(sheet = grid.name(), records = records.len(), "key-value extraction done");
        records
    }
}
