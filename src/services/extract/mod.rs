//! Record extraction strategies. Each turns one sheet into a sequence of
//! loosely typed records; the layout classifier picks the strategy.

mod key_value;
mod positional;
mod tabular;

pub use key_value::{KeyValueExtractor, RecordAccumulator};
pub use positional::PositionalExtractor;
pub use tabular::TabularExtractor;

use crate::models::{ExtractedRecord, SheetAnalysis};
use crate::services::format_classifier::SheetLayout;
use crate::types::{Cell, SheetGrid};
use crate::vocabulary::{LayoutProfile, Vocabulary};

pub trait RecordExtractor {
    fn extract(&self, grid: &SheetGrid, analysis: &SheetAnalysis) -> Vec<ExtractedRecord>;
}

/// Strategy for a classified sheet.
pub fn extractor_for<'a>(
    layout: SheetLayout,
    vocabulary: &'a Vocabulary,
    profile: &'a LayoutProfile,
) -> Box<dyn RecordExtractor + 'a> {
    match layout {
        SheetLayout::KeyValue => Box::new(KeyValueExtractor::new(vocabulary, profile)),
        SheetLayout::Tabular => Box::new(TabularExtractor),
        SheetLayout::Positional => Box::new(PositionalExtractor::new(profile)),
    }
}

pub(crate) fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}
