pub mod extract;
pub mod format_classifier;
pub mod gap_filler;
pub mod output_mapper;
pub mod sheet_analyzer;

pub use extract::{extractor_for, RecordExtractor};
pub use format_classifier::{classify as classify_layout, is_key_value, SheetLayout};
pub use gap_filler::{forward_fill, IDENTITY_COLUMNS};
pub use output_mapper::{classify, compute_total, OutputMapper, ServiceCategory};
pub use sheet_analyzer::{EngineOptions, SheetAnalyzer};
