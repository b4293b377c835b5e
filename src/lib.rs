//! Structure inference and claim-schema normalization for hospital billing
//! workbooks.
//!
//! A [`Workbook`] of decoded sheets goes through per-sheet analysis, layout
//! classification, record extraction, output mapping and gap filling; the
//! [`Processor`] runs the whole chain.

pub mod config;
pub mod error;
pub mod excel;
pub mod models;
pub mod normalize;
pub mod processor;
pub mod services;
pub mod types;
pub mod vocabulary;

pub use config::Settings;
pub use error::{AnalysisIssue, ProcessingError};
pub use models::{CombinedAnalysis, ExtractedRecord, OutputColumn, OutputRow, OutputTable, SheetAnalysis};
pub use processor::{ProcessingOutcome, Processor};
pub use services::EngineOptions;
pub use types::{Cell, SheetGrid, Workbook};
pub use vocabulary::{LayoutProfile, LogicalField, Vocabulary};
