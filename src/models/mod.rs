mod analysis;
mod output;
mod record;

pub use analysis::{
    AnalysisSummary, ColumnProfile, CombinedAnalysis, DeclaredType, FieldLocation,
    HeaderCandidate, PatternType, SheetAnalysis,
};
pub use output::{HeaderFill, OutputColumn, OutputRow, OutputTable};
pub use record::ExtractedRecord;
