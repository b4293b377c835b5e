//! Projection of extracted records onto the canonical claim columns.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{CombinedAnalysis, ExtractedRecord, OutputColumn, OutputRow, OutputTable};
use crate::normalize::{clean_currency, clean_numeric, format_grouped};
use crate::types::DATE_FORMAT;
use crate::vocabulary::{LogicalField, Vocabulary};

/// Field copied verbatim into an output column when non-empty.
const DIRECT_MAPPING: &[(OutputColumn, LogicalField)] = &[
    (OutputColumn::ClientName, LogicalField::NamaPasien),
    (OutputColumn::ClientInvoiceNumber, LogicalField::NomorTagihan),
    (OutputColumn::ClientRegisterNumber, LogicalField::NomorRegistrasi),
    (OutputColumn::Admission, LogicalField::TanggalRegistrasi),
    (OutputColumn::Discharge, LogicalField::TanggalKeluar),
    (OutputColumn::Kelas, LogicalField::KelasKamar),
    (OutputColumn::Tariff, LogicalField::Nilai),
    (OutputColumn::Quantity, LogicalField::Jumlah),
    (OutputColumn::TotalBilled, LogicalField::SubTotal),
    (OutputColumn::ServiceCodeDescription, LogicalField::Keterangan),
    (OutputColumn::GivenDate, LogicalField::Tanggal),
];

/// Cost category derived from cost type and narrative text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCategory {
    /// Medical equipment.
    Alkes,
    /// Medicine.
    Obat,
    Unclassified,
}

impl ServiceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alkes => "Alkes",
            Self::Obat => "Obat",
            Self::Unclassified => "",
        }
    }
}

/// Equipment keywords win over medicine keywords.
pub fn classify(cost_type: &str, narrative: &str, vocabulary: &Vocabulary) -> ServiceCategory {
    let text = format!("{cost_type} {narrative}").to_lowercase();
    let hit = |words: &[String]| words.iter().any(|w| text.contains(w.as_str()));
    if hit(&vocabulary.equipment_keywords) {
        ServiceCategory::Alkes
    } else if hit(&vocabulary.medicine_keywords) {
        ServiceCategory::Obat
    } else {
        ServiceCategory::Unclassified
    }
}

/// rate × quantity, grouped. `None` when either operand does not parse.
pub fn compute_total(rate: &str, quantity: &str) -> Option<String> {
    let rate = clean_currency(rate)?;
    let quantity = clean_numeric(quantity)?;
    Some(format_grouped(rate * quantity))
}

pub struct OutputMapper<'a> {
    vocabulary: &'a Vocabulary,
    processing_date: NaiveDate,
}

impl<'a> OutputMapper<'a> {
    pub fn new(vocabulary: &'a Vocabulary, processing_date: NaiveDate) -> Self {
        Self {
            vocabulary,
            processing_date,
        }
    }

    /// One output row per record, in record order.
    pub fn map(&self, records: &[ExtractedRecord], analysis: &CombinedAnalysis) -> OutputTable {
        debug!(
            records = records.len(),
            sheets = analysis.total_sheets,
            "mapping records to output rows"
        );
        OutputTable::new(records.iter().map(|r| self.map_record(r)).collect())
    }

    pub fn map_record(&self, record: &ExtractedRecord) -> OutputRow {
        let mut row = OutputRow::new();

        for &(column, field) in DIRECT_MAPPING {
            if let Some(value) = record.get(field).filter(|v| !v.is_empty()) {
                row.set(column, value);
            }
        }

        let computed = compute_total(record.text(LogicalField::Nilai), record.text(LogicalField::Jumlah));
        let total = computed.unwrap_or_else(|| record.text(LogicalField::SubTotal).to_string());
        row.set(OutputColumn::TotalBilled, total);

        let category = classify(
            record.text(LogicalField::JenisBiaya),
            record.text(LogicalField::Keterangan),
            self.vocabulary,
        );
        row.set(OutputColumn::ServiceCode, category.as_str());
        row.set(OutputColumn::ServiceCodeDescription, category.as_str());
        row.set(OutputColumn::TariffDescription, "");

        let today = self.processing_date.format(DATE_FORMAT).to_string();
        for column in OutputColumn::ALL {
            if row.get(column).is_empty() {
                if column.is_date() {
                    row.set(column, today.as_str());
                } else if column == OutputColumn::LengthOfStay {
                    row.set(column, "0");
                }
            }
        }
        row
    }
}
