//! Keyword tables driving field recognition and classification.
//!
//! Everything here is plain data handed to the services by reference, so a
//! caller can swap in another vocabulary without touching the algorithms.
//! Rule lists are matched in declaration order and the first hit wins; a
//! broad rule placed before a narrower one shadows it.

use serde::{Deserialize, Serialize};

/// Layout-independent name for a piece of billing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    NomorTagihan,
    NomorRegistrasi,
    TanggalRegistrasi,
    PenjaminBayar,
    NamaPasien,
    TerimaDari,
    KelasKamar,
    TanggalKeluar,
    KelasDijamin,
    JenisBiaya,
    Waktu,
    Tanggal,
    Keterangan,
    Jumlah,
    Nilai,
    SubTotal,
}

impl LogicalField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NomorTagihan => "nomor_tagihan",
            Self::NomorRegistrasi => "nomor_registrasi",
            Self::TanggalRegistrasi => "tanggal_registrasi",
            Self::PenjaminBayar => "penjamin_bayar",
            Self::NamaPasien => "nama_pasien",
            Self::TerimaDari => "terima_dari",
            Self::KelasKamar => "kelas_kamar",
            Self::TanggalKeluar => "tanggal_keluar",
            Self::KelasDijamin => "kelas_dijamin",
            Self::JenisBiaya => "jenis_biaya",
            Self::Waktu => "waktu",
            Self::Tanggal => "tanggal",
            Self::Keterangan => "keterangan",
            Self::Jumlah => "jumlah",
            Self::Nilai => "nilai",
            Self::SubTotal => "sub_total",
        }
    }
}

impl std::fmt::Display for LogicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords that identify one logical field in header text or column content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeywords {
    pub field: LogicalField,
    pub keywords: Vec<String>,
}

/// Maps a key-value label to a field when the lower-cased label contains
/// every fragment in `all_of`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRule {
    pub all_of: Vec<String>,
    pub field: LogicalField,
}

impl LabelRule {
    fn new(all_of: &[&str], field: LogicalField) -> Self {
        Self {
            all_of: to_owned(all_of),
            field,
        }
    }

    pub fn matches(&self, label_lower: &str) -> bool {
        self.all_of.iter().all(|frag| label_lower.contains(frag.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Ordered field vocabulary; order is the tie-break for column detection.
    pub fields: Vec<FieldKeywords>,
    /// Generic words that make a cell look like a label.
    pub structural_keywords: Vec<String>,
    /// Ordered label rules for key-value sheets.
    pub label_rules: Vec<LabelRule>,
    pub equipment_keywords: Vec<String>,
    pub medicine_keywords: Vec<String>,
}

const FIELD_TABLE: &[(LogicalField, &[&str])] = &[
    (LogicalField::NomorTagihan, &["nomor tagihan", "no tagihan", "invoice number", "bill number"]),
    (
        LogicalField::NomorRegistrasi,
        &["nomor registrasi", "no registrasi", "registration number", "reg number"],
    ),
    (
        LogicalField::TanggalRegistrasi,
        &["tanggal registrasi", "tgl registrasi", "registration date", "reg date"],
    ),
    (LogicalField::PenjaminBayar, &["penjamin bayar", "asuransi", "insurance", "guarantor"]),
    (LogicalField::NamaPasien, &["nama pasien", "nama", "patient name", "pasien"]),
    (LogicalField::TerimaDari, &["terima dari", "dari", "from", "received from"]),
    (LogicalField::KelasKamar, &["kelas kamar", "kelas", "kamar", "room class", "class"]),
    (
        LogicalField::TanggalKeluar,
        &["tanggal keluar", "tgl keluar", "discharge date", "exit date"],
    ),
    (LogicalField::KelasDijamin, &["kelas dijamin", "kelas asuransi", "insured class"]),
    (LogicalField::JenisBiaya, &["jenis biaya", "jenis", "biaya", "cost type", "expense type"]),
    (LogicalField::Waktu, &["waktu", "time", "jam", "hour"]),
    (LogicalField::Tanggal, &["tanggal", "tgl", "date"]),
    (LogicalField::Keterangan, &["keterangan", "deskripsi", "description", "note"]),
    (LogicalField::Jumlah, &["jumlah", "qty", "quantity"]),
    (LogicalField::Nilai, &["nilai", "harga", "price", "amount", "tarif"]),
    (LogicalField::SubTotal, &["sub total", "subtotal", "total", "sum"]),
];

const STRUCTURAL_KEYWORDS: &[&str] =
    &["nomor", "tanggal", "nama", "kelas", "biaya", "jumlah", "total"];

const EQUIPMENT_KEYWORDS: &[&str] = &[
    "peralatan",
    "alkes",
    "alat",
    "equipment",
    "medical device",
    "medical equipment",
    "device",
    "instrumen",
    "instrument",
    "pump",
    "syringe",
    "infus",
    "oksigen",
    "oxygen",
    "catheter",
    "canul",
    "tubee",
    "extension",
    "threeway",
    "combopack",
    "spuit",
    "kertas usg",
    "pd gel",
    "kasa",
];

const MEDICINE_KEYWORDS: &[&str] = &[
    "obat",
    "medicine",
    "drug",
    "medication",
    "farmasi",
    "pharmacy",
    "tablet",
    "kapsul",
    "sirup",
    "injeksi",
    "injection",
    "tab",
    "mg",
    "ml",
    "cc",
    "nifedipin",
    "candesartan",
    "furosemide",
    "isosorbide",
    "betadine",
    "alcohol",
    "aquabidest",
    "new diatabs",
];

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_label_rules() -> Vec<LabelRule> {
    use LogicalField::*;
    vec![
        LabelRule::new(&["nomor tagihan"], NomorTagihan),
        LabelRule::new(&["nomor registrasi"], NomorRegistrasi),
        LabelRule::new(&["nama pasien"], NamaPasien),
        LabelRule::new(&["nama", "pasien"], NamaPasien),
        LabelRule::new(&["pasien"], NamaPasien),
        LabelRule::new(&["tanggal registrasi"], TanggalRegistrasi),
        LabelRule::new(&["kelas / kamar"], KelasKamar),
        LabelRule::new(&["penjamin bayar"], PenjaminBayar),
        LabelRule::new(&["tanggal keluar"], TanggalKeluar),
        LabelRule::new(&["kelas dijamin"], KelasDijamin),
        LabelRule::new(&["keterangan"], Keterangan),
        LabelRule::new(&["jumlah"], Jumlah),
        LabelRule::new(&["nilai"], Nilai),
        LabelRule::new(&["biaya kamar"], JenisBiaya),
        LabelRule::new(&["room charge"], JenisBiaya),
    ]
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            fields: FIELD_TABLE
                .iter()
                .map(|(field, words)| FieldKeywords {
                    field: *field,
                    keywords: to_owned(words),
                })
                .collect(),
            structural_keywords: to_owned(STRUCTURAL_KEYWORDS),
            label_rules: default_label_rules(),
            equipment_keywords: to_owned(EQUIPMENT_KEYWORDS),
            medicine_keywords: to_owned(MEDICINE_KEYWORDS),
        }
    }
}

impl Vocabulary {
    /// True when `text` (already lower-cased) contains any field keyword.
    pub fn mentions_any_field(&self, text: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.keywords.iter().any(|k| text.contains(k.as_str())))
    }

    pub fn mentions_structural_keyword(&self, text: &str) -> bool {
        self.structural_keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// First field (in vocabulary order) with a keyword contained in `text`.
    pub fn detect_field(&self, text: &str) -> Option<LogicalField> {
        self.fields
            .iter()
            .find(|f| f.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|f| f.field)
    }

    /// Map a key-value label to a field using the ordered label rules.
    pub fn map_label(&self, label: &str) -> Option<LogicalField> {
        let lower = label.to_lowercase();
        self.label_rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.field)
    }
}

/// Which cell offsets carry transaction data, and where label/value pairs
/// live, for one family of input layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutProfile {
    pub name: &'static str,
    pub cost_type: usize,
    pub narrative: usize,
    pub quantity: usize,
    pub rate: usize,
    pub subtotal: usize,
    /// (label column, value column) pairs scanned on every row.
    pub label_pairs: Vec<(usize, usize)>,
}

impl LayoutProfile {
    /// Hospital statement layout: cost type, narrative, quantity at 4,
    /// rate at 5, subtotal at 7; labels in columns 0-3.
    pub fn hospital_statement() -> Self {
        Self {
            name: "hospital_statement",
            cost_type: 0,
            narrative: 1,
            quantity: 4,
            rate: 5,
            subtotal: 7,
            label_pairs: vec![(0, 1), (2, 3)],
        }
    }

    /// (offset, field) pairs read from a transaction or positional row.
    pub fn transaction_columns(&self) -> [(usize, LogicalField); 5] {
        [
            (self.cost_type, LogicalField::JenisBiaya),
            (self.narrative, LogicalField::Keterangan),
            (self.quantity, LogicalField::Jumlah),
            (self.rate, LogicalField::Nilai),
            (self.subtotal, LogicalField::SubTotal),
        ]
    }

    pub fn total_columns(&self) -> [(usize, LogicalField); 2] {
        [
            (self.cost_type, LogicalField::JenisBiaya),
            (self.subtotal, LogicalField::SubTotal),
        ]
    }
}

impl Default for LayoutProfile {
    fn default() -> Self {
        Self::hospital_statement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rules_follow_declaration_order() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.map_label("Nomor Tagihan"), Some(LogicalField::NomorTagihan));
        assert_eq!(vocab.map_label("Nama Pasien"), Some(LogicalField::NamaPasien));
        assert_eq!(vocab.map_label("Kelas / Kamar"), Some(LogicalField::KelasKamar));
        // "pasien" is declared before "tanggal registrasi" and wins.
        assert_eq!(
            vocab.map_label("Tanggal Registrasi Pasien"),
            Some(LogicalField::NamaPasien)
        );
        assert_eq!(vocab.map_label("Dokter"), None);
    }

    #[test]
    fn column_detection_uses_vocabulary_order() {
        let vocab = Vocabulary::default();
        // "tanggal keluar" also contains "tanggal", but TanggalKeluar is declared first.
        assert_eq!(vocab.detect_field("tanggal keluar 25/08/2025"), Some(LogicalField::TanggalKeluar));
        assert_eq!(vocab.detect_field("xyz"), None);
    }

    #[test]
    fn substituted_vocabulary_is_honoured() {
        let vocab = Vocabulary {
            fields: vec![FieldKeywords {
                field: LogicalField::Nilai,
                keywords: vec!["preis".into()],
            }],
            ..Vocabulary::default()
        };
        assert_eq!(vocab.detect_field("preis"), Some(LogicalField::Nilai));
        assert_eq!(vocab.detect_field("harga"), None);
    }
}
