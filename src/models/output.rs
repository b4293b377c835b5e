use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Canonical claim export columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputColumn {
    ProvId,
    ProviderName,
    ServiceCode,
    ServiceCodeDescription,
    Kelas,
    SurgeryRoom,
    Helper,
    Tariff,
    TariffDescription,
    Quantity,
    TotalBilled,
    GivenDate,
    SpecialTreatment,
    SpecialTreatmentDescription,
    IcdDiagnosisPrimary,
    IcdDescPrimary,
    IcdDiagnosisSecondary,
    IcdDescSecondary,
    PhysicianName,
    PhysicianDescription,
    ClientName,
    ClientDob,
    ClientSex,
    ClientAddress,
    ClientMemberId,
    ClientMrNumber,
    ClientInvoiceNumber,
    ClientRegisterNumber,
    ClientOtherNumber,
    Admission,
    Discharge,
    LengthOfStay,
}

/// Header fill used by the output writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFill {
    Yellow,
    Red,
}

impl OutputColumn {
    pub const ALL: [OutputColumn; 32] = [
        Self::ProvId,
        Self::ProviderName,
        Self::ServiceCode,
        Self::ServiceCodeDescription,
        Self::Kelas,
        Self::SurgeryRoom,
        Self::Helper,
        Self::Tariff,
        Self::TariffDescription,
        Self::Quantity,
        Self::TotalBilled,
        Self::GivenDate,
        Self::SpecialTreatment,
        Self::SpecialTreatmentDescription,
        Self::IcdDiagnosisPrimary,
        Self::IcdDescPrimary,
        Self::IcdDiagnosisSecondary,
        Self::IcdDescSecondary,
        Self::PhysicianName,
        Self::PhysicianDescription,
        Self::ClientName,
        Self::ClientDob,
        Self::ClientSex,
        Self::ClientAddress,
        Self::ClientMemberId,
        Self::ClientMrNumber,
        Self::ClientInvoiceNumber,
        Self::ClientRegisterNumber,
        Self::ClientOtherNumber,
        Self::Admission,
        Self::Discharge,
        Self::LengthOfStay,
    ];

    /// Header text expected by downstream billing consumers.
    pub fn header(self) -> &'static str {
        match self {
            Self::ProvId => "PROVID",
            Self::ProviderName => "PROVIDER_NAME",
            Self::ServiceCode => "SERVICECODE",
            Self::ServiceCodeDescription => "SERVICECODE DESCRIPTION",
            Self::Kelas => "KELAS",
            Self::SurgeryRoom => "RUANG BEDAH (SURGERY)/NON RUANG BEDAH (NON SURGERY)",
            Self::Helper => "HELPER",
            Self::Tariff => "TARIFF",
            Self::TariffDescription => "TARIFF DESCRIPTION",
            Self::Quantity => "QUANTITY",
            Self::TotalBilled => "TOTAL BILLED",
            Self::GivenDate => "GIVEN DATE (month, day, year)",
            Self::SpecialTreatment => "HEAMODIALISA/CHEMOTHERAPY/ODC/PHYSIOTHERAPY/RADIOTHERAPY",
            Self::SpecialTreatmentDescription => {
                "HEAMODIALISA/CHEMOTHERAPY/ODC/PHYSIOTHERAPY/RADIOTHERAPY DESCRIPTION"
            }
            Self::IcdDiagnosisPrimary => "ICD_X_DIAGNOSIS_PRIMARY",
            Self::IcdDescPrimary => "ICD_X_DESC_PRIMARY",
            Self::IcdDiagnosisSecondary => "ICD_X_DIAGNOSIS_SECONDARY",
            Self::IcdDescSecondary => "ICD_X_DESC_SECONDARY",
            Self::PhysicianName => "PHYSICIAN NAME",
            Self::PhysicianDescription => "PHYSICIAN DESCRIPTION (DPJP/IGD/POLICLINIC)",
            Self::ClientName => "CLIENT NAME",
            Self::ClientDob => "CLIENTS DOB (month, day, year)",
            Self::ClientSex => "CLIENTS SEX",
            Self::ClientAddress => "CLIENTS ADDRESS",
            Self::ClientMemberId => "CLIENTS MEMBER ID",
            Self::ClientMrNumber => "CLIENTS MR NUMBER",
            Self::ClientInvoiceNumber => "CLIENTS INVOICE NUMBER",
            Self::ClientRegisterNumber => "CLIENTSREGISTER NUMBER",
            Self::ClientOtherNumber => "CLIENTS OTHER NUMBER",
            Self::Admission => "admission",
            Self::Discharge => "discharge",
            Self::LengthOfStay => "LoS",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Provider-side columns the claim team fills in by hand are flagged red.
    pub fn header_fill(self) -> HeaderFill {
        match self {
            Self::ProvId | Self::ProviderName | Self::Helper => HeaderFill::Red,
            _ => HeaderFill::Yellow,
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, Self::GivenDate | Self::Admission | Self::Discharge)
    }
}

/// One output line. Every canonical column is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    values: [String; 32],
}

impl Default for OutputRow {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| String::new()),
        }
    }
}

impl OutputRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: OutputColumn) -> &str {
        &self.values[column.index()]
    }

    pub fn set(&mut self, column: OutputColumn, value: impl Into<String>) {
        self.values[column.index()] = value.into();
    }

    /// (header, value) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        OutputColumn::ALL
            .iter()
            .map(move |c| (c.header(), self.values[c.index()].as_str()))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (header, value) in self.iter() {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// Ordered output rows, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutputTable {
    rows: Vec<OutputRow>,
}

impl OutputTable {
    pub fn new(rows: Vec<OutputRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [OutputRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values(&self, column: OutputColumn) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r.get(column))
    }
}
