use serde::Serialize;
use std::collections::BTreeMap;

use crate::vocabulary::LogicalField;

/// One inferred billing line or entity snapshot: logical field -> cleaned value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedRecord {
    fields: BTreeMap<LogicalField, String>,
}

impl ExtractedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: LogicalField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Value of `field`, or `""` when absent.
    pub fn text(&self, field: LogicalField) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn contains(&self, field: LogicalField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Overwrite this record's fields with those of `other`.
    pub fn merge(&mut self, other: ExtractedRecord) {
        self.fields.extend(other.fields);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl FromIterator<(LogicalField, String)> for ExtractedRecord {
    fn from_iter<T: IntoIterator<Item = (LogicalField, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
