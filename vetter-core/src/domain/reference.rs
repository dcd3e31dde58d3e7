// vetter-core/src/domain/reference.rs

use std::collections::HashMap;

use crate::domain::error::DomainError;
use crate::domain::metadata::{MetaDataset, MetaId};
use crate::domain::record::{DataFormat, FieldSlot, Record};

/// Metadata of a reference dataset together with the storage format of its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMetadata {
    pub meta: MetaDataset,
    pub format: DataFormat,
}

/// A reference dataset held in memory for the whole run.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    pub meta_id: MetaId,
    pub name: String,
    rows: Vec<Record>,
    // Derived key columns for membership tests, built on first lookup.
    key_columns: HashMap<FieldSlot, Vec<Option<String>>>,
}

impl ReferenceDataset {
    pub fn new(meta_id: MetaId, name: impl Into<String>, rows: Vec<Record>) -> Result<Self, DomainError> {
        let name = name.into();
        if rows.is_empty() {
            return Err(DomainError::EmptyReferenceDataset(name));
        }
        Ok(Self {
            meta_id,
            name,
            rows,
            key_columns: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    /// Membership test of `value` in the key column at `slot` (first match wins).
    ///
    /// Delimited data must expose the key column in its first row.
    pub fn contains_key(&mut self, slot: FieldSlot, value: &str) -> Result<bool, DomainError> {
        if let Some(Record::Delimited(first)) = self.rows.first() {
            if first.len() < slot.position {
                return Err(DomainError::ReferenceKeyColumnMissing {
                    meta_id: self.meta_id,
                    position: slot.position,
                });
            }
        }

        let rows = &self.rows;
        let column = self.key_columns.entry(slot).or_insert_with(|| {
            rows.iter()
                .map(|row| row.value(slot).map(str::to_string))
                .collect()
        });

        Ok(column.iter().any(|key| key.as_deref() == Some(value)))
    }

    /// Index of the first row whose key fields all equal the given values.
    ///
    /// Rows too short for any key slot never match.
    pub fn find_match(&self, keys: &[(FieldSlot, String)]) -> Option<usize> {
        self.rows.iter().position(|row| {
            keys.iter()
                .all(|(slot, expected)| row.value(*slot) == Some(expected.as_str()))
        })
    }
}
