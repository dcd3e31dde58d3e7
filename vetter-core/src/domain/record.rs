// vetter-core/src/domain/record.rs
//
// Field addressing. Positions are 1-based. Fixed-width slices count
// characters of the decoded line.

use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    Csv,
    Fixed,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Fixed => "fixed",
        }
    }
}

/// Resolved address of a field: 1-based position, plus the slice length for
/// fixed-width data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSlot {
    pub position: usize,
    pub bytes: Option<usize>,
}

impl FieldSlot {
    pub fn column(position: usize) -> Self {
        Self {
            position,
            bytes: None,
        }
    }

    pub fn fixed(position: usize, bytes: usize) -> Self {
        Self {
            position,
            bytes: Some(bytes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceRejected {
    /// Delimited row has no column at the slot position.
    OutOfRange,
    /// Fixed-width slice is missing or the replacement would change the line length.
    LengthMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Delimited(Vec<String>),
    Fixed(String),
}

impl Record {
    /// Returns the addressed value, or `None` when the slot lies outside the record.
    pub fn value(&self, slot: FieldSlot) -> Option<&str> {
        match self {
            Record::Delimited(columns) => columns
                .get(slot.position.checked_sub(1)?)
                .map(String::as_str),
            Record::Fixed(line) => {
                let span = char_span(line, slot.position, slot.bytes?)?;
                line.get(span)
            }
        }
    }

    /// Rewrites the addressed field in place and hands back the previous value.
    pub fn replace(&mut self, slot: FieldSlot, value: &str) -> Result<String, ReplaceRejected> {
        match self {
            Record::Delimited(columns) => {
                let cell = slot
                    .position
                    .checked_sub(1)
                    .and_then(|idx| columns.get_mut(idx))
                    .ok_or(ReplaceRejected::OutOfRange)?;
                Ok(std::mem::replace(cell, value.to_string()))
            }
            Record::Fixed(line) => {
                let bytes = slot.bytes.ok_or(ReplaceRejected::LengthMismatch)?;
                if value.chars().count() != bytes {
                    return Err(ReplaceRejected::LengthMismatch);
                }
                let span =
                    char_span(line, slot.position, bytes).ok_or(ReplaceRejected::LengthMismatch)?;
                let previous = line[span.clone()].to_string();
                line.replace_range(span, value);
                Ok(previous)
            }
        }
    }
}

// Byte range of `length` characters starting at the 1-based character `position`.
fn char_span(line: &str, position: usize, length: usize) -> Option<Range<usize>> {
    let first = position.checked_sub(1)?;
    let mut boundaries = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()));
    let start = boundaries.nth(first)?;
    let end = match length {
        0 => start,
        n => boundaries.nth(n - 1)?,
    };
    Some(start..end)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(cols: &[&str]) -> Record {
        Record::Delimited(cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_delimited_value_by_position() {
        let record = row(&["001", "ABC", "05"]);
        assert_eq!(record.value(FieldSlot::column(1)), Some("001"));
        assert_eq!(record.value(FieldSlot::column(3)), Some("05"));
        assert_eq!(record.value(FieldSlot::column(4)), None);
        assert_eq!(record.value(FieldSlot::column(0)), None);
    }

    #[test]
    fn test_fixed_value_requires_full_slice() {
        let record = Record::Fixed("001ABC05".to_string());
        assert_eq!(record.value(FieldSlot::fixed(4, 3)), Some("ABC"));
        assert_eq!(record.value(FieldSlot::fixed(7, 2)), Some("05"));
        assert_eq!(record.value(FieldSlot::fixed(7, 3)), None);
        assert_eq!(record.value(FieldSlot::column(1)), None);
    }

    #[test]
    fn test_fixed_slices_count_characters() {
        let record = Record::Fixed("東京01".to_string());
        assert_eq!(record.value(FieldSlot::fixed(1, 2)), Some("東京"));
        assert_eq!(record.value(FieldSlot::fixed(3, 2)), Some("01"));
    }

    #[test]
    fn test_fixed_replace_preserves_length() {
        let mut record = Record::Fixed("001ABC05".to_string());
        let previous = record.replace(FieldSlot::fixed(7, 2), "00").unwrap();

        assert_eq!(previous, "05");
        assert_eq!(record, Record::Fixed("001ABC00".to_string()));

        assert_eq!(
            record.replace(FieldSlot::fixed(7, 2), "000"),
            Err(ReplaceRejected::LengthMismatch)
        );
        assert_eq!(
            record.replace(FieldSlot::fixed(8, 2), "00"),
            Err(ReplaceRejected::LengthMismatch)
        );
        assert_eq!(record, Record::Fixed("001ABC00".to_string()));
    }

    #[test]
    fn test_delimited_replace_out_of_range() {
        let mut record = row(&["001", "ABC"]);
        assert_eq!(
            record.replace(FieldSlot::column(3), "X"),
            Err(ReplaceRejected::OutOfRange)
        );
        assert_eq!(record.replace(FieldSlot::column(2), "XYZ").unwrap(), "ABC");
        assert_eq!(record, row(&["001", "XYZ"]));
    }
}
