//! Result sets and record views.
//!
//! A [`ResultSet`] is what a link returns for one search: the field
//! names in server order and, per record, one value per name. Records
//! are addressed by 1-based index.

use std::collections::HashMap;

use crate::link::{LinkError, RSP_RECORD_BUFFER};
use crate::value::FieldValue;
use crate::{AdaError, AdaResult};

// ── ResultSet ──────────────────────────────────────────────────────

/// The records and field names produced by one search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Vec<FieldValue>>,
}

impl ResultSet {
    /// Create an empty result set with the given column names.
    /// Duplicate names keep their first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.into();
            if set.index.contains_key(&name) {
                continue;
            }
            set.index.insert(name.clone(), set.names.len());
            set.names.push(name);
        }
        set
    }

    /// Append a record; `values` must hold one value per column.
    pub fn push_record(&mut self, values: Vec<FieldValue>) -> Result<(), LinkError> {
        if values.len() != self.names.len() {
            return Err(LinkError::new(
                RSP_RECORD_BUFFER,
                format!(
                    "record holds {} values for {} fields",
                    values.len(),
                    self.names.len()
                ),
            ));
        }
        self.records.push(values);
        Ok(())
    }

    /// Number of records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Field names in server order.
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    /// Whether `field` is one of the result's columns.
    pub fn contains(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    /// Look up one value by 1-based record index and field name.
    pub fn value(&self, record: i64, field: &str) -> AdaResult<&FieldValue> {
        let row = usize::try_from(record)
            .ok()
            .and_then(|r| r.checked_sub(1))
            .and_then(|r| self.records.get(r))
            .ok_or(AdaError::OutOfRange {
                index: record,
                count: self.records.len(),
            })?;
        let column = self
            .index
            .get(field)
            .ok_or_else(|| AdaError::UnknownField {
                field: field.to_string(),
            })?;
        Ok(&row[*column])
    }

    /// String projection of one value.
    pub fn string_value(&self, record: i64, field: &str) -> AdaResult<String> {
        self.value(record, field).map(ToString::to_string)
    }

    /// Integer projection of one value.
    pub fn integer_value(&self, record: i64, field: &str) -> AdaResult<i64> {
        let value = self.value(record, field)?;
        value.to_i64().ok_or_else(|| AdaError::TypeMismatch {
            field: field.to_string(),
            format: value.field_type(),
        })
    }

    /// Iterate over all records.
    pub fn records(&self) -> Records<'_> {
        Records {
            result: self,
            next: 1,
        }
    }
}

// ── RecordView ─────────────────────────────────────────────────────

/// One record of a result set.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    result: &'a ResultSet,
    index: i64,
}

impl<'a> RecordView<'a> {
    /// The 1-based record index.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// Raw value of a field.
    pub fn value(&self, field: &str) -> AdaResult<&'a FieldValue> {
        self.result.value(self.index, field)
    }

    /// String projection of a field.
    pub fn string(&self, field: &str) -> AdaResult<String> {
        self.result.string_value(self.index, field)
    }

    /// Integer projection of a field.
    pub fn integer(&self, field: &str) -> AdaResult<i64> {
        self.result.integer_value(self.index, field)
    }
}

/// Iterator over the records of a result set.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    result: &'a ResultSet,
    next: i64,
}

impl<'a> Iterator for Records<'a> {
    type Item = RecordView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.result.count() as i64 {
            return None;
        }
        let view = RecordView {
            result: self.result,
            index: self.next,
        };
        self.next += 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.result.count() as i64 - self.next + 1).max(0) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Records<'_> {}

// ── Tests ──────────────────────────────────────────────────────────
