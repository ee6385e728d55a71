//! Field Definition Table.
//!
//! Describes the schema of a file held by the in-memory nucleus:
//! typed elementary fields in definition order plus groups that name a
//! run of member fields. Requesting a group in a search projects all of
//! its members.

use std::collections::HashMap;

use crate::{AdaError, AdaResult};

// ── FieldType ──────────────────────────────────────────────────────

/// The storage format of an ADABAS field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Alphanumeric (left-justified, blank-padded).
    Alpha,
    /// Unpacked decimal.
    Unpacked,
    /// Packed decimal.
    Packed,
    /// Fixed-point binary integer (1, 2, 4 or 8 bytes).
    FixedPoint,
    /// Floating point.
    Float,
    /// Raw binary.
    Binary,
}

impl FieldType {
    /// Whether values of this format project onto a 64-bit integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Unpacked | Self::Packed | Self::FixedPoint)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Alpha => "A",
            Self::Unpacked => "U",
            Self::Packed => "P",
            Self::FixedPoint => "F",
            Self::Float => "G",
            Self::Binary => "B",
        };
        f.write_str(s)
    }
}

// ── FieldDef ───────────────────────────────────────────────────────

/// A single elementary field definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Short name (e.g. "AA").
    pub name: String,
    /// Storage format.
    pub field_type: FieldType,
    /// Maximum byte length (native width for fixed point).
    pub length: u16,
}

impl FieldDef {
    /// Create a new field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType, length: u16) -> Self {
        Self {
            name: name.into(),
            field_type,
            length,
        }
    }

    /// Shorthand for an alphanumeric field.
    pub fn alpha(name: impl Into<String>, length: u16) -> Self {
        Self::new(name, FieldType::Alpha, length)
    }

    fn validate(&self) -> AdaResult<()> {
        let ok = match self.field_type {
            FieldType::FixedPoint => matches!(self.length, 1 | 2 | 4 | 8),
            FieldType::Float => matches!(self.length, 4 | 8),
            _ => self.length > 0,
        };
        if ok {
            Ok(())
        } else {
            Err(AdaError::Definition {
                reason: format!(
                    "field '{}' format {} cannot have length {}",
                    self.name, self.field_type, self.length
                ),
            })
        }
    }
}

// ── GroupField ─────────────────────────────────────────────────────

/// A named group of elementary fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupField {
    /// Group name.
    pub name: String,
    /// Member field names (in order).
    pub members: Vec<String>,
}

impl GroupField {
    /// Create a new, empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member field to the group.
    pub fn with_member(mut self, field_name: impl Into<String>) -> Self {
        self.members.push(field_name.into());
        self
    }
}

// ── Fdt ────────────────────────────────────────────────────────────

/// Field Definition Table: the schema of a file.
#[derive(Debug, Clone, Default)]
pub struct Fdt {
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
    groups: HashMap<String, GroupField>,
}

impl Fdt {
    /// Create an empty FDT.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an elementary field.
    pub fn add_field(&mut self, field: FieldDef) -> AdaResult<()> {
        field.validate()?;
        if self.index.contains_key(&field.name) || self.groups.contains_key(&field.name) {
            return Err(AdaError::DuplicateField { name: field.name });
        }
        self.index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Add a group. All members must already be defined.
    pub fn add_group(&mut self, group: GroupField, file_number: u32) -> AdaResult<()> {
        if self.index.contains_key(&group.name) || self.groups.contains_key(&group.name) {
            return Err(AdaError::DuplicateField { name: group.name });
        }
        if let Some(missing) = group.members.iter().find(|m| !self.index.contains_key(*m)) {
            return Err(AdaError::UndefinedField {
                field: missing.clone(),
                file_number,
            });
        }
        self.groups.insert(group.name.clone(), group);
        Ok(())
    }

    /// Look up an elementary field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Position of an elementary field in definition order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Return all elementary fields in definition order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupField> {
        self.groups.get(name)
    }

    /// Whether `name` is a field or a group.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.groups.contains_key(name)
    }

    /// Expand a field or group name into definition-order positions.
    pub fn resolve(&self, name: &str) -> Option<Vec<usize>> {
        if let Some(&pos) = self.index.get(name) {
            return Some(vec![pos]);
        }
        let group = self.groups.get(name)?;
        let mut positions: Vec<usize> = group
            .members
            .iter()
            .filter_map(|m| self.index.get(m).copied())
            .collect();
        positions.sort_unstable();
        Some(positions)
    }

    /// Return the number of elementary fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
