//! Data Definition Modules (maps).
//!
//! A DDM is a named logical view of one file: it maps long field names
//! (e.g. `PERSONNEL-ID`) to the file's short names (e.g. `AA`). A search
//! by name runs against the DDM's file and reports long names.

use std::collections::HashMap;

/// Data Definition Module: a named view of a file.
#[derive(Debug, Clone)]
pub struct Ddm {
    /// DDM name (e.g. `EMPLOYEES-NAT-DDM`).
    pub name: String,
    /// File number this DDM refers to.
    pub file_number: u32,
    long_to_short: HashMap<String, String>,
    short_to_long: HashMap<String, String>,
    entries: Vec<DdmEntry>,
}

/// A single long-name to short-name mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdmEntry {
    /// The long field name.
    pub long_name: String,
    /// The short field (or group) name.
    pub short_name: String,
}

impl Ddm {
    /// Create a new, empty DDM.
    pub fn new(name: impl Into<String>, file_number: u32) -> Self {
        Self {
            name: name.into(),
            file_number,
            long_to_short: HashMap::new(),
            short_to_long: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Add a field mapping. The first long name given for a short name is
    /// the one reported in results.
    pub fn with_field(mut self, long_name: impl Into<String>, short_name: impl Into<String>) -> Self {
        let long = long_name.into();
        let short = short_name.into();
        self.long_to_short.insert(long.clone(), short.clone());
        self.short_to_long
            .entry(short.clone())
            .or_insert_with(|| long.clone());
        self.entries.push(DdmEntry {
            long_name: long,
            short_name: short,
        });
        self
    }

    /// Resolve a long name to a short name.
    pub fn resolve(&self, long_name: &str) -> Option<&str> {
        self.long_to_short.get(long_name).map(String::as_str)
    }

    /// Reverse lookup: the long name reported for a short name.
    pub fn long_name(&self, short_name: &str) -> Option<&str> {
        self.short_to_long.get(short_name).map(String::as_str)
    }

    /// Return all entries in definition order.
    pub fn entries(&self) -> &[DdmEntry] {
        &self.entries
    }

    /// Return the number of mappings.
    pub fn field_count(&self) -> usize {
        self.entries.len()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
