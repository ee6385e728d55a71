//! Requested field lists.
//!
//! A field list names the fields a search should project, in the
//! format-buffer style used by the direct call interface:
//! `"AA,AB,AH"` or `"AA,AB,AH."`. An empty list or `*` requests every
//! field of the target. Names are opaque and are not checked here; the
//! nucleus rejects names it does not know.

use std::fmt;

/// An ordered, de-duplicated list of requested field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    names: Vec<String>,
}

impl FieldList {
    /// Build a list from field names. Blank names are skipped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for name in names {
            list.push(name.as_ref());
        }
        list
    }

    /// A list requesting all fields.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a format-buffer style field list.
    pub fn parse(spec: &str) -> Self {
        let trimmed = spec.trim().trim_end_matches('.');
        if trimmed.trim() == "*" {
            return Self::all();
        }
        Self::new(trimmed.split(','))
    }

    fn push(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || name == "*" || self.names.iter().any(|n| n == name) {
            return;
        }
        self.names.push(name.to_string());
    }

    /// Whether every field is requested.
    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    /// The requested names in request order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of explicitly requested names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names were given.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("*");
        }
        f.write_str(&self.names.join(","))
    }
}

// ── Tests ──────────────────────────────────────────────────────────
