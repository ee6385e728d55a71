//! Predicate parsing and evaluation for the in-memory nucleus.
//!
//! A predicate is a sequence of `FIELD=value` terms joined by `AND`,
//! `OR` or `NOT` (case-insensitive), evaluated left to right over sorted
//! ISN lists. Values may be quoted with `'` or `"` to include blanks.
//!
//! ```text
//! AA=11100301
//! NAME=SMITH OR NAME=JONES
//! CITY='NEW YORK' NOT DEPT=TECH05
//! ```

use std::cmp::Ordering;

use crate::link::{LinkError, RSP_SEARCH_BUFFER};

/// Internal Sequence Number: record identifier within a file.
pub type Isn = u64;

// ── LogicalOp ──────────────────────────────────────────────────────

/// Logical connectors between search terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Intersection of ISN sets.
    And,
    /// Union of ISN sets.
    Or,
    /// Subtract the following term's ISNs.
    Not,
}

impl LogicalOp {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }
}

// ── SearchCriteria ─────────────────────────────────────────────────

/// A single `FIELD=value` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Field name as written in the predicate.
    pub field: String,
    /// Comparison value, quotes removed.
    pub value: String,
}

impl SearchCriteria {
    /// Create a new term.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    fn parse(token: &str) -> Result<Self, LinkError> {
        let (field, value) = token
            .split_once('=')
            .ok_or_else(|| syntax(format!("expected FIELD=value, got '{token}'")))?;
        let valid = !field.is_empty()
            && field
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(syntax(format!("invalid field name '{field}'")));
        }
        Ok(Self::new(field, value))
    }
}

fn syntax(message: String) -> LinkError {
    LinkError::new(RSP_SEARCH_BUFFER, message)
}

// ── SearchBuffer ───────────────────────────────────────────────────

/// A parsed predicate: terms with the connector preceding each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBuffer {
    /// Terms in order; only the first has no connector.
    pub criteria: Vec<(Option<LogicalOp>, SearchCriteria)>,
}

impl SearchBuffer {
    /// Create a buffer with an initial term.
    pub fn new(initial: SearchCriteria) -> Self {
        Self {
            criteria: vec![(None, initial)],
        }
    }

    /// Append a term with a connector.
    pub fn add(&mut self, op: LogicalOp, criteria: SearchCriteria) {
        self.criteria.push((Some(op), criteria));
    }

    /// Parse a predicate string.
    pub fn parse(predicate: &str) -> Result<Self, LinkError> {
        let tokens = tokenize(predicate)?;
        let mut tokens = tokens.iter();
        let first = tokens
            .next()
            .ok_or_else(|| syntax("empty search predicate".to_string()))?;
        let mut buffer = Self::new(SearchCriteria::parse(first)?);

        while let Some(token) = tokens.next() {
            let op = LogicalOp::parse(token)
                .ok_or_else(|| syntax(format!("expected AND, OR or NOT, got '{token}'")))?;
            let term = tokens
                .next()
                .ok_or_else(|| syntax(format!("dangling connector '{token}'")))?;
            buffer.add(op, SearchCriteria::parse(term)?);
        }
        Ok(buffer)
    }

    /// Evaluate the buffer. `matching` returns the sorted ISNs satisfying
    /// one term, or an error if the term cannot be evaluated.
    pub fn evaluate<F>(&self, mut matching: F) -> Result<Vec<Isn>, LinkError>
    where
        F: FnMut(&SearchCriteria) -> Result<Vec<Isn>, LinkError>,
    {
        let mut result: Option<Vec<Isn>> = None;
        for (op, criterion) in &self.criteria {
            let isns = matching(criterion)?;
            result = Some(match (result, op) {
                (None, _) => isns,
                (Some(current), Some(LogicalOp::Or)) => union_sorted(&current, &isns),
                (Some(current), Some(LogicalOp::Not)) => subtract_sorted(&current, &isns),
                (Some(current), Some(LogicalOp::And) | None) => {
                    intersect_sorted(&current, &isns)
                }
            });
        }
        Ok(result.unwrap_or_default())
    }
}

/// Split on blanks outside quotes; quotes are removed.
fn tokenize(input: &str) -> Result<Vec<String>, LinkError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if quote.is_some() {
        return Err(syntax("unterminated quote in predicate".to_string()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Compute the intersection of two sorted ISN lists.
fn intersect_sorted(a: &[Isn], b: &[Isn]) -> Vec<Isn> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    result
}

/// Compute the union of two sorted ISN lists.
fn union_sorted(a: &[Isn], b: &[Isn]) -> Vec<Isn> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

/// Subtract ISNs in `b` from `a` (both sorted).
fn subtract_sorted(a: &[Isn], b: &[Isn]) -> Vec<Isn> {
    let mut result = Vec::new();
    let mut j = 0;
    for &isn in a {
        while j < b.len() && b[j] < isn {
            j += 1;
        }
        if j >= b.len() || b[j] != isn {
            result.push(isn);
        }
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────
