//! The seam toward the database nucleus.
//!
//! A [`Connector`] opens a [`Link`] for a parsed connection string; the
//! link executes searches and hands back a fully materialized
//! [`ResultSet`]. Failures are reported as a [`LinkError`] carrying an
//! ADABAS-style response code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;
use crate::format::FieldList;
use crate::result::ResultSet;

// ── Response codes ─────────────────────────────────────────────────

/// File (or map) not found.
pub const RSP_FILE_NOT_FOUND: i32 = 17;
/// Command not valid in the current context (e.g. map access disabled).
pub const RSP_INVALID_COMMAND: i32 = 22;
/// Format buffer names a field that is not defined.
pub const RSP_FORMAT_BUFFER: i32 = 41;
/// Record buffer does not match the format buffer.
pub const RSP_RECORD_BUFFER: i32 = 53;
/// Search buffer (predicate) is malformed.
pub const RSP_SEARCH_BUFFER: i32 = 61;
/// Database not active or not reachable.
pub const RSP_NOT_ACTIVE: i32 = 148;

// ── Target ─────────────────────────────────────────────────────────

/// What a search runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A map (logical view) by name.
    #[serde(rename = "map")]
    Name(String),
    /// A file by number.
    File(u32),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "map {name}"),
            Self::File(n) => write!(f, "file {n}"),
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for Target {
    fn from(file: u32) -> Self {
        Self::File(file)
    }
}

// ── SearchRequest ──────────────────────────────────────────────────

/// One search as handed to a link.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    /// Map or file to search.
    pub target: &'a Target,
    /// Fields to project.
    pub fields: &'a FieldList,
    /// Predicate, passed through verbatim.
    pub predicate: &'a str,
}

// ── LinkError ──────────────────────────────────────────────────────

/// A failure reported by the nucleus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response {code}: {message}")]
pub struct LinkError {
    /// Response code.
    pub code: i32,
    /// Response text.
    pub message: String,
}

impl LinkError {
    /// Create a link error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

// ── Traits ─────────────────────────────────────────────────────────

/// Opens links to a database.
pub trait Connector {
    /// Open a link for the given configuration.
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Link>, LinkError>;
}

/// A live link to a database, owned by one session.
pub trait Link: fmt::Debug {
    /// Execute a search and return its result set.
    fn search(&mut self, request: &SearchRequest<'_>) -> Result<ResultSet, LinkError>;

    /// Release the link. Called exactly once by the owning session.
    fn close(&mut self) -> Result<(), LinkError>;
}
