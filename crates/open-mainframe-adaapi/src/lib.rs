#![forbid(unsafe_code)]
//! ADABAS client query sessions.
//!
//! This crate provides:
//!
//! - **Connection Manager**: connection string parsing, session open/close
//! - **Search Executor**: search by map name or by file number
//! - **Field Name Enumerator**: field names present in the live result set
//! - **Record Value Accessor**: string and 64-bit integer projections per record
//! - **Link Seam**: `Connector` / `Link` traits toward the database nucleus
//! - **In-Memory Nucleus**: read-only FDT/DDM database implementing the seam
//! - **Query Profiles**: serializable schema descriptors for drivers
//!
//! ```no_run
//! use open_mainframe_adaapi::{demo, Session};
//!
//! let nucleus = demo::employees_nucleus()?;
//! let mut session = Session::open(&nucleus, "acj;map;config=[24,4]")?;
//! let count = session.search_by_name(
//!     "EMPLOYEES-NAT-DDM",
//!     &["PERSONNEL-ID", "FULL-NAME", "BIRTH"],
//!     "PERSONNEL-ID=11100301",
//! )?;
//! for record in session.records()? {
//!     println!("{} -> {}", record.index(), record.string("NAME")?);
//! }
//! # let _ = count;
//! session.close()?;
//! # Ok::<(), open_mainframe_adaapi::AdaError>(())
//! ```

pub mod config;
pub mod ddm;
pub mod demo;
pub mod fdt;
pub mod format;
pub mod link;
pub mod nucleus;
pub mod profile;
pub mod result;
pub mod search;
pub mod session;
pub mod value;

// ── Re-exports ─────────────────────────────────────────────────────

pub use config::{ConnectionConfig, RepositoryRef};
pub use ddm::{Ddm, DdmEntry};
pub use fdt::{Fdt, FieldDef, FieldType, GroupField};
pub use format::FieldList;
pub use link::{Connector, Link, LinkError, SearchRequest, Target};
pub use nucleus::{MemoryNucleus, NucleusBuilder, NucleusParams};
pub use profile::QueryProfile;
pub use result::{RecordView, Records, ResultSet};
pub use search::{LogicalOp, SearchBuffer, SearchCriteria};
pub use session::Session;
pub use value::FieldValue;

// ── Error ──────────────────────────────────────────────────────────

/// Errors produced by the ADABAS client layer.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AdaError {
    /// The session could not be opened or released.
    #[error("connection failed: {reason}")]
    #[diagnostic(help("connection strings look like 'acj;target=24;config=[24,4]'"))]
    Connection {
        /// Why the connection failed.
        reason: String,
    },

    /// The session was closed (or never opened).
    #[error("invalid session handle: session is closed")]
    InvalidHandle,

    /// The nucleus rejected the search.
    #[error("search on {target} failed with response {code}: {message}")]
    Search {
        /// Rendered search target.
        target: String,
        /// Response code reported by the link.
        code: i32,
        /// Response text reported by the link.
        message: String,
    },

    /// No result set is live on the session.
    #[error("no result set available; issue a search first")]
    InvalidState,

    /// The field is not part of the live result set.
    #[error("field '{field}' is not part of the current result set")]
    UnknownField {
        /// The requested field name.
        field: String,
    },

    /// The record index lies outside `1..=count`.
    #[error("record {index} out of range (result set holds {count} records)")]
    OutOfRange {
        /// The requested 1-based index.
        index: i64,
        /// Records in the live result set.
        count: usize,
    },

    /// The field cannot be represented as a 64-bit integer.
    #[error("field '{field}' has format {format} and is not integer-representable")]
    TypeMismatch {
        /// The field name.
        field: String,
        /// Native format of the stored value.
        format: FieldType,
    },

    /// The caller's buffer cannot hold the value.
    #[error("value of field '{field}' needs {needed} bytes, buffer holds {capacity}")]
    BufferTooSmall {
        /// The field name.
        field: String,
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        capacity: usize,
    },

    /// Duplicate field or group name in an FDT or DDM.
    #[error("duplicate field '{name}'")]
    DuplicateField {
        /// The duplicate name.
        name: String,
    },

    /// A definition references a field that does not exist.
    #[error("field '{field}' not defined in file {file_number}")]
    UndefinedField {
        /// The missing field name.
        field: String,
        /// File whose FDT was consulted.
        file_number: u32,
    },

    /// File number or map name defined twice, or referenced but never defined.
    #[error("invalid definition: {reason}")]
    Definition {
        /// What is wrong.
        reason: String,
    },

    /// A stored value does not conform to its field definition.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// The field name.
        field: String,
        /// What is wrong.
        reason: String,
    },

    /// A query profile could not be loaded.
    #[error("profile error: {reason}")]
    Profile {
        /// What is wrong.
        reason: String,
    },
}

/// Result type for client operations.
pub type AdaResult<T> = Result<T, AdaError>;
