//! Query sessions.
//!
//! A [`Session`] is one open connection to a database plus the result
//! set of its most recent successful search. It is the handle through
//! which the Connection Manager, Search Executor, Field Name Enumerator
//! and Record Value Accessor are reached:
//!
//! - `open` / `close` manage the connection
//! - `search_by_name` / `search_by_id` replace the live result set
//! - `field_names` lists the fields of the live result set
//! - `string_value` / `integer_value` read one value of one record
//!
//! Every operation on a closed session fails with
//! [`AdaError::InvalidHandle`]. Dropping an open session closes it.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::format::FieldList;
use crate::link::{Connector, Link, SearchRequest, Target};
use crate::result::{Records, ResultSet};
use crate::{AdaError, AdaResult};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// An open (or closed) query session.
#[derive(Debug)]
pub struct Session {
    id: u64,
    config: ConnectionConfig,
    link: Option<Box<dyn Link>>,
    result: Option<ResultSet>,
}

impl Session {
    /// Open a session from a connection string such as
    /// `acj;target=24;config=[24,4]`.
    pub fn open(connector: &dyn Connector, configuration: &str) -> AdaResult<Self> {
        Self::open_with(connector, configuration.parse()?)
    }

    /// Open a session from an already parsed configuration.
    pub fn open_with(connector: &dyn Connector, config: ConnectionConfig) -> AdaResult<Self> {
        let link = connector
            .connect(&config)
            .map_err(|e| AdaError::Connection {
                reason: format!("{config}: {e}"),
            })?;
        let id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        info!(session = id, config = %config, "session opened");
        Ok(Self {
            id,
            config,
            link: Some(link),
            result: None,
        })
    }

    /// Session identifier, unique within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The configuration the session was opened with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Whether the session is still open.
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Close the session and release its result set.
    pub fn close(&mut self) -> AdaResult<()> {
        let mut link = self.link.take().ok_or(AdaError::InvalidHandle)?;
        self.result = None;
        link.close().map_err(|e| AdaError::Connection {
            reason: format!("close failed: {e}"),
        })?;
        info!(session = self.id, "session closed");
        Ok(())
    }

    // ── Search Executor ────────────────────────────────────────────

    /// Search a map by name; `fields` are long names. Returns the number
    /// of records found.
    ///
    /// Blank names and `*` in `fields` are skipped, so `&["*", "NAME"]`
    /// requests `NAME` only. A list with no other names requests every
    /// field the map names.
    pub fn search_by_name<S: AsRef<str>>(
        &mut self,
        map: &str,
        fields: &[S],
        predicate: &str,
    ) -> AdaResult<usize> {
        self.search(Target::from(map), &FieldList::new(fields), predicate)
    }

    /// Search a file by number; `fields` are short names. Returns the
    /// number of records found.
    ///
    /// Blank names and `*` are skipped as for [`Session::search_by_name`];
    /// a list with no other names requests every field of the file.
    pub fn search_by_id<S: AsRef<str>>(
        &mut self,
        file: u32,
        fields: &[S],
        predicate: &str,
    ) -> AdaResult<usize> {
        self.search(Target::File(file), &FieldList::new(fields), predicate)
    }

    /// Run a search and make its records the live result set. On failure
    /// no result set is live afterwards.
    pub fn search(&mut self, target: Target, fields: &FieldList, predicate: &str) -> AdaResult<usize> {
        let link = self.link.as_mut().ok_or(AdaError::InvalidHandle)?;
        self.result = None;
        let request = SearchRequest {
            target: &target,
            fields,
            predicate,
        };
        match link.search(&request) {
            Ok(result) => {
                let count = result.count();
                info!(
                    session = self.id,
                    search_target = %target,
                    fields = %fields,
                    count,
                    "search complete"
                );
                self.result = Some(result);
                Ok(count)
            }
            Err(e) => {
                warn!(
                    session = self.id,
                    search_target = %target,
                    code = e.code,
                    "search failed: {}",
                    e.message
                );
                Err(AdaError::Search {
                    target: target.to_string(),
                    code: e.code,
                    message: e.message,
                })
            }
        }
    }

    // ── Field Name Enumerator ──────────────────────────────────────

    /// Field names of the live result set, in server order.
    pub fn field_names(&self) -> AdaResult<Vec<String>> {
        Ok(self.result()?.field_names().to_vec())
    }

    /// Number of records in the live result set.
    pub fn record_count(&self) -> AdaResult<usize> {
        Ok(self.result()?.count())
    }

    // ── Record Value Accessor ──────────────────────────────────────

    /// String value of `field` in the 1-based `record`.
    pub fn string_value(&self, record: i64, field: &str) -> AdaResult<String> {
        self.result()?.string_value(record, field)
    }

    /// Copy the string value into `buf`, returning the bytes written.
    /// Nothing is written if the value does not fit.
    pub fn copy_string_value(&self, record: i64, field: &str, buf: &mut [u8]) -> AdaResult<usize> {
        let value = self.string_value(record, field)?;
        let bytes = value.as_bytes();
        let capacity = buf.len();
        let target = buf
            .get_mut(..bytes.len())
            .ok_or_else(|| AdaError::BufferTooSmall {
                field: field.to_string(),
                needed: bytes.len(),
                capacity,
            })?;
        target.copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Integer value of `field` in the 1-based `record`.
    pub fn integer_value(&self, record: i64, field: &str) -> AdaResult<i64> {
        self.result()?.integer_value(record, field)
    }

    /// Iterate over the records of the live result set.
    pub fn records(&self) -> AdaResult<Records<'_>> {
        Ok(self.result()?.records())
    }

    fn result(&self) -> AdaResult<&ResultSet> {
        if self.link.is_none() {
            return Err(AdaError::InvalidHandle);
        }
        self.result.as_ref().ok_or(AdaError::InvalidState)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut link) = self.link.take() {
            match link.close() {
                Ok(()) => debug!(session = self.id, "session closed on drop"),
                Err(e) => warn!(session = self.id, "close on drop failed: {e}"),
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
