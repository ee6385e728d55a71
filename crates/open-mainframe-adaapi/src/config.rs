//! Connection string parsing.
//!
//! A connection string is a semicolon-separated list of tokens:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | first token | transport selector (e.g. `acj`) |
//! | `target=<dbid>` | database id of the data target |
//! | `map`, `mapping` | enable map (logical view) access |
//! | `map=<NAME>` | enable map access with a default map name |
//! | `config=[<dbid>,<fnr>]` | location of the map repository |
//!
//! Anything else, including empty or repeated tokens, is malformed.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::{AdaError, AdaResult};

// ── RepositoryRef ──────────────────────────────────────────────────

/// The `config=[a,b]` pair: database id and file number holding map
/// definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Database id of the repository.
    pub database: u32,
    /// File number of the repository.
    pub file: u32,
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.database, self.file)
    }
}

// ── ConnectionConfig ───────────────────────────────────────────────

/// Parsed connection options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Transport selector (first token).
    pub transport: String,
    /// Database id given by `target=`.
    pub target: Option<u32>,
    /// Whether map access was requested.
    pub mapping: bool,
    /// Default map name given by `map=NAME`.
    pub map_name: Option<String>,
    /// Map repository given by `config=[..]`.
    pub repository: Option<RepositoryRef>,
}

impl ConnectionConfig {
    /// Create a configuration for the given transport with no options.
    pub fn new(transport: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            target: None,
            mapping: false,
            map_name: None,
            repository: None,
        }
    }

    /// Set the target database id.
    pub fn with_target(mut self, database: u32) -> Self {
        self.target = Some(database);
        self
    }

    /// Enable map access.
    pub fn with_mapping(mut self) -> Self {
        self.mapping = true;
        self
    }

    /// Set the map repository.
    pub fn with_repository(mut self, database: u32, file: u32) -> Self {
        self.repository = Some(RepositoryRef { database, file });
        self
    }
}

fn malformed(input: &str, detail: impl fmt::Display) -> AdaError {
    AdaError::Connection {
        reason: format!("malformed connection string '{input}': {detail}"),
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn parse_positive(input: &str, text: &str, what: &str) -> AdaResult<u32> {
    match text.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(malformed(input, format!("{what} must be a positive integer, got '{text}'"))),
    }
}

fn parse_repository(input: &str, value: &str) -> AdaResult<RepositoryRef> {
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| malformed(input, "config expects '[<dbid>,<fnr>]'"))?;
    let (database, file) = inner
        .split_once(',')
        .ok_or_else(|| malformed(input, "config expects two values"))?;
    Ok(RepositoryRef {
        database: parse_positive(input, database, "config database id")?,
        file: parse_positive(input, file, "config file number")?,
    })
}

impl FromStr for ConnectionConfig {
    type Err = AdaError;

    fn from_str(input: &str) -> AdaResult<Self> {
        let mut tokens = input.split(';').map(str::trim);
        let transport = tokens.next().unwrap_or_default();
        if !is_identifier(transport) {
            return Err(malformed(input, "missing transport selector"));
        }
        let mut config = ConnectionConfig::new(transport);

        for token in tokens {
            debug!(token, "connection token");
            if token.is_empty() {
                return Err(malformed(input, "empty token"));
            }
            let (key, value) = match token.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v)),
                None => (token, None),
            };
            match (key, value) {
                ("map" | "mapping", None) => {
                    if config.mapping {
                        return Err(malformed(input, "map given twice"));
                    }
                    config.mapping = true;
                }
                ("map", Some(name)) => {
                    if config.mapping {
                        return Err(malformed(input, "map given twice"));
                    }
                    let name = name.trim();
                    if !is_identifier(name) {
                        return Err(malformed(input, format!("invalid map name '{name}'")));
                    }
                    config.mapping = true;
                    config.map_name = Some(name.to_string());
                }
                ("target", Some(v)) => {
                    if config.target.is_some() {
                        return Err(malformed(input, "target given twice"));
                    }
                    config.target = Some(parse_positive(input, v, "target")?);
                }
                ("config", Some(v)) => {
                    if config.repository.is_some() {
                        return Err(malformed(input, "config given twice"));
                    }
                    config.repository = Some(parse_repository(input, v)?);
                }
                _ => return Err(malformed(input, format!("unrecognized token '{token}'"))),
            }
        }
        Ok(config)
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.transport)?;
        if let Some(target) = self.target {
            write!(f, ";target={target}")?;
        }
        match (&self.map_name, self.mapping) {
            (Some(name), _) => write!(f, ";map={name}")?,
            (None, true) => f.write_str(";map")?,
            (None, false) => {}
        }
        if let Some(repo) = self.repository {
            write!(f, ";config={repo}")?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
