//! In-memory database nucleus.
//!
//! [`MemoryNucleus`] is a read-only database held in process memory:
//! numbered files with an FDT and stored records, plus DDMs naming views
//! over those files. It implements [`Connector`], so sessions can be
//! opened against it exactly as against a remote database. Contents are
//! fixed once [`NucleusBuilder::build`] returns; links share them through
//! an `Arc`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConnectionConfig, RepositoryRef};
use crate::ddm::Ddm;
use crate::fdt::{Fdt, FieldDef, FieldType};
use crate::format::FieldList;
use crate::link::{
    Connector, Link, LinkError, SearchRequest, Target, RSP_FILE_NOT_FOUND, RSP_FORMAT_BUFFER,
    RSP_INVALID_COMMAND, RSP_NOT_ACTIVE, RSP_SEARCH_BUFFER,
};
use crate::result::ResultSet;
use crate::search::{Isn, SearchBuffer, SearchCriteria};
use crate::value::FieldValue;
use crate::{AdaError, AdaResult};

// ── NucleusParams ──────────────────────────────────────────────────

/// Configuration parameters for the in-memory nucleus.
#[derive(Debug, Clone)]
pub struct NucleusParams {
    /// Database id answered for `target=`.
    pub database_id: u32,
    /// Whether the nucleus accepts connections.
    pub active: bool,
    /// Accepted transport selectors (empty accepts any).
    pub transports: Vec<String>,
    /// Map repository answered for `config=[..]` (`None` accepts any).
    pub map_repository: Option<RepositoryRef>,
}

impl NucleusParams {
    /// Create active parameters for the given database id.
    pub fn new(database_id: u32) -> Self {
        Self {
            database_id,
            active: true,
            transports: Vec::new(),
            map_repository: None,
        }
    }

    /// Restrict the accepted transport selectors.
    pub fn with_transports<I, S>(mut self, transports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transports = transports.into_iter().map(Into::into).collect();
        self
    }

    /// Set the map repository location.
    pub fn with_map_repository(mut self, database: u32, file: u32) -> Self {
        self.map_repository = Some(RepositoryRef { database, file });
        self
    }

    /// Mark the nucleus as not accepting connections.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

// ── Storage ────────────────────────────────────────────────────────

#[derive(Debug)]
struct StoredFile {
    name: String,
    fdt: Fdt,
    records: BTreeMap<Isn, Vec<FieldValue>>,
    next_isn: Isn,
}

#[derive(Debug)]
struct Database {
    params: NucleusParams,
    files: BTreeMap<u32, StoredFile>,
    maps: HashMap<String, Ddm>,
}

impl Database {
    fn file(&self, file_number: u32) -> Result<&StoredFile, LinkError> {
        self.files.get(&file_number).ok_or_else(|| {
            LinkError::new(
                RSP_FILE_NOT_FOUND,
                format!(
                    "file {file_number} not loaded in database {}",
                    self.params.database_id
                ),
            )
        })
    }
}

fn check_value(def: &FieldDef, value: &FieldValue) -> AdaResult<()> {
    let invalid = |reason: String| AdaError::InvalidValue {
        field: def.name.clone(),
        reason,
    };
    if value.field_type() != def.field_type {
        return Err(invalid(format!(
            "expected format {}, got {}",
            def.field_type,
            value.field_type()
        )));
    }
    let limit = usize::from(def.length);
    let used = match value {
        FieldValue::Alpha(s) => s.len(),
        FieldValue::Binary(b) => b.len(),
        FieldValue::Unpacked(n) => n.unsigned_abs().to_string().len(),
        // Packed stores two digits per byte, less one nibble for the sign.
        FieldValue::Packed(n) => (n.unsigned_abs().to_string().len() + 2) / 2,
        FieldValue::Fixed { width, .. } => usize::from(*width),
        FieldValue::Float(_) => limit,
    };
    if used > limit || (def.field_type == FieldType::FixedPoint && used != limit) {
        return Err(invalid(format!(
            "value needs {used} bytes, field length is {limit}"
        )));
    }
    Ok(())
}

// ── NucleusBuilder ─────────────────────────────────────────────────

/// Loads files, maps and records before the nucleus is opened.
#[derive(Debug)]
pub struct NucleusBuilder {
    db: Database,
}

impl NucleusBuilder {
    /// Create a builder for an empty database.
    pub fn new(params: NucleusParams) -> Self {
        Self {
            db: Database {
                params,
                files: BTreeMap::new(),
                maps: HashMap::new(),
            },
        }
    }

    /// Define a file in the database.
    pub fn define_file(&mut self, file_number: u32, name: &str, fdt: Fdt) -> AdaResult<()> {
        if file_number == 0 || self.db.files.contains_key(&file_number) {
            return Err(AdaError::Definition {
                reason: format!("file number {file_number} unusable or already defined"),
            });
        }
        self.db.files.insert(
            file_number,
            StoredFile {
                name: name.to_string(),
                fdt,
                records: BTreeMap::new(),
                next_isn: 1,
            },
        );
        Ok(())
    }

    /// Define a map over an already defined file.
    pub fn define_map(&mut self, ddm: Ddm) -> AdaResult<()> {
        if self.db.maps.contains_key(&ddm.name) {
            return Err(AdaError::Definition {
                reason: format!("map '{}' already defined", ddm.name),
            });
        }
        let file = self
            .db
            .files
            .get(&ddm.file_number)
            .ok_or_else(|| AdaError::Definition {
                reason: format!("map '{}' refers to undefined file {}", ddm.name, ddm.file_number),
            })?;
        if let Some(entry) = ddm.entries().iter().find(|e| !file.fdt.contains(&e.short_name)) {
            return Err(AdaError::UndefinedField {
                field: entry.short_name.clone(),
                file_number: ddm.file_number,
            });
        }
        let mut seen = HashSet::new();
        if let Some(entry) = ddm.entries().iter().find(|e| !seen.insert(e.long_name.as_str())) {
            return Err(AdaError::DuplicateField {
                name: entry.long_name.clone(),
            });
        }
        self.db.maps.insert(ddm.name.clone(), ddm);
        Ok(())
    }

    /// Store a record given as `(short name, value)` pairs. Fields not
    /// given hold their empty value. Returns the assigned ISN.
    pub fn store<'a, I>(&mut self, file_number: u32, values: I) -> AdaResult<Isn>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let file = self
            .db
            .files
            .get_mut(&file_number)
            .ok_or_else(|| AdaError::Definition {
                reason: format!("store into undefined file {file_number}"),
            })?;
        let mut row: Vec<FieldValue> = file.fdt.fields().iter().map(FieldValue::empty).collect();
        for (name, value) in values {
            let pos = file
                .fdt
                .position(name)
                .ok_or_else(|| AdaError::UndefinedField {
                    field: name.to_string(),
                    file_number,
                })?;
            check_value(&file.fdt.fields()[pos], &value)?;
            row[pos] = value;
        }
        let isn = file.next_isn;
        file.next_isn += 1;
        file.records.insert(isn, row);
        Ok(isn)
    }

    /// Freeze the database.
    pub fn build(self) -> MemoryNucleus {
        info!(
            database = self.db.params.database_id,
            files = self.db.files.len(),
            maps = self.db.maps.len(),
            "in-memory nucleus ready"
        );
        MemoryNucleus {
            db: Arc::new(self.db),
        }
    }
}

// ── MemoryNucleus ──────────────────────────────────────────────────

/// A read-only database served from memory.
#[derive(Debug, Clone)]
pub struct MemoryNucleus {
    db: Arc<Database>,
}

impl MemoryNucleus {
    /// Start building a nucleus.
    pub fn builder(params: NucleusParams) -> NucleusBuilder {
        NucleusBuilder::new(params)
    }

    /// The database id.
    pub fn database_id(&self) -> u32 {
        self.db.params.database_id
    }

    /// Name and record count of a file.
    pub fn file_info(&self, file_number: u32) -> Option<(&str, usize)> {
        self.db
            .files
            .get(&file_number)
            .map(|f| (f.name.as_str(), f.records.len()))
    }

    /// Look up a map by name.
    pub fn map(&self, name: &str) -> Option<&Ddm> {
        self.db.maps.get(name)
    }
}

impl Connector for MemoryNucleus {
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Link>, LinkError> {
        let params = &self.db.params;
        let unreachable = |message: String| Err(LinkError::new(RSP_NOT_ACTIVE, message));
        if !params.active {
            return unreachable(format!("database {} not active", params.database_id));
        }
        if !params.transports.is_empty()
            && !params
                .transports
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&config.transport))
        {
            return unreachable(format!(
                "transport '{}' not served by database {}",
                config.transport, params.database_id
            ));
        }
        if let Some(target) = config.target.filter(|t| *t != params.database_id) {
            return unreachable(format!("database {target} not reachable"));
        }
        if let (Some(wanted), Some(served)) = (config.repository, params.map_repository) {
            if wanted != served {
                return unreachable(format!("map repository {wanted} not reachable"));
            }
        }
        if let Some(name) = config.map_name.as_deref() {
            if !self.db.maps.contains_key(name) {
                return Err(LinkError::new(
                    RSP_FILE_NOT_FOUND,
                    format!("map '{name}' not found in database {}", params.database_id),
                ));
            }
        }
        info!(
            database = params.database_id,
            transport = %config.transport,
            mapping = config.mapping,
            "link opened"
        );
        Ok(Box::new(MemoryLink {
            db: Arc::clone(&self.db),
            mapping: config.mapping,
            open: true,
        }))
    }
}

// ── MemoryLink ─────────────────────────────────────────────────────

#[derive(Debug)]
struct MemoryLink {
    db: Arc<Database>,
    mapping: bool,
    open: bool,
}

/// A file as seen through an optional map.
struct View<'a> {
    file: &'a StoredFile,
    ddm: Option<&'a Ddm>,
}

impl<'a> View<'a> {
    fn short_name<'s>(&'s self, name: &'s str) -> Option<&'s str> {
        match self.ddm {
            Some(ddm) => ddm.resolve(name),
            None => Some(name),
        }
    }

    fn column_name(&self, def: &FieldDef) -> Option<String> {
        match self.ddm {
            Some(ddm) => ddm.long_name(&def.name).map(str::to_string),
            None => Some(def.name.clone()),
        }
    }

    fn describe(&self) -> String {
        match self.ddm {
            Some(ddm) => format!("map {}", ddm.name),
            None => format!("file {}", self.file.name),
        }
    }

    /// Projected columns as (FDT position, reported name), in FDT order.
    fn columns(&self, fields: &FieldList) -> Result<Vec<(usize, String)>, LinkError> {
        let fdt = &self.file.fdt;
        let positions: Vec<usize> = if fields.is_all() {
            (0..fdt.field_count()).collect()
        } else {
            let mut positions = Vec::new();
            for name in fields.names() {
                let resolved = self
                    .short_name(name)
                    .and_then(|short| fdt.resolve(short))
                    .ok_or_else(|| {
                        LinkError::new(
                            RSP_FORMAT_BUFFER,
                            format!("field '{name}' not defined in {}", self.describe()),
                        )
                    })?;
                let before = positions.len();
                positions.extend(
                    resolved
                        .into_iter()
                        .filter(|pos| self.column_name(&fdt.fields()[*pos]).is_some()),
                );
                if positions.len() == before {
                    return Err(LinkError::new(
                        RSP_FORMAT_BUFFER,
                        format!("field '{name}' has no named members in {}", self.describe()),
                    ));
                }
            }
            positions.sort_unstable();
            positions.dedup();
            positions
        };
        Ok(positions
            .into_iter()
            .filter_map(|pos| self.column_name(&fdt.fields()[pos]).map(|name| (pos, name)))
            .collect())
    }

    /// Sorted ISNs of records satisfying one term.
    fn matching(&self, criterion: &SearchCriteria) -> Result<Vec<Isn>, LinkError> {
        let fdt = &self.file.fdt;
        let pos = self
            .short_name(&criterion.field)
            .and_then(|short| fdt.position(short))
            .ok_or_else(|| {
                LinkError::new(
                    RSP_SEARCH_BUFFER,
                    format!(
                        "search field '{}' not an elementary field of {}",
                        criterion.field,
                        self.describe()
                    ),
                )
            })?;
        let comparand = Comparand::parse(&fdt.fields()[pos], &criterion.value)?;
        Ok(self
            .file
            .records
            .iter()
            .filter(|(_, row)| comparand.matches(&row[pos]))
            .map(|(isn, _)| *isn)
            .collect())
    }
}

/// A predicate value converted to the searched field's format.
enum Comparand<'v> {
    Text(&'v str),
    Integer(i64),
    Float(f64),
    Hex(String),
}

impl<'v> Comparand<'v> {
    fn parse(def: &FieldDef, value: &'v str) -> Result<Self, LinkError> {
        let bad = || {
            LinkError::new(
                RSP_SEARCH_BUFFER,
                format!("value '{value}' does not fit format {} of field {}", def.field_type, def.name),
            )
        };
        Ok(match def.field_type {
            FieldType::Alpha => Self::Text(value.trim_end_matches(' ')),
            FieldType::Unpacked | FieldType::Packed | FieldType::FixedPoint => {
                Self::Integer(value.trim().parse().map_err(|_| bad())?)
            }
            FieldType::Float => Self::Float(value.trim().parse().map_err(|_| bad())?),
            FieldType::Binary => Self::Hex(value.trim().to_ascii_uppercase()),
        })
    }

    fn matches(&self, stored: &FieldValue) -> bool {
        match (self, stored) {
            (Self::Text(t), FieldValue::Alpha(s)) => s.trim_end_matches(' ') == *t,
            (Self::Integer(n), v) => v.to_i64() == Some(*n),
            (Self::Float(x), FieldValue::Float(f)) => f == x,
            (Self::Hex(h), v @ FieldValue::Binary(_)) => v.to_string() == *h,
            _ => false,
        }
    }
}

impl MemoryLink {
    fn view(&self, target: &Target) -> Result<View<'_>, LinkError> {
        match target {
            Target::File(n) => Ok(View {
                file: self.db.file(*n)?,
                ddm: None,
            }),
            Target::Name(name) => {
                if !self.mapping {
                    return Err(LinkError::new(
                        RSP_INVALID_COMMAND,
                        format!("map access to '{name}' requires the 'map' connection option"),
                    ));
                }
                let ddm = self.db.maps.get(name).ok_or_else(|| {
                    LinkError::new(RSP_FILE_NOT_FOUND, format!("map '{name}' not found"))
                })?;
                Ok(View {
                    file: self.db.file(ddm.file_number)?,
                    ddm: Some(ddm),
                })
            }
        }
    }
}

impl Link for MemoryLink {
    fn search(&mut self, request: &SearchRequest<'_>) -> Result<ResultSet, LinkError> {
        if !self.open {
            return Err(LinkError::new(RSP_INVALID_COMMAND, "link is closed"));
        }
        let view = self.view(request.target)?;
        let columns = view.columns(request.fields)?;
        let buffer = SearchBuffer::parse(request.predicate)?;
        let isns = buffer.evaluate(|criterion| view.matching(criterion))?;

        let mut result = ResultSet::new(columns.iter().map(|(_, name)| name.clone()));
        for isn in &isns {
            let row = &view.file.records[isn];
            result.push_record(columns.iter().map(|(pos, _)| row[*pos].clone()).collect())?;
        }
        debug!(
            view = %view.describe(),
            fields = %request.fields,
            isns = isns.len(),
            columns = columns.len(),
            "search evaluated"
        );
        Ok(result)
    }

    fn close(&mut self) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::new(RSP_INVALID_COMMAND, "link already closed"));
        }
        self.open = false;
        debug!(database = self.db.params.database_id, "link closed");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
