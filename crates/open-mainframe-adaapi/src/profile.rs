//! Query profiles.
//!
//! A profile describes one canned query: the target, the fields to
//! project, a default predicate, and which result fields a driver should
//! read as strings or as integers. Two profiles are built in; others are
//! loaded from JSON:
//!
//! ```json
//! {
//!   "name": "by-city",
//!   "target": { "file": 11 },
//!   "fields": ["AA", "AJ"],
//!   "default-predicate": "AJ=DARMSTADT",
//!   "string-fields": ["AA", "AJ"]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::format::FieldList;
use crate::link::Target;
use crate::{AdaError, AdaResult};

/// A canned query with its read-back plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueryProfile {
    /// Profile name.
    pub name: String,
    /// Map or file searched.
    pub target: Target,
    /// Fields requested from the search.
    pub fields: Vec<String>,
    /// Predicate used when the caller gives none.
    pub default_predicate: String,
    /// Result fields read with the string accessor.
    #[serde(default)]
    pub string_fields: Vec<String>,
    /// Result fields read with the integer accessor.
    #[serde(default)]
    pub integer_fields: Vec<String>,
}

static BUILTIN_NAMES: [&str; 2] = ["employees", "employees-map"];

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl QueryProfile {
    /// Look up a built-in profile.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "employees" => Some(Self {
                name: name.to_string(),
                target: Target::File(11),
                fields: strings(&["AA", "AB", "AH"]),
                default_predicate: "AA=11100301".to_string(),
                string_fields: strings(&["AA", "AC", "AD", "AE"]),
                integer_fields: strings(&["AH"]),
            }),
            "employees-map" => Some(Self {
                name: name.to_string(),
                target: Target::from("EMPLOYEES-NAT-DDM"),
                fields: strings(&["PERSONNEL-ID", "FULL-NAME", "BIRTH"]),
                default_predicate: "PERSONNEL-ID=11100301".to_string(),
                string_fields: strings(&["PERSONNEL-ID", "FIRST-NAME", "MIDDLE-I", "NAME"]),
                integer_fields: strings(&["BIRTH"]),
            }),
            _ => None,
        }
    }

    /// Names of the built-in profiles.
    pub fn builtin_names() -> &'static [&'static str] {
        &BUILTIN_NAMES
    }

    /// Load a profile from JSON.
    pub fn from_json(json: &str) -> AdaResult<Self> {
        let profile: Self = serde_json::from_str(json).map_err(|e| AdaError::Profile {
            reason: e.to_string(),
        })?;
        if profile.name.trim().is_empty() {
            return Err(AdaError::Profile {
                reason: "profile name is empty".to_string(),
            });
        }
        Ok(profile)
    }

    /// The requested fields as a field list.
    pub fn field_list(&self) -> FieldList {
        FieldList::new(&self.fields)
    }

    /// The predicate to run: `explicit` if given, else the default.
    pub fn predicate<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.default_predicate)
    }

    /// Whether the profile searches through a map.
    pub fn uses_map(&self) -> bool {
        matches!(self.target, Target::Name(_))
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve() {
        for name in QueryProfile::builtin_names() {
            let profile = QueryProfile::builtin(name).unwrap();
            assert_eq!(profile.name, *name);
            assert!(!profile.fields.is_empty());
        }
        assert!(QueryProfile::builtin("payroll").is_none());
        assert!(QueryProfile::builtin("employees-map").unwrap().uses_map());
        assert!(!QueryProfile::builtin("employees").unwrap().uses_map());
    }

    #[test]
    fn json_round_trip() {
        let profile = QueryProfile::builtin("employees").unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"default-predicate\""));
        assert_eq!(QueryProfile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn json_defaults_and_errors() {
        let profile = QueryProfile::from_json(
            r#"{"name":"p","target":{"file":11},"fields":["AA"],"default-predicate":"AA=1"}"#,
        )
        .unwrap();
        assert!(profile.string_fields.is_empty());
        assert_eq!(profile.field_list().names(), ["AA"]);

        assert!(matches!(
            QueryProfile::from_json("{}"),
            Err(AdaError::Profile { .. })
        ));
        assert!(matches!(
            QueryProfile::from_json(
                r#"{"name":" ","target":{"file":1},"fields":[],"default-predicate":"A=1"}"#
            ),
            Err(AdaError::Profile { .. })
        ));
    }

    #[test]
    fn predicate_override() {
        let profile = QueryProfile::builtin("employees").unwrap();
        assert_eq!(profile.predicate(None), "AA=11100301");
        assert_eq!(profile.predicate(Some("AJ=PARIS")), "AJ=PARIS");
    }
}
