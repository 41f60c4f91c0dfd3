//! Catalog document types.
//!
//! These mirror the TOML layout of a schema catalog one-to-one. Structural
//! validation (cycles, unknown references, conflicting partitions) happens in
//! `stroke-catalog`; the types here only describe what was declared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::CleanType;

/// Tokens treated as a missing raw cell when no list is declared.
pub fn default_missing_tokens() -> Vec<String> {
    ["", "NA", "NaN", "nan", "NULL"]
        .iter()
        .map(|token| (*token).to_string())
        .collect()
}

/// Top-level catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub catalog: CatalogHeader,
    pub shape: ExpectedShape,
    #[serde(default = "default_missing_tokens")]
    pub missing_tokens: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldRule>,
    #[serde(default)]
    pub implications: Vec<Implication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHeader {
    pub name: String,
    pub schema_version: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Shape the raw export must have at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedShape {
    pub columns: usize,
    #[serde(default)]
    pub rows: Option<usize>,
}

/// One clean field and the rule that derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rule: Rule,
}

/// How an absent raw value is folded into the clean field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Missing is a mapping error.
    Error,
    /// Missing is folded into the negative clean value (0).
    Negative,
    /// Missing stays null in the clean table.
    Null,
}

impl MissingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Negative => "negative",
            Self::Null => "null",
        }
    }
}

fn missing_error() -> MissingPolicy {
    MissingPolicy::Error
}

fn missing_null() -> MissingPolicy {
    MissingPolicy::Null
}

/// Recoding rule family for a clean field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Strict two-valued flag (`Y`/`N`, `M`/`F`, ...).
    Binary {
        source: String,
        positive: Vec<String>,
        negative: Vec<String>,
        #[serde(default = "missing_error")]
        missing: MissingPolicy,
    },
    /// Three observed states folded to a flag. The missing policy has no
    /// default so every field states its fold explicitly.
    TriState {
        source: String,
        positive: Vec<String>,
        negative: Vec<String>,
        missing: MissingPolicy,
    },
    /// Union of code sets (e.g. precise OR best-estimate onset).
    Composite {
        source: String,
        positive: Vec<String>,
        negative: Vec<String>,
        #[serde(default = "missing_null")]
        missing: MissingPolicy,
    },
    /// 1 when the raw cell holds a value, 0 when it is missing.
    Presence { source: String },
    /// Minutes copied through; optionally nulled when a clean flag is 0.
    Duration {
        source: String,
        #[serde(default)]
        only_when: Option<String>,
    },
    /// Sub-score restricted to a declared finite set.
    Ordinal {
        source: String,
        values: Vec<i64>,
        #[serde(default)]
        not_assessed: Option<i64>,
    },
    /// Sum of previously derived clean fields, bounded to `[min, max]`.
    Sum {
        depends_on: Vec<String>,
        min: i64,
        max: i64,
    },
    /// Explicit code to number table (e.g. age band to midpoint).
    Lookup {
        source: String,
        map: BTreeMap<String, f64>,
        #[serde(default = "missing_null")]
        missing: MissingPolicy,
    },
    /// Trimmed text passthrough.
    Text { source: String },
}

impl Rule {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Binary { .. } => "binary",
            Self::TriState { .. } => "tri_state",
            Self::Composite { .. } => "composite",
            Self::Presence { .. } => "presence",
            Self::Duration { .. } => "duration",
            Self::Ordinal { .. } => "ordinal",
            Self::Sum { .. } => "sum",
            Self::Lookup { .. } => "lookup",
            Self::Text { .. } => "text",
        }
    }

    /// Raw column this rule reads, if any.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Binary { source, .. }
            | Self::TriState { source, .. }
            | Self::Composite { source, .. }
            | Self::Presence { source }
            | Self::Duration { source, .. }
            | Self::Ordinal { source, .. }
            | Self::Lookup { source, .. }
            | Self::Text { source } => Some(source),
            Self::Sum { .. } => None,
        }
    }

    /// Clean fields that must be derived before this one.
    pub fn dependencies(&self) -> Vec<&str> {
        match self {
            Self::Sum { depends_on, .. } => depends_on.iter().map(String::as_str).collect(),
            Self::Duration {
                only_when: Some(flag),
                ..
            } => vec![flag.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn clean_type(&self) -> CleanType {
        match self {
            Self::Lookup { .. } => CleanType::Float,
            Self::Text { .. } => CleanType::Text,
            _ => CleanType::Int,
        }
    }

    /// Whether the rule maps raw codes onto a 0/1 flag.
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            Self::Binary { .. } | Self::TriState { .. } | Self::Composite { .. } | Self::Presence { .. }
        )
    }
}

/// Cross-field rule: when `when == equals`, every field in `null_fields`
/// must be null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implication {
    pub name: String,
    pub when: String,
    pub equals: i64,
    pub null_fields: Vec<String>,
}
