use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a raw value could not be mapped onto its clean field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingIssueKind {
    /// Code outside every declared partition.
    UnexpectedCode,
    /// Missing value where the field's policy forbids it.
    MissingValue,
    /// Expected a number.
    NotNumeric,
    /// Minutes with a fractional part.
    FractionalMinutes,
    /// Numeric code outside the declared ordinal set.
    OutsideDeclaredSet,
    /// Duration below zero.
    NegativeDuration,
    /// Aggregate outside its declared bounds.
    OutOfRange,
}

impl MappingIssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedCode => "unexpected_code",
            Self::MissingValue => "missing_value",
            Self::NotNumeric => "not_numeric",
            Self::FractionalMinutes => "fractional_minutes",
            Self::OutsideDeclaredSet => "outside_declared_set",
            Self::NegativeDuration => "negative_duration",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for MappingIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row/field pair that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingIssue {
    /// 1-based data row in the raw export (header excluded).
    pub row: usize,
    /// Clean `id` assigned to the row.
    pub id: i64,
    pub field: String,
    /// Raw column read by the rule (none for derived fields).
    pub column: Option<String>,
    /// Offending raw value, or the computed value for derived fields.
    pub value: Option<String>,
    pub kind: MappingIssueKind,
}

/// Mapping issues collected across a whole normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingReport {
    pub issues: Vec<MappingIssue>,
}

impl MappingReport {
    pub fn push(&mut self, issue: MappingIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Issue counts grouped by clean field and kind.
    pub fn counts(&self) -> BTreeMap<(String, MappingIssueKind), usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry((issue.field.clone(), issue.kind)).or_insert(0) += 1;
        }
        counts
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a MappingIssue> + 'a {
        self.issues.iter().filter(move |issue| issue.field == field)
    }
}

/// Counters from one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub rows: usize,
    pub fields: usize,
    pub issues: usize,
    /// Recorded durations nulled because their gating flag was 0, per field.
    pub gated: BTreeMap<String, usize>,
}

impl NormalizeStats {
    pub fn gated_total(&self) -> usize {
        self.gated.values().sum()
    }
}
