//! Code partitions: which raw codes must land on which clean value.
//!
//! Every partitioned field yields one entry per clean value it can take, so
//! frequency conservation can be checked in both directions straight from
//! the catalog.

use std::collections::BTreeMap;

use serde::Serialize;
use stroke_common::parse_whole_number;
use stroke_model::{FieldRule, MissingPolicy, Rule};

/// Selection of raw cells on the source column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RawMatch {
    /// Cell equals one of the codes (missing cells included when flagged).
    Codes {
        codes: Vec<String>,
        include_missing: bool,
    },
    /// Cell parses to this whole number.
    Number { value: i64 },
    Missing,
    Present,
}

impl RawMatch {
    /// `raw` is the trimmed cell, `None` when missing.
    pub fn matches(&self, raw: Option<&str>) -> bool {
        match (self, raw) {
            (Self::Codes { codes, .. }, Some(value)) => codes.iter().any(|code| code == value),
            (Self::Codes {
                include_missing, ..
            }, None) => *include_missing,
            (Self::Number { value }, Some(raw)) => parse_whole_number(raw) == Ok(*value),
            (Self::Number { .. }, None) => false,
            (Self::Missing, cell) => cell.is_none(),
            (Self::Present, cell) => cell.is_some(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Codes {
                codes,
                include_missing,
            } => {
                let mut parts: Vec<&str> = codes.iter().map(String::as_str).collect();
                if *include_missing {
                    parts.push("<missing>");
                }
                format!("in [{}]", parts.join(", "))
            }
            Self::Number { value } => format!("== {value}"),
            Self::Missing => "is missing".to_string(),
            Self::Present => "is present".to_string(),
        }
    }
}

/// Selection of clean cells on the target column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CleanMatch {
    Int(i64),
    Float(f64),
    Null,
}

impl CleanMatch {
    pub fn describe(&self) -> String {
        match self {
            Self::Int(value) => format!("== {value}"),
            Self::Float(value) => format!("== {value}"),
            Self::Null => "is null".to_string(),
        }
    }
}

/// One `(raw selection) <-> (clean selection)` pair whose row counts must
/// be equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub field: String,
    pub column: String,
    pub raw: RawMatch,
    pub clean: CleanMatch,
}

impl Partition {
    fn new(field: &FieldRule, column: &str, raw: RawMatch, clean: CleanMatch) -> Self {
        Self {
            field: field.name.clone(),
            column: column.to_string(),
            raw,
            clean,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} {} <-> {} {}",
            self.column,
            self.raw.describe(),
            self.field,
            self.clean.describe()
        )
    }
}

/// Partitions declared by one field. Fields without a raw code domain
/// (durations, sums, text) have none.
pub fn field_partitions(field: &FieldRule) -> Vec<Partition> {
    match &field.rule {
        Rule::Binary {
            source,
            positive,
            negative,
            missing,
        }
        | Rule::TriState {
            source,
            positive,
            negative,
            missing,
        }
        | Rule::Composite {
            source,
            positive,
            negative,
            missing,
        } => {
            let mut partitions = vec![
                Partition::new(
                    field,
                    source,
                    RawMatch::Codes {
                        codes: trimmed(positive),
                        include_missing: false,
                    },
                    CleanMatch::Int(1),
                ),
                Partition::new(
                    field,
                    source,
                    RawMatch::Codes {
                        codes: trimmed(negative),
                        include_missing: *missing == MissingPolicy::Negative,
                    },
                    CleanMatch::Int(0),
                ),
            ];
            if *missing == MissingPolicy::Null {
                partitions.push(Partition::new(
                    field,
                    source,
                    RawMatch::Missing,
                    CleanMatch::Null,
                ));
            }
            partitions
        }
        Rule::Presence { source } => vec![
            Partition::new(field, source, RawMatch::Present, CleanMatch::Int(1)),
            Partition::new(field, source, RawMatch::Missing, CleanMatch::Int(0)),
        ],
        Rule::Ordinal {
            source,
            values,
            not_assessed,
        } => {
            let mut partitions: Vec<Partition> = values
                .iter()
                .map(|&value| {
                    Partition::new(
                        field,
                        source,
                        RawMatch::Number { value },
                        CleanMatch::Int(value),
                    )
                })
                .collect();
            let missing_target = match not_assessed {
                Some(sentinel) => CleanMatch::Int(*sentinel),
                None => CleanMatch::Null,
            };
            partitions.push(Partition::new(
                field,
                source,
                RawMatch::Missing,
                missing_target,
            ));
            partitions
        }
        Rule::Lookup {
            source,
            map,
            missing,
        } => {
            // Several codes may share one target value; group them so each
            // clean value is counted once.
            let mut groups: BTreeMap<u64, (f64, Vec<String>)> = BTreeMap::new();
            for (code, value) in map {
                groups
                    .entry(value.to_bits())
                    .or_insert_with(|| (*value, Vec::new()))
                    .1
                    .push(code.trim().to_string());
            }
            let mut partitions: Vec<Partition> = groups
                .into_values()
                .map(|(value, codes)| {
                    Partition::new(
                        field,
                        source,
                        RawMatch::Codes {
                            codes,
                            include_missing: false,
                        },
                        CleanMatch::Float(value),
                    )
                })
                .collect();
            if *missing == MissingPolicy::Null {
                partitions.push(Partition::new(
                    field,
                    source,
                    RawMatch::Missing,
                    CleanMatch::Null,
                ));
            }
            partitions
        }
        Rule::Duration { .. } | Rule::Sum { .. } | Rule::Text { .. } => Vec::new(),
    }
}

fn trimmed(codes: &[String]) -> Vec<String> {
    codes.iter().map(|code| code.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(rule: Rule) -> FieldRule {
        FieldRule {
            name: "thrombolysis".to_string(),
            description: None,
            rule,
        }
    }

    #[test]
    fn tri_state_folds_missing_into_negative_partition() {
        let partitions = field_partitions(&field(Rule::TriState {
            source: "S2Thrombolysis".to_string(),
            positive: vec!["Y".to_string()],
            negative: vec!["N".to_string(), "NB".to_string()],
            missing: MissingPolicy::Negative,
        }));
        assert_eq!(partitions.len(), 2);
        assert!(partitions[1].raw.matches(None));
        assert!(partitions[1].raw.matches(Some("NB")));
        assert!(!partitions[1].raw.matches(Some("Y")));
        assert_eq!(partitions[1].clean, CleanMatch::Int(0));
    }

    #[test]
    fn composite_with_null_policy_adds_missing_partition() {
        let partitions = field_partitions(&field(Rule::Composite {
            source: "S1OnsetTimeType".to_string(),
            positive: vec!["P".to_string(), "BE".to_string()],
            negative: vec!["NK".to_string()],
            missing: MissingPolicy::Null,
        }));
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[2].raw, RawMatch::Missing);
        assert_eq!(partitions[2].clean, CleanMatch::Null);
        assert_eq!(
            partitions[0].describe(),
            "S1OnsetTimeType in [P, BE] <-> thrombolysis == 1"
        );
    }

    #[test]
    fn ordinal_partitions_match_numeric_spellings() {
        let partitions = field_partitions(&field(Rule::Ordinal {
            source: "S2NihssArrivalLoc".to_string(),
            values: vec![0, 1, 2, 3],
            not_assessed: None,
        }));
        assert_eq!(partitions.len(), 5);
        assert!(partitions[2].raw.matches(Some("2.0")));
        assert!(!partitions[2].raw.matches(Some("TRUE")));
    }

    #[test]
    fn lookup_groups_codes_by_value() {
        let partitions = field_partitions(&field(Rule::Lookup {
            source: "S1AgeOnArrival".to_string(),
            map: BTreeMap::from([
                ("[85,90)".to_string(), 87.5),
                ("[90,95)".to_string(), 92.5),
                ("90-95".to_string(), 92.5),
            ]),
            missing: MissingPolicy::Error,
        }));
        assert_eq!(partitions.len(), 2);
        let shared = partitions
            .iter()
            .find(|p| p.clean == CleanMatch::Float(92.5))
            .unwrap();
        assert!(shared.raw.matches(Some("90-95")));
        assert!(shared.raw.matches(Some("[90,95)")));
    }
}
