//! Structural checks on individual catalog entries.

use std::collections::{BTreeMap, BTreeSet};

use stroke_common::MissingTokens;
use stroke_model::{CatalogDocument, CleanType, FieldRule, ID_COLUMN, MissingPolicy, Rule, SchemaError};

/// Checks names, code partitions and cross-references of every entry.
/// Dependency cycles are detected separately by [`crate::order`].
pub fn check_document(document: &CatalogDocument) -> Result<(), SchemaError> {
    let missing = MissingTokens::new(&document.missing_tokens);
    let mut seen: BTreeMap<&str, &FieldRule> = BTreeMap::new();
    for field in &document.fields {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(invalid(&field.name, "field name is empty"));
        }
        if name.eq_ignore_ascii_case(ID_COLUMN) {
            return Err(SchemaError::ReservedField {
                field: field.name.clone(),
            });
        }
        if seen.insert(field.name.as_str(), field).is_some() {
            return Err(SchemaError::DuplicateField {
                field: field.name.clone(),
            });
        }
        check_rule(field, &missing)?;
    }

    for field in &document.fields {
        check_references(field, &seen)?;
    }

    for implication in &document.implications {
        let when = seen.get(implication.when.as_str()).ok_or_else(|| {
            SchemaError::UnknownImplicationField {
                implication: implication.name.clone(),
                field: implication.when.clone(),
            }
        })?;
        if when.rule.clean_type() != CleanType::Int {
            return Err(invalid(
                &implication.when,
                "implication condition must be an integer field",
            ));
        }
        for target in &implication.null_fields {
            if !seen.contains_key(target.as_str()) {
                return Err(SchemaError::UnknownImplicationField {
                    implication: implication.name.clone(),
                    field: target.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_rule(field: &FieldRule, missing: &MissingTokens) -> Result<(), SchemaError> {
    if let Some(source) = field.rule.source()
        && source.trim().is_empty()
    {
        return Err(invalid(&field.name, "source column is empty"));
    }
    match &field.rule {
        Rule::Binary {
            positive, negative, ..
        }
        | Rule::TriState {
            positive, negative, ..
        }
        | Rule::Composite {
            positive, negative, ..
        } => check_partition(&field.name, positive, negative, missing),
        Rule::Ordinal {
            values,
            not_assessed,
            ..
        } => {
            if values.is_empty() {
                return Err(invalid(&field.name, "ordinal value set is empty"));
            }
            let unique: BTreeSet<i64> = values.iter().copied().collect();
            if unique.len() != values.len() {
                return Err(invalid(&field.name, "ordinal values repeat"));
            }
            if let Some(sentinel) = not_assessed
                && unique.contains(sentinel)
            {
                return Err(invalid(
                    &field.name,
                    "not-assessed sentinel collides with an ordinal value",
                ));
            }
            Ok(())
        }
        Rule::Sum {
            depends_on,
            min,
            max,
        } => {
            if depends_on.is_empty() {
                return Err(invalid(&field.name, "sum has no inputs"));
            }
            if min > max {
                return Err(invalid(&field.name, "sum minimum exceeds maximum"));
            }
            Ok(())
        }
        Rule::Lookup {
            map,
            missing: policy,
            ..
        } => {
            if map.is_empty() {
                return Err(invalid(&field.name, "lookup table is empty"));
            }
            if *policy == MissingPolicy::Negative {
                return Err(invalid(
                    &field.name,
                    "lookup fields cannot fold missing into a negative value",
                ));
            }
            if map.values().any(|v| !v.is_finite()) {
                return Err(invalid(&field.name, "lookup values must be finite"));
            }
            let mut keys: BTreeSet<&str> = BTreeSet::new();
            for code in map.keys() {
                if !keys.insert(code.trim()) {
                    return Err(invalid(
                        &field.name,
                        &format!("lookup code '{}' is listed more than once", code.trim()),
                    ));
                }
            }
            Ok(())
        }
        Rule::Presence { .. } | Rule::Duration { .. } | Rule::Text { .. } => Ok(()),
    }
}

fn check_partition(
    field: &str,
    positive: &[String],
    negative: &[String],
    missing: &MissingTokens,
) -> Result<(), SchemaError> {
    if positive.is_empty() || negative.is_empty() {
        return Err(invalid(field, "both code partitions must be non-empty"));
    }
    let positive_set: BTreeSet<&str> = positive.iter().map(|c| c.trim()).collect();
    for code in negative {
        if positive_set.contains(code.trim()) {
            return Err(invalid(
                field,
                &format!("code '{code}' is in both partitions"),
            ));
        }
    }
    for code in positive.iter().chain(negative) {
        if missing.is_missing(code) {
            return Err(invalid(
                field,
                &format!("code '{code}' is a missing-value token and can never match"),
            ));
        }
    }
    Ok(())
}

fn check_references(
    field: &FieldRule,
    fields: &BTreeMap<&str, &FieldRule>,
) -> Result<(), SchemaError> {
    match &field.rule {
        Rule::Sum { depends_on, .. } => {
            for dependency in depends_on {
                let Some(input) = fields.get(dependency.as_str()) else {
                    return Err(SchemaError::UnknownDependency {
                        field: field.name.clone(),
                        dependency: dependency.clone(),
                    });
                };
                if input.rule.clean_type() != CleanType::Int {
                    return Err(invalid(
                        &field.name,
                        &format!("sum input '{dependency}' is not an integer field"),
                    ));
                }
            }
            Ok(())
        }
        Rule::Duration {
            only_when: Some(flag),
            ..
        } => {
            let Some(gate) = fields.get(flag.as_str()) else {
                return Err(SchemaError::UnknownDependency {
                    field: field.name.clone(),
                    dependency: flag.clone(),
                });
            };
            if !gate.rule.is_flag() {
                return Err(invalid(
                    &field.name,
                    &format!("duration gate '{flag}' is not a flag field"),
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn invalid(field: &str, message: &str) -> SchemaError {
    SchemaError::InvalidRule {
        field: field.to_string(),
        message: message.to_string(),
    }
}
