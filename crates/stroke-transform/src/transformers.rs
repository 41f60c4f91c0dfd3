//! Field transformers.
//!
//! Every function takes the trimmed raw cell (`None` when the cell holds a
//! missing token) plus the rule parameters, and returns the clean value or
//! the reason it could not be mapped. Nothing here guesses: a code outside
//! the declared domain is an error, never a default.

use std::collections::BTreeMap;

use stroke_common::{NumberError, parse_whole_number};
use stroke_model::{CleanValue, MappingIssueKind, MissingPolicy};

pub type FieldResult = Result<Option<CleanValue>, MappingIssueKind>;

/// Strict two-valued flag such as `Y`/`N` or `M`/`F`.
pub fn binary_flag(
    raw: Option<&str>,
    positive: &[String],
    negative: &[String],
    missing: MissingPolicy,
) -> FieldResult {
    coded_flag(raw, positive, negative, missing)
}

/// Three observed states folded onto a flag: positive codes map to 1, the
/// negative codes (e.g. `N` and `NB`) to 0, and a missing cell follows the
/// field's explicit policy.
pub fn tri_state_flag(
    raw: Option<&str>,
    positive: &[String],
    negative: &[String],
    missing: MissingPolicy,
) -> FieldResult {
    coded_flag(raw, positive, negative, missing)
}

/// Union-set flag: membership in either set decides the value and any
/// other code is reported, so new codes in an export are caught.
pub fn composite_flag(
    raw: Option<&str>,
    positive: &[String],
    negative: &[String],
    missing: MissingPolicy,
) -> FieldResult {
    coded_flag(raw, positive, negative, missing)
}

fn coded_flag(
    raw: Option<&str>,
    positive: &[String],
    negative: &[String],
    missing: MissingPolicy,
) -> FieldResult {
    let Some(value) = raw else {
        return fold_missing(missing, CleanValue::Int(0));
    };
    if contains_code(positive, value) {
        Ok(Some(CleanValue::Int(1)))
    } else if contains_code(negative, value) {
        Ok(Some(CleanValue::Int(0)))
    } else {
        Err(MappingIssueKind::UnexpectedCode)
    }
}

/// 1 when anything was recorded, 0 otherwise.
pub fn presence_flag(raw: Option<&str>) -> FieldResult {
    Ok(Some(CleanValue::Int(i64::from(raw.is_some()))))
}

/// Whole minutes copied through. Negative minutes are reported rather than
/// clamped.
pub fn duration_minutes(raw: Option<&str>) -> FieldResult {
    let Some(value) = raw else {
        return Ok(None);
    };
    match parse_whole_number(value) {
        Ok(minutes) if minutes < 0 => Err(MappingIssueKind::NegativeDuration),
        Ok(minutes) => Ok(Some(CleanValue::Int(minutes))),
        Err(NumberError::Fractional) => Err(MappingIssueKind::FractionalMinutes),
        Err(NumberError::NotNumeric) => Err(MappingIssueKind::NotNumeric),
    }
}

/// Integer code restricted to `values`. Boolean literals and free text are
/// rejected; a missing cell becomes the not-assessed sentinel when one is
/// declared.
pub fn ordinal_code(raw: Option<&str>, values: &[i64], not_assessed: Option<i64>) -> FieldResult {
    let Some(value) = raw else {
        return Ok(not_assessed.map(CleanValue::Int));
    };
    match parse_whole_number(value) {
        Ok(code) if values.contains(&code) => Ok(Some(CleanValue::Int(code))),
        Ok(_) | Err(NumberError::Fractional) => Err(MappingIssueKind::OutsideDeclaredSet),
        Err(NumberError::NotNumeric) => Err(MappingIssueKind::NotNumeric),
    }
}

/// Sum of already derived inputs, null when any input is null.
pub fn bounded_sum(inputs: &[Option<i64>], min: i64, max: i64) -> FieldResult {
    let mut total: i64 = 0;
    for input in inputs {
        let Some(value) = input else {
            return Ok(None);
        };
        total = total
            .checked_add(*value)
            .ok_or(MappingIssueKind::OutOfRange)?;
    }
    if (min..=max).contains(&total) {
        Ok(Some(CleanValue::Int(total)))
    } else {
        Err(MappingIssueKind::OutOfRange)
    }
}

/// Explicit code to number table.
pub fn lookup_value(
    raw: Option<&str>,
    map: &BTreeMap<String, f64>,
    missing: MissingPolicy,
) -> FieldResult {
    let Some(value) = raw else {
        return fold_missing(missing, CleanValue::Float(0.0));
    };
    map.get(value)
        .or_else(|| {
            map.iter()
                .find(|(code, _)| code.trim() == value)
                .map(|(_, number)| number)
        })
        .map(|number| Some(CleanValue::Float(*number)))
        .ok_or(MappingIssueKind::UnexpectedCode)
}

pub fn text_value(raw: Option<&str>) -> FieldResult {
    Ok(raw.map(|value| CleanValue::Text(value.to_string())))
}

fn fold_missing(policy: MissingPolicy, negative: CleanValue) -> FieldResult {
    match policy {
        MissingPolicy::Error => Err(MappingIssueKind::MissingValue),
        MissingPolicy::Negative => Ok(Some(negative)),
        MissingPolicy::Null => Ok(None),
    }
}

fn contains_code(codes: &[String], value: &str) -> bool {
    codes.iter().any(|code| code.trim() == value)
}
