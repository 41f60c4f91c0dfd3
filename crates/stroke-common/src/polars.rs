//! Polars `AnyValue` conversions used when reading clean tables back.
//!
//! A clean CSV re-read by Polars may come back with integer, float or string
//! dtypes depending on inference (an all-null column is inferred as `String`),
//! so every accessor accepts all three.

use polars::prelude::AnyValue;

use crate::cells::{parse_f64, parse_whole_number};

/// Renders a clean cell for CSV output. `Null` becomes an empty string and
/// floats lose trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Formats a float without trailing zeros (`87.5`, `1`, `100`).
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn any_is_null(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        _ => false,
    }
}

pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)).filter(|v| v.is_finite()),
        AnyValue::Float64(v) => Some(v).filter(|v| v.is_finite()),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Converts to `i64` only when the value is a whole number; `2.5` is `None`
/// rather than being truncated.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) => parse_whole_number(&f64::from(v).to_string()).ok(),
        AnyValue::Float64(v) => parse_whole_number(&v.to_string()).ok(),
        AnyValue::String(s) => parse_whole_number(s).ok(),
        AnyValue::StringOwned(s) => parse_whole_number(&s).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_to_string_formats_cells() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
        assert_eq!(any_to_string(AnyValue::Float64(87.5)), "87.5");
        assert_eq!(any_to_string(AnyValue::Float64(100.0)), "100");
        assert_eq!(any_to_string(AnyValue::String("team_a")), "team_a");
    }

    #[test]
    fn format_numeric_keeps_integer_digits() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(1.50), "1.5");
        assert_eq!(format_numeric(0.0), "0");
    }

    #[test]
    fn nulls_across_dtypes() {
        assert!(any_is_null(&AnyValue::Null));
        assert!(any_is_null(&AnyValue::String("")));
        assert!(any_is_null(&AnyValue::Float64(f64::NAN)));
        assert!(!any_is_null(&AnyValue::Int64(0)));
    }

    #[test]
    fn any_to_i64_rejects_fractions() {
        assert_eq!(any_to_i64(AnyValue::Int32(3)), Some(3));
        assert_eq!(any_to_i64(AnyValue::Float64(3.0)), Some(3));
        assert_eq!(any_to_i64(AnyValue::Float64(3.9)), None);
        assert_eq!(any_to_i64(AnyValue::String("7")), Some(7));
        assert_eq!(any_to_i64(AnyValue::Null), None);
    }

    #[test]
    fn any_to_f64_reads_strings() {
        assert_eq!(any_to_f64(AnyValue::String("87.5")), Some(87.5));
        assert_eq!(any_to_f64(AnyValue::Int64(2)), Some(2.0));
        assert_eq!(any_to_f64(AnyValue::String("x")), None);
    }
}
