//! Raw cell helpers: missing-value sentinels and numeric parsing.

use std::collections::BTreeSet;

/// Set of raw tokens that mean "no value recorded".
///
/// Comparison happens after trimming surrounding whitespace, so `" NA "` is
/// missing when `NA` is a token. The empty string is always missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTokens {
    tokens: BTreeSet<String>,
}

impl MissingTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = tokens
            .into_iter()
            .map(|token| token.as_ref().trim().to_string())
            .collect();
        set.insert(String::new());
        Self { tokens: set }
    }

    pub fn is_missing(&self, raw: &str) -> bool {
        self.tokens.contains(raw.trim())
    }

    /// Trimmed value, or `None` when the cell is missing.
    pub fn present<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let trimmed = raw.trim();
        if self.tokens.contains(trimmed) {
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl Default for MissingTokens {
    fn default() -> Self {
        Self::new(["NA", "NaN", "nan", "NULL"])
    }
}

/// Reason a cell could not be read as a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberError {
    NotNumeric,
    Fractional,
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integer cell, accepting float spellings of whole numbers
/// (`"12.0"`) that spreadsheet exports tend to produce.
pub fn parse_whole_number(value: &str) -> Result<i64, NumberError> {
    let trimmed = value.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    let v = parse_f64(trimmed).ok_or(NumberError::NotNumeric)?;
    if v.fract() != 0.0 {
        return Err(NumberError::Fractional);
    }
    // f64 holds every integer exactly up to 2^53.
    if v.abs() > 9_007_199_254_740_992.0 {
        return Err(NumberError::NotNumeric);
    }
    Ok(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tokens_cover_pandas_sentinels() {
        let tokens = MissingTokens::default();
        assert!(tokens.is_missing(""));
        assert!(tokens.is_missing("   "));
        assert!(tokens.is_missing("NaN"));
        assert!(tokens.is_missing(" NA "));
        assert!(!tokens.is_missing("N"));
        assert!(!tokens.is_missing("NB"));
    }

    #[test]
    fn present_trims() {
        let tokens = MissingTokens::new(["NA"]);
        assert_eq!(tokens.present("  Y "), Some("Y"));
        assert_eq!(tokens.present("NA"), None);
        assert_eq!(tokens.present(""), None);
    }

    #[test]
    fn whole_numbers() {
        assert_eq!(parse_whole_number("12"), Ok(12));
        assert_eq!(parse_whole_number(" -3 "), Ok(-3));
        assert_eq!(parse_whole_number("12.0"), Ok(12));
        assert_eq!(parse_whole_number("12.5"), Err(NumberError::Fractional));
        assert_eq!(parse_whole_number("TRUE"), Err(NumberError::NotNumeric));
        assert_eq!(parse_whole_number("inf"), Err(NumberError::NotNumeric));
    }

    #[test]
    fn parse_f64_rejects_non_finite() {
        assert_eq!(parse_f64("2.5"), Some(2.5));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64(""), None);
    }
}
