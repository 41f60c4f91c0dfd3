use serde::{Deserialize, Serialize};

/// Invariant family a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    RowCount,
    ColumnPresence,
    UniqueId,
    FrequencyConservation,
    RangeClosure,
    NonNegativeDuration,
    Implication,
}

impl CheckKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RowCount => "row_count",
            Self::ColumnPresence => "column_presence",
            Self::UniqueId => "unique_id",
            Self::FrequencyConservation => "frequency_conservation",
            Self::RangeClosure => "range_closure",
            Self::NonNegativeDuration => "non_negative_duration",
            Self::Implication => "implication",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Outcome of a single invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    pub field: Option<String>,
    pub status: CheckStatus,
    pub severity: Severity,
    pub expected: String,
    pub observed: String,
    pub message: String,
}

impl CheckResult {
    pub fn pass(
        check: CheckKind,
        field: Option<&str>,
        expected: impl Into<String>,
        observed: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::build(check, field, CheckStatus::Pass, expected, observed, message)
    }

    pub fn fail(
        check: CheckKind,
        field: Option<&str>,
        expected: impl Into<String>,
        observed: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::build(check, field, CheckStatus::Fail, expected, observed, message)
    }

    /// Pass when `expected == observed`, fail otherwise.
    pub fn compare<T: PartialEq + ToString>(
        check: CheckKind,
        field: Option<&str>,
        expected: &T,
        observed: &T,
        message: impl Into<String>,
    ) -> Self {
        let status = if expected == observed {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        Self::build(
            check,
            field,
            status,
            expected.to_string(),
            observed.to_string(),
            message,
        )
    }

    fn build(
        check: CheckKind,
        field: Option<&str>,
        status: CheckStatus,
        expected: impl Into<String>,
        observed: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check,
            field: field.map(str::to_string),
            status,
            severity: Severity::Error,
            expected: expected.into(),
            observed: observed.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Per-check results for one clean table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn add(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = CheckResult>) {
        self.checks.extend(results);
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|result| !result.passed())
    }

    pub fn error_count(&self) -> usize {
        self.failures()
            .filter(|result| result.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.failures()
            .filter(|result| result.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// True when every check passed, warnings included.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CheckResult::passed)
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a CheckResult> + 'a {
        self.checks
            .iter()
            .filter(move |result| result.field.as_deref() == Some(field))
    }
}
