use polars::prelude::DataFrame;
use stroke_model::{CheckKind, CheckResult, ID_COLUMN};

use crate::ValidationContext;

/// `id` plus every catalog field must be present in the clean table.
pub fn check(ctx: &ValidationContext<'_>, df: &DataFrame) -> CheckResult {
    let expected: Vec<&str> = std::iter::once(ID_COLUMN)
        .chain(ctx.catalog.fields().iter().map(|field| field.name.as_str()))
        .collect();
    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();
    if missing.is_empty() {
        CheckResult::pass(
            CheckKind::ColumnPresence,
            None,
            expected.len().to_string(),
            expected.len().to_string(),
            "all clean columns present",
        )
    } else {
        CheckResult::fail(
            CheckKind::ColumnPresence,
            None,
            expected.len().to_string(),
            (expected.len() - missing.len()).to_string(),
            format!("missing clean columns: {}", missing.join(", ")),
        )
    }
}
