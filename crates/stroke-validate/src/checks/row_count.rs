use polars::prelude::DataFrame;
use stroke_model::{CheckKind, CheckResult};

use crate::ValidationContext;

/// One clean row per raw row.
pub fn check(ctx: &ValidationContext<'_>, df: &DataFrame) -> CheckResult {
    CheckResult::compare(
        CheckKind::RowCount,
        None,
        &ctx.raw.height(),
        &df.height(),
        "clean row count equals raw row count",
    )
}
