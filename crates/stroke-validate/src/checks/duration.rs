use polars::prelude::DataFrame;
use stroke_common::any_to_f64;
use stroke_model::{CheckKind, CheckResult, Rule};

use super::column_cells;
use crate::ValidationContext;

/// Duration columns hold null or minutes `>= 0`. Nulls are not counted.
pub fn check(ctx: &ValidationContext<'_>, df: &DataFrame) -> Vec<CheckResult> {
    ctx.catalog
        .fields()
        .iter()
        .filter(|field| matches!(field.rule, Rule::Duration { .. }))
        .filter_map(|field| {
            let cells = column_cells(df, &field.name)?;
            let negative = cells
                .into_iter()
                .filter_map(any_to_f64)
                .filter(|minutes| *minutes < 0.0)
                .count();
            Some(CheckResult::compare(
                CheckKind::NonNegativeDuration,
                Some(&field.name),
                &0usize,
                &negative,
                "negative durations",
            ))
        })
        .collect()
}
