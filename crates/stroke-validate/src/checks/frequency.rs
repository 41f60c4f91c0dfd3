//! Value-frequency conservation.
//!
//! For every partition the catalog declares, the number of raw rows whose
//! source cell falls in the partition must equal the number of clean rows
//! holding its clean value. Both partitions of a flag are checked, so a code
//! silently moved from one side to the other cannot go unnoticed.

use polars::prelude::{AnyValue, DataFrame};
use stroke_catalog::{CleanMatch, Partition};
use stroke_common::{any_is_null, any_to_f64, any_to_i64};
use stroke_model::{CheckKind, CheckResult};

use super::column_cells;
use crate::ValidationContext;

pub fn check(ctx: &ValidationContext<'_>, df: &DataFrame) -> Vec<CheckResult> {
    ctx.catalog
        .partitions()
        .iter()
        .filter_map(|partition| check_partition(ctx, df, partition))
        .collect()
}

/// `None` when the clean column is absent; column presence reports that.
fn check_partition(
    ctx: &ValidationContext<'_>,
    df: &DataFrame,
    partition: &Partition,
) -> Option<CheckResult> {
    let cells = column_cells(df, &partition.field)?;
    let missing = ctx.catalog.missing_tokens();
    let Some(raw_values) = ctx.raw.column_values(&partition.column) else {
        return Some(CheckResult::fail(
            CheckKind::FrequencyConservation,
            Some(&partition.field),
            partition.describe(),
            "raw column absent",
            format!("raw column '{}' not found", partition.column),
        ));
    };

    let raw_count = raw_values
        .filter(|cell| partition.raw.matches(missing.present(cell)))
        .count();
    let clean_count = cells
        .iter()
        .filter(|cell| clean_matches(&partition.clean, cell))
        .count();
    Some(CheckResult::compare(
        CheckKind::FrequencyConservation,
        Some(&partition.field),
        &raw_count,
        &clean_count,
        partition.describe(),
    ))
}

fn clean_matches(target: &CleanMatch, cell: &AnyValue<'_>) -> bool {
    match target {
        CleanMatch::Null => any_is_null(cell),
        CleanMatch::Int(value) => any_to_i64(cell.clone()) == Some(*value),
        CleanMatch::Float(value) => any_to_f64(cell.clone()) == Some(*value),
    }
}
