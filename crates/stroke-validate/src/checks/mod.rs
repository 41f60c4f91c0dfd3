//! Validation check modules.
//!
//! Each module performs one family of invariant checks.

mod columns;
mod duration;
mod frequency;
mod identifier;
mod implication;
mod range;
mod row_count;

use polars::prelude::{AnyValue, DataFrame};
use stroke_model::ValidationReport;

use crate::ValidationContext;

/// Run all validation checks on a clean table.
pub fn run_all(ctx: &ValidationContext<'_>, df: &DataFrame) -> ValidationReport {
    let mut report = ValidationReport::default();

    // 1. Clean row count equals raw row count
    report.add(row_count::check(ctx, df));

    // 2. Every catalog field and the id column are present
    report.add(columns::check(ctx, df));

    // 3. Row identifiers are non-null and unique
    report.add(identifier::check(df));

    // 4. Raw code counts equal clean value counts, both partitions
    report.extend(frequency::check(ctx, df));

    // 5. Ordinals stay in their declared set, sums in their bounds
    report.extend(range::check(ctx, df));

    // 6. No negative minutes
    report.extend(duration::check(ctx, df));

    // 7. Cross-field implications
    report.extend(implication::check(ctx, df));

    report
}

/// Every cell of a clean column, or `None` when the column is absent.
pub(crate) fn column_cells<'a>(df: &'a DataFrame, name: &str) -> Option<Vec<AnyValue<'a>>> {
    let column = df.column(name).ok()?;
    Some(
        (0..df.height())
            .map(|idx| column.get(idx).unwrap_or(AnyValue::Null))
            .collect(),
    )
}
