use std::collections::HashSet;

use polars::prelude::DataFrame;
use stroke_common::{any_is_null, any_to_string};
use stroke_model::{CheckKind, CheckResult, ID_COLUMN};

use super::column_cells;

/// Row identifiers must be present on every row and pairwise distinct.
pub fn check(df: &DataFrame) -> CheckResult {
    let Some(cells) = column_cells(df, ID_COLUMN) else {
        return CheckResult::fail(
            CheckKind::UniqueId,
            Some(ID_COLUMN),
            "unique ids",
            "no id column",
            "clean table has no id column",
        );
    };

    let mut seen: HashSet<String> = HashSet::with_capacity(cells.len());
    let mut nulls = 0usize;
    let mut duplicates = 0usize;
    for cell in cells {
        if any_is_null(&cell) {
            nulls += 1;
        } else if !seen.insert(any_to_string(cell)) {
            duplicates += 1;
        }
    }

    CheckResult::compare(
        CheckKind::UniqueId,
        Some(ID_COLUMN),
        &"0 null, 0 duplicate".to_string(),
        &format!("{nulls} null, {duplicates} duplicate"),
        "ids are non-null and unique",
    )
}
