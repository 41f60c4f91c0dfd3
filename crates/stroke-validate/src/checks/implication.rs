use polars::prelude::DataFrame;
use stroke_common::{any_is_null, any_to_i64};
use stroke_model::{CheckKind, CheckResult, Implication};

use super::column_cells;
use crate::ValidationContext;

/// Rows where `when == equals` must have every `null_fields` column null.
pub fn check(ctx: &ValidationContext<'_>, df: &DataFrame) -> Vec<CheckResult> {
    ctx.catalog
        .implications()
        .iter()
        .map(|implication| check_implication(df, implication))
        .collect()
}

fn check_implication(df: &DataFrame, implication: &Implication) -> CheckResult {
    let message = format!(
        "{}: {} == {} implies null {}",
        implication.name,
        implication.when,
        implication.equals,
        implication.null_fields.join(", ")
    );
    let Some(condition) = column_cells(df, &implication.when) else {
        return absent(implication, &implication.when, message);
    };
    let mut targets = Vec::with_capacity(implication.null_fields.len());
    for field in &implication.null_fields {
        let Some(cells) = column_cells(df, field) else {
            return absent(implication, field, message);
        };
        targets.push(cells);
    }

    let violations = condition
        .into_iter()
        .enumerate()
        .filter(|(_, cell)| any_to_i64(cell.clone()) == Some(implication.equals))
        .filter(|(row, _)| targets.iter().any(|cells| !any_is_null(&cells[*row])))
        .count();
    CheckResult::compare(
        CheckKind::Implication,
        Some(&implication.when),
        &0usize,
        &violations,
        message,
    )
}

fn absent(implication: &Implication, column: &str, message: String) -> CheckResult {
    CheckResult::fail(
        CheckKind::Implication,
        Some(&implication.when),
        "0",
        format!("column '{column}' absent"),
        message,
    )
}
