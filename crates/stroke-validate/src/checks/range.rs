//! Closed-range checks for ordinal sub-scores and bounded sums.
//!
//! Values outside the declared domain are errors. An ordinal whose observed
//! set is narrower than declared, or a sum that never reaches its bounds, is
//! reported at warning severity: on a full registry extract every level is
//! expected to occur.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use stroke_common::{any_is_null, any_to_i64, any_to_string};
use stroke_model::{CheckKind, CheckResult, FieldRule, Rule, Severity};

use super::column_cells;
use crate::ValidationContext;

pub fn check(ctx: &ValidationContext<'_>, df: &DataFrame) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for field in ctx.catalog.fields() {
        match &field.rule {
            Rule::Ordinal {
                values,
                not_assessed,
                ..
            } => {
                if let Some(result) = check_ordinal(df, field, values, *not_assessed) {
                    results.push(result);
                }
            }
            Rule::Sum { min, max, .. } => results.extend(check_sum(df, field, *min, *max)),
            _ => {}
        }
    }
    results
}

fn check_ordinal(
    df: &DataFrame,
    field: &FieldRule,
    values: &[i64],
    not_assessed: Option<i64>,
) -> Option<CheckResult> {
    let cells = column_cells(df, &field.name)?;
    let declared: BTreeSet<i64> = values.iter().copied().collect();

    let mut observed: BTreeSet<i64> = BTreeSet::new();
    let mut foreign: BTreeSet<String> = BTreeSet::new();
    for cell in cells {
        if any_is_null(&cell) {
            continue;
        }
        match any_to_i64(cell.clone()) {
            Some(value) if Some(value) == not_assessed => {}
            Some(value) if declared.contains(&value) => {
                observed.insert(value);
            }
            _ => {
                foreign.insert(any_to_string(cell));
            }
        }
    }

    let expected = format_set(declared.iter().map(i64::to_string));
    if !foreign.is_empty() {
        return Some(CheckResult::fail(
            CheckKind::RangeClosure,
            Some(&field.name),
            expected,
            format_set(foreign.iter().cloned()),
            "values outside the declared set",
        ));
    }
    let observed_text = format_set(observed.iter().map(i64::to_string));
    if observed == declared {
        Some(CheckResult::pass(
            CheckKind::RangeClosure,
            Some(&field.name),
            expected,
            observed_text,
            "observed set equals declared set",
        ))
    } else {
        Some(
            CheckResult::fail(
                CheckKind::RangeClosure,
                Some(&field.name),
                expected,
                observed_text,
                "observed set narrower than declared",
            )
            .with_severity(Severity::Warning),
        )
    }
}

fn check_sum(df: &DataFrame, field: &FieldRule, min: i64, max: i64) -> Vec<CheckResult> {
    let Some(cells) = column_cells(df, &field.name) else {
        return Vec::new();
    };
    let mut outside = 0usize;
    let mut observed: Option<(i64, i64)> = None;
    for cell in cells {
        if any_is_null(&cell) {
            continue;
        }
        let Some(value) = any_to_i64(cell) else {
            outside += 1;
            continue;
        };
        if !(min..=max).contains(&value) {
            outside += 1;
        }
        observed = Some(match observed {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
    }

    let within = CheckResult::compare(
        CheckKind::RangeClosure,
        Some(&field.name),
        &0usize,
        &outside,
        format!("values outside [{min}, {max}]"),
    );
    let observed_text = observed.map_or_else(
        || "no values".to_string(),
        |(lo, hi)| format!("[{lo}, {hi}]"),
    );
    let span = if observed == Some((min, max)) {
        CheckResult::pass(
            CheckKind::RangeClosure,
            Some(&field.name),
            format!("[{min}, {max}]"),
            observed_text,
            "observed range reaches both bounds",
        )
    } else {
        CheckResult::fail(
            CheckKind::RangeClosure,
            Some(&field.name),
            format!("[{min}, {max}]"),
            observed_text,
            "observed range does not reach both bounds",
        )
        .with_severity(Severity::Warning)
    };
    vec![within, span]
}

fn format_set(items: impl Iterator<Item = String>) -> String {
    format!("{{{}}}", items.collect::<Vec<_>>().join(", "))
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};
    use stroke_catalog::Catalog;
    use stroke_ingest::RawTable;
    use stroke_model::CheckStatus;

    use super::*;

    const CATALOG: &str = r#"
        [catalog]
        name = "unit"
        schema_version = 1

        [shape]
        columns = 2

        [[fields]]
        name = "loc"
        rule = { kind = "ordinal", source = "Loc", values = [0, 1, 2] }

        [[fields]]
        name = "gaze"
        rule = { kind = "ordinal", source = "Gaze", values = [0, 1], not_assessed = 9 }

        [[fields]]
        name = "severity"
        rule = { kind = "sum", depends_on = ["loc", "gaze"], min = 0, max = 3 }
    "#;

    fn run(loc: &[Option<i64>], gaze: &[Option<i64>], severity: &[Option<i64>]) -> Vec<CheckResult> {
        let catalog = Catalog::from_toml_str(CATALOG).unwrap();
        let raw = RawTable::new(vec!["Loc".to_string(), "Gaze".to_string()], Vec::new()).unwrap();
        let ctx = ValidationContext::new(&catalog, &raw);
        let df = DataFrame::new(vec![
            Series::new("loc".into(), loc).into_column(),
            Series::new("gaze".into(), gaze).into_column(),
            Series::new("severity".into(), severity).into_column(),
        ])
        .unwrap();
        check(&ctx, &df)
    }

    #[test]
    fn full_coverage_passes() {
        let results = run(
            &[Some(0), Some(1), Some(2), None],
            &[Some(0), Some(1), Some(9), Some(1)],
            &[Some(0), Some(2), Some(3), None],
        );
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(CheckResult::passed), "{results:?}");
    }

    #[test]
    fn narrower_set_is_a_warning() {
        let results = run(
            &[Some(0), Some(1), Some(1)],
            &[Some(0), Some(1), Some(1)],
            &[Some(0), Some(2), Some(3)],
        );
        let loc = &results[0];
        assert_eq!(loc.status, CheckStatus::Fail);
        assert_eq!(loc.severity, Severity::Warning);
        assert_eq!(loc.expected, "{0, 1, 2}");
        assert_eq!(loc.observed, "{0, 1}");
    }

    #[test]
    fn foreign_value_is_an_error() {
        let results = run(
            &[Some(0), Some(1), Some(2), Some(5)],
            &[Some(0), Some(1), Some(0), Some(0)],
            &[Some(0), Some(2), Some(3), Some(3)],
        );
        assert_eq!(results[0].severity, Severity::Error);
        assert!(!results[0].passed());
        assert_eq!(results[0].observed, "{5}");
    }

    #[test]
    fn sum_bounds() {
        let results = run(
            &[Some(0), Some(1), Some(2)],
            &[Some(0), Some(1), Some(1)],
            &[Some(0), Some(1), Some(4)],
        );
        let within = &results[2];
        let span = &results[3];
        assert!(!within.passed());
        assert_eq!(within.severity, Severity::Error);
        assert_eq!(within.observed, "1");
        assert!(!span.passed());
        assert_eq!(span.observed, "[0, 4]");
    }

    #[test]
    fn all_null_sum_warns() {
        let results = run(&[None], &[None], &[None]);
        assert!(results[2].passed());
        assert_eq!(results[3].observed, "no values");
        assert_eq!(results[3].severity, Severity::Warning);
    }
}
