//! End-to-end normalization and validation with the bundled SSNAP catalog.

use std::collections::BTreeMap;

use stroke_catalog::{Catalog, load_default_catalog};
use stroke_ingest::RawTable;
use stroke_model::{CheckKind, CleanValue, Rule};
use stroke_transform::normalize;
use stroke_validate::{ValidationContext, validate};

/// One row per level of the widest ordinal (mRS 0..=5). Every NIHSS item is
/// clamped to its own maximum, so the first row scores 0 and the last 42.
const ROWS: usize = 6;

fn cell_for(rule: &Rule, row: usize) -> Option<String> {
    match rule {
        Rule::Binary {
            positive, negative, ..
        }
        | Rule::TriState {
            positive, negative, ..
        }
        | Rule::Composite {
            positive, negative, ..
        } => {
            let codes: Vec<&String> = positive.iter().chain(negative).collect();
            Some(codes[row % codes.len()].clone())
        }
        Rule::Ordinal { values, .. } => {
            Some(values[row.min(values.len() - 1)].to_string())
        }
        Rule::Lookup { map, .. } => map.keys().nth(row % map.len()).cloned(),
        // Ambulance flags alternate Y/N, so gated durations are only
        // recorded on even rows.
        Rule::Duration {
            only_when: Some(_), ..
        } => Some(if row % 2 == 0 { "15" } else { "" }.to_string()),
        Rule::Duration { .. } | Rule::Presence { .. } => Some("45".to_string()),
        Rule::Text { .. } => Some(format!("Team {}", row % 3)),
        Rule::Sum { .. } => None,
    }
}

fn full_range_export(catalog: &Catalog) -> RawTable {
    let width = catalog.shape().columns;
    let mut headers: Vec<String> = catalog
        .source_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut padding = 0;
    while headers.len() < width {
        padding += 1;
        headers.push(format!("Unmapped{padding}"));
    }

    let rows = (0..ROWS)
        .map(|row| {
            let mut cells: BTreeMap<&str, String> = BTreeMap::new();
            for field in catalog.fields() {
                if let (Some(source), Some(cell)) = (field.rule.source(), cell_for(&field.rule, row))
                {
                    cells.entry(source).or_insert(cell);
                }
            }
            headers
                .iter()
                .map(|header| cells.get(header.as_str()).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    RawTable::new(headers, rows).expect("valid raw table")
}

#[test]
fn bundled_catalog_normalizes_a_full_range_export() {
    let catalog = load_default_catalog().expect("bundled catalog");
    let raw = full_range_export(&catalog);
    assert_eq!(raw.width(), 83);

    let normalization = normalize(&raw, &catalog).expect("catalog binds");
    assert!(
        normalization.is_clean(),
        "{:?}",
        normalization.issues.issues
    );
    assert_eq!(normalization.stats.gated_total(), 0);

    let table = &normalization.table;
    assert_eq!(table.value(0, "stroke_severity"), Some(CleanValue::Int(0)));
    assert_eq!(
        table.value(ROWS - 1, "stroke_severity"),
        Some(CleanValue::Int(42))
    );
    assert_eq!(table.value(ROWS - 1, "prior_disability"), Some(CleanValue::Int(5)));
    assert_eq!(table.value(1, "ambulance_on_scene_time"), None);
    assert_eq!(
        table.value(0, "ambulance_on_scene_time"),
        Some(CleanValue::Int(15))
    );

    let clean = table.to_dataframe().expect("clean frame");
    let report = validate(&ValidationContext::new(&catalog, &raw), &clean);
    let range_failures: Vec<_> = report
        .failures()
        .filter(|result| result.check == CheckKind::RangeClosure)
        .collect();
    assert!(range_failures.is_empty(), "{range_failures:?}");
    assert!(!report.has_errors(), "{:?}", report.failures().collect::<Vec<_>>());

    let severity_span: Vec<_> = report
        .for_field("stroke_severity")
        .filter(|result| result.check == CheckKind::RangeClosure)
        .collect();
    assert_eq!(severity_span.len(), 2);
    assert!(severity_span.iter().any(|result| result.observed == "[0, 42]"));
    assert!(
        report
            .for_field("nihss_arrival_loc")
            .any(|result| result.check == CheckKind::RangeClosure && result.passed())
    );
}
