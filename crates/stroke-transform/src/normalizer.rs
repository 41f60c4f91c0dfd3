//! Record normalizer.
//!
//! One pass over the raw table. Each row is evaluated field by field in
//! derivation order, derived fields read the clean values already computed
//! for the same row, and every failure is collected as a [`MappingIssue`]
//! with the offending cell left null.

use std::time::Instant;

use stroke_catalog::Catalog;
use stroke_ingest::RawTable;
use stroke_model::{CleanValue, MappingIssue, MappingReport, NormalizeStats, Rule, SchemaError};
use tracing::{debug, info, info_span, warn};

use crate::table::CleanTable;
use crate::transformers::{
    FieldResult, binary_flag, bounded_sum, composite_flag, duration_minutes, lookup_value,
    ordinal_code, presence_flag, text_value, tri_state_flag,
};

/// Result of [`normalize`]: the complete clean table plus every issue.
/// The table is only fit for publication when `issues` is empty.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub table: CleanTable,
    pub issues: MappingReport,
    pub stats: NormalizeStats,
}

impl Normalization {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A catalog field bound to raw column and clean column positions.
struct Step<'a> {
    /// Index into the clean columns (declaration order).
    target: usize,
    name: &'a str,
    rule: &'a Rule,
    /// Raw column index and name for rules that read the raw table.
    source: Option<(usize, &'a str)>,
    /// Clean column indices of the rule's dependencies.
    inputs: Vec<usize>,
}

/// Normalizes `raw` with `catalog`.
///
/// Fails only on structural problems, before any row is read: a source
/// column absent from the raw header.
pub fn normalize(raw: &RawTable, catalog: &Catalog) -> Result<Normalization, SchemaError> {
    let span = info_span!("normalize", catalog = catalog.name(), rows = raw.height());
    let _guard = span.enter();
    let start = Instant::now();

    catalog.check_raw_columns(raw.headers())?;
    let steps = bind(raw, catalog)?;
    let missing = catalog.missing_tokens();

    let mut table = CleanTable::with_schema(
        catalog
            .fields()
            .iter()
            .map(|field| (field.name.as_str(), field.rule.clean_type())),
        raw.height(),
    );
    let mut issues = MappingReport::default();
    let mut stats = NormalizeStats {
        rows: raw.height(),
        fields: steps.len(),
        ..NormalizeStats::default()
    };

    for row in 0..raw.height() {
        let id = row as i64 + 1;
        let mut values: Vec<Option<CleanValue>> = vec![None; steps.len()];
        for step in &steps {
            let cell = step
                .source
                .and_then(|(column, _)| missing.present(raw.cell(row, column)));
            let inputs: Vec<Option<i64>> = step
                .inputs
                .iter()
                .map(|&idx| values[idx].as_ref().and_then(CleanValue::as_i64))
                .collect();

            let gated = is_gated_off(step.rule, &inputs);
            match apply(step.rule, cell, &inputs) {
                Ok(Some(_)) if gated => {
                    *stats.gated.entry(step.name.to_string()).or_insert(0) += 1;
                }
                Ok(value) => values[step.target] = value,
                Err(kind) => issues.push(MappingIssue {
                    row: row + 1,
                    id,
                    field: step.name.to_string(),
                    column: step.source.map(|(_, name)| name.to_string()),
                    value: match step.rule {
                        Rule::Sum { .. } => describe_sum(&inputs),
                        _ => cell.map(str::to_string),
                    },
                    kind,
                }),
            }
        }
        table.push_row(id, values);
    }

    stats.issues = issues.len();
    for ((field, kind), count) in issues.counts() {
        warn!(field = %field, kind = %kind, count, "unmappable values");
    }
    info!(
        rows = stats.rows,
        fields = stats.fields,
        issues = stats.issues,
        gated = stats.gated_total(),
        duration_ms = start.elapsed().as_millis(),
        "normalization complete"
    );
    Ok(Normalization {
        table,
        issues,
        stats,
    })
}

fn bind<'a>(raw: &RawTable, catalog: &'a Catalog) -> Result<Vec<Step<'a>>, SchemaError> {
    let mut steps = Vec::with_capacity(catalog.fields().len());
    for field in catalog.derivation_order() {
        let target = position(catalog, &field.name, &field.name)?;
        let source = match field.rule.source() {
            Some(column) => {
                let index =
                    raw.column_index(column)
                        .ok_or_else(|| SchemaError::MissingSourceColumn {
                            field: field.name.clone(),
                            column: column.to_string(),
                        })?;
                Some((index, column))
            }
            None => None,
        };
        let inputs = field
            .rule
            .dependencies()
            .into_iter()
            .map(|dependency| position(catalog, &field.name, dependency))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            field = %field.name,
            kind = field.rule.kind_name(),
            source = source.map(|(_, name)| name),
            "field bound"
        );
        steps.push(Step {
            target,
            name: &field.name,
            rule: &field.rule,
            source,
            inputs,
        });
    }
    Ok(steps)
}

fn position(catalog: &Catalog, field: &str, dependency: &str) -> Result<usize, SchemaError> {
    catalog
        .position(dependency)
        .ok_or_else(|| SchemaError::UnknownDependency {
            field: field.to_string(),
            dependency: dependency.to_string(),
        })
}

/// A gated duration is suppressed when its flag is exactly 0: a valid value
/// is nulled and counted, an unmappable one is still reported. A null flag
/// (itself a mapping issue) leaves the duration alone.
fn is_gated_off(rule: &Rule, inputs: &[Option<i64>]) -> bool {
    matches!(
        rule,
        Rule::Duration {
            only_when: Some(_),
            ..
        }
    ) && inputs.first() == Some(&Some(0))
}

fn apply(rule: &Rule, cell: Option<&str>, inputs: &[Option<i64>]) -> FieldResult {
    match rule {
        Rule::Binary {
            positive,
            negative,
            missing,
            ..
        } => binary_flag(cell, positive, negative, *missing),
        Rule::TriState {
            positive,
            negative,
            missing,
            ..
        } => tri_state_flag(cell, positive, negative, *missing),
        Rule::Composite {
            positive,
            negative,
            missing,
            ..
        } => composite_flag(cell, positive, negative, *missing),
        Rule::Presence { .. } => presence_flag(cell),
        Rule::Duration { .. } => duration_minutes(cell),
        Rule::Ordinal {
            values,
            not_assessed,
            ..
        } => ordinal_code(cell, values, *not_assessed),
        Rule::Sum { min, max, .. } => bounded_sum(inputs, *min, *max),
        Rule::Lookup { map, missing, .. } => lookup_value(cell, map, *missing),
        Rule::Text { .. } => text_value(cell),
    }
}

fn describe_sum(inputs: &[Option<i64>]) -> Option<String> {
    let total = inputs
        .iter()
        .flatten()
        .try_fold(0_i64, |acc, value| acc.checked_add(*value));
    Some(total.map_or_else(|| "overflow".to_string(), |total| total.to_string()))
}
