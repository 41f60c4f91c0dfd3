use std::time::Instant;

use anyhow::Result;
use comfy_table::Table;
use tracing::info;

use stroke_cli::pipeline::{
    CheckOptions, RunOutcome, check_pipeline, load_run_catalog, run_pipeline,
};
use stroke_model::{MissingPolicy, Rule, RunOptions, ValidationReport};

use crate::cli::{CatalogArgs, CheckArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_normalize(args: &RunArgs) -> Result<RunOutcome> {
    let start = Instant::now();
    let options = RunOptions {
        raw_path: args.raw.clone(),
        output_path: args.output.clone(),
        report_path: args.report.clone(),
        catalog_path: args.catalog.clone(),
        expected_rows: args.expected_rows,
        expected_columns: args.expected_columns,
        dry_run: args.dry_run,
        strict: args.strict,
        keep_going: args.keep_going,
    };
    let outcome = run_pipeline(&options)?;
    info!(
        rows = outcome.report.clean_rows,
        mapping_issues = outcome.report.mapping.len(),
        check_errors = outcome.report.validation.error_count(),
        check_warnings = outcome.report.validation.warning_count(),
        written = outcome.written.is_some(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(outcome)
}

pub fn run_check(args: &CheckArgs) -> Result<ValidationReport> {
    let start = Instant::now();
    let report = check_pipeline(&CheckOptions {
        raw_path: args.raw.clone(),
        clean_path: args.clean.clone(),
        catalog_path: args.catalog.clone(),
        expected_rows: args.expected_rows,
        expected_columns: args.expected_columns,
    })?;
    info!(
        checks = report.checks.len(),
        duration_ms = start.elapsed().as_millis(),
        "check complete"
    );
    Ok(report)
}

pub fn run_catalog(args: &CatalogArgs) -> Result<()> {
    let catalog = load_run_catalog(args.catalog.as_deref())?;
    let shape = catalog.shape();
    println!("Catalog: {}", catalog.name());
    if let Some(fingerprint) = catalog.fingerprint() {
        println!("SHA-256: {fingerprint}");
    }
    match shape.rows {
        Some(rows) => println!("Shape: {rows} rows x {} columns", shape.columns),
        None => println!("Shape: * rows x {} columns", shape.columns),
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Kind", "Source", "Domain", "Missing"]);
    apply_table_style(&mut table);
    for field in catalog.fields() {
        let source = match &field.rule {
            Rule::Sum { depends_on, .. } => depends_on.join(" + "),
            rule => rule.source().unwrap_or("-").to_string(),
        };
        table.add_row(vec![
            field.name.clone(),
            field.rule.kind_name().to_string(),
            source,
            rule_domain(&field.rule),
            missing_label(&field.rule).to_string(),
        ]);
    }
    println!("{table}");

    if !catalog.implications().is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Implication", "When", "Null fields"]);
        apply_table_style(&mut table);
        for implication in catalog.implications() {
            table.add_row(vec![
                implication.name.clone(),
                format!("{} == {}", implication.when, implication.equals),
                implication.null_fields.join(", "),
            ]);
        }
        println!();
        println!("{table}");
    }
    Ok(())
}

fn rule_domain(rule: &Rule) -> String {
    match rule {
        Rule::Binary {
            positive, negative, ..
        }
        | Rule::TriState {
            positive, negative, ..
        }
        | Rule::Composite {
            positive, negative, ..
        } => format!("1: {} / 0: {}", positive.join(","), negative.join(",")),
        Rule::Presence { .. } => "1: present / 0: missing".to_string(),
        Rule::Duration {
            only_when: Some(flag),
            ..
        } => format!("minutes >= 0 when {flag} == 1"),
        Rule::Duration { .. } => "minutes >= 0".to_string(),
        Rule::Ordinal {
            values,
            not_assessed,
            ..
        } => {
            let values: Vec<String> = values.iter().map(i64::to_string).collect();
            match not_assessed {
                Some(sentinel) => format!("{{{}}} (not assessed {sentinel})", values.join(", ")),
                None => format!("{{{}}}", values.join(", ")),
            }
        }
        Rule::Sum { min, max, .. } => format!("[{min}, {max}]"),
        Rule::Lookup { map, .. } => format!("{} codes", map.len()),
        Rule::Text { .. } => "text".to_string(),
    }
}

fn missing_label(rule: &Rule) -> &'static str {
    match rule {
        Rule::Binary { missing, .. }
        | Rule::TriState { missing, .. }
        | Rule::Composite { missing, .. }
        | Rule::Lookup { missing, .. } => missing.as_str(),
        Rule::Presence { .. } => MissingPolicy::Negative.as_str(),
        Rule::Duration { .. } | Rule::Ordinal { .. } | Rule::Sum { .. } | Rule::Text { .. } => {
            MissingPolicy::Null.as_str()
        }
    }
}
