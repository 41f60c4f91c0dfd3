use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use stroke_cli::pipeline::RunOutcome;
use stroke_model::{CheckKind, CheckResult, MappingReport, Severity, ValidationReport};

pub fn print_run_summary(outcome: &RunOutcome) {
    let report = &outcome.report;
    println!("Catalog: {} ({})", report.catalog, short_hash(&report.catalog_sha256));
    println!("Raw: {}", report.raw_path.display());
    match &outcome.written {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: not written"),
    }
    if let Some(path) = &outcome.report_path {
        println!("Run report: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Rows"),
        header_cell("Items"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        stage_cell("Ingest"),
        Cell::new(report.raw_rows),
        dim_cell("-"),
        count_cell(Some(0), Color::Red),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        stage_cell("Normalize"),
        Cell::new(report.stats.rows),
        Cell::new(format!("{} fields", report.stats.fields)),
        count_cell(Some(report.mapping.len()), Color::Red),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        stage_cell("Validate"),
        Cell::new(report.clean_rows),
        Cell::new(format!("{} checks", report.validation.checks.len())),
        count_cell(Some(report.validation.error_count()), Color::Red),
        count_cell(Some(report.validation.warning_count()), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.clean_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(
            Some(report.mapping.len() + report.validation.error_count()),
            Color::Red,
        )
        .add_attribute(Attribute::Bold),
        count_cell(Some(report.validation.warning_count()), Color::Yellow)
            .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let gated = report.stats.gated_total();
    if gated > 0 {
        println!("Gated durations nulled: {gated}");
    }
    print_mapping_table(&report.mapping);
    print_check_table(&report.validation);
}

pub fn print_check_summary(report: &ValidationReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Run"),
        header_cell("Passed"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut by_kind: BTreeMap<CheckKind, [usize; 4]> = BTreeMap::new();
    for result in &report.checks {
        let counts = by_kind.entry(result.check).or_default();
        counts[0] += 1;
        if result.passed() {
            counts[1] += 1;
        } else if result.severity == Severity::Error {
            counts[2] += 1;
        } else {
            counts[3] += 1;
        }
    }
    for (kind, [run, passed, errors, warnings]) in by_kind {
        table.add_row(vec![
            stage_cell(kind.as_str()),
            Cell::new(run),
            Cell::new(passed),
            count_cell(Some(errors), Color::Red),
            count_cell(Some(warnings), Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.checks.len()).add_attribute(Attribute::Bold),
        Cell::new(report.checks.iter().filter(|c| c.passed()).count())
            .add_attribute(Attribute::Bold),
        count_cell(Some(report.error_count()), Color::Red).add_attribute(Attribute::Bold),
        count_cell(Some(report.warning_count()), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_check_table(report);
}

fn print_mapping_table(mapping: &MappingReport) {
    if mapping.is_empty() {
        return;
    }
    let mut first_rows: BTreeMap<(&str, _), usize> = BTreeMap::new();
    for issue in &mapping.issues {
        first_rows
            .entry((issue.field.as_str(), issue.kind))
            .or_insert(issue.row);
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Issue"),
        header_cell("Count"),
        header_cell("First row"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for ((field, kind), count) in mapping.counts() {
        let first = first_rows.get(&(field.as_str(), kind)).copied();
        table.add_row(vec![
            Cell::new(&field),
            Cell::new(kind.as_str()).fg(Color::Red),
            Cell::new(count).fg(Color::Red),
            first.map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!();
    println!("Mapping issues:");
    println!("{table}");
}

fn print_check_table(report: &ValidationReport) {
    let mut failures: Vec<&CheckResult> = report.failures().collect();
    if failures.is_empty() {
        return;
    }
    failures.sort_by_key(|c| (severity_rank(c.severity), c.check));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Check"),
        header_cell("Field"),
        header_cell("Expected"),
        header_cell("Observed"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for failure in failures {
        table.add_row(vec![
            severity_cell(failure.severity),
            Cell::new(failure.check.as_str()),
            failure
                .field
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&failure.expected),
            Cell::new(&failure.observed),
            Cell::new(&failure.message),
        ]);
    }
    println!();
    println!("Failed checks:");
    println!("{table}");
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(100);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn stage_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
