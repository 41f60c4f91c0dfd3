//! Invariant validation of a clean table against its raw source.
//!
//! Every check yields a [`CheckResult`](stroke_model::CheckResult); nothing
//! here mutates either table. Clean cells are read through `AnyValue`, so a
//! table built in memory and one re-read from CSV validate the same way.

mod checks;

use std::time::Instant;

use polars::prelude::DataFrame;
use stroke_catalog::Catalog;
use stroke_ingest::RawTable;
use stroke_model::ValidationReport;
use tracing::{info, info_span, warn};

/// Read-only inputs shared by every check.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub catalog: &'a Catalog,
    pub raw: &'a RawTable,
}

impl<'a> ValidationContext<'a> {
    pub fn new(catalog: &'a Catalog, raw: &'a RawTable) -> Self {
        Self { catalog, raw }
    }
}

/// Runs the full check battery on `clean`.
pub fn validate(ctx: &ValidationContext<'_>, clean: &DataFrame) -> ValidationReport {
    let span = info_span!("validate", catalog = ctx.catalog.name(), rows = clean.height());
    let _guard = span.enter();
    let start = Instant::now();

    let report = checks::run_all(ctx, clean);

    for failure in report.failures() {
        warn!(
            check = failure.check.as_str(),
            field = failure.field.as_deref().unwrap_or("-"),
            expected = %failure.expected,
            observed = %failure.observed,
            "{}",
            failure.message
        );
    }
    info!(
        checks = report.checks.len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "validation complete"
    );
    report
}
