//! Run stages shared by the `run` and `check` commands.
//!
//! Stage order: catalog → ingest (shape check) → normalize → validate →
//! output. Schema errors abort before any row is transformed; mapping issues
//! and failed checks are collected into the [`RunReport`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use stroke_catalog::{Catalog, load_catalog, load_default_catalog};
use stroke_ingest::{check_shape, read_clean_table, read_raw_table, resolve_shape};
use stroke_model::{RunOptions, RunReport, ValidationReport};
use stroke_output::{write_clean_csv, write_run_report};
use stroke_transform::normalize;
use stroke_validate::{ValidationContext, validate};

use crate::logging::redact_value;

/// Everything a `run` produced, for summaries and tests.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub clean: DataFrame,
    /// Where the clean table was written, if it was.
    pub written: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    /// Whether the run counts as failed under the chosen strictness.
    pub failed: bool,
}

/// Loads the catalog from `path`, or the default catalog.
pub fn load_run_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            load_catalog(path).with_context(|| format!("load catalog {}", path.display()))
        }
        None => load_default_catalog().context("load default catalog"),
    }
}

pub fn run_pipeline(options: &RunOptions) -> Result<RunOutcome> {
    let run_span = info_span!("run", raw = %options.raw_path.display());
    let _run_guard = run_span.enter();

    // Stage 1: catalog
    let catalog = load_run_catalog(options.catalog_path.as_deref())?;
    let fingerprint = catalog.fingerprint().unwrap_or_default().to_string();
    info!(
        catalog = catalog.name(),
        fields = catalog.fields().len(),
        implications = catalog.implications().len(),
        "catalog ready"
    );

    // Stage 2: ingest with shape precondition
    let ingest_start = Instant::now();
    let raw = read_raw_table(&options.raw_path)
        .with_context(|| format!("read raw table {}", options.raw_path.display()))?;
    let shape = resolve_shape(
        catalog.shape(),
        options.expected_rows,
        options.expected_columns,
    );
    check_shape(&raw, shape).context("raw table shape")?;
    info!(
        rows = raw.height(),
        columns = raw.width(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    // Stage 3: normalize
    let normalization = normalize(&raw, &catalog).context("bind catalog to raw table")?;
    for issue in &normalization.issues.issues {
        debug!(
            row = issue.row,
            field = %issue.field,
            kind = %issue.kind,
            value = redact_value(issue.value.as_deref().unwrap_or("")),
            "mapping issue"
        );
    }
    let clean = normalization
        .table
        .to_dataframe()
        .context("materialize clean table")?;

    // Stage 4: validate
    let validation = validate(&ValidationContext::new(&catalog, &raw), &clean);

    let mut report = RunReport {
        catalog: catalog.name().to_string(),
        catalog_sha256: fingerprint,
        raw_path: options.raw_path.clone(),
        output_path: None,
        raw_rows: raw.height(),
        clean_rows: clean.height(),
        mapping: normalization.issues,
        stats: normalization.stats,
        validation,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    let failed = report.has_errors(options.strict);

    // Stage 5: output
    let written = match &options.output_path {
        Some(path) if !options.dry_run && (!failed || options.keep_going) => {
            write_clean_csv(&clean, path)
                .with_context(|| format!("write clean table {}", path.display()))?;
            Some(path.clone())
        }
        Some(path) if !options.dry_run => {
            warn!(
                path = %path.display(),
                "run failed; clean table not written (use --keep-going to override)"
            );
            None
        }
        _ => None,
    };
    report.output_path.clone_from(&written);

    if let Some(path) = &options.report_path {
        write_run_report(&report, path)
            .with_context(|| format!("write run report {}", path.display()))?;
    }

    Ok(RunOutcome {
        report,
        clean,
        written,
        report_path: options.report_path.clone(),
        failed,
    })
}

/// Inputs of a `check`: an existing clean CSV and the raw export it came from.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub raw_path: PathBuf,
    pub clean_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub expected_rows: Option<usize>,
    pub expected_columns: Option<usize>,
}

/// Validates an existing clean CSV against its raw export. The raw shape is
/// checked first, exactly as in a run.
pub fn check_pipeline(options: &CheckOptions) -> Result<ValidationReport> {
    let check_span = info_span!("check", clean = %options.clean_path.display());
    let _check_guard = check_span.enter();

    let catalog = load_run_catalog(options.catalog_path.as_deref())?;
    let raw = read_raw_table(&options.raw_path)
        .with_context(|| format!("read raw table {}", options.raw_path.display()))?;
    let shape = resolve_shape(
        catalog.shape(),
        options.expected_rows,
        options.expected_columns,
    );
    check_shape(&raw, shape).context("raw table shape")?;
    let clean = read_clean_table(&options.clean_path)
        .with_context(|| format!("read clean table {}", options.clean_path.display()))?;
    Ok(validate(&ValidationContext::new(&catalog, &raw), &clean))
}
