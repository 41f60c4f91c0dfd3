use std::fs;
use std::path::Path;

use stroke_model::RunReport;
use tracing::info;

use crate::ensure_parent_dir;
use crate::error::{OutputError, Result};

/// Writes the run report as pretty-printed JSON.
pub fn write_run_report(report: &RunReport, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, format!("{json}\n")).map_err(|e| OutputError::io(path, e))?;
    info!(
        path = %path.display(),
        issues = report.mapping.len(),
        checks = report.validation.checks.len(),
        "run report written"
    );
    Ok(())
}
