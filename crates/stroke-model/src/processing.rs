use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::mapping::{MappingReport, NormalizeStats};
use crate::validation::ValidationReport;

/// Options for one normalization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    pub raw_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    /// Overrides the catalog's expected row count.
    pub expected_rows: Option<usize>,
    /// Overrides the catalog's expected column count.
    pub expected_columns: Option<usize>,
    /// Normalize and validate without writing the clean table.
    pub dry_run: bool,
    /// Treat warning-severity check failures as errors.
    pub strict: bool,
    /// Write the clean table even when checks fail.
    pub keep_going: bool,
}

/// Aggregated outcome of a run: mapping issues plus check results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub catalog: String,
    pub catalog_sha256: String,
    pub raw_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub mapping: MappingReport,
    pub stats: NormalizeStats,
    pub validation: ValidationReport,
    pub generated_at: String,
}

impl RunReport {
    pub fn has_errors(&self, strict: bool) -> bool {
        if !self.mapping.is_empty() || self.validation.has_errors() {
            return true;
        }
        strict && self.validation.warning_count() > 0
    }
}
