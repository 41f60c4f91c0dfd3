//! Output writers for normalized stroke registry data.

mod clean_csv;
mod error;
mod report;

pub use clean_csv::write_clean_csv;
pub use error::{OutputError, Result};
pub use report::write_run_report;

use std::fs;
use std::path::Path;

/// Ensure a parent directory exists for a file path.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
    }
    Ok(())
}
