use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::error::{IngestError, Result};

/// Reads a clean table written by a previous run.
///
/// The whole file is scanned for schema inference so a late fractional or
/// text value cannot fail the read; empty cells come back as nulls.
pub fn read_clean_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let parse_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "clean table loaded"
    );
    Ok(df)
}
