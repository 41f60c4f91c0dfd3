use std::fs;
use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};
use stroke_common::any_to_string;
use tracing::{info, warn};

use crate::ensure_parent_dir;
use crate::error::{OutputError, Result};

/// Writes the clean table as CSV: a header row of column names, nulls as
/// empty cells, integers without decimals, floats without trailing zeros.
///
/// The file is written next to `path` and renamed into place, so a failed
/// write never leaves a partial clean table behind.
pub fn write_clean_csv(df: &DataFrame, path: &Path) -> Result<usize> {
    ensure_parent_dir(path)?;
    let staging = path.with_extension("csv.partial");
    let written = write_records(df, &staging)
        .and_then(|()| fs::rename(&staging, path).map_err(|e| OutputError::io(path, e)));
    if let Err(error) = written {
        if staging.exists()
            && let Err(cleanup) = fs::remove_file(&staging)
        {
            warn!(path = %staging.display(), error = %cleanup, "staging file not removed");
        }
        return Err(error);
    }

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "clean table written"
    );
    Ok(df.height())
}

fn write_records(df: &DataFrame, staging: &Path) -> Result<()> {
    let csv_error = |source| OutputError::Csv {
        path: staging.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(staging).map_err(csv_error)?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    writer.write_record(&names).map_err(csv_error)?;

    let columns = df.get_columns();
    let mut record: Vec<String> = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        for column in columns {
            record.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| OutputError::io(staging, e))
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    #[test]
    fn formats_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clean.csv");
        let df = DataFrame::new(vec![
            Series::new("id".into(), &[1i64, 2]).into_column(),
            Series::new("stroke_team".into(), &[Some("Team, A"), None]).into_column(),
            Series::new("age".into(), &[Some(87.5f64), Some(100.0)]).into_column(),
            Series::new("male".into(), &[Some(1i64), None]).into_column(),
        ])
        .unwrap();

        let rows = write_clean_csv(&df, &path).unwrap();
        assert_eq!(rows, 2);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "id,stroke_team,age,male\n1,\"Team, A\",87.5,1\n2,,100,\n"
        );
        assert!(!path.with_extension("csv.partial").exists());
    }

    #[test]
    fn failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "occupied").unwrap();
        let df = DataFrame::new(vec![Series::new("id".into(), &[1i64]).into_column()]).unwrap();

        let err = write_clean_csv(&df, &path).unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));
        assert!(!path.with_extension("csv.partial").exists());
        assert!(path.join("keep").exists());
    }
}
