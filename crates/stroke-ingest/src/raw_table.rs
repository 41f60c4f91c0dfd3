use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use stroke_model::SchemaError;
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Raw registry export: header plus string cells, loaded once and never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    index: BTreeMap<String, usize>,
}

impl RawTable {
    /// Builds a table, rejecting duplicate header names and rows whose
    /// width differs from the header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut index = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if index.insert(header.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    column: header.clone(),
                }
                .into());
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(IngestError::RaggedRow {
                    row: idx + 1,
                    expected: headers.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            headers,
            rows,
            index,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name.trim()).copied()
    }

    /// Cell at `row` (0-based data row) and `column` index, untrimmed.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Every cell of one column, or `None` when the column is absent.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let column = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[column].as_str()))
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

/// Reads a raw export with a single header row.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let table = read_raw_table_from_reader(BufReader::new(file), path)?;
    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "raw table loaded"
    );
    Ok(table)
}

/// Reads a raw export from any reader. `path` is only used in errors.
pub fn read_raw_table_from_reader<R: Read>(reader: R, path: &Path) -> Result<RawTable> {
    let parse_error = |e: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| normalize_header(h).is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    debug!(path = %path.display(), rows = rows.len(), "raw records parsed");
    RawTable::new(headers, rows)
}
