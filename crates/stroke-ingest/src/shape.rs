//! Raw table shape precondition.

use stroke_model::{ExpectedShape, SchemaError};

use crate::raw_table::RawTable;

/// Applies command-line overrides on top of the catalog's declared shape.
pub fn resolve_shape(
    declared: ExpectedShape,
    rows: Option<usize>,
    columns: Option<usize>,
) -> ExpectedShape {
    ExpectedShape {
        columns: columns.unwrap_or(declared.columns),
        rows: rows.or(declared.rows),
    }
}

/// Fails when the raw column count, or the row count if one is pinned,
/// differs from `expected`.
pub fn check_shape(table: &RawTable, expected: ExpectedShape) -> Result<(), SchemaError> {
    let rows_match = expected.rows.is_none_or(|rows| rows == table.height());
    if rows_match && expected.columns == table.width() {
        return Ok(());
    }
    Err(SchemaError::ShapeMismatch {
        expected_rows: expected.rows,
        expected_columns: expected.columns,
        actual_rows: table.height(),
        actual_columns: table.width(),
    })
}
