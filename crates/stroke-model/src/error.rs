use thiserror::Error;

/// Structural errors that abort a run before any row is transformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field '{field}' reads raw column '{column}' which is absent from the raw table")]
    MissingSourceColumn { field: String, column: String },

    #[error("cyclic derivation dependency between fields: {}", fields.join(" -> "))]
    CyclicDependency { fields: Vec<String> },

    #[error("field '{field}' depends on unknown field '{dependency}'")]
    UnknownDependency { field: String, dependency: String },

    #[error(
        "raw table shape {actual_rows}x{actual_columns} does not match expected {}x{expected_columns}",
        expected_rows.map_or_else(|| "*".to_string(), |rows| rows.to_string())
    )]
    ShapeMismatch {
        expected_rows: Option<usize>,
        expected_columns: usize,
        actual_rows: usize,
        actual_columns: usize,
    },

    #[error("clean field '{field}' is declared more than once")]
    DuplicateField { field: String },

    #[error("clean field name '{field}' is reserved")]
    ReservedField { field: String },

    #[error("raw column '{column}' appears more than once in the raw header")]
    DuplicateColumn { column: String },

    #[error("invalid rule for field '{field}': {message}")]
    InvalidRule { field: String, message: String },

    #[error("implication '{implication}' references unknown field '{field}'")]
    UnknownImplicationField { implication: String, field: String },
}
