pub mod catalog;
pub mod error;
pub mod mapping;
pub mod processing;
pub mod validation;
pub mod value;

pub use catalog::{
    CatalogDocument, CatalogHeader, ExpectedShape, FieldRule, Implication, MissingPolicy, Rule,
    default_missing_tokens,
};
pub use error::SchemaError;
pub use mapping::{MappingIssue, MappingIssueKind, MappingReport, NormalizeStats};
pub use processing::{RunOptions, RunReport};
pub use validation::{CheckKind, CheckResult, CheckStatus, Severity, ValidationReport};
pub use value::{CleanType, CleanValue};

/// Name of the generated row identifier column in every clean table.
pub const ID_COLUMN: &str = "id";
