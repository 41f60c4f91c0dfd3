//! Stroke registry ingestion.
//!
//! Raw exports are read with the `csv` crate into an immutable [`RawTable`]
//! of trimmed strings: missingness depends on the catalog, so no cell is
//! interpreted here. Clean tables written by a previous run are read back
//! with Polars for stand-alone validation.

mod clean_reader;
mod error;
mod raw_table;
mod shape;

pub use clean_reader::read_clean_table;
pub use error::{IngestError, Result};
pub use raw_table::{RawTable, read_raw_table, read_raw_table_from_reader};
pub use shape::{check_shape, resolve_shape};
