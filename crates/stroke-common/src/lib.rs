//! Shared utilities for the stroke normalization crates.
//!
//! Raw cells arrive as strings from the registry export and clean cells come
//! back as Polars `AnyValue`s; both ends meet here.

pub mod cells;
pub mod polars;

pub use cells::{MissingTokens, NumberError, parse_f64, parse_whole_number};
pub use polars::{any_is_null, any_to_f64, any_to_i64, any_to_string, format_numeric};
