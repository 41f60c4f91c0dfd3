//! Raw to clean record transformation.
//!
//! - **transformers**: pure per-family field functions (flags, durations,
//!   ordinals, sums, lookups, text)
//! - **normalizer**: single pass over a raw table driven by the catalog
//! - **table**: the clean table and its Polars materialization

pub mod normalizer;
pub mod table;
pub mod transformers;

pub use normalizer::{Normalization, normalize};
pub use stroke_model::NormalizeStats;
pub use table::{CleanColumn, CleanTable, ColumnData};
