#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod hash;
pub mod loader;
pub mod order;
pub mod partition;
pub mod rules;

pub use crate::catalog::Catalog;
pub use crate::error::CatalogError;
pub use crate::loader::{CATALOG_ENV_VAR, default_catalog_path, load_catalog, load_default_catalog};
pub use crate::partition::{CleanMatch, Partition, RawMatch};
