//! Catalog file resolution and loading.

use std::path::{Path, PathBuf};

use stroke_model::CatalogDocument;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::hash::sha256_hex;

/// Environment variable overriding the default catalog path.
pub const CATALOG_ENV_VAR: &str = "STROKE_CATALOG";

const DEFAULT_CATALOG_FILE: &str = "ssnap_v2.toml";

/// Resolution order:
/// 1. `STROKE_CATALOG` environment variable
/// 2. `standards/ssnap_v2.toml` relative to the workspace root
pub fn default_catalog_path() -> PathBuf {
    if let Ok(path) = std::env::var(CATALOG_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../standards")
        .join(DEFAULT_CATALOG_FILE)
}

pub fn load_default_catalog() -> Result<Catalog, CatalogError> {
    load_catalog(&default_catalog_path())
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    let document: CatalogDocument =
        toml::from_str(&text).map_err(|source| CatalogError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
    let catalog = Catalog::from_document(document)?.with_fingerprint(sha256_hex(text.as_bytes()));
    debug!(
        catalog = catalog.name(),
        path = %path.display(),
        fields = catalog.fields().len(),
        "catalog loaded"
    );
    Ok(catalog)
}
