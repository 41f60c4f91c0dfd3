#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use stroke_common::MissingTokens;
use stroke_model::{CatalogDocument, ExpectedShape, FieldRule, Implication, SchemaError};

use crate::hash::sha256_hex;
use crate::order::derivation_order;
use crate::partition::{Partition, field_partitions};
use crate::rules::check_document;

/// A structurally valid schema catalog.
///
/// Construction fails with [`SchemaError`] for duplicate or reserved field
/// names, conflicting code partitions, unknown references and cyclic
/// derivation dependencies, so a `Catalog` value is always safe to run.
#[derive(Debug, Clone)]
pub struct Catalog {
    document: CatalogDocument,
    order: Vec<usize>,
    index: BTreeMap<String, usize>,
    missing: MissingTokens,
    fingerprint: Option<String>,
}

impl Catalog {
    pub fn from_document(document: CatalogDocument) -> Result<Self, SchemaError> {
        check_document(&document)?;
        let order = derivation_order(&document.fields)?;
        let index = document
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name.clone(), idx))
            .collect();
        let missing = MissingTokens::new(&document.missing_tokens);
        Ok(Self {
            document,
            order,
            index,
            missing,
            fingerprint: None,
        })
    }

    /// Parses and validates a TOML catalog.
    pub fn from_toml_str(text: &str) -> Result<Self, crate::CatalogError> {
        let document: CatalogDocument =
            toml::from_str(text).map_err(|source| crate::CatalogError::Toml {
                path: "<inline>".into(),
                source,
            })?;
        let mut catalog = Self::from_document(document)?;
        catalog.fingerprint = Some(sha256_hex(text.as_bytes()));
        Ok(catalog)
    }

    pub(crate) fn with_fingerprint(mut self, fingerprint: String) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn name(&self) -> &str {
        &self.document.catalog.name
    }

    pub fn document(&self) -> &CatalogDocument {
        &self.document
    }

    /// SHA-256 of the TOML source, when the catalog was loaded from text.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn shape(&self) -> ExpectedShape {
        self.document.shape
    }

    pub fn missing_tokens(&self) -> &MissingTokens {
        &self.missing
    }

    /// Fields in declaration order (the clean column order).
    pub fn fields(&self) -> &[FieldRule] {
        &self.document.fields
    }

    /// Fields in evaluation order: every field after its dependencies.
    pub fn derivation_order(&self) -> impl Iterator<Item = &FieldRule> {
        self.order.iter().map(|&idx| &self.document.fields[idx])
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.index.get(name).map(|&idx| &self.document.fields[idx])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn implications(&self) -> &[Implication] {
        &self.document.implications
    }

    /// Distinct raw columns read by the catalog, sorted.
    pub fn source_columns(&self) -> BTreeSet<&str> {
        self.document
            .fields
            .iter()
            .filter_map(|field| field.rule.source())
            .collect()
    }

    /// Binds the catalog to a raw header: every source column must be
    /// present. Returns the first field whose column is absent.
    pub fn check_raw_columns<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), SchemaError> {
        let available: BTreeSet<&str> = headers.iter().map(|h| h.as_ref().trim()).collect();
        for field in &self.document.fields {
            if let Some(column) = field.rule.source()
                && !available.contains(column.trim())
            {
                return Err(SchemaError::MissingSourceColumn {
                    field: field.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Frequency-conservation partitions for every field, in declaration
    /// order.
    pub fn partitions(&self) -> Vec<Partition> {
        self.document
            .fields
            .iter()
            .flat_map(field_partitions)
            .collect()
    }
}
