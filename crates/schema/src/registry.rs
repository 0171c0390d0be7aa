//! Per-kind version registries
//!
//! A [`SchemaRegistry`] maps each schema version of one entity kind to its
//! [`FieldSchema`]. Registries are built once, usually inside a
//! `once_cell::sync::Lazy` static, and never mutated afterwards.
//!
//! Versions start at 1 and increase by 1 with no gaps; the current version is
//! the largest key. A gap is a programming defect that
//! [`SchemaRegistry::check_complete`] reports.

use crate::fields::FieldSchema;
use modeldoc_core::{Error, Result};
use std::collections::BTreeMap;

/// Function building the schema of one version
pub type SchemaFn = fn() -> FieldSchema;

/// Version → schema table for one entity kind
#[derive(Debug)]
pub struct SchemaRegistry {
    kind: &'static str,
    versions: BTreeMap<u32, FieldSchema>,
}

impl SchemaRegistry {
    /// Build a registry from `(version, schema function)` pairs
    pub fn new(kind: &'static str, versions: &[(u32, SchemaFn)]) -> Self {
        SchemaRegistry {
            kind,
            versions: versions.iter().map(|(v, f)| (*v, f())).collect(),
        }
    }

    /// Entity kind this registry describes
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The version written on export
    pub fn current_version(&self) -> u32 {
        self.versions.keys().next_back().copied().unwrap_or(0)
    }

    /// Schema for a declared version
    pub fn fields(&self, version: u32) -> Result<&FieldSchema> {
        self.versions
            .get(&version)
            .ok_or_else(|| Error::not_valid(format!("version {version}")))
    }

    /// All registered versions, ascending
    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.versions.keys().copied()
    }

    /// Check that the registered versions are exactly `1..=current`
    pub fn check_complete(&self) -> Result<()> {
        if self.versions.is_empty() {
            return Err(Error::validation(format!("{} registry is empty", self.kind)));
        }
        for (expected, actual) in (1u32..).zip(self.versions.keys()) {
            if expected != *actual {
                return Err(Error::validation(format!(
                    "{} registry missing version {expected}",
                    self.kind
                )));
            }
        }
        Ok(())
    }
}
