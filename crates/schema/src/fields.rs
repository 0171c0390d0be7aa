//! Field schemas
//!
//! A [`FieldSchema`] is the shape of one entity at one schema version: a set of
//! named field checkers plus, for the optional ones, a default.
//!
//! - A field with no default is required.
//! - A field with `FieldDefault::Value(v)` takes `v` when absent.
//! - A field with `FieldDefault::Omit` may be absent and is then left unset.
//!   Unset and zero are different things: an unspecified memory constraint is
//!   not the same as a memory constraint of zero.
//!
//! Schemas for successive versions are built from each other with consuming
//! deltas, so each version function reads as the change log for that version:
//!
//! ```
//! use modeldoc_schema::checker::{int, string};
//! use modeldoc_schema::fields::FieldSchema;
//!
//! fn space_v1() -> FieldSchema {
//!     FieldSchema::new()
//!         .required("name", string())
//!         .optional("provider-id", string(), "")
//! }
//!
//! fn space_v2() -> FieldSchema {
//!     space_v1().optional("id", string(), "")
//! }
//!
//! assert!(space_v2().contains("id"));
//! assert!(!space_v1().contains("id"));
//! ```

use crate::checker::Checker;
use crate::path::Path;
use modeldoc_core::{Error, Map, Result, Value};
use std::collections::BTreeMap;

/// What happens when an optional field is absent
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    /// Leave the field unset
    Omit,
    /// Use this value (coerced through the field's checker)
    Value(Value),
}

/// Field checkers and defaults for one entity kind at one version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    fields: BTreeMap<&'static str, Checker>,
    defaults: BTreeMap<&'static str, FieldDefault>,
}

impl FieldSchema {
    /// An empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a required field
    pub fn required(mut self, name: &'static str, checker: Checker) -> Self {
        self.fields.insert(name, checker);
        self.defaults.remove(name);
        self
    }

    /// Add (or replace) an optional field with a default value
    pub fn optional(mut self, name: &'static str, checker: Checker, default: impl Into<Value>) -> Self {
        self.fields.insert(name, checker);
        self.defaults
            .insert(name, FieldDefault::Value(default.into()));
        self
    }

    /// Add (or replace) an optional field that is left unset when absent
    pub fn omit(mut self, name: &'static str, checker: Checker) -> Self {
        self.fields.insert(name, checker);
        self.defaults.insert(name, FieldDefault::Omit);
        self
    }

    /// Remove a field
    pub fn remove(mut self, name: &'static str) -> Self {
        self.fields.remove(name);
        self.defaults.remove(name);
        self
    }

    /// Change the default of an existing field
    pub fn with_default(mut self, name: &'static str, default: FieldDefault) -> Self {
        if self.fields.contains_key(name) {
            self.defaults.insert(name, default);
        }
        self
    }

    /// Replace the checker of an existing field, keeping its default
    pub fn widen(mut self, name: &'static str, checker: Checker) -> Self {
        if let Some(existing) = self.fields.get_mut(name) {
            *existing = checker;
        }
        self
    }

    /// Check if the schema declares a field
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The checker for a field
    pub fn checker(&self, name: &str) -> Option<&Checker> {
        self.fields.get(name)
    }

    /// The default for a field (`None` means required)
    pub fn default_for(&self, name: &str) -> Option<&FieldDefault> {
        self.defaults.get(name)
    }

    /// Declared field names, in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Coerce a decoded map against this schema
    ///
    /// Fails on the first wrong-typed or missing field; no partial result is
    /// returned. Undeclared keys are dropped.
    pub fn coerce(&self, value: &Value, path: &Path) -> Result<Map> {
        let source = match value {
            Value::Map(m) => m,
            other => return Err(Error::mismatch(path.as_str(), "map", other.describe())),
        };
        let mut out = Map::new();
        for (&name, checker) in &self.fields {
            let field_path = path.field(name);
            match source.get(name) {
                Some(v) => {
                    out.insert(name.to_string(), checker.coerce(v, &field_path)?);
                }
                None => match self.defaults.get(name) {
                    Some(FieldDefault::Omit) => {}
                    Some(FieldDefault::Value(d)) => {
                        out.insert(name.to_string(), checker.coerce(d, &field_path)?);
                    }
                    None => {
                        return Err(Error::mismatch(
                            field_path.as_str(),
                            checker.expected(),
                            "nothing",
                        ))
                    }
                },
            }
        }
        Ok(out)
    }
}
