//! Typed view over a coerced field map
//!
//! Importers never pattern-match on [`Value`] directly. After a
//! [`FieldSchema`](crate::fields::FieldSchema) has coerced a payload, the
//! importer reads it through [`Fields`], whose accessors return the Rust type
//! the checker produced or a type mismatch naming the key.

use crate::envelope::{import_collection, import_embedded, import_embedded_list, VersionedEntity};
use chrono::{DateTime, Utc};
use modeldoc_core::{Error, Map, Result, ResultExt, Value};
use std::collections::BTreeMap;

/// Coerced fields of one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    map: Map,
}

fn mismatch(key: &str, expected: &str, got: Option<&Value>) -> Error {
    Error::mismatch(
        key,
        expected,
        got.map(Value::describe).unwrap_or_else(|| "nothing".to_string()),
    )
}

impl Fields {
    /// Wrap a coerced map
    pub fn new(map: Map) -> Self {
        Fields { map }
    }

    /// The underlying map
    pub fn into_map(self) -> Map {
        self.map
    }

    /// Raw value of a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Check if a key is present (and not null)
    pub fn has(&self, key: &str) -> bool {
        matches!(self.map.get(key), Some(v) if !v.is_null())
    }

    /// Required string
    pub fn string(&self, key: &str) -> Result<String> {
        match self.map.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(mismatch(key, "string", other)),
        }
    }

    /// Optional string
    pub fn opt_string(&self, key: &str) -> Result<Option<String>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.string(key).map(Some),
        }
    }

    /// Required signed integer
    pub fn int(&self, key: &str) -> Result<i64> {
        match self.map.get(key) {
            Some(Value::Int(i)) => Ok(*i),
            Some(Value::Uint(u)) => {
                i64::try_from(*u).map_err(|_| mismatch(key, "int", self.map.get(key)))
            }
            other => Err(mismatch(key, "int", other)),
        }
    }

    /// Optional signed integer
    pub fn opt_int(&self, key: &str) -> Result<Option<i64>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.int(key).map(Some),
        }
    }

    /// Required unsigned integer
    pub fn uint(&self, key: &str) -> Result<u64> {
        match self.map.get(key) {
            Some(Value::Uint(u)) => Ok(*u),
            Some(Value::Int(i)) => {
                u64::try_from(*i).map_err(|_| mismatch(key, "uint", self.map.get(key)))
            }
            other => Err(mismatch(key, "uint", other)),
        }
    }

    /// Optional unsigned integer
    pub fn opt_uint(&self, key: &str) -> Result<Option<u64>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.uint(key).map(Some),
        }
    }

    /// Required float
    pub fn float(&self, key: &str) -> Result<f64> {
        match self.map.get(key) {
            Some(Value::Float(f)) => Ok(*f),
            other => Err(mismatch(key, "float", other)),
        }
    }

    /// Required boolean
    pub fn bool(&self, key: &str) -> Result<bool> {
        match self.map.get(key) {
            Some(Value::Bool(b)) => Ok(*b),
            other => Err(mismatch(key, "bool", other)),
        }
    }

    /// Optional boolean
    pub fn opt_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.bool(key).map(Some),
        }
    }

    /// Required timestamp
    pub fn time(&self, key: &str) -> Result<DateTime<Utc>> {
        match self.map.get(key) {
            Some(Value::Time(t)) => Ok(*t),
            other => Err(mismatch(key, "time", other)),
        }
    }

    /// Optional timestamp
    pub fn opt_time(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.time(key).map(Some),
        }
    }

    /// Optional byte blob
    pub fn opt_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bytes(b)) => Ok(Some(b.clone())),
            other => Err(mismatch(key, "bytes", other)),
        }
    }

    /// List of strings; absent means empty
    pub fn strings(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.opt_strings(key)?.unwrap_or_default())
    }

    /// Optional list of strings
    pub fn opt_strings(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(mismatch(&format!("{key}[{i}]"), "string", Some(other))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            other => Err(mismatch(key, "list", other)),
        }
    }

    /// String-to-string map; absent means empty
    pub fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        self.map(key)?
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k, s)),
                other => Err(mismatch(&format!("{key}.{k}"), "string", Some(&other))),
            })
            .collect()
    }

    /// Map of arbitrary values; absent means empty
    pub fn map(&self, key: &str) -> Result<Map> {
        Ok(self.opt_map(key)?.unwrap_or_default())
    }

    /// Optional map of arbitrary values
    pub fn opt_map(&self, key: &str) -> Result<Option<Map>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Map(m)) => Ok(Some(m.clone())),
            other => Err(mismatch(key, "map", other)),
        }
    }

    /// List of arbitrary values; absent means empty
    pub fn list(&self, key: &str) -> Result<Vec<Value>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::List(items)) => Ok(items.clone()),
            other => Err(mismatch(key, "list", other)),
        }
    }

    /// Nested field map (a map coerced by a `fields(..)` checker)
    pub fn sub(&self, key: &str) -> Result<Option<Fields>> {
        Ok(self.opt_map(key)?.map(Fields::new))
    }

    /// List of nested field maps; absent means empty
    pub fn items(&self, key: &str) -> Result<Vec<Fields>> {
        self.list(key)?
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Map(m) => Ok(Fields::new(m)),
                other => Err(mismatch(&format!("{key}[{i}]"), "map", Some(&other))),
            })
            .collect()
    }

    /// String-keyed map of nested field maps; absent means empty
    pub fn field_map(&self, key: &str) -> Result<BTreeMap<String, Fields>> {
        self.map(key)?
            .into_iter()
            .map(|(k, v)| match v {
                Value::Map(m) => Ok((k, Fields::new(m))),
                other => Err(mismatch(&format!("{key}.{k}"), "map", Some(&other))),
            })
            .collect()
    }

    /// Import an optional self-versioned document stored under `key`
    pub fn embedded<T: VersionedEntity>(
        &self,
        key: &str,
        payload_key: &'static str,
    ) -> Result<Option<T>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => import_embedded::<T>(v, payload_key).annotate(key).map(Some),
        }
    }

    /// Import a required self-versioned document stored under `key`
    pub fn required_embedded<T: VersionedEntity>(
        &self,
        key: &str,
        payload_key: &'static str,
    ) -> Result<T> {
        match self.map.get(key) {
            None | Some(Value::Null) => Err(mismatch(key, "map", None)),
            Some(v) => import_embedded::<T>(v, payload_key).annotate(key),
        }
    }

    /// Import a self-versioned list stored under `key`; absent means empty
    pub fn embedded_list<T: VersionedEntity>(
        &self,
        key: &str,
        payload_key: &'static str,
    ) -> Result<Vec<T>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => import_embedded_list::<T>(v, payload_key).annotate(key),
        }
    }

    /// Import a nested collection envelope stored under `key`
    pub fn collection<T: VersionedEntity>(&self, key: &'static str) -> Result<Vec<T>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => import_collection::<T>(v, key),
        }
    }
}
