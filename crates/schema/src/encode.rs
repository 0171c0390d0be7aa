//! Payload construction for export
//!
//! [`MapBuilder`] assembles the current-version payload of an entity. Unset
//! optional values are omitted rather than written as null or zero, so a
//! re-import sees them as absent.

use crate::envelope::{collection_envelope, embedded_envelope, ToWire, VersionedEntity};
use modeldoc_core::{Map, Value};
use std::collections::BTreeMap;

/// Builder for an exported payload map
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    map: Map,
}

impl MapBuilder {
    /// An empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Always write a value
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    /// Write a string only when it is non-empty
    pub fn nonempty(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.field(key, value)
        }
    }

    /// Write a value only when it is set
    pub fn opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Write a list of strings, even when empty
    pub fn strings(self, key: &str, values: &[String]) -> Self {
        self.field(key, values)
    }

    /// Write a list of strings only when it is non-empty
    pub fn nonempty_strings(self, key: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self
        } else {
            self.strings(key, values)
        }
    }

    /// Write a string map, even when empty
    pub fn string_map(self, key: &str, values: &BTreeMap<String, String>) -> Self {
        self.field(key, values)
    }

    /// Write a string map only when it is non-empty
    pub fn nonempty_map(self, key: &str, values: &BTreeMap<String, String>) -> Self {
        if values.is_empty() {
            self
        } else {
            self.string_map(key, values)
        }
    }

    /// Write an arbitrary value map only when it is non-empty
    pub fn nonempty_values(self, key: &str, values: &Map) -> Self {
        if values.is_empty() {
            self
        } else {
            self.field(key, values.clone())
        }
    }

    /// Write a nested payload without an envelope
    pub fn wire<T: ToWire>(self, key: &str, item: &T) -> Self {
        self.field(key, item.to_wire())
    }

    /// Write an optional nested payload without an envelope
    pub fn opt_wire<T: ToWire>(self, key: &str, item: Option<&T>) -> Self {
        match item {
            Some(item) => self.wire(key, item),
            None => self,
        }
    }

    /// Write a list of nested payloads without an envelope
    pub fn wire_list<T: ToWire>(self, key: &str, items: &[T]) -> Self {
        self.field(
            key,
            Value::List(items.iter().map(ToWire::to_wire).collect()),
        )
    }

    /// Write a self-versioned embedded document
    pub fn embedded<T: VersionedEntity + ToWire>(
        self,
        key: &str,
        payload_key: &str,
        item: &T,
    ) -> Self {
        self.field(key, embedded_envelope(payload_key, item))
    }

    /// Write an optional self-versioned embedded document
    pub fn opt_embedded<T: VersionedEntity + ToWire>(
        self,
        key: &str,
        payload_key: &str,
        item: Option<&T>,
    ) -> Self {
        match item {
            Some(item) => self.embedded(key, payload_key, item),
            None => self,
        }
    }

    /// Write a collection envelope whose payload key differs from `key`
    pub fn embedded_list<T: VersionedEntity + ToWire>(
        self,
        key: &str,
        payload_key: &str,
        items: &[T],
    ) -> Self {
        self.field(key, collection_envelope(payload_key, items))
    }

    /// Write a nested collection envelope
    pub fn collection<T: VersionedEntity + ToWire>(self, key: &str, items: &[T]) -> Self {
        self.field(key, collection_envelope(key, items))
    }

    /// Finish as a map
    pub fn build(self) -> Map {
        self.map
    }

    /// Finish as a value
    pub fn into_value(self) -> Value {
        Value::Map(self.map)
    }
}
