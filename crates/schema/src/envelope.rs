//! Versioned Envelope Protocol
//!
//! Every versioned boundary in a document is an envelope:
//!
//! ```text
//! {version: <int>, <payload-key>: <payload>}
//! ```
//!
//! Collections carry a list payload keyed by the collection name
//! (`{version: 2, spaces: [...]}`); self-versioned embedded documents carry a
//! single map (`{version: 1, instance: {...}}`).
//!
//! Import is two-phase. The envelope is first coerced with a minimal checker
//! that only requires an integer `version` and accepts any payload, because the
//! payload shape depends on the version. The version is then looked up in the
//! kind's [`SchemaRegistry`]; an unknown version fails with
//! `NotValid("version N")` and nothing is constructed. Finally each payload
//! item is coerced against that version's schema and handed to
//! [`VersionedEntity::import`], which upgrades it to the current in-memory
//! shape.
//!
//! Export always writes the registry's current version.

use crate::checker::{any, int, list, Checker};
use crate::fields::FieldSchema;
use crate::path::Path;
use crate::registry::SchemaRegistry;
use crate::valid::Fields;
use modeldoc_core::{Error, Map, Result, ResultExt, Value};
use tracing::{debug, trace};

/// An entity kind read through the envelope protocol
pub trait VersionedEntity: Sized {
    /// Entity kind used in error annotations (`machine`, `subnet`)
    const KIND: &'static str;

    /// The kind's version table
    fn registry() -> &'static SchemaRegistry;

    /// Build the current in-memory shape from fields coerced at `version`
    fn import(fields: Fields, version: u32) -> Result<Self>;

    /// Adjust a raw payload item before coercion
    fn preprocess(item: Value) -> Value {
        item
    }
}

/// An entity that can be written as its current-version payload
pub trait ToWire {
    /// The payload map at the current schema version
    fn to_wire(&self) -> Value;
}

/// Read `{version, <payload_key>}` and return the version and raw payload
pub fn read_envelope(
    source: &Value,
    payload_key: &'static str,
    payload: Checker,
) -> Result<(u32, Value)> {
    let schema = FieldSchema::new()
        .required("version", int())
        .required(payload_key, payload);
    let mut coerced = schema.coerce(source, &Path::root())?;
    let version = coerced
        .get("version")
        .and_then(Value::as_int)
        .ok_or_else(|| Error::mismatch("version", "int", "nothing"))?;
    let version =
        u32::try_from(version).map_err(|_| Error::not_valid(format!("version {version}")))?;
    let payload = coerced.remove(payload_key).unwrap_or(Value::Null);
    Ok((version, payload))
}

/// Read the root `version` of a document whose fields live beside it
pub fn read_version(source: &Value) -> Result<u32> {
    let schema = FieldSchema::new().required("version", int());
    let coerced = schema.coerce(source, &Path::root())?;
    let version = coerced
        .get("version")
        .and_then(Value::as_int)
        .ok_or_else(|| Error::mismatch("version", "int", "nothing"))?;
    u32::try_from(version).map_err(|_| Error::not_valid(format!("version {version}")))
}

/// Coerce and import each item of a payload list declared at `version`
pub fn import_items<T: VersionedEntity>(items: &[Value], version: u32) -> Result<Vec<T>> {
    let schema = T::registry().fields(version)?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let item = T::preprocess(item.clone());
        let coerced = schema
            .coerce(&item, &Path::root())
            .annotate_with(|| format!("{} {} v{} schema check failed", T::KIND, i, version))?;
        let entity =
            T::import(Fields::new(coerced), version).annotate_with(|| format!("{} {}", T::KIND, i))?;
        out.push(entity);
    }
    Ok(out)
}

/// Import a collection envelope `{version, <collection>: [...]}`
pub fn import_collection<T: VersionedEntity>(
    source: &Value,
    collection: &'static str,
) -> Result<Vec<T>> {
    let (version, payload) = read_envelope(source, collection, list(any()))
        .annotate_with(|| format!("{collection} version schema check failed"))?;
    let items = into_list(payload);
    debug!(collection, version, count = items.len(), "importing collection");
    import_items::<T>(&items, version).annotate(collection)
}

/// Import a self-versioned embedded document `{version, <payload_key>: {...}}`
pub fn import_embedded<T: VersionedEntity>(source: &Value, payload_key: &'static str) -> Result<T> {
    let (version, payload) = read_envelope(source, payload_key, any())
        .annotate_with(|| format!("{} version schema check failed", T::KIND))?;
    trace!(kind = T::KIND, version, "importing embedded document");
    let schema = T::registry().fields(version)?;
    let payload = T::preprocess(payload);
    let coerced = schema
        .coerce(&payload, &Path::root())
        .annotate_with(|| format!("{} v{} schema check failed", T::KIND, version))?;
    T::import(Fields::new(coerced), version)
}

/// Import a self-versioned embedded list `{version, <payload_key>: [...]}`
pub fn import_embedded_list<T: VersionedEntity>(
    source: &Value,
    payload_key: &'static str,
) -> Result<Vec<T>> {
    let (version, payload) = read_envelope(source, payload_key, list(any()))
        .annotate_with(|| format!("{} version schema check failed", T::KIND))?;
    let items = into_list(payload);
    trace!(kind = T::KIND, version, count = items.len(), "importing embedded list");
    import_items::<T>(&items, version)
}

/// Import a whole document whose `version` sits beside its fields
pub fn import_document<T: VersionedEntity>(source: &Value) -> Result<T> {
    let version = read_version(source)
        .annotate_with(|| format!("{} version schema check failed", T::KIND))?;
    debug!(kind = T::KIND, version, "importing document");
    let schema = T::registry().fields(version)?;
    let source = T::preprocess(source.clone());
    let coerced = schema
        .coerce(&source, &Path::root())
        .annotate_with(|| format!("{} v{} schema check failed", T::KIND, version))?;
    T::import(Fields::new(coerced), version)
}

fn into_list(payload: Value) -> Vec<Value> {
    match payload {
        Value::List(items) => items,
        _ => Vec::new(),
    }
}

/// Write a collection envelope at the current version
pub fn collection_envelope<T: VersionedEntity + ToWire>(collection: &str, items: &[T]) -> Value {
    let mut out = Map::new();
    out.insert(
        "version".to_string(),
        Value::Int(i64::from(T::registry().current_version())),
    );
    out.insert(
        collection.to_string(),
        Value::List(items.iter().map(ToWire::to_wire).collect()),
    );
    Value::Map(out)
}

/// Write a self-versioned embedded document at the current version
pub fn embedded_envelope<T: VersionedEntity + ToWire>(payload_key: &str, item: &T) -> Value {
    let mut out = Map::new();
    out.insert(
        "version".to_string(),
        Value::Int(i64::from(T::registry().current_version())),
    );
    out.insert(payload_key.to_string(), item.to_wire());
    Value::Map(out)
}
