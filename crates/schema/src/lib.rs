//! Versioned schema protocol
//!
//! This crate turns decoded [`Value`](modeldoc_core::Value) trees into typed
//! entities, one version at a time:
//! - Checker: composable coercion of dynamic values (`list(string())`)
//! - FieldSchema: required/optional fields of one version, built by deltas
//! - SchemaRegistry: version → schema table per entity kind
//! - Envelope: `{version, payload}` dispatch for collections and embedded
//!   documents
//! - Fields / MapBuilder: typed reading of coerced payloads, and writing them
//!   back out

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checker;
pub mod encode;
pub mod envelope;
pub mod fields;
pub mod path;
pub mod registry;
pub mod valid;

pub use checker::Checker;
pub use encode::MapBuilder;
pub use envelope::{
    collection_envelope, embedded_envelope, import_collection, import_embedded,
    import_document, import_embedded_list, import_items, read_envelope, read_version, ToWire, VersionedEntity,
};
pub use fields::{FieldDefault, FieldSchema};
pub use path::Path;
pub use registry::{SchemaFn, SchemaRegistry};
pub use valid::Fields;
