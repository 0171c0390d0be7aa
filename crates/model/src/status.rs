//! Status points and status history
//!
//! A status point is embedded into many owners (machines, applications,
//! units, volumes, filesystems, the model itself) as a self-versioned document:
//!
//! ```text
//! status: {version: 2, status: {value: active, message: "", updated: ..., neverset: false}}
//! ```
//!
//! Owners also carry a [`StatusHistory`], a composable field holding earlier
//! points, written as `{version: 1, history: [...]}`.

use chrono::{DateTime, Utc};
use modeldoc_core::{Map, Result, Value};
use modeldoc_schema::checker::{any, bool, string, string_map, time};
use modeldoc_schema::{
    collection_envelope, FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity,
};
use once_cell::sync::Lazy;

/// Arguments for a status point
#[derive(Debug, Clone, PartialEq)]
pub struct StatusArgs {
    /// Status value (`active`, `error`, `started`, ...)
    pub value: String,
    /// Human readable message
    pub message: String,
    /// Structured data attached to the status
    pub data: Map,
    /// When the status was set
    pub updated: DateTime<Utc>,
    /// True when no status update has ever been received
    pub never_set: bool,
}

/// One status value at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPoint {
    value: String,
    message: String,
    data: Map,
    updated: DateTime<Utc>,
    never_set: bool,
}

impl StatusPoint {
    /// Create a status point
    pub fn new(args: StatusArgs) -> Self {
        StatusPoint {
            value: args.value,
            message: args.message,
            data: args.data,
            updated: args.updated,
            never_set: args.never_set,
        }
    }

    /// The placeholder status used for documents that lost theirs
    pub(crate) fn unknown() -> Self {
        StatusPoint {
            value: "unknown".to_string(),
            message: String::new(),
            data: Map::new(),
            updated: DateTime::<Utc>::UNIX_EPOCH,
            never_set: false,
        }
    }

    /// Status value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Status message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured status data
    pub fn data(&self) -> &Map {
        &self.data
    }

    /// When the status was set
    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// True when no status update has ever been received
    pub fn never_set(&self) -> bool {
        self.never_set
    }

    fn from_fields(fields: &Fields, never_set: bool) -> Result<Self> {
        Ok(StatusPoint {
            value: fields.string("value")?,
            message: fields.string("message")?,
            data: fields.map("data")?,
            updated: fields.time("updated")?,
            never_set,
        })
    }

    fn base_wire(&self) -> MapBuilder {
        MapBuilder::new()
            .field("value", self.value.as_str())
            .field("message", self.message.as_str())
            .nonempty_values("data", &self.data)
            .field("updated", self.updated)
    }
}

fn status_v1() -> FieldSchema {
    FieldSchema::new()
        .required("value", string())
        .optional("message", string(), "")
        .omit("data", string_map(any()))
        .required("updated", time())
}

fn status_v2() -> FieldSchema {
    status_v1().optional("neverset", bool(), false)
}

static STATUS_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("status", &[(1, status_v1), (2, status_v2)]));

impl VersionedEntity for StatusPoint {
    const KIND: &'static str = "status";

    fn registry() -> &'static SchemaRegistry {
        &STATUS_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let never_set = if version >= 2 {
            fields.bool("neverset")?
        } else {
            false
        };
        StatusPoint::from_fields(&fields, never_set)
    }
}

impl ToWire for StatusPoint {
    fn to_wire(&self) -> Value {
        self.base_wire()
            .field("neverset", self.never_set)
            .into_value()
    }
}

// =============================================================================
// History
// =============================================================================

/// A status history entry as written on the wire
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HistoryEntry(StatusPoint);

fn history_v1() -> FieldSchema {
    status_v1()
}

static HISTORY_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("status history", &[(1, history_v1)]));

impl VersionedEntity for HistoryEntry {
    const KIND: &'static str = "status history";

    fn registry() -> &'static SchemaRegistry {
        &HISTORY_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        StatusPoint::from_fields(&fields, false).map(HistoryEntry)
    }
}

impl ToWire for HistoryEntry {
    fn to_wire(&self) -> Value {
        self.0.base_wire().into_value()
    }
}

/// Ordered earlier status points of an owner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusHistory {
    history: Vec<StatusPoint>,
}

impl StatusHistory {
    /// Status points, oldest first as recorded
    pub fn status_history(&self) -> &[StatusPoint] {
        &self.history
    }

    /// Replace the recorded status points
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.history = args.into_iter().map(StatusPoint::new).collect();
    }

    /// Read a status history stored under `key`
    pub fn import(fields: &Fields, key: &str) -> Result<Self> {
        let entries = fields.embedded_list::<HistoryEntry>(key, "history")?;
        Ok(StatusHistory {
            history: entries.into_iter().map(|HistoryEntry(p)| p).collect(),
        })
    }

    /// The history envelope at the current version
    pub fn to_wire(&self) -> Value {
        let entries: Vec<HistoryEntry> = self.history.iter().cloned().map(HistoryEntry).collect();
        collection_envelope("history", &entries)
    }
}

/// Registries defined in this module
pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&STATUS_REGISTRY, &HISTORY_REGISTRY]
}
