//! Agent binaries recorded on machines and units

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{force_uint, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`AgentTools`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentToolsArgs {
    /// Version string such as `3.1.2-ubuntu-amd64`
    pub version: String,
    /// Download location
    pub url: String,
    /// SHA-256 of the binary archive
    pub sha256: String,
    /// Archive size in bytes
    pub size: u64,
}

/// The agent binaries an entity runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentTools {
    version: String,
    url: String,
    sha256: String,
    size: u64,
}

impl AgentTools {
    /// Create an agent tools record
    pub fn new(args: AgentToolsArgs) -> Self {
        AgentTools {
            version: args.version,
            url: args.url,
            sha256: args.sha256,
            size: args.size,
        }
    }

    /// Version string
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Download location
    pub fn url(&self) -> &str {
        &self.url
    }

    /// SHA-256 of the binary archive
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Archive size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}

fn tools_v1() -> FieldSchema {
    FieldSchema::new()
        .required("tools-version", string())
        .optional("url", string(), "")
        .optional("sha256", string(), "")
        .optional("size", force_uint(), 0)
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("tools", &[(1, tools_v1)]));

impl VersionedEntity for AgentTools {
    const KIND: &'static str = "tools";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(AgentTools {
            version: fields.string("tools-version")?,
            url: fields.string("url")?,
            sha256: fields.string("sha256")?,
            size: fields.uint("size")?,
        })
    }
}

impl ToWire for AgentTools {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("tools-version", self.version.as_str())
            .nonempty("url", &self.url)
            .nonempty("sha256", &self.sha256)
            .field("size", self.size)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
