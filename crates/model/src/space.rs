//! Network spaces

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{bool, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`Space`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceArgs {
    /// Space id
    pub id: String,
    /// Space name
    pub name: String,
    /// Whether the space is public
    pub public: bool,
    /// Provider id
    pub provider_id: String,
}

/// A network space
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Space {
    args: SpaceArgs,
}

impl Space {
    /// Create a space
    pub fn new(args: SpaceArgs) -> Self {
        Space { args }
    }

    /// Space id
    pub fn id(&self) -> &str {
        &self.args.id
    }

    /// Space name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Whether the space is public
    pub fn public(&self) -> bool {
        self.args.public
    }

    /// Provider id
    pub fn provider_id(&self) -> &str {
        &self.args.provider_id
    }
}

fn space_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .optional("provider-id", string(), "")
        .optional("public", bool(), false)
}

fn space_v2() -> FieldSchema {
    space_v1().optional("id", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("space", &[(1, space_v1), (2, space_v2)]));

impl VersionedEntity for Space {
    const KIND: &'static str = "space";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        Ok(Space::new(SpaceArgs {
            id: if version >= 2 {
                fields.string("id")?
            } else {
                String::new()
            },
            name: fields.string("name")?,
            public: fields.bool("public")?,
            provider_id: fields.string("provider-id")?,
        }))
    }
}

impl ToWire for Space {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .nonempty("id", &self.args.id)
            .field("name", self.args.name.as_str())
            .field("public", self.args.public)
            .nonempty("provider-id", &self.args.provider_id)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
