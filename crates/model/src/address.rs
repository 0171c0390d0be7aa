//! Network addresses
//!
//! Addresses appear embedded (`preferred-public-address`) and as lists of
//! embedded documents (`provider-addresses`). Each list element carries its
//! own version.

use modeldoc_core::{Result, ResultExt, Value};
use modeldoc_schema::checker::string;
use modeldoc_schema::{
    embedded_envelope, import_embedded, FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire,
    VersionedEntity,
};
use once_cell::sync::Lazy;

/// Arguments for [`Address`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressArgs {
    /// The address itself
    pub value: String,
    /// Address type (`ipv4`, `ipv6`, `hostname`)
    pub type_: String,
    /// Network scope (`public`, `local-cloud`, ...)
    pub scope: String,
    /// Who reported the address (`provider`, `machine`)
    pub origin: String,
    /// Space the address belongs to
    pub space_id: String,
}

/// A network address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    value: String,
    type_: String,
    scope: String,
    origin: String,
    space_id: String,
}

impl Address {
    /// Create an address
    pub fn new(args: AddressArgs) -> Self {
        Address {
            value: args.value,
            type_: args.type_,
            scope: args.scope,
            origin: args.origin,
            space_id: args.space_id,
        }
    }

    /// The address itself
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Address type
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// Network scope
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Who reported the address
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Space the address belongs to
    pub fn space_id(&self) -> &str {
        &self.space_id
    }
}

fn address_v1() -> FieldSchema {
    FieldSchema::new()
        .required("value", string())
        .required("type", string())
        .optional("scope", string(), "")
        .optional("origin", string(), "")
}

fn address_v2() -> FieldSchema {
    address_v1().optional("space-id", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("address", &[(1, address_v1), (2, address_v2)]));

impl VersionedEntity for Address {
    const KIND: &'static str = "address";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        Ok(Address {
            value: fields.string("value")?,
            type_: fields.string("type")?,
            scope: fields.string("scope")?,
            origin: fields.string("origin")?,
            space_id: if version >= 2 {
                fields.string("space-id")?
            } else {
                String::new()
            },
        })
    }
}

impl ToWire for Address {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("value", self.value.as_str())
            .field("type", self.type_.as_str())
            .nonempty("scope", &self.scope)
            .nonempty("origin", &self.origin)
            .nonempty("space-id", &self.space_id)
            .into_value()
    }
}

/// Read a list of embedded addresses stored under `key`
pub(crate) fn import_addresses(fields: &Fields, key: &str) -> Result<Vec<Address>> {
    fields
        .list(key)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            import_embedded::<Address>(v, "address").annotate_with(|| format!("{key} {i}"))
        })
        .collect()
}

/// Write a list of embedded addresses
pub(crate) fn addresses_to_wire(addresses: &[Address]) -> Value {
    Value::List(
        addresses
            .iter()
            .map(|a| embedded_envelope("address", a))
            .collect(),
    )
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
