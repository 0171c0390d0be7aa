//! Provider records for container-based (CAAS) units and applications

use crate::address::{addresses_to_wire, import_addresses, Address};
use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{any, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`CloudContainer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudContainerArgs {
    /// Provider id of the container
    pub provider_id: String,
    /// Container address
    pub address: Option<Address>,
    /// Open ports
    pub ports: Vec<String>,
}

/// The provider container backing a unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudContainer {
    provider_id: String,
    address: Option<Address>,
    ports: Vec<String>,
}

impl CloudContainer {
    /// Create a cloud container record
    pub fn new(args: CloudContainerArgs) -> Self {
        CloudContainer {
            provider_id: args.provider_id,
            address: args.address,
            ports: args.ports,
        }
    }

    /// Provider id of the container
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Container address
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Open ports
    pub fn ports(&self) -> &[String] {
        &self.ports
    }
}

fn container_v1() -> FieldSchema {
    FieldSchema::new()
        .required("provider-id", string())
        .omit("address", any())
        .omit("ports", list(string()))
}

static CONTAINER_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("cloud container", &[(1, container_v1)]));

impl VersionedEntity for CloudContainer {
    const KIND: &'static str = "cloud container";

    fn registry() -> &'static SchemaRegistry {
        &CONTAINER_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(CloudContainer {
            provider_id: fields.string("provider-id")?,
            address: fields.embedded::<Address>("address", "address")?,
            ports: fields.strings("ports")?,
        })
    }
}

impl ToWire for CloudContainer {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("provider-id", self.provider_id.as_str())
            .opt_embedded("address", "address", self.address.as_ref())
            .nonempty_strings("ports", &self.ports)
            .into_value()
    }
}

/// Arguments for [`CloudService`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudServiceArgs {
    /// Provider id of the service
    pub provider_id: String,
    /// Service addresses
    pub addresses: Vec<Address>,
}

/// The provider service fronting an application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudService {
    provider_id: String,
    addresses: Vec<Address>,
}

impl CloudService {
    /// Create a cloud service record
    pub fn new(args: CloudServiceArgs) -> Self {
        CloudService {
            provider_id: args.provider_id,
            addresses: args.addresses,
        }
    }

    /// Provider id of the service
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Service addresses
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }
}

fn service_v1() -> FieldSchema {
    FieldSchema::new()
        .required("provider-id", string())
        .omit("addresses", list(any()))
}

static SERVICE_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("cloud service", &[(1, service_v1)]));

impl VersionedEntity for CloudService {
    const KIND: &'static str = "cloud service";

    fn registry() -> &'static SchemaRegistry {
        &SERVICE_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(CloudService {
            provider_id: fields.string("provider-id")?,
            addresses: import_addresses(&fields, "addresses")?,
        })
    }
}

impl ToWire for CloudService {
    fn to_wire(&self) -> Value {
        let builder = MapBuilder::new().field("provider-id", self.provider_id.as_str());
        if self.addresses.is_empty() {
            builder.into_value()
        } else {
            builder
                .field("addresses", addresses_to_wire(&self.addresses))
                .into_value()
        }
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&CONTAINER_REGISTRY, &SERVICE_REGISTRY]
}
