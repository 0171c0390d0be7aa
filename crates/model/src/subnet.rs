//! Subnets
//!
//! Subnets have the longest version history of any entity:
//!
//! | Version | Change |
//! |---------|--------|
//! | 2 | provider network id |
//! | 3 | provider space id, fan underlay and overlay |
//! | 4 | singular `availability-zone` replaced by `availability-zones` |
//! | 5 | public flag |
//! | 6 | space id |
//! | 7 | subnet id and UUID |
//!
//! Fields from later versions that appear in an older document are ignored.

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{bool, int, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`Subnet`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetArgs {
    /// Subnet id
    pub id: String,
    /// Subnet UUID
    pub uuid: String,
    /// CIDR
    pub cidr: String,
    /// Provider id
    pub provider_id: String,
    /// Provider network id
    pub provider_network_id: String,
    /// Provider space id
    pub provider_space_id: String,
    /// VLAN tag
    pub vlan_tag: i64,
    /// Space name (legacy)
    pub space_name: String,
    /// Space id
    pub space_id: String,
    /// Availability zones
    pub availability_zones: Vec<String>,
    /// Whether the subnet is public
    pub is_public: bool,
    /// Fan local underlay CIDR
    pub fan_local_underlay: String,
    /// Fan overlay CIDR
    pub fan_overlay: String,
    /// Upper bound of allocatable addresses
    pub allocatable_ip_high: String,
    /// Lower bound of allocatable addresses
    pub allocatable_ip_low: String,
}

/// A subnet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subnet {
    args: SubnetArgs,
}

impl Subnet {
    /// Create a subnet
    pub fn new(args: SubnetArgs) -> Self {
        Subnet { args }
    }

    /// Subnet id
    pub fn id(&self) -> &str {
        &self.args.id
    }

    /// Subnet UUID
    pub fn uuid(&self) -> &str {
        &self.args.uuid
    }

    /// CIDR
    pub fn cidr(&self) -> &str {
        &self.args.cidr
    }

    /// Provider id
    pub fn provider_id(&self) -> &str {
        &self.args.provider_id
    }

    /// Provider network id
    pub fn provider_network_id(&self) -> &str {
        &self.args.provider_network_id
    }

    /// Provider space id
    pub fn provider_space_id(&self) -> &str {
        &self.args.provider_space_id
    }

    /// VLAN tag
    pub fn vlan_tag(&self) -> i64 {
        self.args.vlan_tag
    }

    /// Space name (legacy)
    pub fn space_name(&self) -> &str {
        &self.args.space_name
    }

    /// Space id
    pub fn space_id(&self) -> &str {
        &self.args.space_id
    }

    /// Availability zones
    pub fn availability_zones(&self) -> &[String] {
        &self.args.availability_zones
    }

    /// Whether the subnet is public
    pub fn is_public(&self) -> bool {
        self.args.is_public
    }

    /// Fan local underlay CIDR
    pub fn fan_local_underlay(&self) -> &str {
        &self.args.fan_local_underlay
    }

    /// Fan overlay CIDR
    pub fn fan_overlay(&self) -> &str {
        &self.args.fan_overlay
    }

    /// Upper bound of allocatable addresses
    pub fn allocatable_ip_high(&self) -> &str {
        &self.args.allocatable_ip_high
    }

    /// Lower bound of allocatable addresses
    pub fn allocatable_ip_low(&self) -> &str {
        &self.args.allocatable_ip_low
    }
}

fn subnet_v1() -> FieldSchema {
    FieldSchema::new()
        .required("cidr", string())
        .optional("provider-id", string(), "")
        .optional("vlan-tag", int(), 0)
        .optional("space-name", string(), "")
        .optional("availability-zone", string(), "")
        .optional("allocatable-ip-high", string(), "")
        .optional("allocatable-ip-low", string(), "")
}

fn subnet_v2() -> FieldSchema {
    subnet_v1().optional("provider-network-id", string(), "")
}

fn subnet_v3() -> FieldSchema {
    subnet_v2()
        .optional("provider-space-id", string(), "")
        .optional("fan-local-underlay", string(), "")
        .optional("fan-overlay", string(), "")
}

fn subnet_v4() -> FieldSchema {
    subnet_v3()
        .remove("availability-zone")
        .omit("availability-zones", list(string()))
}

fn subnet_v5() -> FieldSchema {
    subnet_v4().optional("is-public", bool(), false)
}

fn subnet_v6() -> FieldSchema {
    subnet_v5().optional("space-id", string(), "")
}

fn subnet_v7() -> FieldSchema {
    subnet_v6()
        .optional("subnet-id", string(), "")
        .optional("uuid", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "subnet",
        &[
            (1, subnet_v1),
            (2, subnet_v2),
            (3, subnet_v3),
            (4, subnet_v4),
            (5, subnet_v5),
            (6, subnet_v6),
            (7, subnet_v7),
        ],
    )
});

impl VersionedEntity for Subnet {
    const KIND: &'static str = "subnet";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = SubnetArgs {
            cidr: fields.string("cidr")?,
            provider_id: fields.string("provider-id")?,
            vlan_tag: fields.int("vlan-tag")?,
            space_name: fields.string("space-name")?,
            allocatable_ip_high: fields.string("allocatable-ip-high")?,
            allocatable_ip_low: fields.string("allocatable-ip-low")?,
            ..Default::default()
        };
        if version >= 2 {
            args.provider_network_id = fields.string("provider-network-id")?;
        }
        if version >= 3 {
            args.provider_space_id = fields.string("provider-space-id")?;
            args.fan_local_underlay = fields.string("fan-local-underlay")?;
            args.fan_overlay = fields.string("fan-overlay")?;
        }
        args.availability_zones = if version >= 4 {
            fields.strings("availability-zones")?
        } else {
            let zone = fields.string("availability-zone")?;
            if zone.is_empty() {
                Vec::new()
            } else {
                vec![zone]
            }
        };
        if version >= 5 {
            args.is_public = fields.bool("is-public")?;
        }
        if version >= 6 {
            args.space_id = fields.string("space-id")?;
        }
        if version >= 7 {
            args.id = fields.string("subnet-id")?;
            args.uuid = fields.string("uuid")?;
        }
        Ok(Subnet::new(args))
    }
}

impl ToWire for Subnet {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .nonempty("subnet-id", &a.id)
            .nonempty("uuid", &a.uuid)
            .field("cidr", a.cidr.as_str())
            .nonempty("provider-id", &a.provider_id)
            .nonempty("provider-network-id", &a.provider_network_id)
            .nonempty("provider-space-id", &a.provider_space_id)
            .field("vlan-tag", a.vlan_tag)
            .nonempty("space-name", &a.space_name)
            .nonempty("space-id", &a.space_id)
            .nonempty_strings("availability-zones", &a.availability_zones)
            .field("is-public", a.is_public)
            .nonempty("fan-local-underlay", &a.fan_local_underlay)
            .nonempty("fan-overlay", &a.fan_overlay)
            .nonempty("allocatable-ip-high", &a.allocatable_ip_high)
            .nonempty("allocatable-ip-low", &a.allocatable_ip_low)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
