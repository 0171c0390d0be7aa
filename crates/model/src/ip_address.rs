//! IP addresses assigned to link-layer devices

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{bool, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`IpAddress`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAddressArgs {
    /// Provider id
    pub provider_id: String,
    /// Device the address is assigned to
    pub device_name: String,
    /// Machine owning the device
    pub machine_id: String,
    /// CIDR of the subnet the address belongs to
    pub subnet_cidr: String,
    /// How the address was configured (`static`, `dhcp`, ...)
    pub config_method: String,
    /// The address
    pub value: String,
    /// DNS servers
    pub dns_servers: Vec<String>,
    /// DNS search domains
    pub dns_search_domains: Vec<String>,
    /// Gateway address
    pub gateway_address: String,
    /// Whether the gateway is the default route
    pub is_default_gateway: bool,
    /// Provider network id
    pub provider_network_id: String,
    /// Provider subnet id
    pub provider_subnet_id: String,
    /// Who reported the address
    pub origin: String,
    /// Whether the address is a shadow of a provider address
    pub is_shadow: bool,
    /// Whether the address is secondary on its device
    pub is_secondary: bool,
}

/// An IP address on a device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAddress {
    args: IpAddressArgs,
}

impl IpAddress {
    /// Create an address
    pub fn new(args: IpAddressArgs) -> Self {
        IpAddress { args }
    }

    /// Provider id
    pub fn provider_id(&self) -> &str {
        &self.args.provider_id
    }

    /// Device name
    pub fn device_name(&self) -> &str {
        &self.args.device_name
    }

    /// Machine id
    pub fn machine_id(&self) -> &str {
        &self.args.machine_id
    }

    /// Subnet CIDR
    pub fn subnet_cidr(&self) -> &str {
        &self.args.subnet_cidr
    }

    /// Config method
    pub fn config_method(&self) -> &str {
        &self.args.config_method
    }

    /// The address
    pub fn value(&self) -> &str {
        &self.args.value
    }

    /// DNS servers
    pub fn dns_servers(&self) -> &[String] {
        &self.args.dns_servers
    }

    /// DNS search domains
    pub fn dns_search_domains(&self) -> &[String] {
        &self.args.dns_search_domains
    }

    /// Gateway address
    pub fn gateway_address(&self) -> &str {
        &self.args.gateway_address
    }

    /// Whether the gateway is the default route
    pub fn is_default_gateway(&self) -> bool {
        self.args.is_default_gateway
    }

    /// Provider network id
    pub fn provider_network_id(&self) -> &str {
        &self.args.provider_network_id
    }

    /// Provider subnet id
    pub fn provider_subnet_id(&self) -> &str {
        &self.args.provider_subnet_id
    }

    /// Who reported the address
    pub fn origin(&self) -> &str {
        &self.args.origin
    }

    /// Shadow flag
    pub fn is_shadow(&self) -> bool {
        self.args.is_shadow
    }

    /// Secondary flag
    pub fn is_secondary(&self) -> bool {
        self.args.is_secondary
    }
}

fn ip_address_v1() -> FieldSchema {
    FieldSchema::new()
        .optional("provider-id", string(), "")
        .required("device-name", string())
        .required("machine-id", string())
        .required("subnet-cidr", string())
        .required("config-method", string())
        .required("value", string())
        .omit("dns-servers", list(string()))
        .omit("dns-search-domains", list(string()))
        .optional("gateway-address", string(), "")
}

fn ip_address_v2() -> FieldSchema {
    ip_address_v1().optional("is-default-gateway", bool(), false)
}

fn ip_address_v3() -> FieldSchema {
    ip_address_v2()
        .optional("provider-network-id", string(), "")
        .optional("provider-subnet-id", string(), "")
}

fn ip_address_v4() -> FieldSchema {
    ip_address_v3().optional("origin", string(), "")
}

fn ip_address_v5() -> FieldSchema {
    ip_address_v4()
        .optional("is-shadow", bool(), false)
        .optional("is-secondary", bool(), false)
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "ip address",
        &[
            (1, ip_address_v1),
            (2, ip_address_v2),
            (3, ip_address_v3),
            (4, ip_address_v4),
            (5, ip_address_v5),
        ],
    )
});

impl VersionedEntity for IpAddress {
    const KIND: &'static str = "ip address";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = IpAddressArgs {
            provider_id: fields.string("provider-id")?,
            device_name: fields.string("device-name")?,
            machine_id: fields.string("machine-id")?,
            subnet_cidr: fields.string("subnet-cidr")?,
            config_method: fields.string("config-method")?,
            value: fields.string("value")?,
            dns_servers: fields.strings("dns-servers")?,
            dns_search_domains: fields.strings("dns-search-domains")?,
            gateway_address: fields.string("gateway-address")?,
            ..Default::default()
        };
        if version >= 2 {
            args.is_default_gateway = fields.bool("is-default-gateway")?;
        }
        if version >= 3 {
            args.provider_network_id = fields.string("provider-network-id")?;
            args.provider_subnet_id = fields.string("provider-subnet-id")?;
        }
        if version >= 4 {
            args.origin = fields.string("origin")?;
        }
        if version >= 5 {
            args.is_shadow = fields.bool("is-shadow")?;
            args.is_secondary = fields.bool("is-secondary")?;
        }
        Ok(IpAddress::new(args))
    }
}

impl ToWire for IpAddress {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .nonempty("provider-id", &a.provider_id)
            .field("device-name", a.device_name.as_str())
            .field("machine-id", a.machine_id.as_str())
            .field("subnet-cidr", a.subnet_cidr.as_str())
            .field("config-method", a.config_method.as_str())
            .field("value", a.value.as_str())
            .nonempty_strings("dns-servers", &a.dns_servers)
            .nonempty_strings("dns-search-domains", &a.dns_search_domains)
            .nonempty("gateway-address", &a.gateway_address)
            .field("is-default-gateway", a.is_default_gateway)
            .nonempty("provider-network-id", &a.provider_network_id)
            .nonempty("provider-subnet-id", &a.provider_subnet_id)
            .nonempty("origin", &a.origin)
            .field("is-shadow", a.is_shadow)
            .field("is-secondary", a.is_secondary)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
