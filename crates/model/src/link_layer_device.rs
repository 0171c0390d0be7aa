//! Link-layer network devices on machines

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{bool, force_uint, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`LinkLayerDevice`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkLayerDeviceArgs {
    /// Device name
    pub name: String,
    /// MTU
    pub mtu: u64,
    /// Provider id
    pub provider_id: String,
    /// Owning machine id
    pub machine_id: String,
    /// Device type (`ethernet`, `bridge`, ...)
    pub type_: String,
    /// MAC address
    pub mac_address: String,
    /// Brought up at boot
    pub is_autostart: bool,
    /// Currently up
    pub is_up: bool,
    /// Parent device name, or a global key for container devices
    pub parent_name: String,
    /// Virtual port type
    pub virtual_port_type: String,
}

/// A link-layer device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkLayerDevice {
    args: LinkLayerDeviceArgs,
}

impl LinkLayerDevice {
    /// Create a device
    pub fn new(args: LinkLayerDeviceArgs) -> Self {
        LinkLayerDevice { args }
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// MTU
    pub fn mtu(&self) -> u64 {
        self.args.mtu
    }

    /// Provider id
    pub fn provider_id(&self) -> &str {
        &self.args.provider_id
    }

    /// Owning machine id
    pub fn machine_id(&self) -> &str {
        &self.args.machine_id
    }

    /// Device type
    pub fn type_(&self) -> &str {
        &self.args.type_
    }

    /// MAC address
    pub fn mac_address(&self) -> &str {
        &self.args.mac_address
    }

    /// Brought up at boot
    pub fn is_autostart(&self) -> bool {
        self.args.is_autostart
    }

    /// Currently up
    pub fn is_up(&self) -> bool {
        self.args.is_up
    }

    /// Parent device name
    pub fn parent_name(&self) -> &str {
        &self.args.parent_name
    }

    /// Virtual port type
    pub fn virtual_port_type(&self) -> &str {
        &self.args.virtual_port_type
    }
}

fn device_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .required("mtu", force_uint())
        .optional("provider-id", string(), "")
        .required("machine-id", string())
        .required("type", string())
        .optional("mac-address", string(), "")
        .required("is-autostart", bool())
        .required("is-up", bool())
        .optional("parent-name", string(), "")
}

fn device_v2() -> FieldSchema {
    device_v1().optional("virtual-port-type", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new("link layer device", &[(1, device_v1), (2, device_v2)])
});

impl VersionedEntity for LinkLayerDevice {
    const KIND: &'static str = "link layer device";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        Ok(LinkLayerDevice::new(LinkLayerDeviceArgs {
            name: fields.string("name")?,
            mtu: fields.uint("mtu")?,
            provider_id: fields.string("provider-id")?,
            machine_id: fields.string("machine-id")?,
            type_: fields.string("type")?,
            mac_address: fields.string("mac-address")?,
            is_autostart: fields.bool("is-autostart")?,
            is_up: fields.bool("is-up")?,
            parent_name: fields.string("parent-name")?,
            virtual_port_type: if version >= 2 {
                fields.string("virtual-port-type")?
            } else {
                String::new()
            },
        }))
    }
}

impl ToWire for LinkLayerDevice {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("name", a.name.as_str())
            .field("mtu", a.mtu)
            .nonempty("provider-id", &a.provider_id)
            .field("machine-id", a.machine_id.as_str())
            .field("type", a.type_.as_str())
            .nonempty("mac-address", &a.mac_address)
            .field("is-autostart", a.is_autostart)
            .field("is-up", a.is_up)
            .nonempty("parent-name", &a.parent_name)
            .nonempty("virtual-port-type", &a.virtual_port_type)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldoc_schema::{collection_envelope, import_collection};

    #[test]
    fn test_device_round_trip_and_v1() {
        let devices = vec![LinkLayerDevice::new(LinkLayerDeviceArgs {
            name: "eth0".into(),
            mtu: 1500,
            machine_id: "0".into(),
            type_: "ethernet".into(),
            mac_address: "00:16:3e:00:00:01".into(),
            is_autostart: true,
            is_up: true,
            parent_name: "br-eth0".into(),
            virtual_port_type: "openvswitch".into(),
            ..Default::default()
        })];
        let mut env = collection_envelope("link-layer-devices", &devices);
        let back = import_collection::<LinkLayerDevice>(&env, "link-layer-devices").unwrap();
        assert_eq!(back, devices);

        if let Value::Map(m) = &mut env {
            m.insert("version".into(), Value::Int(1));
        }
        let back = import_collection::<LinkLayerDevice>(&env, "link-layer-devices").unwrap();
        assert_eq!(back[0].virtual_port_type(), "");
        assert_eq!(back[0].mtu(), 1500);
    }
}
