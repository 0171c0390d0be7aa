//! Block devices attached to a machine

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{bool, force_uint, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`BlockDevice`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDeviceArgs {
    /// Kernel device name
    pub name: String,
    /// Device links under `/dev/disk`
    pub links: Vec<String>,
    /// Filesystem label
    pub label: String,
    /// Filesystem UUID
    pub uuid: String,
    /// Hardware id
    pub hardware_id: String,
    /// World wide name
    pub wwn: String,
    /// Bus address
    pub bus_address: String,
    /// Serial id
    pub serial_id: String,
    /// Size in MiB
    pub size: u64,
    /// Filesystem type
    pub filesystem_type: String,
    /// Whether the device is in use
    pub in_use: bool,
    /// Mount point
    pub mount_point: String,
}

/// A block device observed on a machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDevice {
    args: BlockDeviceArgs,
}

impl BlockDevice {
    /// Create a block device
    pub fn new(args: BlockDeviceArgs) -> Self {
        BlockDevice { args }
    }

    /// Kernel device name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Device links
    pub fn links(&self) -> &[String] {
        &self.args.links
    }

    /// Filesystem label
    pub fn label(&self) -> &str {
        &self.args.label
    }

    /// Filesystem UUID
    pub fn uuid(&self) -> &str {
        &self.args.uuid
    }

    /// Hardware id
    pub fn hardware_id(&self) -> &str {
        &self.args.hardware_id
    }

    /// World wide name
    pub fn wwn(&self) -> &str {
        &self.args.wwn
    }

    /// Bus address
    pub fn bus_address(&self) -> &str {
        &self.args.bus_address
    }

    /// Serial id
    pub fn serial_id(&self) -> &str {
        &self.args.serial_id
    }

    /// Size in MiB
    pub fn size(&self) -> u64 {
        self.args.size
    }

    /// Filesystem type
    pub fn filesystem_type(&self) -> &str {
        &self.args.filesystem_type
    }

    /// Whether the device is in use
    pub fn in_use(&self) -> bool {
        self.args.in_use
    }

    /// Mount point
    pub fn mount_point(&self) -> &str {
        &self.args.mount_point
    }
}

fn block_device_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .omit("links", list(string()))
        .optional("label", string(), "")
        .optional("uuid", string(), "")
        .optional("hardware-id", string(), "")
        .optional("bus-address", string(), "")
        .required("size", force_uint())
        .optional("fs-type", string(), "")
        .required("in-use", bool())
        .optional("mount-point", string(), "")
}

fn block_device_v2() -> FieldSchema {
    block_device_v1()
        .optional("wwn", string(), "")
        .optional("serial-id", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new("block device", &[(1, block_device_v1), (2, block_device_v2)])
});

impl VersionedEntity for BlockDevice {
    const KIND: &'static str = "block device";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = BlockDeviceArgs {
            name: fields.string("name")?,
            links: fields.strings("links")?,
            label: fields.string("label")?,
            uuid: fields.string("uuid")?,
            hardware_id: fields.string("hardware-id")?,
            bus_address: fields.string("bus-address")?,
            size: fields.uint("size")?,
            filesystem_type: fields.string("fs-type")?,
            in_use: fields.bool("in-use")?,
            mount_point: fields.string("mount-point")?,
            ..Default::default()
        };
        if version >= 2 {
            args.wwn = fields.string("wwn")?;
            args.serial_id = fields.string("serial-id")?;
        }
        Ok(BlockDevice::new(args))
    }
}

impl ToWire for BlockDevice {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("name", a.name.as_str())
            .nonempty_strings("links", &a.links)
            .nonempty("label", &a.label)
            .nonempty("uuid", &a.uuid)
            .nonempty("hardware-id", &a.hardware_id)
            .nonempty("wwn", &a.wwn)
            .nonempty("bus-address", &a.bus_address)
            .nonempty("serial-id", &a.serial_id)
            .field("size", a.size)
            .nonempty("fs-type", &a.filesystem_type)
            .field("in-use", a.in_use)
            .nonempty("mount-point", &a.mount_point)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldoc_core::Map;
    use modeldoc_schema::{collection_envelope, import_collection};

    fn device() -> BlockDevice {
        BlockDevice::new(BlockDeviceArgs {
            name: "sda".into(),
            links: vec!["/dev/disk/by-id/a".into()],
            label: "root".into(),
            hardware_id: "scsi-1".into(),
            wwn: "wwn-1".into(),
            serial_id: "S1".into(),
            size: 10240,
            filesystem_type: "ext4".into(),
            in_use: true,
            mount_point: "/".into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_block_device_round_trip() {
        let devices = vec![device()];
        let wire = collection_envelope("block-devices", &devices);
        let back = import_collection::<BlockDevice>(&wire, "block-devices").unwrap();
        assert_eq!(back, devices);
    }

    #[test]
    fn test_v1_ignores_wwn() {
        let mut payload = match device().to_wire() {
            Value::Map(m) => m,
            _ => unreachable!(),
        };
        payload.insert("size".into(), Value::from("2048"));
        let mut env = Map::new();
        env.insert("version".into(), Value::Int(1));
        env.insert("block-devices".into(), Value::List(vec![Value::Map(payload)]));
        let back = import_collection::<BlockDevice>(&Value::Map(env), "block-devices").unwrap();
        assert_eq!(back[0].wwn(), "");
        assert_eq!(back[0].serial_id(), "");
        assert_eq!(back[0].size(), 2048);
    }

    #[test]
    fn test_missing_in_use_names_the_item() {
        let mut payload = Map::new();
        payload.insert("name".into(), Value::from("sdb"));
        payload.insert("size".into(), Value::Int(1));
        let mut env = Map::new();
        env.insert("version".into(), Value::Int(2));
        env.insert("block-devices".into(), Value::List(vec![Value::Map(payload)]));
        let err = import_collection::<BlockDevice>(&Value::Map(env), "block-devices").unwrap_err();
        assert_eq!(
            err.to_string(),
            "block-devices: block device 0 v2 schema check failed: in-use: expected bool, got nothing"
        );
    }
}
