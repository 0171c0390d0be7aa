//! Volumes, their attachments and attachment plans
//!
//! Version 1 attachments named the host by bare machine id. Version 2 names it
//! by tag so that units of container-based models can be hosts too.

use crate::block_device::{BlockDevice, BlockDeviceArgs};
use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use modeldoc_core::{Result, ResultExt, Tag, Value};
use modeldoc_schema::checker::{any, envelope, bool, force_uint, string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Arguments for [`VolumeAttachment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeAttachmentArgs {
    /// Host the volume is attached to (machine or unit)
    pub host: Tag,
    /// Whether the attachment is provisioned
    pub provisioned: bool,
    /// Attached read-only
    pub read_only: bool,
    /// Device name
    pub device_name: String,
    /// Device link
    pub device_link: String,
    /// Bus address
    pub bus_address: String,
}

/// A volume attached to a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeAttachment {
    args: VolumeAttachmentArgs,
}

impl VolumeAttachment {
    /// Create an attachment
    pub fn new(args: VolumeAttachmentArgs) -> Self {
        VolumeAttachment { args }
    }

    /// Host the volume is attached to
    pub fn host(&self) -> &Tag {
        &self.args.host
    }

    /// Whether the attachment is provisioned
    pub fn provisioned(&self) -> bool {
        self.args.provisioned
    }

    /// Attached read-only
    pub fn read_only(&self) -> bool {
        self.args.read_only
    }

    /// Device name
    pub fn device_name(&self) -> &str {
        &self.args.device_name
    }

    /// Device link
    pub fn device_link(&self) -> &str {
        &self.args.device_link
    }

    /// Bus address
    pub fn bus_address(&self) -> &str {
        &self.args.bus_address
    }
}

fn attachment_v1() -> FieldSchema {
    FieldSchema::new()
        .required("machine-id", string())
        .required("provisioned", bool())
        .required("read-only", bool())
        .optional("device-name", string(), "")
        .optional("device-link", string(), "")
        .optional("bus-address", string(), "")
}

fn attachment_v2() -> FieldSchema {
    attachment_v1().remove("machine-id").required("host-id", string())
}

static ATTACHMENT_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "volume attachment",
        &[(1, attachment_v1), (2, attachment_v2)],
    )
});

/// Read the attachment host: a machine id before version 2, a tag after
pub(crate) fn attachment_host(fields: &Fields, version: u32) -> Result<Tag> {
    if version >= 2 {
        Tag::parse(&fields.string("host-id")?).annotate("host-id")
    } else {
        Ok(Tag::Machine(fields.string("machine-id")?))
    }
}

impl VersionedEntity for VolumeAttachment {
    const KIND: &'static str = "volume attachment";

    fn registry() -> &'static SchemaRegistry {
        &ATTACHMENT_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        Ok(VolumeAttachment::new(VolumeAttachmentArgs {
            host: attachment_host(&fields, version)?,
            provisioned: fields.bool("provisioned")?,
            read_only: fields.bool("read-only")?,
            device_name: fields.string("device-name")?,
            device_link: fields.string("device-link")?,
            bus_address: fields.string("bus-address")?,
        }))
    }
}

impl ToWire for VolumeAttachment {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("host-id", a.host.to_string())
            .field("provisioned", a.provisioned)
            .field("read-only", a.read_only)
            .nonempty("device-name", &a.device_name)
            .nonempty("device-link", &a.device_link)
            .nonempty("bus-address", &a.bus_address)
            .into_value()
    }
}

/// Arguments for [`AttachmentPlan`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentPlanArgs {
    /// Machine the plan is for
    pub machine_id: String,
    /// Block device the volume shows up as
    pub block_device: Option<BlockDeviceArgs>,
    /// Device type (`local`, `iscsi`)
    pub device_type: String,
    /// Device attributes
    pub device_attributes: BTreeMap<String, String>,
}

/// How a volume will be attached to a machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentPlan {
    machine_id: String,
    block_device: Option<BlockDevice>,
    device_type: String,
    device_attributes: BTreeMap<String, String>,
}

impl AttachmentPlan {
    /// Create an attachment plan
    pub fn new(args: AttachmentPlanArgs) -> Self {
        AttachmentPlan {
            machine_id: args.machine_id,
            block_device: args.block_device.map(BlockDevice::new),
            device_type: args.device_type,
            device_attributes: args.device_attributes,
        }
    }

    /// Machine the plan is for
    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    /// Block device the volume shows up as
    pub fn block_device(&self) -> Option<&BlockDevice> {
        self.block_device.as_ref()
    }

    /// Device type
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Device attributes
    pub fn device_attributes(&self) -> &BTreeMap<String, String> {
        &self.device_attributes
    }
}

fn plan_v1() -> FieldSchema {
    FieldSchema::new()
        .required("machine-id", string())
        .omit("block-device", any())
        .optional("device-type", string(), "")
        .omit("device-attributes", string_map(string()))
}

static PLAN_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("attachment plan", &[(1, plan_v1)]));

impl VersionedEntity for AttachmentPlan {
    const KIND: &'static str = "attachment plan";

    fn registry() -> &'static SchemaRegistry {
        &PLAN_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(AttachmentPlan {
            machine_id: fields.string("machine-id")?,
            block_device: fields.embedded::<BlockDevice>("block-device", "block-device")?,
            device_type: fields.string("device-type")?,
            device_attributes: fields.string_map("device-attributes")?,
        })
    }
}

impl ToWire for AttachmentPlan {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("machine-id", self.machine_id.as_str())
            .opt_embedded("block-device", "block-device", self.block_device.as_ref())
            .nonempty("device-type", &self.device_type)
            .nonempty_map("device-attributes", &self.device_attributes)
            .into_value()
    }
}

/// Arguments for [`Volume`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeArgs {
    /// Volume id
    pub id: String,
    /// Storage instance the volume backs
    pub storage_id: String,
    /// Whether the volume is provisioned
    pub provisioned: bool,
    /// Size in MiB
    pub size: u64,
    /// Storage pool
    pub pool: String,
    /// Hardware id
    pub hardware_id: String,
    /// World wide name
    pub wwn: String,
    /// Provider volume id
    pub volume_id: String,
    /// Outlives its machine
    pub persistent: bool,
}

/// A volume
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    args: VolumeArgs,
    status: Option<StatusPoint>,
    status_history: StatusHistory,
    attachments: Vec<VolumeAttachment>,
    attachment_plans: Vec<AttachmentPlan>,
}

impl Volume {
    /// Create a volume
    pub fn new(args: VolumeArgs) -> Self {
        Volume {
            args,
            status: None,
            status_history: StatusHistory::default(),
            attachments: Vec::new(),
            attachment_plans: Vec::new(),
        }
    }

    /// Volume id
    pub fn id(&self) -> &str {
        &self.args.id
    }

    /// Storage instance the volume backs
    pub fn storage_id(&self) -> &str {
        &self.args.storage_id
    }

    /// Whether the volume is provisioned
    pub fn provisioned(&self) -> bool {
        self.args.provisioned
    }

    /// Size in MiB
    pub fn size(&self) -> u64 {
        self.args.size
    }

    /// Storage pool
    pub fn pool(&self) -> &str {
        &self.args.pool
    }

    /// Hardware id
    pub fn hardware_id(&self) -> &str {
        &self.args.hardware_id
    }

    /// World wide name
    pub fn wwn(&self) -> &str {
        &self.args.wwn
    }

    /// Provider volume id
    pub fn volume_id(&self) -> &str {
        &self.args.volume_id
    }

    /// Outlives its machine
    pub fn persistent(&self) -> bool {
        self.args.persistent
    }

    /// Volume status
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the volume status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Earlier volume statuses
    pub fn status_history(&self) -> &[StatusPoint] {
        self.status_history.status_history()
    }

    /// Replace the earlier volume statuses
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.status_history.set_status_history(args);
    }

    /// Attachments
    pub fn attachments(&self) -> &[VolumeAttachment] {
        &self.attachments
    }

    /// Add an attachment
    pub fn add_attachment(&mut self, args: VolumeAttachmentArgs) -> &VolumeAttachment {
        self.attachments.push(VolumeAttachment::new(args));
        let last = self.attachments.len() - 1;
        &self.attachments[last]
    }

    /// Attachment plans
    pub fn attachment_plans(&self) -> &[AttachmentPlan] {
        &self.attachment_plans
    }

    /// Add an attachment plan
    pub fn add_attachment_plan(&mut self, args: AttachmentPlanArgs) -> &AttachmentPlan {
        self.attachment_plans.push(AttachmentPlan::new(args));
        let last = self.attachment_plans.len() - 1;
        &self.attachment_plans[last]
    }
}

fn volume_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .optional("storage-id", string(), "")
        .required("provisioned", bool())
        .required("size", force_uint())
        .optional("pool", string(), "")
        .optional("hardware-id", string(), "")
        .optional("wwn", string(), "")
        .optional("volume-id", string(), "")
        .required("persistent", bool())
        .required("status", envelope())
        .required("status-history", envelope())
        .required("attachments", envelope())
}

fn volume_v2() -> FieldSchema {
    volume_v1().omit("attachment-plans", any())
}

static VOLUME_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("volume", &[(1, volume_v1), (2, volume_v2)]));

impl VersionedEntity for Volume {
    const KIND: &'static str = "volume";

    fn registry() -> &'static SchemaRegistry {
        &VOLUME_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut volume = Volume::new(VolumeArgs {
            id: fields.string("id")?,
            storage_id: fields.string("storage-id")?,
            provisioned: fields.bool("provisioned")?,
            size: fields.uint("size")?,
            pool: fields.string("pool")?,
            hardware_id: fields.string("hardware-id")?,
            wwn: fields.string("wwn")?,
            volume_id: fields.string("volume-id")?,
            persistent: fields.bool("persistent")?,
        });
        volume.status = Some(fields.required_embedded::<StatusPoint>("status", "status")?);
        volume.status_history = StatusHistory::import(&fields, "status-history")?;
        volume.attachments = fields.collection::<VolumeAttachment>("attachments")?;
        if version >= 2 {
            volume.attachment_plans = fields.collection::<AttachmentPlan>("attachment-plans")?;
        }
        Ok(volume)
    }
}

impl ToWire for Volume {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let mut builder = MapBuilder::new()
            .field("id", a.id.as_str())
            .nonempty("storage-id", &a.storage_id)
            .field("provisioned", a.provisioned)
            .field("size", a.size)
            .nonempty("pool", &a.pool)
            .nonempty("hardware-id", &a.hardware_id)
            .nonempty("wwn", &a.wwn)
            .nonempty("volume-id", &a.volume_id)
            .field("persistent", a.persistent)
            .opt_embedded("status", "status", self.status.as_ref())
            .field("status-history", self.status_history.to_wire())
            .collection("attachments", &self.attachments);
        if !self.attachment_plans.is_empty() {
            builder = builder.collection("attachment-plans", &self.attachment_plans);
        }
        builder.into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&VOLUME_REGISTRY, &ATTACHMENT_REGISTRY, &PLAN_REGISTRY]
}
