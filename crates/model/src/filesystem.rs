//! Filesystems and their attachments

use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use crate::volume::attachment_host;
use modeldoc_core::{Result, Tag, Value};
use modeldoc_schema::checker::{bool, envelope, force_uint, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`FilesystemAttachment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemAttachmentArgs {
    /// Host the filesystem is mounted on (machine or unit)
    pub host: Tag,
    /// Whether the attachment is provisioned
    pub provisioned: bool,
    /// Mount point
    pub mount_point: String,
    /// Mounted read-only
    pub read_only: bool,
}

/// A filesystem mounted on a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemAttachment {
    args: FilesystemAttachmentArgs,
}

impl FilesystemAttachment {
    /// Create an attachment
    pub fn new(args: FilesystemAttachmentArgs) -> Self {
        FilesystemAttachment { args }
    }

    /// Host the filesystem is mounted on
    pub fn host(&self) -> &Tag {
        &self.args.host
    }

    /// Whether the attachment is provisioned
    pub fn provisioned(&self) -> bool {
        self.args.provisioned
    }

    /// Mount point
    pub fn mount_point(&self) -> &str {
        &self.args.mount_point
    }

    /// Mounted read-only
    pub fn read_only(&self) -> bool {
        self.args.read_only
    }
}

fn attachment_v1() -> FieldSchema {
    FieldSchema::new()
        .required("machine-id", string())
        .required("provisioned", bool())
        .optional("mount-point", string(), "")
        .required("read-only", bool())
}

fn attachment_v2() -> FieldSchema {
    attachment_v1().remove("machine-id").required("host-id", string())
}

static ATTACHMENT_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "filesystem attachment",
        &[(1, attachment_v1), (2, attachment_v2)],
    )
});

impl VersionedEntity for FilesystemAttachment {
    const KIND: &'static str = "filesystem attachment";

    fn registry() -> &'static SchemaRegistry {
        &ATTACHMENT_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        Ok(FilesystemAttachment::new(FilesystemAttachmentArgs {
            host: attachment_host(&fields, version)?,
            provisioned: fields.bool("provisioned")?,
            mount_point: fields.string("mount-point")?,
            read_only: fields.bool("read-only")?,
        }))
    }
}

impl ToWire for FilesystemAttachment {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("host-id", self.args.host.to_string())
            .field("provisioned", self.args.provisioned)
            .nonempty("mount-point", &self.args.mount_point)
            .field("read-only", self.args.read_only)
            .into_value()
    }
}

/// Arguments for [`Filesystem`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesystemArgs {
    /// Filesystem id
    pub id: String,
    /// Storage instance the filesystem backs
    pub storage_id: String,
    /// Volume the filesystem lives on
    pub volume_id: String,
    /// Whether the filesystem is provisioned
    pub provisioned: bool,
    /// Size in MiB
    pub size: u64,
    /// Storage pool
    pub pool: String,
    /// Provider filesystem id
    pub filesystem_id: String,
}

/// A filesystem
#[derive(Debug, Clone, PartialEq)]
pub struct Filesystem {
    args: FilesystemArgs,
    status: Option<StatusPoint>,
    status_history: StatusHistory,
    attachments: Vec<FilesystemAttachment>,
}

impl Filesystem {
    /// Create a filesystem
    pub fn new(args: FilesystemArgs) -> Self {
        Filesystem {
            args,
            status: None,
            status_history: StatusHistory::default(),
            attachments: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.args.id
    }

    pub fn storage_id(&self) -> &str {
        &self.args.storage_id
    }

    pub fn volume_id(&self) -> &str {
        &self.args.volume_id
    }

    pub fn provisioned(&self) -> bool {
        self.args.provisioned
    }

    pub fn size(&self) -> u64 {
        self.args.size
    }

    pub fn pool(&self) -> &str {
        &self.args.pool
    }

    pub fn filesystem_id(&self) -> &str {
        &self.args.filesystem_id
    }

    /// Filesystem status
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the filesystem status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Earlier filesystem statuses
    pub fn status_history(&self) -> &[StatusPoint] {
        self.status_history.status_history()
    }

    /// Replace the earlier filesystem statuses
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.status_history.set_status_history(args);
    }

    pub fn attachments(&self) -> &[FilesystemAttachment] {
        &self.attachments
    }

    /// Add an attachment
    pub fn add_attachment(&mut self, args: FilesystemAttachmentArgs) -> &FilesystemAttachment {
        self.attachments.push(FilesystemAttachment::new(args));
        let last = self.attachments.len() - 1;
        &self.attachments[last]
    }
}

fn filesystem_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .optional("storage-id", string(), "")
        .optional("volume-id", string(), "")
        .required("provisioned", bool())
        .required("size", force_uint())
        .optional("pool", string(), "")
        .optional("filesystem-id", string(), "")
        .required("status", envelope())
        .required("status-history", envelope())
        .required("attachments", envelope())
}

static FILESYSTEM_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("filesystem", &[(1, filesystem_v1)]));

impl VersionedEntity for Filesystem {
    const KIND: &'static str = "filesystem";

    fn registry() -> &'static SchemaRegistry {
        &FILESYSTEM_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        let mut fs = Filesystem::new(FilesystemArgs {
            id: fields.string("id")?,
            storage_id: fields.string("storage-id")?,
            volume_id: fields.string("volume-id")?,
            provisioned: fields.bool("provisioned")?,
            size: fields.uint("size")?,
            pool: fields.string("pool")?,
            filesystem_id: fields.string("filesystem-id")?,
        });
        fs.status = Some(fields.required_embedded::<StatusPoint>("status", "status")?);
        fs.status_history = StatusHistory::import(&fields, "status-history")?;
        fs.attachments = fields.collection::<FilesystemAttachment>("attachments")?;
        Ok(fs)
    }
}

impl ToWire for Filesystem {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("id", a.id.as_str())
            .nonempty("storage-id", &a.storage_id)
            .nonempty("volume-id", &a.volume_id)
            .field("provisioned", a.provisioned)
            .field("size", a.size)
            .nonempty("pool", &a.pool)
            .nonempty("filesystem-id", &a.filesystem_id)
            .opt_embedded("status", "status", self.status.as_ref())
            .field("status-history", self.status_history.to_wire())
            .collection("attachments", &self.attachments)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&FILESYSTEM_REGISTRY, &ATTACHMENT_REGISTRY]
}
