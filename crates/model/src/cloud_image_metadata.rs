//! Cached cloud image metadata

use chrono::{DateTime, Utc};
use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{force_uint, int, string, time};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`CloudImageMetadata`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudImageMetadataArgs {
    /// Image stream (`released`, `daily`)
    pub stream: String,
    /// Cloud region
    pub region: String,
    /// OS version (`22.04`)
    pub version: String,
    /// Architecture
    pub arch: String,
    /// Virtualisation type
    pub virt_type: String,
    /// Root storage type
    pub root_storage_type: String,
    /// Root storage size in GiB
    pub root_storage_size: Option<u64>,
    /// Creation time in nanoseconds since the epoch
    pub date_created: i64,
    /// Where the metadata came from
    pub source: String,
    /// Lookup priority
    pub priority: i64,
    /// Provider image id
    pub image_id: String,
    /// When the entry expires
    pub expires_at: Option<DateTime<Utc>>,
}

/// One image metadata record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudImageMetadata {
    args: CloudImageMetadataArgs,
}

impl CloudImageMetadata {
    /// Create a record
    pub fn new(args: CloudImageMetadataArgs) -> Self {
        CloudImageMetadata { args }
    }

    pub fn stream(&self) -> &str {
        &self.args.stream
    }

    pub fn region(&self) -> &str {
        &self.args.region
    }

    pub fn version(&self) -> &str {
        &self.args.version
    }

    pub fn arch(&self) -> &str {
        &self.args.arch
    }

    pub fn virt_type(&self) -> &str {
        &self.args.virt_type
    }

    pub fn root_storage_type(&self) -> &str {
        &self.args.root_storage_type
    }

    /// Root storage size, when recorded
    pub fn root_storage_size(&self) -> Option<u64> {
        self.args.root_storage_size
    }

    pub fn date_created(&self) -> i64 {
        self.args.date_created
    }

    pub fn source(&self) -> &str {
        &self.args.source
    }

    pub fn priority(&self) -> i64 {
        self.args.priority
    }

    pub fn image_id(&self) -> &str {
        &self.args.image_id
    }

    /// Expiry time, when set
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.args.expires_at
    }
}

fn metadata_v1() -> FieldSchema {
    FieldSchema::new()
        .required("stream", string())
        .required("region", string())
        .required("version", string())
        .required("arch", string())
        .optional("virt-type", string(), "")
        .optional("root-storage-type", string(), "")
        .omit("root-storage-size", force_uint())
        .required("date-created", int())
        .required("source", string())
        .required("priority", int())
        .required("image-id", string())
}

fn metadata_v2() -> FieldSchema {
    metadata_v1().omit("expires-at", time())
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "cloud image metadata",
        &[(1, metadata_v1), (2, metadata_v2)],
    )
});

impl VersionedEntity for CloudImageMetadata {
    const KIND: &'static str = "cloud image metadata";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        Ok(CloudImageMetadata::new(CloudImageMetadataArgs {
            stream: fields.string("stream")?,
            region: fields.string("region")?,
            version: fields.string("version")?,
            arch: fields.string("arch")?,
            virt_type: fields.string("virt-type")?,
            root_storage_type: fields.string("root-storage-type")?,
            root_storage_size: fields.opt_uint("root-storage-size")?,
            date_created: fields.int("date-created")?,
            source: fields.string("source")?,
            priority: fields.int("priority")?,
            image_id: fields.string("image-id")?,
            expires_at: if version >= 2 {
                fields.opt_time("expires-at")?
            } else {
                None
            },
        }))
    }
}

impl ToWire for CloudImageMetadata {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("stream", a.stream.as_str())
            .field("region", a.region.as_str())
            .field("version", a.version.as_str())
            .field("arch", a.arch.as_str())
            .nonempty("virt-type", &a.virt_type)
            .nonempty("root-storage-type", &a.root_storage_type)
            .opt("root-storage-size", a.root_storage_size)
            .field("date-created", a.date_created)
            .field("source", a.source.as_str())
            .field("priority", a.priority)
            .field("image-id", a.image_id.as_str())
            .opt("expires-at", a.expires_at)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
