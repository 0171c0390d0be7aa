//! Provider instances backing machines
//!
//! Version 1 stored the instance status as a bare string. Those strings were
//! written incorrectly by the producers of that era, so a version 1 import
//! ignores the stored value and records an `unknown` status instead.

use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use modeldoc_core::{Error, Result, Value};
use modeldoc_schema::checker::{any, force_uint, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use tracing::trace;

/// Arguments for [`CloudInstance`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudInstanceArgs {
    /// Provider instance id
    pub instance_id: String,
    /// CPU architecture
    pub architecture: String,
    /// Memory in MiB
    pub memory: Option<u64>,
    /// Root disk size in MiB
    pub root_disk: Option<u64>,
    /// Storage pool of the root disk
    pub root_disk_source: String,
    /// Number of CPU cores
    pub cpu_cores: Option<u64>,
    /// Relative CPU power
    pub cpu_power: Option<u64>,
    /// Provider tags
    pub tags: Vec<String>,
    /// Availability zone
    pub availability_zone: String,
    /// Virtualisation type
    pub virt_type: String,
}

/// A provider instance
#[derive(Debug, Clone, PartialEq)]
pub struct CloudInstance {
    instance_id: String,
    status: Option<StatusPoint>,
    status_history: StatusHistory,
    modification_status: Option<StatusPoint>,
    architecture: String,
    memory: Option<u64>,
    root_disk: Option<u64>,
    root_disk_source: String,
    cpu_cores: Option<u64>,
    cpu_power: Option<u64>,
    tags: Vec<String>,
    availability_zone: String,
    virt_type: String,
}

impl CloudInstance {
    /// Create a cloud instance
    pub fn new(args: CloudInstanceArgs) -> Self {
        CloudInstance {
            instance_id: args.instance_id,
            status: None,
            status_history: StatusHistory::default(),
            modification_status: None,
            architecture: args.architecture,
            memory: args.memory,
            root_disk: args.root_disk,
            root_disk_source: args.root_disk_source,
            cpu_cores: args.cpu_cores,
            cpu_power: args.cpu_power,
            tags: args.tags,
            availability_zone: args.availability_zone,
            virt_type: args.virt_type,
        }
    }

    /// Provider instance id
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Instance status
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the instance status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Earlier instance statuses
    pub fn status_history(&self) -> &[StatusPoint] {
        self.status_history.status_history()
    }

    /// Replace the earlier instance statuses
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.status_history.set_status_history(args);
    }

    /// Status of the last modification applied to the instance
    pub fn modification_status(&self) -> Option<&StatusPoint> {
        self.modification_status.as_ref()
    }

    /// Set the modification status
    pub fn set_modification_status(&mut self, args: StatusArgs) {
        self.modification_status = Some(StatusPoint::new(args));
    }

    /// CPU architecture
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Memory in MiB
    pub fn memory(&self) -> Option<u64> {
        self.memory
    }

    /// Root disk size in MiB
    pub fn root_disk(&self) -> Option<u64> {
        self.root_disk
    }

    /// Storage pool of the root disk
    pub fn root_disk_source(&self) -> &str {
        &self.root_disk_source
    }

    /// Number of CPU cores
    pub fn cpu_cores(&self) -> Option<u64> {
        self.cpu_cores
    }

    /// Relative CPU power
    pub fn cpu_power(&self) -> Option<u64> {
        self.cpu_power
    }

    /// Provider tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Availability zone
    pub fn availability_zone(&self) -> &str {
        &self.availability_zone
    }

    /// Virtualisation type
    pub fn virt_type(&self) -> &str {
        &self.virt_type
    }

    /// Check the instance's own invariants
    pub fn validate(&self) -> Result<()> {
        if self.instance_id.is_empty() {
            return Err(Error::validation("instance id is empty"));
        }
        if self.status.is_none() {
            return Err(Error::validation(format!(
                "instance {:?} missing status",
                self.instance_id
            )));
        }
        Ok(())
    }
}

fn instance_v1() -> FieldSchema {
    FieldSchema::new()
        .required("instance-id", string())
        .required("status", string())
        .omit("architecture", string())
        .omit("memory", force_uint())
        .omit("root-disk", force_uint())
        .omit("cpu-cores", force_uint())
        .omit("cpu-power", force_uint())
        .omit("tags", list(string()))
        .omit("availability-zone", string())
}

fn instance_v2() -> FieldSchema {
    instance_v1()
        .widen("status", any())
        .omit("status-history", any())
}

fn instance_v3() -> FieldSchema {
    instance_v2()
        .omit("root-disk-source", string())
        .omit("virt-type", string())
}

fn instance_v4() -> FieldSchema {
    instance_v3().omit("modification-status", any())
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "instance",
        &[
            (1, instance_v1),
            (2, instance_v2),
            (3, instance_v3),
            (4, instance_v4),
        ],
    )
});

impl VersionedEntity for CloudInstance {
    const KIND: &'static str = "instance";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut instance = CloudInstance::new(CloudInstanceArgs {
            instance_id: fields.string("instance-id")?,
            architecture: fields.opt_string("architecture")?.unwrap_or_default(),
            memory: fields.opt_uint("memory")?,
            root_disk: fields.opt_uint("root-disk")?,
            cpu_cores: fields.opt_uint("cpu-cores")?,
            cpu_power: fields.opt_uint("cpu-power")?,
            tags: fields.strings("tags")?,
            availability_zone: fields.opt_string("availability-zone")?.unwrap_or_default(),
            ..Default::default()
        });
        if version >= 2 {
            instance.status = Some(fields.required_embedded::<StatusPoint>("status", "status")?);
            instance.status_history = StatusHistory::import(&fields, "status-history")?;
        } else {
            trace!(
                instance = %instance.instance_id,
                "replacing version 1 instance status with unknown"
            );
            instance.status = Some(StatusPoint::unknown());
        }
        if version >= 3 {
            instance.root_disk_source = fields.opt_string("root-disk-source")?.unwrap_or_default();
            instance.virt_type = fields.opt_string("virt-type")?.unwrap_or_default();
        }
        if version >= 4 {
            instance.modification_status =
                fields.embedded::<StatusPoint>("modification-status", "status")?;
        }
        Ok(instance)
    }
}

impl ToWire for CloudInstance {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("instance-id", self.instance_id.as_str())
            .opt_embedded("status", "status", self.status.as_ref())
            .field("status-history", self.status_history.to_wire())
            .opt_embedded(
                "modification-status",
                "status",
                self.modification_status.as_ref(),
            )
            .nonempty("architecture", &self.architecture)
            .opt("memory", self.memory)
            .opt("root-disk", self.root_disk)
            .nonempty("root-disk-source", &self.root_disk_source)
            .opt("cpu-cores", self.cpu_cores)
            .opt("cpu-power", self.cpu_power)
            .nonempty_strings("tags", &self.tags)
            .nonempty("availability-zone", &self.availability_zone)
            .nonempty("virt-type", &self.virt_type)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use modeldoc_core::Map;
    use modeldoc_schema::{embedded_envelope, import_embedded};

    fn instance() -> CloudInstance {
        let mut i = CloudInstance::new(CloudInstanceArgs {
            instance_id: "i-0abc".into(),
            architecture: "amd64".into(),
            memory: Some(4096),
            root_disk: Some(0),
            root_disk_source: "ebs".into(),
            cpu_cores: Some(2),
            tags: vec!["a".into()],
            availability_zone: "us-east-1a".into(),
            virt_type: "hvm".into(),
            ..Default::default()
        });
        i.set_status(StatusArgs {
            value: "running".into(),
            message: String::new(),
            data: Map::new(),
            updated: Utc.with_ymd_and_hms(2021, 2, 3, 4, 5, 6).unwrap(),
            never_set: false,
        });
        i
    }

    #[test]
    fn test_instance_round_trip() {
        let i = instance();
        let back = import_embedded::<CloudInstance>(&embedded_envelope("instance", &i), "instance")
            .unwrap();
        assert_eq!(back, i);
        assert_eq!(back.root_disk(), Some(0));
        assert_eq!(back.cpu_power(), None);
    }

    #[test]
    fn test_v1_string_status_becomes_unknown() {
        let mut payload = Map::new();
        payload.insert("instance-id".into(), Value::from("i-1"));
        payload.insert("status".into(), Value::from("running"));
        payload.insert("virt-type".into(), Value::from("kvm"));
        let mut env = Map::new();
        env.insert("version".into(), Value::Int(1));
        env.insert("instance".into(), Value::Map(payload));
        let back = import_embedded::<CloudInstance>(&Value::Map(env), "instance").unwrap();
        let status = back.status().unwrap();
        assert_eq!(status.value(), "unknown");
        assert_eq!(status.updated(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(back.virt_type(), "");
    }

    #[test]
    fn test_v2_requires_status_document() {
        let mut payload = Map::new();
        payload.insert("instance-id".into(), Value::from("i-1"));
        payload.insert("status".into(), Value::from("running"));
        let mut env = Map::new();
        env.insert("version".into(), Value::Int(2));
        env.insert("instance".into(), Value::Map(payload));
        let err = import_embedded::<CloudInstance>(&Value::Map(env), "instance").unwrap_err();
        assert_eq!(err.contexts()[0], "status");
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_validate() {
        assert!(instance().validate().is_ok());
        let bare = CloudInstance::new(CloudInstanceArgs {
            instance_id: "i-1".into(),
            ..Default::default()
        });
        assert_eq!(
            bare.validate().unwrap_err().to_string(),
            "instance \"i-1\" missing status"
        );
    }
}
