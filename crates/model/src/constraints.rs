//! Resource constraints
//!
//! Constraints are optional on machines, applications, units and the model.
//! An owner with no constraints carries `None`, never an all-zero value, and
//! exports no `constraints` key at all. Numeric fields are `Option<u64>`
//! because an unset memory constraint differs from a memory constraint of 0.
//!
//! Older producers wrote the core count as `cpu-cores`; both spellings are
//! read, and a document that uses both is rejected.

use modeldoc_core::{Error, Result, Value};
use modeldoc_schema::checker::{bool, force_uint, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for creating constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintsArgs {
    /// CPU architecture
    pub architecture: String,
    /// Container type
    pub container: String,
    /// Number of CPU cores
    pub cores: Option<u64>,
    /// Relative CPU power
    pub cpu_power: Option<u64>,
    /// Provider instance type
    pub instance_type: String,
    /// Memory in MiB
    pub memory: Option<u64>,
    /// Root disk size in MiB
    pub root_disk: Option<u64>,
    /// Storage pool for the root disk
    pub root_disk_source: String,
    /// Space names, `^` prefixed when excluded
    pub spaces: Vec<String>,
    /// Provider tags
    pub tags: Vec<String>,
    /// Virtualisation type
    pub virt_type: String,
    /// Availability zones
    pub zones: Vec<String>,
    /// Whether to allocate a public IP
    pub allocate_public_ip: Option<bool>,
    /// Image to boot from
    pub image_id: String,
}

/// Resource constraints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    architecture: String,
    container: String,
    cores: Option<u64>,
    cpu_power: Option<u64>,
    instance_type: String,
    memory: Option<u64>,
    root_disk: Option<u64>,
    root_disk_source: String,
    spaces: Vec<String>,
    tags: Vec<String>,
    virt_type: String,
    zones: Vec<String>,
    allocate_public_ip: Option<bool>,
    image_id: String,
}

impl Constraints {
    /// Create constraints, or `None` when nothing is constrained
    pub fn new(args: ConstraintsArgs) -> Option<Self> {
        if args == ConstraintsArgs::default() {
            return None;
        }
        Some(Constraints {
            architecture: args.architecture,
            container: args.container,
            cores: args.cores,
            cpu_power: args.cpu_power,
            instance_type: args.instance_type,
            memory: args.memory,
            root_disk: args.root_disk,
            root_disk_source: args.root_disk_source,
            spaces: args.spaces,
            tags: args.tags,
            virt_type: args.virt_type,
            zones: args.zones,
            allocate_public_ip: args.allocate_public_ip,
            image_id: args.image_id,
        })
    }

    /// True when no constraint is set
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }

    /// CPU architecture
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Container type
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Number of CPU cores
    pub fn cores(&self) -> Option<u64> {
        self.cores
    }

    /// Relative CPU power
    pub fn cpu_power(&self) -> Option<u64> {
        self.cpu_power
    }

    /// Provider instance type
    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    /// Memory in MiB
    pub fn memory(&self) -> Option<u64> {
        self.memory
    }

    /// Root disk size in MiB
    pub fn root_disk(&self) -> Option<u64> {
        self.root_disk
    }

    /// Storage pool for the root disk
    pub fn root_disk_source(&self) -> &str {
        &self.root_disk_source
    }

    /// Space names
    pub fn spaces(&self) -> &[String] {
        &self.spaces
    }

    /// Provider tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Virtualisation type
    pub fn virt_type(&self) -> &str {
        &self.virt_type
    }

    /// Availability zones
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Whether to allocate a public IP
    pub fn allocate_public_ip(&self) -> Option<bool> {
        self.allocate_public_ip
    }

    /// Image to boot from
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// Read optional constraints stored under `key`, collapsing empty ones
    pub(crate) fn import_optional(fields: &Fields, key: &str) -> Result<Option<Self>> {
        Ok(fields
            .embedded::<Constraints>(key, "constraints")?
            .filter(|c| !c.is_empty()))
    }
}

fn constraints_v1() -> FieldSchema {
    FieldSchema::new()
        .omit("architecture", string())
        .omit("container", string())
        .omit("cores", force_uint())
        .omit("cpu-cores", force_uint())
        .omit("cpu-power", force_uint())
        .omit("instance-type", string())
        .omit("memory", force_uint())
        .omit("root-disk", force_uint())
        .omit("spaces", list(string()))
        .omit("tags", list(string()))
        .omit("virt-type", string())
}

fn constraints_v2() -> FieldSchema {
    constraints_v1()
        .omit("root-disk-source", string())
        .omit("zones", list(string()))
}

fn constraints_v3() -> FieldSchema {
    constraints_v2()
        .omit("allocate-public-ip", bool())
        .omit("image-id", string())
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "constraints",
        &[(1, constraints_v1), (2, constraints_v2), (3, constraints_v3)],
    )
});

impl VersionedEntity for Constraints {
    const KIND: &'static str = "constraints";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let cores = match (fields.opt_uint("cores")?, fields.opt_uint("cpu-cores")?) {
            (Some(_), Some(_)) => {
                return Err(Error::conflict(
                    "can not specify both cores and cores constraints",
                ))
            }
            (cores, cpu_cores) => cores.or(cpu_cores),
        };
        let mut c = Constraints {
            architecture: fields.opt_string("architecture")?.unwrap_or_default(),
            container: fields.opt_string("container")?.unwrap_or_default(),
            cores,
            cpu_power: fields.opt_uint("cpu-power")?,
            instance_type: fields.opt_string("instance-type")?.unwrap_or_default(),
            memory: fields.opt_uint("memory")?,
            root_disk: fields.opt_uint("root-disk")?,
            spaces: fields.strings("spaces")?,
            tags: fields.strings("tags")?,
            virt_type: fields.opt_string("virt-type")?.unwrap_or_default(),
            ..Constraints::default()
        };
        if version >= 2 {
            c.root_disk_source = fields.opt_string("root-disk-source")?.unwrap_or_default();
            c.zones = fields.strings("zones")?;
        }
        if version >= 3 {
            c.allocate_public_ip = fields.opt_bool("allocate-public-ip")?;
            c.image_id = fields.opt_string("image-id")?.unwrap_or_default();
        }
        Ok(c)
    }
}

impl ToWire for Constraints {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .nonempty("architecture", &self.architecture)
            .nonempty("container", &self.container)
            .opt("cores", self.cores)
            .opt("cpu-power", self.cpu_power)
            .nonempty("instance-type", &self.instance_type)
            .opt("memory", self.memory)
            .opt("root-disk", self.root_disk)
            .nonempty("root-disk-source", &self.root_disk_source)
            .nonempty_strings("spaces", &self.spaces)
            .nonempty_strings("tags", &self.tags)
            .nonempty("virt-type", &self.virt_type)
            .nonempty_strings("zones", &self.zones)
            .opt("allocate-public-ip", self.allocate_public_ip)
            .nonempty("image-id", &self.image_id)
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
    use modeldoc_schema::{embedded_envelope, import_embedded};
    use proptest::prelude::*;

    fn envelope(version: i64, pairs: &[(&str, Value)]) -> Value {
        let payload: Map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let mut env = Map::new();
        env.insert("version".into(), Value::Int(version));
        env.insert("constraints".into(), Value::Map(payload));
        Value::Map(env)
    }

    #[test]
    fn test_empty_args_mean_no_constraints() {
        assert_eq!(Constraints::new(ConstraintsArgs::default()), None);
    }

    #[test]
    fn test_zero_memory_is_a_constraint() {
        let c = Constraints::new(ConstraintsArgs {
            memory: Some(0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.memory(), Some(0));
        let back = import_embedded::<Constraints>(&embedded_envelope("constraints", &c), "constraints")
            .unwrap();
        assert_eq!(back.memory(), Some(0));
        assert_eq!(back.cores(), None);
    }

    #[test]
    fn test_cores_and_cpu_cores_conflict() {
        let env = envelope(1, &[("cores", Value::Int(4)), ("cpu-cores", Value::Int(4))]);
        let err = import_embedded::<Constraints>(&env, "constraints").unwrap_err();
        assert_eq!(
            err.to_string(),
            "can not specify both cores and cores constraints"
        );
        assert!(err.is_conflict());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_cpu_cores_alias() {
        let env = envelope(1, &[("cpu-cores", Value::Int(8))]);
        let c = import_embedded::<Constraints>(&env, "constraints").unwrap();
        assert_eq!(c.cores(), Some(8));
        let wire = c.to_wire();
        assert_eq!(wire.get("cores"), Some(&Value::Uint(8)));
        assert_eq!(wire.get("cpu-cores"), None);
    }

    #[test]
    fn test_v1_ignores_later_fields() {
        let env = envelope(
            1,
            &[
                ("zones", Value::List(vec![Value::from("az1")])),
                ("image-id", Value::from("img")),
                ("arch", Value::from("amd64")),
            ],
        );
        let c = import_embedded::<Constraints>(&env, "constraints").unwrap();
        assert!(c.zones().is_empty());
        assert_eq!(c.image_id(), "");
        assert!(c.is_empty());
    }

    #[test]
    fn test_empty_import_collapses() {
        let mut m = Map::new();
        m.insert("constraints".into(), envelope(3, &[]));
        let c = Constraints::import_optional(&Fields::new(m), "constraints").unwrap();
        assert_eq!(c, None);
    }

    #[test]
    fn test_negative_memory_rejected() {
        let env = envelope(2, &[("memory", Value::Int(-1))]);
        let err = import_embedded::<Constraints>(&env, "constraints").unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("memory: expected uint, got int(-1)"));
    }

    proptest! {
        #[test]
        fn prop_constraints_round_trip(
            memory in proptest::option::of(0u64..1 << 40),
            cores in proptest::option::of(0u64..512),
            arch in proptest::sample::select(vec!["", "amd64", "arm64"]),
            public in proptest::option::of(proptest::bool::ANY),
        ) {
            let args = ConstraintsArgs {
                architecture: arch.to_string(),
                memory,
                cores,
                allocate_public_ip: public,
                ..Default::default()
            };
            match Constraints::new(args.clone()) {
                None => prop_assert_eq!(args, ConstraintsArgs::default()),
                Some(c) => {
                    let wire = embedded_envelope("constraints", &c);
                    let back = import_embedded::<Constraints>(&wire, "constraints").unwrap();
                    prop_assert_eq!(back, c);
                }
            }
        }
    }
}
