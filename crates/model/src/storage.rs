//! Storage instances and storage pools
//!
//! Before version 3 a storage instance named its owner and attached units by
//! tag (`unit-data-0`). Version 3 stores bare unit names under `unit-owner`
//! and `attachments`; older tags are converted on import.

use modeldoc_core::{Error, Map, Result, ResultExt, Tag, Value};
use modeldoc_schema::checker::{any, fields, force_uint, list, string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use tracing::trace;

/// Requested size and pool of a storage instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageInstanceConstraints {
    /// Storage pool
    pub pool: String,
    /// Size in MiB
    pub size: u64,
    /// Instance count
    pub count: u64,
}

/// Arguments for [`Storage`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageArgs {
    /// Storage id (`data/0`)
    pub id: String,
    /// `block` or `filesystem`
    pub kind: String,
    /// Owning unit name, if any
    pub unit_owner: String,
    /// Storage name from the charm
    pub name: String,
    /// Attached unit names
    pub attachments: Vec<String>,
    /// Requested constraints
    pub constraints: Option<StorageInstanceConstraints>,
}

/// A storage instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Storage {
    args: StorageArgs,
}

impl Storage {
    /// Create a storage instance
    pub fn new(args: StorageArgs) -> Self {
        Storage { args }
    }

    /// Storage id
    pub fn id(&self) -> &str {
        &self.args.id
    }

    /// Storage kind
    pub fn kind(&self) -> &str {
        &self.args.kind
    }

    /// Owning unit name, if any
    pub fn unit_owner(&self) -> Option<&str> {
        if self.args.unit_owner.is_empty() {
            None
        } else {
            Some(&self.args.unit_owner)
        }
    }

    /// Storage name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Attached unit names
    pub fn attachments(&self) -> &[String] {
        &self.args.attachments
    }

    /// Requested constraints
    pub fn constraints(&self) -> Option<&StorageInstanceConstraints> {
        self.args.constraints.as_ref()
    }
}

fn constraints_schema() -> FieldSchema {
    FieldSchema::new()
        .required("pool", string())
        .required("size", force_uint())
        .required("count", force_uint())
}

fn storage_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("kind", string())
        .omit("owner", string())
        .required("name", string())
        .omit("attachments", list(string()))
}

fn storage_v2() -> FieldSchema {
    storage_v1().omit("constraints", fields(constraints_schema()))
}

fn storage_v3() -> FieldSchema {
    storage_v2().remove("owner").omit("unit-owner", string())
}

static STORAGE_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "storage",
        &[(1, storage_v1), (2, storage_v2), (3, storage_v3)],
    )
});

fn unit_from_tag(tag: &str) -> Result<String> {
    match Tag::parse(tag)? {
        Tag::Unit(name) => Ok(name),
        other => Err(Error::not_valid(format!("unit tag {:?}", other.to_string()))),
    }
}

impl VersionedEntity for Storage {
    const KIND: &'static str = "storage";

    fn registry() -> &'static SchemaRegistry {
        &STORAGE_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = StorageArgs {
            id: fields.string("id")?,
            kind: fields.string("kind")?,
            name: fields.string("name")?,
            ..Default::default()
        };
        if version >= 3 {
            args.unit_owner = fields.opt_string("unit-owner")?.unwrap_or_default();
            args.attachments = fields.strings("attachments")?;
        } else {
            if let Some(owner) = fields.opt_string("owner")? {
                args.unit_owner = unit_from_tag(&owner).annotate("owner")?;
            }
            args.attachments = fields
                .strings("attachments")?
                .iter()
                .map(|t| unit_from_tag(t))
                .collect::<Result<_>>()
                .annotate("attachments")?;
            trace!(storage = %args.id, "converted storage unit tags to names");
        }
        if version >= 2 {
            args.constraints = fields
                .sub("constraints")?
                .map(|c| -> Result<_> {
                    Ok(StorageInstanceConstraints {
                        pool: c.string("pool")?,
                        size: c.uint("size")?,
                        count: c.uint("count")?,
                    })
                })
                .transpose()?;
        }
        Ok(Storage::new(args))
    }
}

impl ToWire for Storage {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let constraints = a.constraints.as_ref().map(|c| {
            MapBuilder::new()
                .field("pool", c.pool.as_str())
                .field("size", c.size)
                .field("count", c.count)
                .into_value()
        });
        MapBuilder::new()
            .field("id", a.id.as_str())
            .field("kind", a.kind.as_str())
            .nonempty("unit-owner", &a.unit_owner)
            .field("name", a.name.as_str())
            .nonempty_strings("attachments", &a.attachments)
            .opt("constraints", constraints)
            .into_value()
    }
}

/// Arguments for [`StoragePool`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoragePoolArgs {
    /// Pool name
    pub name: String,
    /// Storage provider type
    pub provider: String,
    /// Provider attributes
    pub attributes: Map,
}

/// A named storage pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoragePool {
    args: StoragePoolArgs,
}

impl StoragePool {
    /// Create a storage pool
    pub fn new(args: StoragePoolArgs) -> Self {
        StoragePool { args }
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Storage provider type
    pub fn provider(&self) -> &str {
        &self.args.provider
    }

    /// Provider attributes
    pub fn attributes(&self) -> &Map {
        &self.args.attributes
    }
}

fn pool_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .required("provider", string())
        .omit("attributes", string_map(any()))
}

static POOL_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("storage pool", &[(1, pool_v1)]));

impl VersionedEntity for StoragePool {
    const KIND: &'static str = "storage pool";

    fn registry() -> &'static SchemaRegistry {
        &POOL_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(StoragePool::new(StoragePoolArgs {
            name: fields.string("name")?,
            provider: fields.string("provider")?,
            attributes: fields.map("attributes")?,
        }))
    }
}

impl ToWire for StoragePool {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("name", self.args.name.as_str())
            .field("provider", self.args.provider.as_str())
            .nonempty_values("attributes", &self.args.attributes)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&STORAGE_REGISTRY, &POOL_REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldoc_schema::{collection_envelope, import_collection};

    fn storage() -> Storage {
        Storage::new(StorageArgs {
            id: "data/0".into(),
            kind: "filesystem".into(),
            unit_owner: "postgresql/0".into(),
            name: "data".into(),
            attachments: vec!["postgresql/0".into()],
            constraints: Some(StorageInstanceConstraints {
                pool: "rootfs".into(),
                size: 1024,
                count: 1,
            }),
        })
    }

    fn legacy(version: i64, owner: &str) -> Value {
        let mut item = Map::new();
        item.insert("id".into(), Value::from("data/0"));
        item.insert("kind".into(), Value::from("filesystem"));
        item.insert("owner".into(), Value::from(owner));
        item.insert("name".into(), Value::from("data"));
        item.insert(
            "attachments".into(),
            Value::List(vec![Value::from("unit-postgresql-0")]),
        );
        let mut env = Map::new();
        env.insert("version".into(), Value::Int(version));
        env.insert("storages".into(), Value::List(vec![Value::Map(item)]));
        Value::Map(env)
    }

    #[test]
    fn test_storage_round_trip() {
        let storages = vec![storage()];
        let back =
            import_collection::<Storage>(&collection_envelope("storages", &storages), "storages")
                .unwrap();
        assert_eq!(back, storages);
    }

    #[test]
    fn test_legacy_owner_tag_is_stripped() {
        let back = import_collection::<Storage>(&legacy(1, "unit-postgresql-0"), "storages").unwrap();
        assert_eq!(back[0].unit_owner(), Some("postgresql/0"));
        assert_eq!(back[0].attachments(), &["postgresql/0".to_string()]);
        assert!(back[0].constraints().is_none());
    }

    #[test]
    fn test_legacy_owner_must_be_a_unit() {
        let err =
            import_collection::<Storage>(&legacy(2, "application-postgresql"), "storages").unwrap_err();
        assert_eq!(
            err.to_string(),
            "storages: storage 0: owner: unit tag \"application-postgresql\" not valid"
        );
    }

    #[test]
    fn test_pool_round_trip() {
        let mut attributes = Map::new();
        attributes.insert("volume-type".into(), Value::from("gp2"));
        let pools = vec![StoragePool::new(StoragePoolArgs {
            name: "fast".into(),
            provider: "ebs".into(),
            attributes,
        })];
        let back = import_collection::<StoragePool>(
            &collection_envelope("storage-pools", &pools),
            "storage-pools",
        )
        .unwrap();
        assert_eq!(back, pools);
    }
}
