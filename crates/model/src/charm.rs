//! Charm documents embedded in applications
//!
//! Four self-versioned documents describe the charm an application runs:
//! origin (where it came from), metadata (what it declares), manifest (which
//! bases it supports) and config (its option schema). Metadata nests relation,
//! storage, container and resource declarations as field maps keyed by name.

use modeldoc_core::{Map, Result, Value};
use modeldoc_schema::checker::{any, bool, fields, force_uint, int, list, string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

// =============================================================================
// Origin
// =============================================================================

/// Arguments for [`CharmOrigin`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmOriginArgs {
    /// Store or local source
    pub source: String,
    /// Store id
    pub id: String,
    /// Archive hash
    pub hash: String,
    /// Charm revision
    pub revision: i64,
    /// Tracked channel
    pub channel: String,
    /// Platform string (`amd64/ubuntu/22.04`)
    pub platform: String,
}

/// Where an application's charm came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmOrigin {
    source: String,
    id: String,
    hash: String,
    revision: i64,
    channel: String,
    platform: String,
}

impl CharmOrigin {
    /// Create a charm origin
    pub fn new(args: CharmOriginArgs) -> Self {
        CharmOrigin {
            source: args.source,
            id: args.id,
            hash: args.hash,
            revision: args.revision,
            channel: args.channel,
            platform: args.platform,
        }
    }

    /// Store or local source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Store id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Archive hash
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Charm revision
    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Tracked channel
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Platform string
    pub fn platform(&self) -> &str {
        &self.platform
    }
}

fn origin_v1() -> FieldSchema {
    FieldSchema::new()
        .required("source", string())
        .optional("id", string(), "")
        .optional("hash", string(), "")
        .optional("revision", int(), 0)
        .optional("channel", string(), "")
        .optional("platform", string(), "")
}

static ORIGIN_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("charm origin", &[(1, origin_v1)]));

impl VersionedEntity for CharmOrigin {
    const KIND: &'static str = "charm origin";

    fn registry() -> &'static SchemaRegistry {
        &ORIGIN_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(CharmOrigin {
            source: fields.string("source")?,
            id: fields.string("id")?,
            hash: fields.string("hash")?,
            revision: fields.int("revision")?,
            channel: fields.string("channel")?,
            platform: fields.string("platform")?,
        })
    }
}

impl ToWire for CharmOrigin {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("source", self.source.as_str())
            .nonempty("id", &self.id)
            .nonempty("hash", &self.hash)
            .field("revision", self.revision)
            .nonempty("channel", &self.channel)
            .nonempty("platform", &self.platform)
            .into_value()
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// A relation a charm provides, requires or peers on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmRelation {
    /// Relation name
    pub name: String,
    /// `provider`, `requirer` or `peer`
    pub role: String,
    /// Interface name
    pub interface: String,
    /// Whether the relation is optional
    pub optional: bool,
    /// Maximum number of relations
    pub limit: i64,
    /// `global` or `container`
    pub scope: String,
}

/// A storage declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmStorage {
    /// Storage name
    pub name: String,
    /// Description
    pub description: String,
    /// `filesystem` or `block`
    pub type_: String,
    /// Shared between units
    pub shared: bool,
    /// Mounted read-only
    pub read_only: bool,
    /// Minimum instance count
    pub count_min: i64,
    /// Maximum instance count (-1 for unbounded)
    pub count_max: i64,
    /// Minimum size in MiB
    pub minimum_size: u64,
    /// Mount location
    pub location: String,
    /// Extra properties
    pub properties: Vec<String>,
}

/// A storage mount inside a workload container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmMount {
    /// Storage name
    pub storage: String,
    /// Mount location
    pub location: String,
}

/// A workload container declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmContainer {
    /// Image resource name
    pub resource: String,
    /// Storage mounts
    pub mounts: Vec<CharmMount>,
}

/// A resource declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmResource {
    /// Resource name
    pub name: String,
    /// `file` or `oci-image`
    pub type_: String,
    /// Path inside the unit
    pub path: String,
    /// Description
    pub description: String,
}

/// Arguments for [`CharmMetadata`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmMetadataArgs {
    /// Charm name
    pub name: String,
    /// One-line summary
    pub summary: String,
    /// Long description
    pub description: String,
    /// Whether the charm is a subordinate
    pub subordinate: bool,
    /// Minimum agent version
    pub min_juju_version: String,
    /// User the charm runs as
    pub run_as: String,
    /// Serialized `assumes` expression
    pub assumes: String,
    /// Serialized LXD profile
    pub lxd_profile: String,
    /// Categories
    pub categories: Vec<String>,
    /// Tags
    pub tags: Vec<String>,
    /// Terms the user must accept
    pub terms: Vec<String>,
    /// Provided relations
    pub provides: BTreeMap<String, CharmRelation>,
    /// Required relations
    pub requires: BTreeMap<String, CharmRelation>,
    /// Peer relations
    pub peers: BTreeMap<String, CharmRelation>,
    /// Extra endpoint bindings
    pub extra_bindings: BTreeMap<String, String>,
    /// Storage declarations
    pub storage: BTreeMap<String, CharmStorage>,
    /// Workload containers
    pub containers: BTreeMap<String, CharmContainer>,
    /// Resources
    pub resources: BTreeMap<String, CharmResource>,
}

/// What a charm declares about itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmMetadata {
    args: CharmMetadataArgs,
}

impl CharmMetadata {
    /// Create charm metadata
    pub fn new(args: CharmMetadataArgs) -> Self {
        CharmMetadata { args }
    }

    /// Charm name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// One-line summary
    pub fn summary(&self) -> &str {
        &self.args.summary
    }

    /// Long description
    pub fn description(&self) -> &str {
        &self.args.description
    }

    /// Whether the charm is a subordinate
    pub fn subordinate(&self) -> bool {
        self.args.subordinate
    }

    /// Minimum agent version
    pub fn min_juju_version(&self) -> &str {
        &self.args.min_juju_version
    }

    /// User the charm runs as
    pub fn run_as(&self) -> &str {
        &self.args.run_as
    }

    /// Serialized `assumes` expression
    pub fn assumes(&self) -> &str {
        &self.args.assumes
    }

    /// Serialized LXD profile
    pub fn lxd_profile(&self) -> &str {
        &self.args.lxd_profile
    }

    /// Categories
    pub fn categories(&self) -> &[String] {
        &self.args.categories
    }

    /// Tags
    pub fn tags(&self) -> &[String] {
        &self.args.tags
    }

    /// Terms
    pub fn terms(&self) -> &[String] {
        &self.args.terms
    }

    /// Provided relations
    pub fn provides(&self) -> &BTreeMap<String, CharmRelation> {
        &self.args.provides
    }

    /// Required relations
    pub fn requires(&self) -> &BTreeMap<String, CharmRelation> {
        &self.args.requires
    }

    /// Peer relations
    pub fn peers(&self) -> &BTreeMap<String, CharmRelation> {
        &self.args.peers
    }

    /// Extra endpoint bindings
    pub fn extra_bindings(&self) -> &BTreeMap<String, String> {
        &self.args.extra_bindings
    }

    /// Storage declarations
    pub fn storage(&self) -> &BTreeMap<String, CharmStorage> {
        &self.args.storage
    }

    /// Workload containers
    pub fn containers(&self) -> &BTreeMap<String, CharmContainer> {
        &self.args.containers
    }

    /// Resources
    pub fn resources(&self) -> &BTreeMap<String, CharmResource> {
        &self.args.resources
    }
}

fn relation_schema() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .required("role", string())
        .required("interface", string())
        .optional("optional", bool(), false)
        .optional("limit", int(), 0)
        .optional("scope", string(), "")
}

fn storage_schema() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .optional("description", string(), "")
        .required("type", string())
        .optional("shared", bool(), false)
        .optional("read-only", bool(), false)
        .optional("count-min", int(), 0)
        .optional("count-max", int(), 0)
        .optional("minimum-size", force_uint(), 0)
        .optional("location", string(), "")
        .omit("properties", list(string()))
}

fn mount_schema() -> FieldSchema {
    FieldSchema::new()
        .optional("storage", string(), "")
        .optional("location", string(), "")
}

fn container_schema() -> FieldSchema {
    FieldSchema::new()
        .optional("resource", string(), "")
        .omit("mounts", list(fields(mount_schema())))
}

fn resource_schema() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .required("type", string())
        .optional("path", string(), "")
        .optional("description", string(), "")
}

fn metadata_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .optional("summary", string(), "")
        .optional("description", string(), "")
        .optional("subordinate", bool(), false)
        .optional("min-juju-version", string(), "")
        .optional("run-as", string(), "")
        .optional("assumes", string(), "")
        .omit("categories", list(string()))
        .omit("tags", list(string()))
        .omit("terms", list(string()))
        .omit("provides", string_map(fields(relation_schema())))
        .omit("requires", string_map(fields(relation_schema())))
        .omit("peers", string_map(fields(relation_schema())))
        .omit("extra-bindings", string_map(string()))
        .omit("storage", string_map(fields(storage_schema())))
        .omit("containers", string_map(fields(container_schema())))
        .omit("resources", string_map(fields(resource_schema())))
}

fn metadata_v2() -> FieldSchema {
    metadata_v1().optional("lxd-profile", string(), "")
}

static METADATA_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("charm metadata", &[(1, metadata_v1), (2, metadata_v2)]));

fn import_relations(fields: &Fields, key: &str) -> Result<BTreeMap<String, CharmRelation>> {
    fields
        .field_map(key)?
        .into_iter()
        .map(|(name, f)| {
            Ok((
                name,
                CharmRelation {
                    name: f.string("name")?,
                    role: f.string("role")?,
                    interface: f.string("interface")?,
                    optional: f.bool("optional")?,
                    limit: f.int("limit")?,
                    scope: f.string("scope")?,
                },
            ))
        })
        .collect()
}

fn relations_to_wire(relations: &BTreeMap<String, CharmRelation>) -> Map {
    relations
        .iter()
        .map(|(name, r)| {
            let v = MapBuilder::new()
                .field("name", r.name.as_str())
                .field("role", r.role.as_str())
                .field("interface", r.interface.as_str())
                .field("optional", r.optional)
                .field("limit", r.limit)
                .nonempty("scope", &r.scope)
                .into_value();
            (name.clone(), v)
        })
        .collect()
}

impl VersionedEntity for CharmMetadata {
    const KIND: &'static str = "charm metadata";

    fn registry() -> &'static SchemaRegistry {
        &METADATA_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let storage = fields
            .field_map("storage")?
            .into_iter()
            .map(|(name, f)| {
                Ok((
                    name,
                    CharmStorage {
                        name: f.string("name")?,
                        description: f.string("description")?,
                        type_: f.string("type")?,
                        shared: f.bool("shared")?,
                        read_only: f.bool("read-only")?,
                        count_min: f.int("count-min")?,
                        count_max: f.int("count-max")?,
                        minimum_size: f.uint("minimum-size")?,
                        location: f.string("location")?,
                        properties: f.strings("properties")?,
                    },
                ))
            })
            .collect::<Result<_>>()?;
        let containers = fields
            .field_map("containers")?
            .into_iter()
            .map(|(name, f)| {
                let mounts = f
                    .items("mounts")?
                    .into_iter()
                    .map(|m| {
                        Ok(CharmMount {
                            storage: m.string("storage")?,
                            location: m.string("location")?,
                        })
                    })
                    .collect::<Result<_>>()?;
                Ok((
                    name,
                    CharmContainer {
                        resource: f.string("resource")?,
                        mounts,
                    },
                ))
            })
            .collect::<Result<_>>()?;
        let resources = fields
            .field_map("resources")?
            .into_iter()
            .map(|(name, f)| {
                Ok((
                    name,
                    CharmResource {
                        name: f.string("name")?,
                        type_: f.string("type")?,
                        path: f.string("path")?,
                        description: f.string("description")?,
                    },
                ))
            })
            .collect::<Result<_>>()?;
        Ok(CharmMetadata::new(CharmMetadataArgs {
            name: fields.string("name")?,
            summary: fields.string("summary")?,
            description: fields.string("description")?,
            subordinate: fields.bool("subordinate")?,
            min_juju_version: fields.string("min-juju-version")?,
            run_as: fields.string("run-as")?,
            assumes: fields.string("assumes")?,
            lxd_profile: if version >= 2 {
                fields.string("lxd-profile")?
            } else {
                String::new()
            },
            categories: fields.strings("categories")?,
            tags: fields.strings("tags")?,
            terms: fields.strings("terms")?,
            provides: import_relations(&fields, "provides")?,
            requires: import_relations(&fields, "requires")?,
            peers: import_relations(&fields, "peers")?,
            extra_bindings: fields.string_map("extra-bindings")?,
            storage,
            containers,
            resources,
        }))
    }
}

impl ToWire for CharmMetadata {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let storage: Map = a
            .storage
            .iter()
            .map(|(name, s)| {
                let v = MapBuilder::new()
                    .field("name", s.name.as_str())
                    .nonempty("description", &s.description)
                    .field("type", s.type_.as_str())
                    .field("shared", s.shared)
                    .field("read-only", s.read_only)
                    .field("count-min", s.count_min)
                    .field("count-max", s.count_max)
                    .field("minimum-size", s.minimum_size)
                    .nonempty("location", &s.location)
                    .nonempty_strings("properties", &s.properties)
                    .into_value();
                (name.clone(), v)
            })
            .collect();
        let containers: Map = a
            .containers
            .iter()
            .map(|(name, c)| {
                let mounts: Vec<Value> = c
                    .mounts
                    .iter()
                    .map(|m| {
                        MapBuilder::new()
                            .nonempty("storage", &m.storage)
                            .nonempty("location", &m.location)
                            .into_value()
                    })
                    .collect();
                let mut b = MapBuilder::new().nonempty("resource", &c.resource);
                if !mounts.is_empty() {
                    b = b.field("mounts", mounts);
                }
                (name.clone(), b.into_value())
            })
            .collect();
        let resources: Map = a
            .resources
            .iter()
            .map(|(name, r)| {
                let v = MapBuilder::new()
                    .field("name", r.name.as_str())
                    .field("type", r.type_.as_str())
                    .nonempty("path", &r.path)
                    .nonempty("description", &r.description)
                    .into_value();
                (name.clone(), v)
            })
            .collect();
        MapBuilder::new()
            .field("name", a.name.as_str())
            .nonempty("summary", &a.summary)
            .nonempty("description", &a.description)
            .field("subordinate", a.subordinate)
            .nonempty("min-juju-version", &a.min_juju_version)
            .nonempty("run-as", &a.run_as)
            .nonempty("assumes", &a.assumes)
            .nonempty("lxd-profile", &a.lxd_profile)
            .nonempty_strings("categories", &a.categories)
            .nonempty_strings("tags", &a.tags)
            .nonempty_strings("terms", &a.terms)
            .nonempty_values("provides", &relations_to_wire(&a.provides))
            .nonempty_values("requires", &relations_to_wire(&a.requires))
            .nonempty_values("peers", &relations_to_wire(&a.peers))
            .nonempty_map("extra-bindings", &a.extra_bindings)
            .nonempty_values("storage", &storage)
            .nonempty_values("containers", &containers)
            .nonempty_values("resources", &resources)
            .into_value()
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// A base a charm supports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmBase {
    /// OS name
    pub name: String,
    /// OS channel
    pub channel: String,
    /// Supported architectures
    pub architectures: Vec<String>,
}

/// The bases a charm supports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmManifest {
    bases: Vec<CharmBase>,
}

impl CharmManifest {
    /// Create a charm manifest
    pub fn new(bases: Vec<CharmBase>) -> Self {
        CharmManifest { bases }
    }

    /// Supported bases
    pub fn bases(&self) -> &[CharmBase] {
        &self.bases
    }
}

fn base_schema() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .required("channel", string())
        .omit("architectures", list(string()))
}

fn manifest_v1() -> FieldSchema {
    FieldSchema::new().required("bases", list(fields(base_schema())))
}

static MANIFEST_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("charm manifest", &[(1, manifest_v1)]));

impl VersionedEntity for CharmManifest {
    const KIND: &'static str = "charm manifest";

    fn registry() -> &'static SchemaRegistry {
        &MANIFEST_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        let bases = fields
            .items("bases")?
            .into_iter()
            .map(|b| {
                Ok(CharmBase {
                    name: b.string("name")?,
                    channel: b.string("channel")?,
                    architectures: b.strings("architectures")?,
                })
            })
            .collect::<Result<_>>()?;
        Ok(CharmManifest { bases })
    }
}

impl ToWire for CharmManifest {
    fn to_wire(&self) -> Value {
        let bases: Vec<Value> = self
            .bases
            .iter()
            .map(|b| {
                MapBuilder::new()
                    .field("name", b.name.as_str())
                    .field("channel", b.channel.as_str())
                    .nonempty_strings("architectures", &b.architectures)
                    .into_value()
            })
            .collect();
        MapBuilder::new().field("bases", bases).into_value()
    }
}

// =============================================================================
// Config
// =============================================================================

/// One charm config option
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharmOption {
    /// Option type (`string`, `int`, `boolean`, ...)
    pub type_: String,
    /// Default value
    pub default: Option<Value>,
    /// Description
    pub description: String,
}

/// A charm's config option schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharmConfig {
    options: BTreeMap<String, CharmOption>,
}

impl CharmConfig {
    /// Create a charm config
    pub fn new(options: BTreeMap<String, CharmOption>) -> Self {
        CharmConfig { options }
    }

    /// Config options by name
    pub fn options(&self) -> &BTreeMap<String, CharmOption> {
        &self.options
    }
}

fn option_schema() -> FieldSchema {
    FieldSchema::new()
        .required("type", string())
        .omit("default", any())
        .optional("description", string(), "")
}

fn config_v1() -> FieldSchema {
    FieldSchema::new().required("config", string_map(fields(option_schema())))
}

static CONFIG_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("charm config", &[(1, config_v1)]));

impl VersionedEntity for CharmConfig {
    const KIND: &'static str = "charm config";

    fn registry() -> &'static SchemaRegistry {
        &CONFIG_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        let options = fields
            .field_map("config")?
            .into_iter()
            .map(|(name, f)| {
                Ok((
                    name,
                    CharmOption {
                        type_: f.string("type")?,
                        default: f.get("default").cloned(),
                        description: f.string("description")?,
                    },
                ))
            })
            .collect::<Result<_>>()?;
        Ok(CharmConfig { options })
    }
}

impl ToWire for CharmConfig {
    fn to_wire(&self) -> Value {
        let config: Map = self
            .options
            .iter()
            .map(|(name, o)| {
                let v = MapBuilder::new()
                    .field("type", o.type_.as_str())
                    .opt("default", o.default.clone())
                    .nonempty("description", &o.description)
                    .into_value();
                (name.clone(), v)
            })
            .collect();
        MapBuilder::new().field("config", config).into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![
        &ORIGIN_REGISTRY,
        &METADATA_REGISTRY,
        &MANIFEST_REGISTRY,
        &CONFIG_REGISTRY,
    ]
}
