//! The model document root
//!
//! Unlike every other entity the model keeps its `version` beside its own
//! fields rather than in a wrapping envelope. Each collection below it is a
//! separate envelope with its own version, so a document can mix an old
//! machine schema with a new subnet schema.
//!
//! | Version | Change |
//! |---------|--------|
//! | 2 | model type, environ version, firewall rules and cross-model collections |
//! | 3 | operations and remote secrets |

use crate::application::{Application, ApplicationArgs};
use crate::cloud_credential::{CloudCredential, CloudCredentialArgs};
use crate::cloud_image_metadata::{CloudImageMetadata, CloudImageMetadataArgs};
use crate::constraints::{Constraints, ConstraintsArgs};
use crate::filesystem::{Filesystem, FilesystemArgs};
use crate::firewall_rule::{FirewallRule, FirewallRuleArgs};
use crate::ip_address::{IpAddress, IpAddressArgs};
use crate::link_layer_device::{LinkLayerDevice, LinkLayerDeviceArgs};
use crate::machine::{Machine, MachineArgs};
use crate::operation::{Action, ActionArgs, Operation, OperationArgs};
use crate::relation::{Relation, RelationArgs};
use crate::remote::{
    ExternalController, ExternalControllerArgs, OfferConnection, OfferConnectionArgs,
    RelationNetwork, RelationNetworkArgs, RemoteEntity, RemoteEntityArgs, RemoteSecret,
};
use crate::space::{Space, SpaceArgs};
use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use crate::storage::{Storage, StorageArgs, StoragePool, StoragePoolArgs};
use crate::subnet::{Subnet, SubnetArgs};
use crate::user::{SshHostKey, SshHostKeyArgs, User, UserArgs};
use crate::volume::{Volume, VolumeArgs};
use modeldoc_core::{Error, Map, Result, ResultExt, Value};
use modeldoc_schema::checker::{any, envelope, fields, int, string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Kind of workload substrate a model runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// Machines
    #[default]
    Iaas,
    /// Kubernetes
    Caas,
}

impl ModelType {
    /// Parse the wire form (`iaas`, `caas`)
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "iaas" => Ok(ModelType::Iaas),
            "caas" => Ok(ModelType::Caas),
            other => Err(Error::not_valid(format!("model type {other:?}"))),
        }
    }

    /// The wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Iaas => "iaas",
            ModelType::Caas => "caas",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Support level agreement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sla {
    /// Support level
    pub level: String,
    /// Owner of the agreement
    pub owner: String,
    /// Opaque credentials
    pub credentials: String,
}

/// Model meter status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeterStatus {
    /// Status code
    pub code: String,
    /// Status detail
    pub info: String,
}

/// Arguments for [`Model`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelArgs {
    /// Model type
    pub type_: ModelType,
    /// Owning user name
    pub owner: String,
    /// Model configuration; `uuid` and `name` live here
    pub config: Map,
    /// Newest agent version available
    pub latest_tools_version: String,
    /// Environ schema version of the provider
    pub environ_version: i64,
    /// Blocked operations and their messages
    pub blocks: BTreeMap<String, String>,
    /// Cloud name
    pub cloud: String,
    /// Cloud region
    pub cloud_region: String,
}

/// A model: the root of the document and every entity in it
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    type_: ModelType,
    owner: String,
    config: Map,
    latest_tools_version: String,
    environ_version: i64,
    blocks: BTreeMap<String, String>,
    cloud: String,
    cloud_region: String,
    annotations: BTreeMap<String, String>,
    constraints: Option<Constraints>,
    cloud_credential: Option<CloudCredential>,
    sla: Sla,
    meter_status: MeterStatus,
    sequences: BTreeMap<String, i64>,
    status: Option<StatusPoint>,
    status_history: StatusHistory,

    users: Vec<User>,
    machines: Vec<Machine>,
    applications: Vec<Application>,
    relations: Vec<Relation>,
    spaces: Vec<Space>,
    link_layer_devices: Vec<LinkLayerDevice>,
    ip_addresses: Vec<IpAddress>,
    subnets: Vec<Subnet>,
    cloud_image_metadata: Vec<CloudImageMetadata>,
    actions: Vec<Action>,
    operations: Vec<Operation>,
    ssh_host_keys: Vec<SshHostKey>,
    storages: Vec<Storage>,
    storage_pools: Vec<StoragePool>,
    volumes: Vec<Volume>,
    filesystems: Vec<Filesystem>,
    firewall_rules: Vec<FirewallRule>,
    remote_entities: Vec<RemoteEntity>,
    remote_secrets: Vec<RemoteSecret>,
    relation_networks: Vec<RelationNetwork>,
    offer_connections: Vec<OfferConnection>,
    external_controllers: Vec<ExternalController>,
}

fn push<T>(items: &mut Vec<T>, item: T) -> &mut T {
    items.push(item);
    let last = items.len() - 1;
    &mut items[last]
}

impl Model {
    /// Create an empty model
    pub fn new(args: ModelArgs) -> Self {
        Model {
            type_: args.type_,
            owner: args.owner,
            config: args.config,
            latest_tools_version: args.latest_tools_version,
            environ_version: args.environ_version,
            blocks: args.blocks,
            cloud: args.cloud,
            cloud_region: args.cloud_region,
            annotations: BTreeMap::new(),
            constraints: None,
            cloud_credential: None,
            sla: Sla::default(),
            meter_status: MeterStatus::default(),
            sequences: BTreeMap::new(),
            status: None,
            status_history: StatusHistory::default(),
            users: Vec::new(),
            machines: Vec::new(),
            applications: Vec::new(),
            relations: Vec::new(),
            spaces: Vec::new(),
            link_layer_devices: Vec::new(),
            ip_addresses: Vec::new(),
            subnets: Vec::new(),
            cloud_image_metadata: Vec::new(),
            actions: Vec::new(),
            operations: Vec::new(),
            ssh_host_keys: Vec::new(),
            storages: Vec::new(),
            storage_pools: Vec::new(),
            volumes: Vec::new(),
            filesystems: Vec::new(),
            firewall_rules: Vec::new(),
            remote_entities: Vec::new(),
            remote_secrets: Vec::new(),
            relation_networks: Vec::new(),
            offer_connections: Vec::new(),
            external_controllers: Vec::new(),
        }
    }

    /// Model type
    pub fn type_(&self) -> ModelType {
        self.type_
    }

    /// Owning user name
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Model configuration
    pub fn config(&self) -> &Map {
        &self.config
    }

    /// The model UUID from its configuration, when present as a string
    pub fn uuid(&self) -> Option<&str> {
        self.config.get("uuid").and_then(Value::as_str)
    }

    /// Newest agent version available, empty when unknown
    pub fn latest_tools_version(&self) -> &str {
        &self.latest_tools_version
    }

    /// Environ schema version
    pub fn environ_version(&self) -> i64 {
        self.environ_version
    }

    /// Blocked operations
    pub fn blocks(&self) -> &BTreeMap<String, String> {
        &self.blocks
    }

    /// Replace the blocked operations
    pub fn set_blocks(&mut self, blocks: BTreeMap<String, String>) {
        self.blocks = blocks;
    }

    /// Cloud name
    pub fn cloud(&self) -> &str {
        &self.cloud
    }

    /// Cloud region
    pub fn cloud_region(&self) -> &str {
        &self.cloud_region
    }

    /// Annotations
    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Replace the annotations
    pub fn set_annotations(&mut self, annotations: BTreeMap<String, String>) {
        self.annotations = annotations;
    }

    /// Model constraints
    pub fn constraints(&self) -> Option<&Constraints> {
        self.constraints.as_ref()
    }

    /// Set the model constraints; empty arguments clear them
    pub fn set_constraints(&mut self, args: ConstraintsArgs) {
        self.constraints = Constraints::new(args);
    }

    /// Cloud credential
    pub fn cloud_credential(&self) -> Option<&CloudCredential> {
        self.cloud_credential.as_ref()
    }

    /// Set the cloud credential
    pub fn set_cloud_credential(&mut self, args: CloudCredentialArgs) {
        self.cloud_credential = Some(CloudCredential::new(args));
    }

    /// Support level agreement
    pub fn sla(&self) -> &Sla {
        &self.sla
    }

    /// Set the support level agreement
    pub fn set_sla(&mut self, level: &str, owner: &str, credentials: &str) {
        self.sla = Sla {
            level: level.to_string(),
            owner: owner.to_string(),
            credentials: credentials.to_string(),
        };
    }

    /// Meter status
    pub fn meter_status(&self) -> &MeterStatus {
        &self.meter_status
    }

    /// Set the meter status
    pub fn set_meter_status(&mut self, code: &str, info: &str) {
        self.meter_status = MeterStatus {
            code: code.to_string(),
            info: info.to_string(),
        };
    }

    /// Named counters used to allocate ids
    pub fn sequences(&self) -> &BTreeMap<String, i64> {
        &self.sequences
    }

    /// Set one named counter
    pub fn set_sequence(&mut self, name: &str, value: i64) {
        self.sequences.insert(name.to_string(), value);
    }

    /// Model status
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the model status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Earlier model statuses
    pub fn status_history(&self) -> &[StatusPoint] {
        self.status_history.status_history()
    }

    /// Replace the earlier model statuses
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.status_history.set_status_history(args);
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Grant a user access
    pub fn add_user(&mut self, args: UserArgs) -> &User {
        push(&mut self.users, User::new(args))
    }

    /// Top-level machines; containers hang off their hosts
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Add a top-level machine and return it for further setup
    pub fn add_machine(&mut self, args: MachineArgs) -> &mut Machine {
        push(&mut self.machines, Machine::new(args))
    }

    /// Every machine including nested containers, depth first
    pub fn all_machines(&self) -> Vec<&Machine> {
        self.machines.iter().flat_map(Machine::all_machines).collect()
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Add an application and return it for further setup
    pub fn add_application(&mut self, args: ApplicationArgs) -> &mut Application {
        push(&mut self.applications, Application::new(args))
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Add a relation and return it so endpoints can be added
    pub fn add_relation(&mut self, args: RelationArgs) -> &mut Relation {
        push(&mut self.relations, Relation::new(args))
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Add a network space
    pub fn add_space(&mut self, args: SpaceArgs) -> &Space {
        push(&mut self.spaces, Space::new(args))
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    /// Add a subnet
    pub fn add_subnet(&mut self, args: SubnetArgs) -> &Subnet {
        push(&mut self.subnets, Subnet::new(args))
    }

    pub fn link_layer_devices(&self) -> &[LinkLayerDevice] {
        &self.link_layer_devices
    }

    /// Add a link-layer device
    pub fn add_link_layer_device(&mut self, args: LinkLayerDeviceArgs) -> &LinkLayerDevice {
        push(&mut self.link_layer_devices, LinkLayerDevice::new(args))
    }

    pub fn ip_addresses(&self) -> &[IpAddress] {
        &self.ip_addresses
    }

    /// Add an IP address
    pub fn add_ip_address(&mut self, args: IpAddressArgs) -> &IpAddress {
        push(&mut self.ip_addresses, IpAddress::new(args))
    }

    pub fn cloud_image_metadata(&self) -> &[CloudImageMetadata] {
        &self.cloud_image_metadata
    }

    /// Add a cloud image metadata record
    pub fn add_cloud_image_metadata(&mut self, args: CloudImageMetadataArgs) -> &CloudImageMetadata {
        push(&mut self.cloud_image_metadata, CloudImageMetadata::new(args))
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Add an action
    pub fn add_action(&mut self, args: ActionArgs) -> &Action {
        push(&mut self.actions, Action::new(args))
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Add an operation
    pub fn add_operation(&mut self, args: OperationArgs) -> &Operation {
        push(&mut self.operations, Operation::new(args))
    }

    pub fn ssh_host_keys(&self) -> &[SshHostKey] {
        &self.ssh_host_keys
    }

    /// Add a machine's SSH host keys
    pub fn add_ssh_host_key(&mut self, args: SshHostKeyArgs) -> &SshHostKey {
        push(&mut self.ssh_host_keys, SshHostKey::new(args))
    }

    pub fn storages(&self) -> &[Storage] {
        &self.storages
    }

    /// Add a storage instance
    pub fn add_storage(&mut self, args: StorageArgs) -> &Storage {
        push(&mut self.storages, Storage::new(args))
    }

    pub fn storage_pools(&self) -> &[StoragePool] {
        &self.storage_pools
    }

    /// Add a storage pool
    pub fn add_storage_pool(&mut self, args: StoragePoolArgs) -> &StoragePool {
        push(&mut self.storage_pools, StoragePool::new(args))
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Add a volume and return it so attachments can be added
    pub fn add_volume(&mut self, args: VolumeArgs) -> &mut Volume {
        push(&mut self.volumes, Volume::new(args))
    }

    pub fn filesystems(&self) -> &[Filesystem] {
        &self.filesystems
    }

    /// Add a filesystem and return it so attachments can be added
    pub fn add_filesystem(&mut self, args: FilesystemArgs) -> &mut Filesystem {
        push(&mut self.filesystems, Filesystem::new(args))
    }

    pub fn firewall_rules(&self) -> &[FirewallRule] {
        &self.firewall_rules
    }

    /// Add a firewall rule
    pub fn add_firewall_rule(&mut self, args: FirewallRuleArgs) -> &FirewallRule {
        push(&mut self.firewall_rules, FirewallRule::new(args))
    }

    pub fn remote_entities(&self) -> &[RemoteEntity] {
        &self.remote_entities
    }

    /// Add a remote entity token
    pub fn add_remote_entity(&mut self, args: RemoteEntityArgs) -> &RemoteEntity {
        push(&mut self.remote_entities, RemoteEntity::new(args))
    }

    pub fn remote_secrets(&self) -> &[RemoteSecret] {
        &self.remote_secrets
    }

    /// Add a consumed remote secret
    pub fn add_remote_secret(&mut self, secret: RemoteSecret) -> &RemoteSecret {
        push(&mut self.remote_secrets, secret)
    }

    pub fn relation_networks(&self) -> &[RelationNetwork] {
        &self.relation_networks
    }

    /// Add relation ingress networks
    pub fn add_relation_network(&mut self, args: RelationNetworkArgs) -> &RelationNetwork {
        push(&mut self.relation_networks, RelationNetwork::new(args))
    }

    pub fn offer_connections(&self) -> &[OfferConnection] {
        &self.offer_connections
    }

    /// Add an offer connection
    pub fn add_offer_connection(&mut self, args: OfferConnectionArgs) -> &OfferConnection {
        push(&mut self.offer_connections, OfferConnection::new(args))
    }

    pub fn external_controllers(&self) -> &[ExternalController] {
        &self.external_controllers
    }

    /// Add an external controller
    pub fn add_external_controller(&mut self, args: ExternalControllerArgs) -> &ExternalController {
        push(&mut self.external_controllers, ExternalController::new(args))
    }
}

fn sla_schema() -> FieldSchema {
    FieldSchema::new()
        .optional("level", string(), "")
        .optional("owner", string(), "")
        .optional("credentials", string(), "")
}

fn meter_status_schema() -> FieldSchema {
    FieldSchema::new()
        .optional("code", string(), "")
        .optional("info", string(), "")
}

fn model_v1() -> FieldSchema {
    FieldSchema::new()
        .required("owner", string())
        .required("config", string_map(any()))
        .omit("latest-tools", string())
        .omit("blocks", string_map(string()))
        .omit("annotations", string_map(string()))
        .omit("constraints", any())
        .required("cloud", string())
        .optional("cloud-region", string(), "")
        .omit("cloud-credential", any())
        .omit("sla", fields(sla_schema()))
        .omit("meter-status", fields(meter_status_schema()))
        .required("sequences", string_map(int()))
        .required("status", envelope())
        .required("status-history", envelope())
        .required("users", envelope())
        .required("machines", envelope())
        .required("applications", envelope())
        .required("relations", envelope())
        .required("spaces", envelope())
        .required("link-layer-devices", envelope())
        .required("ip-addresses", envelope())
        .required("subnets", envelope())
        .required("cloud-image-metadata", envelope())
        .required("actions", envelope())
        .required("ssh-host-keys", envelope())
        .required("storages", envelope())
        .required("storage-pools", envelope())
        .required("volumes", envelope())
        .required("filesystems", envelope())
}

fn model_v2() -> FieldSchema {
    model_v1()
        .required("type", string())
        .optional("environ-version", int(), 0)
        .required("firewall-rules", envelope())
        .required("remote-entities", envelope())
        .required("relation-networks", envelope())
        .required("offer-connections", envelope())
        .required("external-controllers", envelope())
}

fn model_v3() -> FieldSchema {
    model_v2()
        .required("operations", envelope())
        .required("remote-secrets", envelope())
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new("model", &[(1, model_v1), (2, model_v2), (3, model_v3)])
});

fn import_sequences(fields: &Fields) -> Result<BTreeMap<String, i64>> {
    fields
        .map("sequences")?
        .into_iter()
        .map(|(name, v)| match v.as_int() {
            Some(n) => Ok((name, n)),
            None => Err(Error::mismatch(
                &format!("sequences.{name}"),
                "int",
                v.describe(),
            )),
        })
        .collect()
}

impl VersionedEntity for Model {
    const KIND: &'static str = "model";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let type_ = if version >= 2 {
            ModelType::parse(&fields.string("type")?).annotate("type")?
        } else {
            ModelType::Iaas
        };
        let mut model = Model::new(ModelArgs {
            type_,
            owner: fields.string("owner")?,
            config: fields.map("config")?,
            latest_tools_version: fields.opt_string("latest-tools")?.unwrap_or_default(),
            environ_version: if version >= 2 {
                fields.int("environ-version")?
            } else {
                0
            },
            blocks: fields.string_map("blocks")?,
            cloud: fields.string("cloud")?,
            cloud_region: fields.string("cloud-region")?,
        });
        debug!(uuid = ?model.uuid(), version, "importing model");

        model.annotations = fields.string_map("annotations")?;
        model.constraints = Constraints::import_optional(&fields, "constraints")?;
        model.cloud_credential =
            fields.embedded::<CloudCredential>("cloud-credential", "credential")?;
        if let Some(sla) = fields.sub("sla")? {
            model.sla = Sla {
                level: sla.string("level")?,
                owner: sla.string("owner")?,
                credentials: sla.string("credentials")?,
            };
        }
        if let Some(meter) = fields.sub("meter-status")? {
            model.meter_status = MeterStatus {
                code: meter.string("code")?,
                info: meter.string("info")?,
            };
        }
        model.sequences = import_sequences(&fields)?;
        model.status = Some(fields.required_embedded::<StatusPoint>("status", "status")?);
        model.status_history = StatusHistory::import(&fields, "status-history")?;

        model.users = fields.collection("users")?;
        model.machines = fields.collection("machines")?;
        model.applications = fields.collection("applications")?;
        model.relations = fields.collection("relations")?;
        model.spaces = fields.collection("spaces")?;
        model.link_layer_devices = fields.collection("link-layer-devices")?;
        model.ip_addresses = fields.collection("ip-addresses")?;
        model.subnets = fields.collection("subnets")?;
        model.cloud_image_metadata = fields.collection("cloud-image-metadata")?;
        model.actions = fields.collection("actions")?;
        model.ssh_host_keys = fields.collection("ssh-host-keys")?;
        model.storages = fields.collection("storages")?;
        model.storage_pools = fields.collection("storage-pools")?;
        model.volumes = fields.collection("volumes")?;
        model.filesystems = fields.collection("filesystems")?;
        if version >= 2 {
            model.firewall_rules = fields.collection("firewall-rules")?;
            model.remote_entities = fields.collection("remote-entities")?;
            model.relation_networks = fields.collection("relation-networks")?;
            model.offer_connections = fields.collection("offer-connections")?;
            model.external_controllers = fields.collection("external-controllers")?;
        }
        if version >= 3 {
            model.operations = fields.collection("operations")?;
            model.remote_secrets = fields.collection("remote-secrets")?;
        }
        Ok(model)
    }
}

impl ToWire for Model {
    fn to_wire(&self) -> Value {
        let sequences: Map = self
            .sequences
            .iter()
            .map(|(k, v)| (k.clone(), Value::Int(*v)))
            .collect();
        let sla = MapBuilder::new()
            .field("level", self.sla.level.as_str())
            .field("owner", self.sla.owner.as_str())
            .field("credentials", self.sla.credentials.as_str())
            .into_value();
        let meter_status = MapBuilder::new()
            .field("code", self.meter_status.code.as_str())
            .field("info", self.meter_status.info.as_str())
            .into_value();
        MapBuilder::new()
            .field("version", i64::from(REGISTRY.current_version()))
            .field("type", self.type_.as_str())
            .field("owner", self.owner.as_str())
            .field("config", self.config.clone())
            .nonempty("latest-tools", &self.latest_tools_version)
            .field("environ-version", self.environ_version)
            .nonempty_map("blocks", &self.blocks)
            .nonempty_map("annotations", &self.annotations)
            .opt_embedded("constraints", "constraints", self.constraints.as_ref())
            .field("cloud", self.cloud.as_str())
            .nonempty("cloud-region", &self.cloud_region)
            .opt_embedded("cloud-credential", "credential", self.cloud_credential.as_ref())
            .field("sla", sla)
            .field("meter-status", meter_status)
            .field("sequences", sequences)
            .opt_embedded("status", "status", self.status.as_ref())
            .field("status-history", self.status_history.to_wire())
            .collection("users", &self.users)
            .collection("machines", &self.machines)
            .collection("applications", &self.applications)
            .collection("relations", &self.relations)
            .collection("spaces", &self.spaces)
            .collection("link-layer-devices", &self.link_layer_devices)
            .collection("ip-addresses", &self.ip_addresses)
            .collection("subnets", &self.subnets)
            .collection("cloud-image-metadata", &self.cloud_image_metadata)
            .collection("actions", &self.actions)
            .collection("operations", &self.operations)
            .collection("ssh-host-keys", &self.ssh_host_keys)
            .collection("storages", &self.storages)
            .collection("storage-pools", &self.storage_pools)
            .collection("volumes", &self.volumes)
            .collection("filesystems", &self.filesystems)
            .collection("firewall-rules", &self.firewall_rules)
            .collection("remote-entities", &self.remote_entities)
            .collection("remote-secrets", &self.remote_secrets)
            .collection("relation-networks", &self.relation_networks)
            .collection("offer-connections", &self.offer_connections)
            .collection("external-controllers", &self.external_controllers)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
