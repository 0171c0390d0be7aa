//! Machines and their containers
//!
//! Containers are stored inline as machine maps under `containers`, without
//! their own envelope, so they are imported at the parent collection's version.
//! Nesting depth is unbounded.
//!
//! Version 3 replaced the `series` codename with a `base` (`ubuntu@22.04`);
//! older documents derive the base from the series on import.

use crate::address::{addresses_to_wire, import_addresses, Address, AddressArgs};
use crate::agent_tools::{AgentTools, AgentToolsArgs};
use crate::base::{series_to_base, validate_base};
use crate::block_device::{BlockDevice, BlockDeviceArgs};
use crate::cloud_instance::{CloudInstance, CloudInstanceArgs};
use crate::constraints::{Constraints, ConstraintsArgs};
use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use modeldoc_core::tag::machine_parent;
use modeldoc_core::{Error, Result, ResultExt, Value};
use modeldoc_schema::checker::{any, envelope, list, string, string_map};
use modeldoc_schema::{
    import_items, FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity,
};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::trace;

/// Arguments for [`Machine`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineArgs {
    /// Machine id (`0`, `0/lxd/1`)
    pub id: String,
    /// Provisioning nonce
    pub nonce: String,
    /// Agent password hash
    pub password_hash: String,
    /// Placement directive
    pub placement: String,
    /// OS base (`ubuntu@22.04`)
    pub base: String,
    /// Container type for containers (`lxd`, `kvm`)
    pub container_type: String,
    /// Machine jobs
    pub jobs: Vec<String>,
    /// Container types the machine can host, when known
    pub supported_containers: Option<Vec<String>>,
}

/// A machine, possibly hosting containers
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    id: String,
    nonce: String,
    password_hash: String,
    placement: String,
    base: String,
    container_type: String,
    jobs: Vec<String>,
    supported_containers: Option<Vec<String>>,
    instance: Option<CloudInstance>,
    tools: Option<AgentTools>,
    status: Option<StatusPoint>,
    status_history: StatusHistory,
    modification_status: Option<StatusPoint>,
    preferred_public_address: Option<Address>,
    preferred_private_address: Option<Address>,
    provider_addresses: Vec<Address>,
    machine_addresses: Vec<Address>,
    containers: Vec<Machine>,
    block_devices: Vec<BlockDevice>,
    annotations: BTreeMap<String, String>,
    constraints: Option<Constraints>,
}

impl Machine {
    /// Create a machine
    pub fn new(args: MachineArgs) -> Self {
        Machine {
            id: args.id,
            nonce: args.nonce,
            password_hash: args.password_hash,
            placement: args.placement,
            base: args.base,
            container_type: args.container_type,
            jobs: args.jobs,
            supported_containers: args.supported_containers,
            instance: None,
            tools: None,
            status: None,
            status_history: StatusHistory::default(),
            modification_status: None,
            preferred_public_address: None,
            preferred_private_address: None,
            provider_addresses: Vec::new(),
            machine_addresses: Vec::new(),
            containers: Vec::new(),
            block_devices: Vec::new(),
            annotations: BTreeMap::new(),
            constraints: None,
        }
    }

    /// Machine id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the hosting machine, for containers
    pub fn container_parent(&self) -> Option<&str> {
        machine_parent(&self.id)
    }

    /// Provisioning nonce
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Agent password hash
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Placement directive
    pub fn placement(&self) -> &str {
        &self.placement
    }

    /// OS base
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Container type
    pub fn container_type(&self) -> &str {
        &self.container_type
    }

    /// Machine jobs
    pub fn jobs(&self) -> &[String] {
        &self.jobs
    }

    /// Container types the machine can host, `None` when unknown
    pub fn supported_containers(&self) -> Option<&[String]> {
        self.supported_containers.as_deref()
    }

    /// Set the container types the machine can host
    pub fn set_supported_containers(&mut self, containers: Vec<String>) {
        self.supported_containers = Some(containers);
    }

    /// Provider instance
    pub fn instance(&self) -> Option<&CloudInstance> {
        self.instance.as_ref()
    }

    /// Set the provider instance
    pub fn set_instance(&mut self, args: CloudInstanceArgs) -> &mut CloudInstance {
        self.instance.insert(CloudInstance::new(args))
    }

    /// Agent tools
    pub fn tools(&self) -> Option<&AgentTools> {
        self.tools.as_ref()
    }

    /// Set the agent tools
    pub fn set_tools(&mut self, args: AgentToolsArgs) {
        self.tools = Some(AgentTools::new(args));
    }

    /// Machine status
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the machine status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Earlier machine statuses
    pub fn status_history(&self) -> &[StatusPoint] {
        self.status_history.status_history()
    }

    /// Replace the earlier machine statuses
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.status_history.set_status_history(args);
    }

    /// Status of the last modification
    pub fn modification_status(&self) -> Option<&StatusPoint> {
        self.modification_status.as_ref()
    }

    /// Set the modification status
    pub fn set_modification_status(&mut self, args: StatusArgs) {
        self.modification_status = Some(StatusPoint::new(args));
    }

    /// Preferred public address
    pub fn preferred_public_address(&self) -> Option<&Address> {
        self.preferred_public_address.as_ref()
    }

    /// Preferred private address
    pub fn preferred_private_address(&self) -> Option<&Address> {
        self.preferred_private_address.as_ref()
    }

    /// Set the preferred addresses
    pub fn set_preferred_addresses(&mut self, public: AddressArgs, private: AddressArgs) {
        self.preferred_public_address = Some(Address::new(public));
        self.preferred_private_address = Some(Address::new(private));
    }

    /// Addresses reported by the provider
    pub fn provider_addresses(&self) -> &[Address] {
        &self.provider_addresses
    }

    /// Addresses reported by the machine agent
    pub fn machine_addresses(&self) -> &[Address] {
        &self.machine_addresses
    }

    /// Replace the provider and machine addresses
    pub fn set_addresses(&mut self, provider: Vec<AddressArgs>, machine: Vec<AddressArgs>) {
        self.provider_addresses = provider.into_iter().map(Address::new).collect();
        self.machine_addresses = machine.into_iter().map(Address::new).collect();
    }

    /// Hosted containers
    pub fn containers(&self) -> &[Machine] {
        &self.containers
    }

    /// Add a container and return it for further setup
    pub fn add_container(&mut self, args: MachineArgs) -> &mut Machine {
        self.containers.push(Machine::new(args));
        let last = self.containers.len() - 1;
        &mut self.containers[last]
    }

    /// Block devices
    pub fn block_devices(&self) -> &[BlockDevice] {
        &self.block_devices
    }

    /// Add a block device
    pub fn add_block_device(&mut self, args: BlockDeviceArgs) -> &BlockDevice {
        self.block_devices.push(BlockDevice::new(args));
        let last = self.block_devices.len() - 1;
        &self.block_devices[last]
    }

    /// Annotations
    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Replace the annotations
    pub fn set_annotations(&mut self, annotations: BTreeMap<String, String>) {
        self.annotations = annotations;
    }

    /// Constraints, `None` when unconstrained
    pub fn constraints(&self) -> Option<&Constraints> {
        self.constraints.as_ref()
    }

    /// Set the constraints; empty arguments clear them
    pub fn set_constraints(&mut self, args: ConstraintsArgs) {
        self.constraints = Constraints::new(args);
    }

    /// Check the machine and its containers
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::validation("machine missing id"));
        }
        validate_base(&self.base).annotate_with(|| format!("machine {:?}", self.id))?;
        if self.status.is_none() {
            return Err(Error::validation(format!(
                "machine {:?} missing status",
                self.id
            )));
        }
        if let Some(instance) = &self.instance {
            instance
                .validate()
                .annotate_with(|| format!("machine {:?}", self.id))?;
        }
        for container in &self.containers {
            container.validate()?;
        }
        Ok(())
    }

    /// This machine and all nested containers, depth first
    pub fn all_machines(&self) -> Vec<&Machine> {
        let mut out = vec![self];
        for container in &self.containers {
            out.extend(container.all_machines());
        }
        out
    }
}

fn machine_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("nonce", string())
        .required("password-hash", string())
        .optional("placement", string(), "")
        .omit("instance", any())
        .required("series", string())
        .optional("container-type", string(), "")
        .required("jobs", list(string()))
        .required("status", envelope())
        .required("status-history", envelope())
        .omit("supported-containers", list(string()))
        .omit("tools", any())
        .required("containers", list(any()))
        .required("block-devices", envelope())
        .omit("annotations", string_map(string()))
        .omit("constraints", any())
}

fn machine_v2() -> FieldSchema {
    machine_v1()
        .omit("modification-status", any())
        .omit("preferred-public-address", any())
        .omit("preferred-private-address", any())
        .omit("provider-addresses", list(any()))
        .omit("machine-addresses", list(any()))
}

fn machine_v3() -> FieldSchema {
    machine_v2().remove("series").required("base", string())
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "machine",
        &[(1, machine_v1), (2, machine_v2), (3, machine_v3)],
    )
});

impl VersionedEntity for Machine {
    const KIND: &'static str = "machine";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let base = if version >= 3 {
            fields.string("base")?
        } else {
            let series = fields.string("series")?;
            let base = series_to_base(&series)?;
            trace!(%series, %base, "derived machine base from series");
            base
        };
        let mut machine = Machine::new(MachineArgs {
            id: fields.string("id")?,
            nonce: fields.string("nonce")?,
            password_hash: fields.string("password-hash")?,
            placement: fields.string("placement")?,
            base,
            container_type: fields.string("container-type")?,
            jobs: fields.strings("jobs")?,
            supported_containers: fields.opt_strings("supported-containers")?,
        });
        machine.instance = fields.embedded::<CloudInstance>("instance", "instance")?;
        machine.tools = fields.embedded::<AgentTools>("tools", "tools")?;
        machine.status = Some(fields.required_embedded::<StatusPoint>("status", "status")?);
        machine.status_history = StatusHistory::import(&fields, "status-history")?;
        machine.block_devices = fields.collection::<BlockDevice>("block-devices")?;
        machine.annotations = fields.string_map("annotations")?;
        machine.constraints = Constraints::import_optional(&fields, "constraints")?;
        machine.containers = import_items::<Machine>(&fields.list("containers")?, version)
            .annotate("containers")?;

        if version >= 2 {
            machine.modification_status =
                fields.embedded::<StatusPoint>("modification-status", "status")?;
            machine.preferred_public_address =
                fields.embedded::<Address>("preferred-public-address", "address")?;
            machine.preferred_private_address =
                fields.embedded::<Address>("preferred-private-address", "address")?;
            machine.provider_addresses = import_addresses(&fields, "provider-addresses")?;
            machine.machine_addresses = import_addresses(&fields, "machine-addresses")?;
        }
        Ok(machine)
    }
}

impl ToWire for Machine {
    fn to_wire(&self) -> Value {
        let containers: Vec<Value> = self.containers.iter().map(ToWire::to_wire).collect();
        let mut builder = MapBuilder::new()
            .field("id", self.id.as_str())
            .field("nonce", self.nonce.as_str())
            .field("password-hash", self.password_hash.as_str())
            .nonempty("placement", &self.placement)
            .field("base", self.base.as_str())
            .nonempty("container-type", &self.container_type)
            .strings("jobs", &self.jobs)
            .opt(
                "supported-containers",
                self.supported_containers.as_deref(),
            )
            .opt_embedded("instance", "instance", self.instance.as_ref())
            .opt_embedded("tools", "tools", self.tools.as_ref())
            .opt_embedded("status", "status", self.status.as_ref())
            .field("status-history", self.status_history.to_wire())
            .opt_embedded(
                "modification-status",
                "status",
                self.modification_status.as_ref(),
            )
            .opt_embedded(
                "preferred-public-address",
                "address",
                self.preferred_public_address.as_ref(),
            )
            .opt_embedded(
                "preferred-private-address",
                "address",
                self.preferred_private_address.as_ref(),
            )
            .field("containers", containers)
            .collection("block-devices", &self.block_devices)
            .nonempty_map("annotations", &self.annotations)
            .opt_embedded("constraints", "constraints", self.constraints.as_ref());
        if !self.provider_addresses.is_empty() {
            builder = builder.field(
                "provider-addresses",
                addresses_to_wire(&self.provider_addresses),
            );
        }
        if !self.machine_addresses.is_empty() {
            builder = builder.field(
                "machine-addresses",
                addresses_to_wire(&self.machine_addresses),
            );
        }
        builder.into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
