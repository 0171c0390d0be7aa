//! Model description documents
//!
//! This crate holds every entity kind a model document can contain, the
//! [`Model`] aggregate that owns them, the cross-entity validator and the
//! byte-level facade:
//!
//! ```ignore
//! let bytes = modeldoc_model::serialize(&model)?;
//! let model = modeldoc_model::deserialize(&bytes)?;
//! model.validate()?;
//! ```
//!
//! Every entity kind owns a [`SchemaRegistry`] of its historical versions.
//! Export always writes the newest version; import reads any of them.

#![warn(clippy::all)]

pub mod address;
pub mod agent_tools;
pub mod application;
pub mod base;
pub mod block_device;
pub mod charm;
pub mod cloud_container;
pub mod cloud_credential;
pub mod cloud_image_metadata;
pub mod cloud_instance;
pub mod config;
pub mod constraints;
pub mod filesystem;
pub mod firewall_rule;
pub mod ip_address;
pub mod link_layer_device;
pub mod machine;
pub mod model;
pub mod offer;
pub mod operation;
pub mod relation;
pub mod remote;
pub mod serialization;
pub mod space;
pub mod status;
pub mod storage;
pub mod subnet;
pub mod unit;
pub mod user;
pub mod validate;
pub mod volume;

pub use address::{Address, AddressArgs};
pub use agent_tools::{AgentTools, AgentToolsArgs};
pub use application::{Application, ApplicationArgs, ExposedEndpoint, StorageDirective};
pub use block_device::{BlockDevice, BlockDeviceArgs};
pub use charm::{
    CharmConfig, CharmManifest, CharmMetadata, CharmMetadataArgs, CharmOrigin, CharmOriginArgs,
};
pub use cloud_container::{CloudContainer, CloudContainerArgs, CloudService, CloudServiceArgs};
pub use cloud_credential::{CloudCredential, CloudCredentialArgs};
pub use cloud_image_metadata::{CloudImageMetadata, CloudImageMetadataArgs};
pub use cloud_instance::{CloudInstance, CloudInstanceArgs};
pub use config::{ConfigError, DescriptionConfig};
pub use constraints::{Constraints, ConstraintsArgs};
pub use filesystem::{Filesystem, FilesystemArgs, FilesystemAttachment, FilesystemAttachmentArgs};
pub use firewall_rule::{FirewallRule, FirewallRuleArgs};
pub use ip_address::{IpAddress, IpAddressArgs};
pub use link_layer_device::{LinkLayerDevice, LinkLayerDeviceArgs};
pub use machine::{Machine, MachineArgs};
pub use model::{MeterStatus, Model, ModelArgs, ModelType, Sla};
pub use offer::{ApplicationOffer, ApplicationOfferArgs};
pub use operation::{Action, ActionArgs, ActionMessage, Operation, OperationArgs};
pub use relation::{Endpoint, EndpointArgs, Relation, RelationArgs};
pub use remote::{
    ExternalController, ExternalControllerArgs, OfferConnection, OfferConnectionArgs,
    RelationNetwork, RelationNetworkArgs, RemoteEntity, RemoteEntityArgs, RemoteSecret,
};
pub use serialization::{deserialize, deserialize_with, from_value, serialize, serialize_with};
pub use space::{Space, SpaceArgs};
pub use status::{StatusArgs, StatusHistory, StatusPoint};
pub use storage::{Storage, StorageArgs, StorageInstanceConstraints, StoragePool, StoragePoolArgs};
pub use subnet::{Subnet, SubnetArgs};
pub use unit::{Unit, UnitArgs};
pub use user::{SshHostKey, SshHostKeyArgs, User, UserArgs};
pub use volume::{
    AttachmentPlan, AttachmentPlanArgs, Volume, VolumeArgs, VolumeAttachment,
    VolumeAttachmentArgs,
};

use modeldoc_schema::SchemaRegistry;

/// Every schema registry defined by this crate
pub fn registries() -> Vec<&'static SchemaRegistry> {
    [
        status::registries(),
        agent_tools::registries(),
        address::registries(),
        constraints::registries(),
        cloud_instance::registries(),
        cloud_container::registries(),
        cloud_credential::registries(),
        charm::registries(),
        machine::registries(),
        block_device::registries(),
        application::registries(),
        unit::registries(),
        offer::registries(),
        relation::registries(),
        space::registries(),
        subnet::registries(),
        link_layer_device::registries(),
        ip_address::registries(),
        storage::registries(),
        volume::registries(),
        filesystem::registries(),
        firewall_rule::registries(),
        remote::registries(),
        operation::registries(),
        cloud_image_metadata::registries(),
        user::registries(),
        model::registries(),
    ]
    .into_iter()
    .flatten()
    .collect()
}
