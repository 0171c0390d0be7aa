//! Cross-model records
//!
//! Everything a model needs to remember about other models and controllers:
//! the controllers it talks to, consumers of its offers, egress networks of
//! cross-model relations, remote entity tokens and secrets consumed from
//! elsewhere. All of these kinds are at version 1.

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{int, list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`ExternalController`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalControllerArgs {
    /// Controller UUID
    pub id: String,
    /// Display alias
    pub alias: String,
    /// API addresses
    pub addrs: Vec<String>,
    /// CA certificate (PEM)
    pub ca_cert: String,
    /// UUIDs of the models hosted there that this model consumes from
    pub models: Vec<String>,
}

/// Another controller this model has relations with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalController {
    args: ExternalControllerArgs,
}

impl ExternalController {
    /// Create a record
    pub fn new(args: ExternalControllerArgs) -> Self {
        ExternalController { args }
    }

    pub fn id(&self) -> &str {
        &self.args.id
    }

    pub fn alias(&self) -> &str {
        &self.args.alias
    }

    pub fn addrs(&self) -> &[String] {
        &self.args.addrs
    }

    pub fn ca_cert(&self) -> &str {
        &self.args.ca_cert
    }

    pub fn models(&self) -> &[String] {
        &self.args.models
    }
}

fn controller_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .optional("alias", string(), "")
        .required("addrs", list(string()))
        .required("ca-cert", string())
        .omit("models", list(string()))
}

static CONTROLLER_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("external controller", &[(1, controller_v1)]));

impl VersionedEntity for ExternalController {
    const KIND: &'static str = "external controller";

    fn registry() -> &'static SchemaRegistry {
        &CONTROLLER_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(ExternalController::new(ExternalControllerArgs {
            id: fields.string("id")?,
            alias: fields.string("alias")?,
            addrs: fields.strings("addrs")?,
            ca_cert: fields.string("ca-cert")?,
            models: fields.strings("models")?,
        }))
    }
}

impl ToWire for ExternalController {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("id", a.id.as_str())
            .nonempty("alias", &a.alias)
            .strings("addrs", &a.addrs)
            .field("ca-cert", a.ca_cert.as_str())
            .nonempty_strings("models", &a.models)
            .into_value()
    }
}

/// Arguments for [`OfferConnection`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferConnectionArgs {
    /// Offer consumed
    pub offer_uuid: String,
    /// Relation carrying the connection
    pub relation_id: i64,
    /// Key of that relation
    pub relation_key: String,
    /// Consuming model
    pub source_model_uuid: String,
    /// Consuming user
    pub user_name: String,
}

/// A consumer connected to one of this model's offers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferConnection {
    args: OfferConnectionArgs,
}

impl OfferConnection {
    /// Create a record
    pub fn new(args: OfferConnectionArgs) -> Self {
        OfferConnection { args }
    }

    pub fn offer_uuid(&self) -> &str {
        &self.args.offer_uuid
    }

    pub fn relation_id(&self) -> i64 {
        self.args.relation_id
    }

    pub fn relation_key(&self) -> &str {
        &self.args.relation_key
    }

    pub fn source_model_uuid(&self) -> &str {
        &self.args.source_model_uuid
    }

    pub fn user_name(&self) -> &str {
        &self.args.user_name
    }
}

fn connection_v1() -> FieldSchema {
    FieldSchema::new()
        .required("offer-uuid", string())
        .required("relation-id", int())
        .required("relation-key", string())
        .required("source-model-uuid", string())
        .required("user-name", string())
}

static CONNECTION_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("offer connection", &[(1, connection_v1)]));

impl VersionedEntity for OfferConnection {
    const KIND: &'static str = "offer connection";

    fn registry() -> &'static SchemaRegistry {
        &CONNECTION_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(OfferConnection::new(OfferConnectionArgs {
            offer_uuid: fields.string("offer-uuid")?,
            relation_id: fields.int("relation-id")?,
            relation_key: fields.string("relation-key")?,
            source_model_uuid: fields.string("source-model-uuid")?,
            user_name: fields.string("user-name")?,
        }))
    }
}

impl ToWire for OfferConnection {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("offer-uuid", a.offer_uuid.as_str())
            .field("relation-id", a.relation_id)
            .field("relation-key", a.relation_key.as_str())
            .field("source-model-uuid", a.source_model_uuid.as_str())
            .field("user-name", a.user_name.as_str())
            .into_value()
    }
}

/// Arguments for [`RelationNetwork`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationNetworkArgs {
    /// Record id
    pub id: String,
    /// Relation the networks belong to
    pub relation_key: String,
    /// Ingress CIDRs
    pub cidrs: Vec<String>,
}

/// Networks allowed to reach a cross-model relation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationNetwork {
    args: RelationNetworkArgs,
}

impl RelationNetwork {
    /// Create a record
    pub fn new(args: RelationNetworkArgs) -> Self {
        RelationNetwork { args }
    }

    pub fn id(&self) -> &str {
        &self.args.id
    }

    pub fn relation_key(&self) -> &str {
        &self.args.relation_key
    }

    pub fn cidrs(&self) -> &[String] {
        &self.args.cidrs
    }
}

fn network_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("relation-key", string())
        .omit("cidrs", list(string()))
}

static NETWORK_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("relation network", &[(1, network_v1)]));

impl VersionedEntity for RelationNetwork {
    const KIND: &'static str = "relation network";

    fn registry() -> &'static SchemaRegistry {
        &NETWORK_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(RelationNetwork::new(RelationNetworkArgs {
            id: fields.string("id")?,
            relation_key: fields.string("relation-key")?,
            cidrs: fields.strings("cidrs")?,
        }))
    }
}

impl ToWire for RelationNetwork {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("id", self.args.id.as_str())
            .field("relation-key", self.args.relation_key.as_str())
            .nonempty_strings("cidrs", &self.args.cidrs)
            .into_value()
    }
}

/// Arguments for [`RemoteEntity`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteEntityArgs {
    /// Entity tag
    pub id: String,
    /// Token the remote side knows the entity by
    pub token: String,
    /// Serialized macaroon, if any
    pub macaroon: String,
}

/// Token mapping for an entity shared with another model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteEntity {
    args: RemoteEntityArgs,
}

impl RemoteEntity {
    /// Create a record
    pub fn new(args: RemoteEntityArgs) -> Self {
        RemoteEntity { args }
    }

    pub fn id(&self) -> &str {
        &self.args.id
    }

    pub fn token(&self) -> &str {
        &self.args.token
    }

    pub fn macaroon(&self) -> &str {
        &self.args.macaroon
    }
}

fn entity_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("token", string())
        .optional("macaroon", string(), "")
}

static ENTITY_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("remote entity", &[(1, entity_v1)]));

impl VersionedEntity for RemoteEntity {
    const KIND: &'static str = "remote entity";

    fn registry() -> &'static SchemaRegistry {
        &ENTITY_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(RemoteEntity::new(RemoteEntityArgs {
            id: fields.string("id")?,
            token: fields.string("token")?,
            macaroon: fields.string("macaroon")?,
        }))
    }
}

impl ToWire for RemoteEntity {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("id", self.args.id.as_str())
            .field("token", self.args.token.as_str())
            .nonempty("macaroon", &self.args.macaroon)
            .into_value()
    }
}

/// A secret consumed from another model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSecret {
    /// Secret id
    pub id: String,
    /// Model the secret comes from
    pub source_uuid: String,
    /// Consuming entity tag
    pub consumer_id: String,
    /// Consumer label
    pub label: String,
    /// Revision the consumer is tracking
    pub current_revision: i64,
    /// Newest revision available
    pub latest_revision: i64,
}

fn secret_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", string())
        .required("source-uuid", string())
        .required("consumer-id", string())
        .optional("label", string(), "")
        .required("current-revision", int())
        .required("latest-revision", int())
}

static SECRET_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("remote secret", &[(1, secret_v1)]));

impl VersionedEntity for RemoteSecret {
    const KIND: &'static str = "remote secret";

    fn registry() -> &'static SchemaRegistry {
        &SECRET_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(RemoteSecret {
            id: fields.string("id")?,
            source_uuid: fields.string("source-uuid")?,
            consumer_id: fields.string("consumer-id")?,
            label: fields.string("label")?,
            current_revision: fields.int("current-revision")?,
            latest_revision: fields.int("latest-revision")?,
        })
    }
}

impl ToWire for RemoteSecret {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("id", self.id.as_str())
            .field("source-uuid", self.source_uuid.as_str())
            .field("consumer-id", self.consumer_id.as_str())
            .nonempty("label", &self.label)
            .field("current-revision", self.current_revision)
            .field("latest-revision", self.latest_revision)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![
        &CONTROLLER_REGISTRY,
        &CONNECTION_REGISTRY,
        &NETWORK_REGISTRY,
        &ENTITY_REGISTRY,
        &SECRET_REGISTRY,
    ]
}
