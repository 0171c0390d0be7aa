//! Application offers for cross-model relations

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Arguments for [`ApplicationOffer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationOfferArgs {
    /// Offer UUID
    pub offer_uuid: String,
    /// Offer name
    pub offer_name: String,
    /// Offered endpoints, offer endpoint name to application endpoint name
    pub endpoints: BTreeMap<String, String>,
    /// Access per user
    pub acl: BTreeMap<String, String>,
    /// Offering application
    pub application_name: String,
    /// Description shown to consumers
    pub application_description: String,
}

/// An offer of an application's endpoints to other models
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationOffer {
    args: ApplicationOfferArgs,
}

impl ApplicationOffer {
    /// Create an offer
    pub fn new(args: ApplicationOfferArgs) -> Self {
        ApplicationOffer { args }
    }

    /// Offer UUID
    pub fn offer_uuid(&self) -> &str {
        &self.args.offer_uuid
    }

    /// Offer name
    pub fn offer_name(&self) -> &str {
        &self.args.offer_name
    }

    /// Offered endpoints
    pub fn endpoints(&self) -> &BTreeMap<String, String> {
        &self.args.endpoints
    }

    /// Access per user
    pub fn acl(&self) -> &BTreeMap<String, String> {
        &self.args.acl
    }

    /// Offering application
    pub fn application_name(&self) -> &str {
        &self.args.application_name
    }

    /// Description shown to consumers
    pub fn application_description(&self) -> &str {
        &self.args.application_description
    }
}

fn offer_v1() -> FieldSchema {
    FieldSchema::new()
        .required("offer-name", string())
        .required("endpoints", string_map(string()))
        .omit("acl", string_map(string()))
        .optional("application-name", string(), "")
}

fn offer_v2() -> FieldSchema {
    offer_v1()
        .optional("offer-uuid", string(), "")
        .optional("application-description", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("offer", &[(1, offer_v1), (2, offer_v2)]));

impl VersionedEntity for ApplicationOffer {
    const KIND: &'static str = "offer";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = ApplicationOfferArgs {
            offer_name: fields.string("offer-name")?,
            endpoints: fields.string_map("endpoints")?,
            acl: fields.string_map("acl")?,
            application_name: fields.string("application-name")?,
            ..Default::default()
        };
        if version >= 2 {
            args.offer_uuid = fields.string("offer-uuid")?;
            args.application_description = fields.string("application-description")?;
        }
        Ok(ApplicationOffer::new(args))
    }
}

impl ToWire for ApplicationOffer {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .nonempty("offer-uuid", &a.offer_uuid)
            .field("offer-name", a.offer_name.as_str())
            .string_map("endpoints", &a.endpoints)
            .nonempty_map("acl", &a.acl)
            .nonempty("application-name", &a.application_name)
            .nonempty("application-description", &a.application_description)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
