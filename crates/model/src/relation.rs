//! Relations and their endpoints
//!
//! A relation's status is optional even in versions that carry it. Some
//! producers wrote an explicit null, which is removed before coercion and
//! read as "no status".

use crate::status::{StatusArgs, StatusPoint};
use modeldoc_core::{Map, Result, Value};
use modeldoc_schema::checker::{any, envelope, bool, int, string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Arguments for [`Endpoint`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointArgs {
    /// Application name
    pub application_name: String,
    /// Endpoint name
    pub name: String,
    /// `provider`, `requirer` or `peer`
    pub role: String,
    /// Interface name
    pub interface: String,
    /// Whether the endpoint is optional
    pub optional: bool,
    /// Maximum relation count
    pub limit: i64,
    /// `global` or `container`
    pub scope: String,
}

/// One side of a relation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoint {
    args: EndpointArgs,
    unit_settings: BTreeMap<String, Map>,
    application_settings: Map,
}

impl Endpoint {
    /// Create an endpoint
    pub fn new(args: EndpointArgs) -> Self {
        Endpoint {
            args,
            unit_settings: BTreeMap::new(),
            application_settings: Map::new(),
        }
    }

    /// Application name
    pub fn application_name(&self) -> &str {
        &self.args.application_name
    }

    /// Endpoint name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Role
    pub fn role(&self) -> &str {
        &self.args.role
    }

    /// Interface name
    pub fn interface(&self) -> &str {
        &self.args.interface
    }

    /// Whether the endpoint is optional
    pub fn optional(&self) -> bool {
        self.args.optional
    }

    /// Maximum relation count
    pub fn limit(&self) -> i64 {
        self.args.limit
    }

    /// Scope
    pub fn scope(&self) -> &str {
        &self.args.scope
    }

    /// Relation settings per unit
    pub fn unit_settings(&self) -> &BTreeMap<String, Map> {
        &self.unit_settings
    }

    /// Relation settings of one unit
    pub fn settings(&self, unit: &str) -> Option<&Map> {
        self.unit_settings.get(unit)
    }

    /// Set the relation settings of a unit
    pub fn set_unit_settings(&mut self, unit: impl Into<String>, settings: Map) {
        self.unit_settings.insert(unit.into(), settings);
    }

    /// Application-level relation settings
    pub fn application_settings(&self) -> &Map {
        &self.application_settings
    }

    /// Set the application-level relation settings
    pub fn set_application_settings(&mut self, settings: Map) {
        self.application_settings = settings;
    }
}

fn endpoint_v1() -> FieldSchema {
    FieldSchema::new()
        .required("application-name", string())
        .required("name", string())
        .required("role", string())
        .required("interface", string())
        .optional("optional", bool(), false)
        .optional("limit", int(), 0)
        .optional("scope", string(), "")
        .required("unit-settings", string_map(string_map(any())))
}

fn endpoint_v2() -> FieldSchema {
    endpoint_v1().omit("application-settings", string_map(any()))
}

static ENDPOINT_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("endpoint", &[(1, endpoint_v1), (2, endpoint_v2)]));

impl VersionedEntity for Endpoint {
    const KIND: &'static str = "endpoint";

    fn registry() -> &'static SchemaRegistry {
        &ENDPOINT_REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut endpoint = Endpoint::new(EndpointArgs {
            application_name: fields.string("application-name")?,
            name: fields.string("name")?,
            role: fields.string("role")?,
            interface: fields.string("interface")?,
            optional: fields.bool("optional")?,
            limit: fields.int("limit")?,
            scope: fields.string("scope")?,
        });
        for (unit, settings) in fields.map("unit-settings")? {
            if let Value::Map(settings) = settings {
                endpoint.unit_settings.insert(unit, settings);
            }
        }
        if version >= 2 {
            endpoint.application_settings = fields.map("application-settings")?;
        }
        Ok(endpoint)
    }
}

impl ToWire for Endpoint {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let unit_settings: Map = self
            .unit_settings
            .iter()
            .map(|(unit, s)| (unit.clone(), Value::Map(s.clone())))
            .collect();
        MapBuilder::new()
            .field("application-name", a.application_name.as_str())
            .field("name", a.name.as_str())
            .field("role", a.role.as_str())
            .field("interface", a.interface.as_str())
            .field("optional", a.optional)
            .field("limit", a.limit)
            .nonempty("scope", &a.scope)
            .field("unit-settings", unit_settings)
            .nonempty_values("application-settings", &self.application_settings)
            .into_value()
    }
}

/// Arguments for [`Relation`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationArgs {
    /// Relation id
    pub id: i64,
    /// Relation key (`wordpress:db mysql:server`)
    pub key: String,
    /// Whether the relation is suspended
    pub suspended: bool,
    /// Why the relation was suspended
    pub suspended_reason: String,
}

/// A relation between application endpoints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    args: RelationArgs,
    status: Option<StatusPoint>,
    endpoints: Vec<Endpoint>,
}

impl Relation {
    /// Create a relation
    pub fn new(args: RelationArgs) -> Self {
        Relation {
            args,
            status: None,
            endpoints: Vec::new(),
        }
    }

    /// Relation id
    pub fn id(&self) -> i64 {
        self.args.id
    }

    /// Relation key
    pub fn key(&self) -> &str {
        &self.args.key
    }

    /// Whether the relation is suspended
    pub fn suspended(&self) -> bool {
        self.args.suspended
    }

    /// Why the relation was suspended
    pub fn suspended_reason(&self) -> &str {
        &self.args.suspended_reason
    }

    /// Relation status, if any
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the relation status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Endpoints
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Add an endpoint and return it for settings
    pub fn add_endpoint(&mut self, args: EndpointArgs) -> &mut Endpoint {
        self.endpoints.push(Endpoint::new(args));
        let last = self.endpoints.len() - 1;
        &mut self.endpoints[last]
    }
}

fn relation_v1() -> FieldSchema {
    FieldSchema::new()
        .required("id", int())
        .required("key", string())
        .required("endpoints", envelope())
}

fn relation_v2() -> FieldSchema {
    relation_v1()
        .optional("suspended", bool(), false)
        .optional("suspended-reason", string(), "")
}

fn relation_v3() -> FieldSchema {
    relation_v2().omit("status", any())
}

static RELATION_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "relation",
        &[(1, relation_v1), (2, relation_v2), (3, relation_v3)],
    )
});

impl VersionedEntity for Relation {
    const KIND: &'static str = "relation";

    fn registry() -> &'static SchemaRegistry {
        &RELATION_REGISTRY
    }

    fn preprocess(item: Value) -> Value {
        match item {
            Value::Map(mut m) => {
                if matches!(m.get("status"), Some(Value::Null)) {
                    m.remove("status");
                }
                Value::Map(m)
            }
            other => other,
        }
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = RelationArgs {
            id: fields.int("id")?,
            key: fields.string("key")?,
            ..Default::default()
        };
        if version >= 2 {
            args.suspended = fields.bool("suspended")?;
            args.suspended_reason = fields.string("suspended-reason")?;
        }
        let mut relation = Relation::new(args);
        relation.endpoints = fields.collection::<Endpoint>("endpoints")?;
        if version >= 3 {
            relation.status = fields.embedded::<StatusPoint>("status", "status")?;
        }
        Ok(relation)
    }
}

impl ToWire for Relation {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("id", self.args.id)
            .field("key", self.args.key.as_str())
            .field("suspended", self.args.suspended)
            .nonempty("suspended-reason", &self.args.suspended_reason)
            .opt_embedded("status", "status", self.status.as_ref())
            .collection("endpoints", &self.endpoints)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&RELATION_REGISTRY, &ENDPOINT_REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use modeldoc_schema::{collection_envelope, import_collection};

    fn relation() -> Relation {
        let mut r = Relation::new(RelationArgs {
            id: 7,
            key: "wordpress:db mysql:server".into(),
            suspended: true,
            suspended_reason: "maintenance".into(),
        });
        r.set_status(StatusArgs {
            value: "suspended".into(),
            message: String::new(),
            data: Map::new(),
            updated: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            never_set: false,
        });
        let ep = r.add_endpoint(EndpointArgs {
            application_name: "mysql".into(),
            name: "server".into(),
            role: "provider".into(),
            interface: "mysql".into(),
            scope: "global".into(),
            ..Default::default()
        });
        let mut settings = Map::new();
        settings.insert("host".into(), Value::from("10.0.0.1"));
        ep.set_unit_settings("mysql/0", settings.clone());
        ep.set_application_settings(settings);
        r
    }

    fn edit_first(env: &mut Value, f: impl FnOnce(&mut Map)) {
        if let Value::Map(m) = env {
            if let Some(Value::List(items)) = m.get_mut("relations") {
                if let Value::Map(r) = &mut items[0] {
                    f(r);
                }
            }
        }
    }

    #[test]
    fn test_relation_round_trip() {
        let relations = vec![relation()];
        let back =
            import_collection::<Relation>(&collection_envelope("relations", &relations), "relations")
                .unwrap();
        assert_eq!(back, relations);
        assert_eq!(
            back[0].endpoints()[0].settings("mysql/0").unwrap().get("host"),
            Some(&Value::from("10.0.0.1"))
        );
    }

    #[test]
    fn test_null_status_means_no_status() {
        let mut env = collection_envelope("relations", &[relation()]);
        edit_first(&mut env, |r| {
            r.insert("status".into(), Value::Null);
        });
        let back = import_collection::<Relation>(&env, "relations").unwrap();
        assert!(back[0].status().is_none());
    }

    #[test]
    fn test_v1_drops_suspension() {
        let mut env = collection_envelope("relations", &[relation()]);
        if let Value::Map(m) = &mut env {
            m.insert("version".into(), Value::Int(1));
        }
        let back = import_collection::<Relation>(&env, "relations").unwrap();
        assert!(!back[0].suspended());
        assert!(back[0].status().is_none());
        assert_eq!(back[0].endpoints().len(), 1);
    }

    #[test]
    fn test_endpoint_v1_drops_application_settings() {
        let mut env = collection_envelope("relations", &[relation()]);
        edit_first(&mut env, |r| {
            if let Some(Value::Map(eps)) = r.get_mut("endpoints") {
                eps.insert("version".into(), Value::Int(1));
            }
        });
        let back = import_collection::<Relation>(&env, "relations").unwrap();
        assert!(back[0].endpoints()[0].application_settings().is_empty());
        assert_eq!(back[0].endpoints()[0].unit_settings().len(), 1);
    }
}
