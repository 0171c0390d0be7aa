//! Firewall rules for well-known services

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{list, string};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`FirewallRule`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirewallRuleArgs {
    /// Service the rule applies to (`ssh`, `juju-controller`)
    pub well_known_service: String,
    /// CIDRs allowed to reach the service
    pub whitelist_cidrs: Vec<String>,
}

/// Ingress rule for a well-known service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirewallRule {
    args: FirewallRuleArgs,
}

impl FirewallRule {
    /// Create a rule
    pub fn new(args: FirewallRuleArgs) -> Self {
        FirewallRule { args }
    }

    pub fn well_known_service(&self) -> &str {
        &self.args.well_known_service
    }

    pub fn whitelist_cidrs(&self) -> &[String] {
        &self.args.whitelist_cidrs
    }
}

fn rule_v1() -> FieldSchema {
    FieldSchema::new()
        .required("well-known-service", string())
        .omit("whitelist-cidrs", list(string()))
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("firewall rule", &[(1, rule_v1)]));

impl VersionedEntity for FirewallRule {
    const KIND: &'static str = "firewall rule";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(FirewallRule::new(FirewallRuleArgs {
            well_known_service: fields.string("well-known-service")?,
            whitelist_cidrs: fields.strings("whitelist-cidrs")?,
        }))
    }
}

impl ToWire for FirewallRule {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("well-known-service", self.args.well_known_service.as_str())
            .nonempty_strings("whitelist-cidrs", &self.args.whitelist_cidrs)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}
