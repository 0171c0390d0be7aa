//! The cloud credential a model uses

use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Arguments for [`CloudCredential`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudCredentialArgs {
    /// Owning user
    pub owner: String,
    /// Cloud name
    pub cloud: String,
    /// Credential name
    pub name: String,
    /// Authentication type (`access-key`, `userpass`, ...)
    pub auth_type: String,
    /// Credential attributes
    pub attributes: BTreeMap<String, String>,
}

/// A named cloud credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudCredential {
    owner: String,
    cloud: String,
    name: String,
    auth_type: String,
    attributes: BTreeMap<String, String>,
}

impl CloudCredential {
    /// Create a cloud credential
    pub fn new(args: CloudCredentialArgs) -> Self {
        CloudCredential {
            owner: args.owner,
            cloud: args.cloud,
            name: args.name,
            auth_type: args.auth_type,
            attributes: args.attributes,
        }
    }

    /// Owning user
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Cloud name
    pub fn cloud(&self) -> &str {
        &self.cloud
    }

    /// Credential name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Authentication type
    pub fn auth_type(&self) -> &str {
        &self.auth_type
    }

    /// Credential attributes
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

fn credential_v1() -> FieldSchema {
    FieldSchema::new()
        .required("owner", string())
        .required("cloud", string())
        .required("name", string())
        .required("auth-type", string())
        .omit("attributes", string_map(string()))
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("cloud credential", &[(1, credential_v1)]));

impl VersionedEntity for CloudCredential {
    const KIND: &'static str = "cloud credential";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(CloudCredential {
            owner: fields.string("owner")?,
            cloud: fields.string("cloud")?,
            name: fields.string("name")?,
            auth_type: fields.string("auth-type")?,
            attributes: fields.string_map("attributes")?,
        })
    }
}

impl ToWire for CloudCredential {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("owner", self.owner.as_str())
            .field("cloud", self.cloud.as_str())
            .field("name", self.name.as_str())
            .field("auth-type", self.auth_type.as_str())
            .nonempty_map("attributes", &self.attributes)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldoc_schema::{embedded_envelope, import_embedded};

    #[test]
    fn test_credential_round_trip() {
        let mut attributes = BTreeMap::new();
        attributes.insert("access-key".to_string(), "AKIA".to_string());
        let credential = CloudCredential::new(CloudCredentialArgs {
            owner: "admin".into(),
            cloud: "aws".into(),
            name: "default".into(),
            auth_type: "access-key".into(),
            attributes,
        });
        let wire = embedded_envelope("credential", &credential);
        let back = import_embedded::<CloudCredential>(&wire, "credential").unwrap();
        assert_eq!(back, credential);
    }

    #[test]
    fn test_missing_auth_type() {
        let mut payload = modeldoc_core::Map::new();
        payload.insert("owner".into(), Value::from("admin"));
        payload.insert("cloud".into(), Value::from("aws"));
        payload.insert("name".into(), Value::from("default"));
        let mut env = modeldoc_core::Map::new();
        env.insert("version".into(), Value::Int(1));
        env.insert("credential".into(), Value::Map(payload));
        let err = import_embedded::<CloudCredential>(&Value::Map(env), "credential").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cloud credential v1 schema check failed: auth-type: expected string, got nothing"
        );
    }
}
