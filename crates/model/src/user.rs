//! Model users and machine SSH host keys

use chrono::{DateTime, Utc};
use modeldoc_core::{Result, Value};
use modeldoc_schema::checker::{list, string, time};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;

/// Arguments for [`User`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserArgs {
    /// User name
    pub name: String,
    /// Display name
    pub display_name: String,
    /// Who granted access
    pub created_by: String,
    /// When access was granted
    pub date_created: DateTime<Utc>,
    /// Last connection to the model
    pub last_connection: Option<DateTime<Utc>>,
    /// Access level (`read`, `write`, `admin`)
    pub access: String,
}

/// A user with access to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    args: UserArgs,
}

impl User {
    /// Create a user
    pub fn new(args: UserArgs) -> Self {
        User { args }
    }

    pub fn name(&self) -> &str {
        &self.args.name
    }

    pub fn display_name(&self) -> &str {
        &self.args.display_name
    }

    pub fn created_by(&self) -> &str {
        &self.args.created_by
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.args.date_created
    }

    pub fn last_connection(&self) -> Option<DateTime<Utc>> {
        self.args.last_connection
    }

    pub fn access(&self) -> &str {
        &self.args.access
    }
}

fn user_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .optional("display-name", string(), "")
        .required("created-by", string())
        .required("date-created", time())
        .omit("last-connection", time())
        .required("access", string())
}

static USER_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("user", &[(1, user_v1)]));

impl VersionedEntity for User {
    const KIND: &'static str = "user";

    fn registry() -> &'static SchemaRegistry {
        &USER_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(User::new(UserArgs {
            name: fields.string("name")?,
            display_name: fields.string("display-name")?,
            created_by: fields.string("created-by")?,
            date_created: fields.time("date-created")?,
            last_connection: fields.opt_time("last-connection")?,
            access: fields.string("access")?,
        }))
    }
}

impl ToWire for User {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        MapBuilder::new()
            .field("name", a.name.as_str())
            .nonempty("display-name", &a.display_name)
            .field("created-by", a.created_by.as_str())
            .field("date-created", a.date_created)
            .opt("last-connection", a.last_connection)
            .field("access", a.access.as_str())
            .into_value()
    }
}

/// Arguments for [`SshHostKey`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshHostKeyArgs {
    /// Machine the keys belong to
    pub machine_id: String,
    /// Public host keys
    pub keys: Vec<String>,
}

/// A machine's SSH host keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshHostKey {
    args: SshHostKeyArgs,
}

impl SshHostKey {
    /// Create a record
    pub fn new(args: SshHostKeyArgs) -> Self {
        SshHostKey { args }
    }

    pub fn machine_id(&self) -> &str {
        &self.args.machine_id
    }

    pub fn keys(&self) -> &[String] {
        &self.args.keys
    }
}

fn host_key_v1() -> FieldSchema {
    FieldSchema::new()
        .required("machine-id", string())
        .required("keys", list(string()))
}

static HOST_KEY_REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("ssh host key", &[(1, host_key_v1)]));

impl VersionedEntity for SshHostKey {
    const KIND: &'static str = "ssh host key";

    fn registry() -> &'static SchemaRegistry {
        &HOST_KEY_REGISTRY
    }

    fn import(fields: Fields, _version: u32) -> Result<Self> {
        Ok(SshHostKey::new(SshHostKeyArgs {
            machine_id: fields.string("machine-id")?,
            keys: fields.strings("keys")?,
        }))
    }
}

impl ToWire for SshHostKey {
    fn to_wire(&self) -> Value {
        MapBuilder::new()
            .field("machine-id", self.args.machine_id.as_str())
            .strings("keys", &self.args.keys)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&USER_REGISTRY, &HOST_KEY_REGISTRY]
}
