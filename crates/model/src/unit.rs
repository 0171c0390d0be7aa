//! Units of an application
//!
//! Units carry two independent status streams (agent and workload), each with
//! its own history, plus a workload version history. Version 2 made the
//! machine optional for container-based models and added the provider
//! container record. Version 3 added uniter state, including the
//! integer-keyed relation state map.

use crate::agent_tools::{AgentTools, AgentToolsArgs};
use crate::cloud_container::{CloudContainer, CloudContainerArgs};
use crate::constraints::{Constraints, ConstraintsArgs};
use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use modeldoc_core::tag::{is_valid_unit_name, unit_application};
use modeldoc_core::{Error, Map, Result, Value};
use modeldoc_schema::checker::{any, envelope, int, list, map, string, string_map};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Arguments for [`Unit`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitArgs {
    /// Unit name (`mysql/0`)
    pub name: String,
    /// Hosting machine id; empty for container-based models
    pub machine: String,
    /// Principal unit, for subordinates
    pub principal: String,
    /// Subordinate unit names
    pub subordinates: Vec<String>,
    /// Reported workload version
    pub workload_version: String,
    /// Agent password hash
    pub password_hash: String,
    /// Meter status code
    pub meter_status_code: String,
    /// Meter status info
    pub meter_status_info: String,
    /// Charm-managed state
    pub charm_state: BTreeMap<String, String>,
    /// Per-relation uniter state keyed by relation id
    pub relation_state: BTreeMap<i64, String>,
    /// Serialized uniter state
    pub uniter_state: String,
    /// Serialized storage state
    pub storage_state: String,
}

/// A unit of an application
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    args: UnitArgs,
    tools: Option<AgentTools>,
    agent_status: Option<StatusPoint>,
    agent_status_history: StatusHistory,
    workload_status: Option<StatusPoint>,
    workload_status_history: StatusHistory,
    workload_version_history: StatusHistory,
    cloud_container: Option<CloudContainer>,
    annotations: BTreeMap<String, String>,
    constraints: Option<Constraints>,
}

impl Unit {
    /// Create a unit
    pub fn new(args: UnitArgs) -> Self {
        Unit {
            args,
            tools: None,
            agent_status: None,
            agent_status_history: StatusHistory::default(),
            workload_status: None,
            workload_status_history: StatusHistory::default(),
            workload_version_history: StatusHistory::default(),
            cloud_container: None,
            annotations: BTreeMap::new(),
            constraints: None,
        }
    }

    /// Unit name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Name of the application the unit belongs to
    pub fn application_name(&self) -> &str {
        unit_application(&self.args.name)
    }

    /// Hosting machine id
    pub fn machine(&self) -> &str {
        &self.args.machine
    }

    /// Principal unit
    pub fn principal(&self) -> &str {
        &self.args.principal
    }

    /// Subordinate unit names
    pub fn subordinates(&self) -> &[String] {
        &self.args.subordinates
    }

    /// Reported workload version
    pub fn workload_version(&self) -> &str {
        &self.args.workload_version
    }

    /// Agent password hash
    pub fn password_hash(&self) -> &str {
        &self.args.password_hash
    }

    /// Meter status code
    pub fn meter_status_code(&self) -> &str {
        &self.args.meter_status_code
    }

    /// Meter status info
    pub fn meter_status_info(&self) -> &str {
        &self.args.meter_status_info
    }

    /// Charm-managed state
    pub fn charm_state(&self) -> &BTreeMap<String, String> {
        &self.args.charm_state
    }

    /// Per-relation uniter state
    pub fn relation_state(&self) -> &BTreeMap<i64, String> {
        &self.args.relation_state
    }

    /// Serialized uniter state
    pub fn uniter_state(&self) -> &str {
        &self.args.uniter_state
    }

    /// Serialized storage state
    pub fn storage_state(&self) -> &str {
        &self.args.storage_state
    }

    /// Agent tools
    pub fn tools(&self) -> Option<&AgentTools> {
        self.tools.as_ref()
    }

    /// Set the agent tools
    pub fn set_tools(&mut self, args: AgentToolsArgs) {
        self.tools = Some(AgentTools::new(args));
    }

    /// Agent status
    pub fn agent_status(&self) -> Option<&StatusPoint> {
        self.agent_status.as_ref()
    }

    /// Set the agent status
    pub fn set_agent_status(&mut self, args: StatusArgs) {
        self.agent_status = Some(StatusPoint::new(args));
    }

    /// Earlier agent statuses
    pub fn agent_status_history(&self) -> &[StatusPoint] {
        self.agent_status_history.status_history()
    }

    /// Replace the earlier agent statuses
    pub fn set_agent_status_history(&mut self, args: Vec<StatusArgs>) {
        self.agent_status_history.set_status_history(args);
    }

    /// Workload status
    pub fn workload_status(&self) -> Option<&StatusPoint> {
        self.workload_status.as_ref()
    }

    /// Set the workload status
    pub fn set_workload_status(&mut self, args: StatusArgs) {
        self.workload_status = Some(StatusPoint::new(args));
    }

    /// Earlier workload statuses
    pub fn workload_status_history(&self) -> &[StatusPoint] {
        self.workload_status_history.status_history()
    }

    /// Replace the earlier workload statuses
    pub fn set_workload_status_history(&mut self, args: Vec<StatusArgs>) {
        self.workload_status_history.set_status_history(args);
    }

    /// Earlier workload versions
    pub fn workload_version_history(&self) -> &[StatusPoint] {
        self.workload_version_history.status_history()
    }

    /// Replace the earlier workload versions
    pub fn set_workload_version_history(&mut self, args: Vec<StatusArgs>) {
        self.workload_version_history.set_status_history(args);
    }

    /// Provider container
    pub fn cloud_container(&self) -> Option<&CloudContainer> {
        self.cloud_container.as_ref()
    }

    /// Set the provider container
    pub fn set_cloud_container(&mut self, args: CloudContainerArgs) {
        self.cloud_container = Some(CloudContainer::new(args));
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

    /// Check the unit's own invariants
    pub fn validate(&self) -> Result<()> {
        if !is_valid_unit_name(&self.args.name) {
            return Err(Error::not_valid(format!("unit name {:?}", self.args.name)));
        }
        if self.agent_status.is_none() {
            return Err(Error::validation(format!(
                "unit {:?} missing agent status",
                self.args.name
            )));
        }
        if self.workload_status.is_none() {
            return Err(Error::validation(format!(
                "unit {:?} missing workload status",
                self.args.name
            )));
        }
        Ok(())
    }
}

fn unit_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .required("machine", string())
        .required("agent-status", envelope())
        .required("agent-status-history", envelope())
        .required("workload-status", envelope())
        .required("workload-status-history", envelope())
        .optional("workload-version", string(), "")
        .omit("workload-version-history", any())
        .optional("principal", string(), "")
        .omit("subordinates", list(string()))
        .required("password-hash", string())
        .omit("tools", any())
        .optional("meter-status-code", string(), "")
        .optional("meter-status-info", string(), "")
        .omit("annotations", string_map(string()))
        .omit("constraints", any())
}

fn unit_v2() -> FieldSchema {
    unit_v1()
        .omit("cloud-container", any())
        .optional("machine", string(), "")
}

fn unit_v3() -> FieldSchema {
    unit_v2()
        .omit("charm-state", string_map(string()))
        .omit("relation-state", map(int(), string()))
        .optional("uniter-state", string(), "")
        .optional("storage-state", string(), "")
}

static REGISTRY: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::new("unit", &[(1, unit_v1), (2, unit_v2), (3, unit_v3)]));

fn relation_state(fields: &Fields) -> Result<BTreeMap<i64, String>> {
    fields
        .map("relation-state")?
        .into_iter()
        .map(|(k, v)| {
            let id = k
                .parse::<i64>()
                .map_err(|_| Error::mismatch(format!("relation-state.{k}"), "int", "string"))?;
            match v {
                Value::String(s) => Ok((id, s)),
                other => Err(Error::mismatch(
                    format!("relation-state.{k}"),
                    "string",
                    other.describe(),
                )),
            }
        })
        .collect()
}

impl VersionedEntity for Unit {
    const KIND: &'static str = "unit";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let mut args = UnitArgs {
            name: fields.string("name")?,
            machine: fields.string("machine")?,
            principal: fields.string("principal")?,
            subordinates: fields.strings("subordinates")?,
            workload_version: fields.string("workload-version")?,
            password_hash: fields.string("password-hash")?,
            meter_status_code: fields.string("meter-status-code")?,
            meter_status_info: fields.string("meter-status-info")?,
            ..Default::default()
        };
        if version >= 3 {
            args.charm_state = fields.string_map("charm-state")?;
            args.relation_state = relation_state(&fields)?;
            args.uniter_state = fields.string("uniter-state")?;
            args.storage_state = fields.string("storage-state")?;
        }
        let mut unit = Unit::new(args);
        unit.tools = fields.embedded::<AgentTools>("tools", "tools")?;
        unit.agent_status = Some(fields.required_embedded::<StatusPoint>("agent-status", "status")?);
        unit.agent_status_history = StatusHistory::import(&fields, "agent-status-history")?;
        unit.workload_status =
            Some(fields.required_embedded::<StatusPoint>("workload-status", "status")?);
        unit.workload_status_history = StatusHistory::import(&fields, "workload-status-history")?;
        unit.workload_version_history =
            StatusHistory::import(&fields, "workload-version-history")?;
        unit.annotations = fields.string_map("annotations")?;
        unit.constraints = Constraints::import_optional(&fields, "constraints")?;
        if version >= 2 {
            unit.cloud_container = fields.embedded::<CloudContainer>("cloud-container", "container")?;
        }
        Ok(unit)
    }
}

impl ToWire for Unit {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let relation_state: Map = a
            .relation_state
            .iter()
            .map(|(id, state)| (id.to_string(), Value::from(state.as_str())))
            .collect();
        MapBuilder::new()
            .field("name", a.name.as_str())
            .nonempty("machine", &a.machine)
            .opt_embedded("agent-status", "status", self.agent_status.as_ref())
            .field("agent-status-history", self.agent_status_history.to_wire())
            .opt_embedded("workload-status", "status", self.workload_status.as_ref())
            .field(
                "workload-status-history",
                self.workload_status_history.to_wire(),
            )
            .nonempty("workload-version", &a.workload_version)
            .field(
                "workload-version-history",
                self.workload_version_history.to_wire(),
            )
            .nonempty("principal", &a.principal)
            .nonempty_strings("subordinates", &a.subordinates)
            .field("password-hash", a.password_hash.as_str())
            .opt_embedded("tools", "tools", self.tools.as_ref())
            .nonempty("meter-status-code", &a.meter_status_code)
            .nonempty("meter-status-info", &a.meter_status_info)
            .nonempty_map("annotations", &self.annotations)
            .opt_embedded("constraints", "constraints", self.constraints.as_ref())
            .opt_embedded("cloud-container", "container", self.cloud_container.as_ref())
            .nonempty_map("charm-state", &a.charm_state)
            .nonempty_values("relation-state", &relation_state)
            .nonempty("uniter-state", &a.uniter_state)
            .nonempty("storage-state", &a.storage_state)
            .into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use modeldoc_schema::{collection_envelope, import_collection};

    fn status(value: &str) -> StatusArgs {
        StatusArgs {
            value: value.into(),
            message: String::new(),
            data: Map::new(),
            updated: Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap(),
            never_set: false,
        }
    }

    fn unit() -> Unit {
        let mut relation_state = BTreeMap::new();
        relation_state.insert(5, "joined".to_string());
        relation_state.insert(12, "departed".to_string());
        let mut u = Unit::new(UnitArgs {
            name: "mysql/0".into(),
            machine: "0".into(),
            workload_version: "8.0".into(),
            password_hash: "secret".into(),
            relation_state,
            uniter_state: "uniter".into(),
            ..Default::default()
        });
        u.set_agent_status(status("idle"));
        u.set_workload_status(status("active"));
        u.set_agent_status_history(vec![status("executing")]);
        u.set_tools(AgentToolsArgs {
            version: "3.1.0-ubuntu-amd64".into(),
            ..Default::default()
        });
        u
    }

    fn at_version(version: i64, units: &[Unit]) -> Value {
        let mut env = collection_envelope("units", units);
        if let Value::Map(m) = &mut env {
            m.insert("version".into(), Value::Int(version));
        }
        env
    }

    #[test]
    fn test_unit_round_trip() {
        let units = vec![unit()];
        let back = import_collection::<Unit>(&collection_envelope("units", &units), "units").unwrap();
        assert_eq!(back, units);
        assert_eq!(back[0].relation_state()[&12], "departed");
        assert_eq!(back[0].application_name(), "mysql");
    }

    #[test]
    fn test_v2_drops_uniter_state() {
        let back = import_collection::<Unit>(&at_version(2, &[unit()]), "units").unwrap();
        assert!(back[0].relation_state().is_empty());
        assert_eq!(back[0].uniter_state(), "");
        assert_eq!(back[0].workload_version(), "8.0");
    }

    #[test]
    fn test_v1_requires_machine() {
        let mut u = unit();
        u.args.machine = String::new();
        let err = import_collection::<Unit>(&at_version(1, &[u.clone()]), "units").unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().ends_with("machine: expected string, got nothing"));
        assert!(import_collection::<Unit>(&at_version(2, &[u]), "units").is_ok());
    }

    #[test]
    fn test_relation_state_keys_must_be_integers() {
        let mut env = collection_envelope("units", &[unit()]);
        if let Value::Map(m) = &mut env {
            if let Some(Value::List(items)) = m.get_mut("units") {
                if let Value::Map(u) = &mut items[0] {
                    let mut bad = Map::new();
                    bad.insert("db".into(), Value::from("joined"));
                    u.insert("relation-state".into(), Value::Map(bad));
                }
            }
        }
        let err = import_collection::<Unit>(&env, "units").unwrap_err();
        assert!(err
            .to_string()
            .ends_with("relation-state.db: expected int, got string(\"db\")"));
    }

    #[test]
    fn test_validate() {
        assert!(unit().validate().is_ok());
        let bare = Unit::new(UnitArgs {
            name: "mysql/1".into(),
            ..Default::default()
        });
        assert_eq!(
            bare.validate().unwrap_err().to_string(),
            "unit \"mysql/1\" missing agent status"
        );
        let misnamed = Unit::new(UnitArgs {
            name: "mysql".into(),
            ..Default::default()
        });
        assert!(misnamed.validate().unwrap_err().is_not_valid());
    }
}
