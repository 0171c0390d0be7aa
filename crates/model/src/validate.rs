//! Cross-entity consistency checks
//!
//! Import only checks shapes. [`Model::validate`] checks that entities agree
//! with each other: units sit on machines that exist, relation endpoints name
//! real applications, devices and addresses hang off real machines. Checks run
//! in a fixed order and the first violation is returned.

use crate::link_layer_device::LinkLayerDevice;
use crate::model::Model;
use modeldoc_core::tag::machine_parent;
use modeldoc_core::{Error, Result, Tag};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use tracing::debug;

/// Device type container devices must be parented to on their host
const BRIDGE: &str = "bridge";

/// Parse `addr/prefix`, checking the prefix fits the address family
pub(crate) fn parse_cidr(s: &str) -> Option<(IpAddr, u8)> {
    let (addr, prefix) = s.split_once('/')?;
    let addr: IpAddr = addr.parse().ok()?;
    let prefix: u8 = prefix.parse().ok()?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    (prefix <= max).then_some((addr, prefix))
}

/// Split a device global key `m#<machine>#d#<device>`
fn parse_device_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix("m#")?;
    let (machine, device) = rest.split_once("#d#")?;
    if machine.is_empty() || device.is_empty() {
        return None;
    }
    Some((machine, device))
}

struct Index<'a> {
    machines: BTreeSet<&'a str>,
    units: BTreeSet<&'a str>,
    storages: BTreeSet<&'a str>,
    devices: BTreeMap<(&'a str, &'a str), &'a LinkLayerDevice>,
}

impl<'a> Index<'a> {
    fn new(model: &'a Model) -> Self {
        Index {
            machines: model.all_machines().into_iter().map(|m| m.id()).collect(),
            units: model
                .applications()
                .iter()
                .flat_map(|a| a.units())
                .map(|u| u.name())
                .collect(),
            storages: model.storages().iter().map(|s| s.id()).collect(),
            devices: model
                .link_layer_devices()
                .iter()
                .map(|d| ((d.machine_id(), d.name()), d))
                .collect(),
        }
    }

    fn check_host(&self, host: &Tag, owner: &str) -> Result<()> {
        let known = match host {
            Tag::Machine(id) => self.machines.contains(id.as_str()),
            Tag::Unit(name) => self.units.contains(name.as_str()),
            other => {
                return Err(Error::validation(format!(
                    "{owner} attached to {other}, expected a machine or unit"
                )))
            }
        };
        if known {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "{owner} attached to unknown {} {:?}",
                host.kind(),
                host.id()
            )))
        }
    }
}

impl Model {
    /// Check cross-entity invariants
    ///
    /// Order: model identity and status, machines, applications and their
    /// units, unit placement, relations, subnets, link-layer devices, IP
    /// addresses, storage, volumes, filesystems.
    pub fn validate(&self) -> Result<()> {
        debug!(uuid = ?self.uuid(), "validating model");
        self.validate_identity()?;
        for machine in self.machines() {
            machine.validate()?;
        }
        for application in self.applications() {
            application.validate()?;
        }
        let index = Index::new(self);
        self.validate_unit_machines(&index)?;
        self.validate_relations()?;
        self.validate_subnets()?;
        self.validate_link_layer_devices(&index)?;
        self.validate_ip_addresses(&index)?;
        self.validate_storage(&index)?;
        Ok(())
    }

    fn validate_identity(&self) -> Result<()> {
        let uuid = self
            .uuid()
            .ok_or_else(|| Error::validation("model missing uuid"))?;
        uuid::Uuid::parse_str(uuid).map_err(|_| Error::not_valid(format!("model uuid {uuid:?}")))?;
        if self.status().is_none() {
            return Err(Error::validation("model missing status"));
        }
        Ok(())
    }

    fn validate_unit_machines(&self, index: &Index<'_>) -> Result<()> {
        for unit in self.applications().iter().flat_map(|a| a.units()) {
            if !unit.machine().is_empty() && !index.machines.contains(unit.machine()) {
                return Err(Error::validation(format!(
                    "unit {:?} assigned to unknown machine {:?}",
                    unit.name(),
                    unit.machine()
                )));
            }
        }
        Ok(())
    }

    fn validate_relations(&self) -> Result<()> {
        for relation in self.relations() {
            for endpoint in relation.endpoints() {
                let app_name = endpoint.application_name();
                let application = self
                    .applications()
                    .iter()
                    .find(|a| a.name() == app_name)
                    .ok_or_else(|| {
                        Error::validation(format!(
                            "unknown application {app_name:?} for relation {}",
                            relation.id()
                        ))
                    })?;
                let units: BTreeSet<&str> = application.units().iter().map(|u| u.name()).collect();
                let with_settings: BTreeSet<&str> =
                    endpoint.unit_settings().keys().map(String::as_str).collect();
                if let Some(missing) = units.difference(&with_settings).next() {
                    return Err(Error::validation(format!(
                        "missing relation settings for unit {missing:?} in relation {}",
                        relation.id()
                    )));
                }
                if let Some(extra) = with_settings.difference(&units).next() {
                    return Err(Error::validation(format!(
                        "settings for unknown unit {extra:?} in relation {}",
                        relation.id()
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_subnets(&self) -> Result<()> {
        let space_ids: BTreeSet<&str> = self.spaces().iter().map(|s| s.id()).collect();
        for subnet in self.subnets() {
            if !subnet.space_id().is_empty() && !space_ids.contains(subnet.space_id()) {
                return Err(Error::validation(format!(
                    "subnet {:?} references unknown space {:?}",
                    subnet.cidr(),
                    subnet.space_id()
                )));
            }
        }
        Ok(())
    }

    fn validate_link_layer_devices(&self, index: &Index<'_>) -> Result<()> {
        for device in self.link_layer_devices() {
            let machine = device.machine_id();
            let name = device.name();
            if !index.machines.contains(machine) {
                return Err(Error::validation(format!(
                    "device {name:?} on unknown machine {machine:?}"
                )));
            }
            let parent = device.parent_name();
            if parent.is_empty() {
                continue;
            }
            match parse_device_key(parent) {
                Some((host, parent_name)) => {
                    if machine_parent(machine) != Some(host) {
                        return Err(Error::validation(format!(
                            "device {name:?} on machine {machine:?} has parent on {host:?}, which is not its host"
                        )));
                    }
                    match index.devices.get(&(host, parent_name)) {
                        None => {
                            return Err(Error::validation(format!(
                                "device {name:?} on machine {machine:?} has unknown parent {parent:?}"
                            )))
                        }
                        Some(p) if p.type_() != BRIDGE => {
                            return Err(Error::validation(format!(
                                "device {name:?} on machine {machine:?} has parent {parent:?} of type {:?}, expected {BRIDGE:?}",
                                p.type_()
                            )))
                        }
                        Some(_) => {}
                    }
                }
                None if parent.contains('#') => {
                    return Err(Error::not_valid(format!("device parent {parent:?}")));
                }
                None => {
                    if !index.devices.contains_key(&(machine, parent)) {
                        return Err(Error::validation(format!(
                            "device {name:?} on machine {machine:?} has unknown parent {parent:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_ip_addresses(&self, index: &Index<'_>) -> Result<()> {
        for address in self.ip_addresses() {
            let value = address.value();
            if value.parse::<IpAddr>().is_err() {
                return Err(Error::not_valid(format!("IP address {value:?}")));
            }
            let machine = address.machine_id();
            if !index.machines.contains(machine) {
                return Err(Error::validation(format!(
                    "IP address {value:?} on unknown machine {machine:?}"
                )));
            }
            if !index.devices.contains_key(&(machine, address.device_name())) {
                return Err(Error::validation(format!(
                    "IP address {value:?} on unknown device {:?} of machine {machine:?}",
                    address.device_name()
                )));
            }
            if parse_cidr(address.subnet_cidr()).is_none() {
                return Err(Error::not_valid(format!(
                    "IP address {value:?} subnet CIDR {:?}",
                    address.subnet_cidr()
                )));
            }
            let gateway = address.gateway_address();
            if !gateway.is_empty() && gateway.parse::<IpAddr>().is_err() {
                return Err(Error::not_valid(format!(
                    "IP address {value:?} gateway {gateway:?}"
                )));
            }
        }
        Ok(())
    }

    fn validate_storage(&self, index: &Index<'_>) -> Result<()> {
        for storage in self.storages() {
            let id = storage.id();
            if let Some(owner) = storage.unit_owner() {
                if !index.units.contains(owner) {
                    return Err(Error::validation(format!(
                        "storage {id:?} owned by unknown unit {owner:?}"
                    )));
                }
            }
            for unit in storage.attachments() {
                if !index.units.contains(unit.as_str()) {
                    return Err(Error::validation(format!(
                        "storage {id:?} attached to unknown unit {unit:?}"
                    )));
                }
            }
        }
        for volume in self.volumes() {
            let owner = format!("volume {:?}", volume.id());
            if !volume.storage_id().is_empty() && !index.storages.contains(volume.storage_id()) {
                return Err(Error::validation(format!(
                    "{owner} backs unknown storage {:?}",
                    volume.storage_id()
                )));
            }
            for attachment in volume.attachments() {
                index.check_host(attachment.host(), &owner)?;
            }
        }
        for filesystem in self.filesystems() {
            let owner = format!("filesystem {:?}", filesystem.id());
            if !filesystem.storage_id().is_empty()
                && !index.storages.contains(filesystem.storage_id())
            {
                return Err(Error::validation(format!(
                    "{owner} backs unknown storage {:?}",
                    filesystem.storage_id()
                )));
            }
            for attachment in filesystem.attachments() {
                index.check_host(attachment.host(), &owner)?;
            }
        }
        Ok(())
    }
}
