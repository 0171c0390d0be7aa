//! Shared fixtures for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;

pub use modeldoc::{
    deserialize, deserialize_with, from_value, serialize, serialize_with, AgentToolsArgs,
    ApplicationArgs, CloudInstanceArgs, DescriptionConfig, EndpointArgs, Error, FilesystemArgs,
    FilesystemAttachmentArgs, IpAddressArgs, LinkLayerDeviceArgs, Map, MachineArgs, Model,
    ModelArgs, ModelType, RelationArgs, SpaceArgs, StatusArgs, StorageArgs, SubnetArgs, Tag,
    UnitArgs, Value, VolumeArgs, VolumeAttachmentArgs,
};

pub const MODEL_UUID: &str = "bd3fae18-5ea1-4bc5-8837-45400cf1f8f6";

// ============================================================================
// Small builders
// ============================================================================

pub fn timestamp(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 12, minute, 0).unwrap()
}

pub fn status(value: &str) -> StatusArgs {
    StatusArgs {
        value: value.into(),
        message: String::new(),
        data: Map::new(),
        updated: timestamp(0),
        never_set: false,
    }
}

pub fn status_message(value: &str, message: &str, minute: u32) -> StatusArgs {
    StatusArgs {
        value: value.into(),
        message: message.into(),
        data: Map::new(),
        updated: timestamp(minute),
        never_set: false,
    }
}

pub fn tools(version: &str) -> AgentToolsArgs {
    AgentToolsArgs {
        version: version.into(),
        url: format!("https://streams.example.com/agent/{version}.tgz"),
        sha256: "0a1b2c3d".into(),
        size: 31_457_280,
    }
}

pub fn settings(pairs: &[(&str, &str)]) -> Map {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::from(*v)))
        .collect()
}

/// Model with identity and status only
pub fn empty_model() -> Model {
    let mut config = Map::new();
    config.insert("name".into(), Value::from("production"));
    config.insert("uuid".into(), Value::from(MODEL_UUID));
    let mut model = Model::new(ModelArgs {
        type_: ModelType::Iaas,
        owner: "admin".into(),
        config,
        latest_tools_version: "3.4.2".into(),
        environ_version: 1,
        cloud: "lxd".into(),
        cloud_region: "localhost".into(),
        ..Default::default()
    });
    model.set_status(status("available"));
    model
}

// ============================================================================
// Fully populated model
// ============================================================================

/// A model where every cross-entity reference resolves
///
/// Machine `0` hosts container `0/lxd/0`. `wordpress` has two units, one on
/// each; `mysql` has one on the host. The container's `eth0` is parented to
/// the host bridge `br-eth0`. Storage `data/0` belongs to `wordpress/0` and is
/// backed by volume `0` and filesystem `0`.
pub fn populated_model() -> Model {
    let mut model = empty_model();
    model.set_sla("essential", "admin", "");
    model.set_meter_status("GREEN", "");
    model.set_sequence("machine", 1);
    model.set_sequence("application-wordpress", 2);
    model.set_status_history(vec![
        status_message("busy", "migrating", 1),
        status_message("available", "", 2),
    ]);

    add_machines(&mut model);
    add_applications(&mut model);
    add_relation(&mut model);
    add_network(&mut model);
    add_storage(&mut model);
    model
}

fn add_machines(model: &mut Model) {
    let host = model.add_machine(MachineArgs {
        id: "0".into(),
        nonce: "machine-nonce".into(),
        password_hash: "pw-0".into(),
        base: "ubuntu@22.04".into(),
        jobs: vec!["host-units".into()],
        supported_containers: Some(vec!["lxd".into()]),
        ..Default::default()
    });
    host.set_status(status("started"));
    host.set_tools(tools("3.4.2-ubuntu-amd64"));
    let instance = host.set_instance(CloudInstanceArgs {
        instance_id: "juju-bd3fae-0".into(),
        architecture: "amd64".into(),
        memory: Some(4096),
        cpu_cores: Some(2),
        ..Default::default()
    });
    instance.set_status(status("running"));

    let container = host.add_container(MachineArgs {
        id: "0/lxd/0".into(),
        nonce: "container-nonce".into(),
        password_hash: "pw-0-lxd-0".into(),
        base: "ubuntu@22.04".into(),
        container_type: "lxd".into(),
        jobs: vec!["host-units".into()],
        ..Default::default()
    });
    container.set_status(status("started"));
}

fn add_applications(model: &mut Model) {
    let wordpress = model.add_application(ApplicationArgs {
        name: "wordpress".into(),
        charm_url: "ch:amd64/jammy/wordpress-12".into(),
        channel: "stable".into(),
        exposed: true,
        settings: settings(&[("blog-title", "Hello")]),
        leader: "wordpress/0".into(),
        leadership_settings: settings(&[("db-host", "10.0.0.2")]),
        ..Default::default()
    });
    wordpress.set_status(status("active"));
    for (name, machine) in [("wordpress/0", "0"), ("wordpress/1", "0/lxd/0")] {
        let unit = wordpress.add_unit(UnitArgs {
            name: name.into(),
            machine: machine.into(),
            workload_version: "6.4".into(),
            ..Default::default()
        });
        unit.set_agent_status(status("idle"));
        unit.set_workload_status(status_message("active", "serving", 3));
        unit.set_tools(tools("3.4.2-ubuntu-amd64"));
    }

    let mysql = model.add_application(ApplicationArgs {
        name: "mysql".into(),
        charm_url: "ch:amd64/jammy/mysql-58".into(),
        leader: "mysql/0".into(),
        ..Default::default()
    });
    mysql.set_status(status("active"));
    let unit = mysql.add_unit(UnitArgs {
        name: "mysql/0".into(),
        machine: "0".into(),
        ..Default::default()
    });
    unit.set_agent_status(status("idle"));
    unit.set_workload_status(status("active"));
}

fn add_relation(model: &mut Model) {
    let relation = model.add_relation(RelationArgs {
        id: 1,
        key: "wordpress:db mysql:server".into(),
        ..Default::default()
    });
    relation.set_status(status("joined"));
    let wordpress = relation.add_endpoint(EndpointArgs {
        application_name: "wordpress".into(),
        name: "db".into(),
        role: "requirer".into(),
        interface: "mysql".into(),
        limit: 1,
        scope: "global".into(),
        ..Default::default()
    });
    wordpress.set_unit_settings("wordpress/0", settings(&[("ingress-address", "10.0.0.2")]));
    wordpress.set_unit_settings("wordpress/1", settings(&[("ingress-address", "10.0.0.3")]));
    let mysql = relation.add_endpoint(EndpointArgs {
        application_name: "mysql".into(),
        name: "server".into(),
        role: "provider".into(),
        interface: "mysql".into(),
        scope: "global".into(),
        ..Default::default()
    });
    mysql.set_unit_settings("mysql/0", settings(&[("database", "wordpress")]));
}

fn add_network(model: &mut Model) {
    model.add_space(SpaceArgs {
        id: "1".into(),
        name: "alpha".into(),
        ..Default::default()
    });
    model.add_subnet(SubnetArgs {
        id: "3".into(),
        cidr: "10.0.0.0/24".into(),
        space_id: "1".into(),
        space_name: "alpha".into(),
        availability_zones: vec!["zone-a".into(), "zone-b".into()],
        ..Default::default()
    });

    model.add_link_layer_device(LinkLayerDeviceArgs {
        name: "eth0".into(),
        mtu: 1500,
        machine_id: "0".into(),
        type_: "ethernet".into(),
        mac_address: "00:16:3e:00:00:01".into(),
        is_autostart: true,
        is_up: true,
        ..Default::default()
    });
    model.add_link_layer_device(LinkLayerDeviceArgs {
        name: "br-eth0".into(),
        mtu: 1500,
        machine_id: "0".into(),
        type_: "bridge".into(),
        is_autostart: true,
        is_up: true,
        parent_name: "eth0".into(),
        ..Default::default()
    });
    model.add_link_layer_device(LinkLayerDeviceArgs {
        name: "eth0".into(),
        mtu: 1500,
        machine_id: "0/lxd/0".into(),
        type_: "ethernet".into(),
        mac_address: "00:16:3e:00:00:02".into(),
        is_up: true,
        parent_name: "m#0#d#br-eth0".into(),
        ..Default::default()
    });

    model.add_ip_address(IpAddressArgs {
        device_name: "br-eth0".into(),
        machine_id: "0".into(),
        subnet_cidr: "10.0.0.0/24".into(),
        config_method: "static".into(),
        value: "10.0.0.2".into(),
        dns_servers: vec!["10.0.0.1".into()],
        gateway_address: "10.0.0.1".into(),
        is_default_gateway: true,
        ..Default::default()
    });
    model.add_ip_address(IpAddressArgs {
        device_name: "eth0".into(),
        machine_id: "0/lxd/0".into(),
        subnet_cidr: "10.0.0.0/24".into(),
        config_method: "dynamic".into(),
        value: "10.0.0.3".into(),
        ..Default::default()
    });
}

fn add_storage(model: &mut Model) {
    model.add_storage(StorageArgs {
        id: "data/0".into(),
        kind: "filesystem".into(),
        unit_owner: "wordpress/0".into(),
        name: "data".into(),
        attachments: vec!["wordpress/0".into()],
        constraints: None,
    });

    let volume = model.add_volume(VolumeArgs {
        id: "0".into(),
        storage_id: "data/0".into(),
        provisioned: true,
        size: 10240,
        pool: "lxd".into(),
        volume_id: "vol-0".into(),
        ..Default::default()
    });
    volume.set_status(status("attached"));
    volume.add_attachment(VolumeAttachmentArgs {
        host: Tag::Machine("0".into()),
        provisioned: true,
        read_only: false,
        device_name: "sdb".into(),
        device_link: String::new(),
        bus_address: String::new(),
    });

    let filesystem = model.add_filesystem(FilesystemArgs {
        id: "0".into(),
        storage_id: "data/0".into(),
        volume_id: "0".into(),
        provisioned: true,
        size: 10240,
        pool: "lxd".into(),
        filesystem_id: "fs-0".into(),
    });
    filesystem.set_status(status("attached"));
    filesystem.add_attachment(FilesystemAttachmentArgs {
        host: Tag::Unit("wordpress/0".into()),
        provisioned: true,
        mount_point: "/srv/data".into(),
        read_only: false,
    });
}

// ============================================================================
// Document surgery
// ============================================================================

/// Mutable access to the map at `path` inside a document tree
///
/// Path segments are map keys, or list indices written as decimal numbers.
pub fn map_at<'a>(doc: &'a mut Value, path: &[&str]) -> &'a mut Map {
    let mut cur = doc;
    for seg in path {
        cur = match cur {
            Value::Map(m) => m
                .get_mut(*seg)
                .unwrap_or_else(|| panic!("no key {seg:?} in document")),
            Value::List(items) => {
                let i: usize = seg.parse().unwrap_or_else(|_| panic!("bad index {seg:?}"));
                &mut items[i]
            }
            other => panic!("cannot descend into {} at {seg:?}", other.type_name()),
        };
    }
    match cur {
        Value::Map(m) => m,
        other => panic!("expected map, found {}", other.type_name()),
    }
}

/// Rewrite the `version` of the envelope at `path`
pub fn set_version(doc: &mut Value, path: &[&str], version: i64) {
    map_at(doc, path).insert("version".into(), Value::Int(version));
}

pub fn wire(model: &Model) -> Value {
    use modeldoc::schema::ToWire;
    model.to_wire()
}
