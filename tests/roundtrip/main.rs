//! Export then import through both codecs.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use proptest::prelude::*;

fn yaml_round_trip(model: &Model) -> Model {
    let bytes = serialize(model).unwrap();
    deserialize(&bytes).unwrap()
}

fn json_round_trip(model: &Model) -> Model {
    let config = DescriptionConfig::json();
    let bytes = serialize_with(model, &config).unwrap();
    deserialize_with(&bytes, &config).unwrap()
}

#[test]
fn test_populated_model_is_valid() {
    populated_model().validate().unwrap();
}

#[test]
fn test_yaml_round_trip_is_lossless() {
    let model = populated_model();
    assert_eq!(yaml_round_trip(&model), model);
}

#[test]
fn test_json_round_trip_is_lossless() {
    let model = populated_model();
    assert_eq!(json_round_trip(&model), model);
}

#[test]
fn test_strict_import_of_valid_document() {
    let model = populated_model();
    let config = DescriptionConfig::strict();
    let bytes = serialize_with(&model, &config).unwrap();
    assert_eq!(deserialize_with(&bytes, &config).unwrap(), model);
}

#[test]
fn test_reserialization_is_byte_identical() {
    let model = populated_model();
    let first = serialize(&model).unwrap();
    let second = serialize(&deserialize(&first).unwrap()).unwrap();
    assert_eq!(first, second);

    let config = DescriptionConfig::json();
    let first = serialize_with(&model, &config).unwrap();
    let second = serialize_with(&deserialize_with(&first, &config).unwrap(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_application_with_unit_survives() {
    let model = populated_model();
    let back = yaml_round_trip(&model);

    let names: Vec<&str> = back.applications().iter().map(|a| a.name()).collect();
    assert_eq!(names, ["wordpress", "mysql"]);

    let wordpress = &back.applications()[0];
    assert_eq!(wordpress.leader(), "wordpress/0");
    let units: Vec<&str> = wordpress.units().iter().map(|u| u.name()).collect();
    assert_eq!(units, ["wordpress/0", "wordpress/1"]);

    let unit = &wordpress.units()[1];
    assert_eq!(unit.machine(), "0/lxd/0");
    assert_eq!(unit.agent_status().unwrap().value(), "idle");
    let workload = unit.workload_status().unwrap();
    assert_eq!(workload.value(), "active");
    assert_eq!(workload.message(), "serving");
    assert_eq!(workload.updated(), timestamp(3));
    assert_eq!(unit.tools().unwrap().version(), "3.4.2-ubuntu-amd64");
}

#[test]
fn test_nested_containers_and_history_order() {
    let back = json_round_trip(&populated_model());
    let ids: Vec<&str> = back.all_machines().iter().map(|m| m.id()).collect();
    assert_eq!(ids, ["0", "0/lxd/0"]);

    let history: Vec<&str> = back.status_history().iter().map(|s| s.value()).collect();
    assert_eq!(history, ["busy", "available"]);

    let zones = back.subnets()[0].availability_zones();
    assert_eq!(zones, ["zone-a", "zone-b"]);
}

#[test]
fn test_attachment_hosts_survive() {
    let back = yaml_round_trip(&populated_model());
    assert_eq!(
        back.volumes()[0].attachments()[0].host(),
        &Tag::Machine("0".into())
    );
    assert_eq!(
        back.filesystems()[0].attachments()[0].host(),
        &Tag::Unit("wordpress/0".into())
    );
    assert_eq!(back.storages()[0].unit_owner(), Some("wordpress/0"));
}

#[test]
fn test_optional_zero_differs_from_absent() {
    let mut model = empty_model();
    let machine = model.add_machine(MachineArgs {
        id: "0".into(),
        base: "ubuntu@22.04".into(),
        ..Default::default()
    });
    machine.set_status(status("started"));
    let instance = machine.set_instance(CloudInstanceArgs {
        instance_id: "i-0".into(),
        memory: Some(0),
        root_disk: None,
        ..Default::default()
    });
    instance.set_status(status("running"));

    let back = yaml_round_trip(&model);
    let instance = back.machines()[0].instance().unwrap();
    assert_eq!(instance.memory(), Some(0));
    assert_eq!(instance.root_disk(), None);

    let back = json_round_trip(&model);
    let instance = back.machines()[0].instance().unwrap();
    assert_eq!(instance.memory(), Some(0));
    assert_eq!(instance.root_disk(), None);
}

#[test]
fn test_empty_and_absent_supported_containers() {
    let mut model = empty_model();
    for (id, supported) in [("0", None), ("1", Some(Vec::new()))] {
        let machine = model.add_machine(MachineArgs {
            id: id.into(),
            base: "ubuntu@22.04".into(),
            supported_containers: supported,
            ..Default::default()
        });
        machine.set_status(status("started"));
    }
    let back = yaml_round_trip(&model);
    assert_eq!(back.machines()[0].supported_containers(), None);
    assert_eq!(back.machines()[1].supported_containers(), Some(&[][..]));
}

fn status_with_blob_and_time() -> StatusArgs {
    let mut args = status_message("error", "hook failed", 7);
    args.data.insert("blob".into(), Value::Bytes(vec![0xde, 0xad]));
    args.data.insert("when".into(), Value::Time(timestamp(7)));
    args
}

#[test]
fn test_free_form_time_and_bytes_survive_yaml() {
    let mut model = populated_model();
    model.set_status(status_with_blob_and_time());
    let back = yaml_round_trip(&model);
    let data = back.status().unwrap().data();
    assert_eq!(data.get("blob"), Some(&Value::Bytes(vec![0xde, 0xad])));
    assert_eq!(data.get("when"), Some(&Value::Time(timestamp(7))));
    assert_eq!(back, model);
}

#[test]
fn test_free_form_time_and_bytes_become_strings_in_json() {
    let mut model = empty_model();
    model.set_status(status_with_blob_and_time());
    let back = json_round_trip(&model);
    let status = back.status().unwrap();
    assert_eq!(status.updated(), timestamp(7));
    assert_eq!(status.data().get("blob"), Some(&Value::from("3q0=")));
    assert_eq!(status.data().get("when"), Some(&Value::from("2024-05-17T12:07:00Z")));
}

#[test]
fn test_document_carries_current_versions() {
    let doc = wire(&populated_model());
    let root = match &doc {
        Value::Map(m) => m,
        other => panic!("expected map, got {}", other.type_name()),
    };
    assert_eq!(root.get("version"), Some(&Value::Int(3)));
    let machines = root.get("machines").unwrap();
    assert_eq!(machines.get("version"), Some(&Value::Int(3)));
    let applications = root.get("applications").unwrap();
    assert_eq!(applications.get("version"), Some(&Value::Int(5)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_status_text_round_trips(
        value in "[a-z]{1,12}",
        message in "[ -~]{0,40}",
        minute in 0u32..60,
    ) {
        let mut model = empty_model();
        model.set_status(status_message(&value, &message, minute));
        let back = yaml_round_trip(&model);
        let point = back.status().unwrap();
        prop_assert_eq!(point.value(), value.as_str());
        prop_assert_eq!(point.message(), message.as_str());
        prop_assert_eq!(point.updated(), timestamp(minute));
    }

    #[test]
    fn prop_sequences_round_trip(
        seqs in proptest::collection::btree_map("[a-z]{1,8}", 0i64..1_000_000, 0..6),
    ) {
        let mut model = empty_model();
        for (name, value) in &seqs {
            model.set_sequence(name, *value);
        }
        let back = json_round_trip(&model);
        prop_assert_eq!(back.sequences(), &seqs);
    }
}
