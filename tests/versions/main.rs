//! Reading documents written at older schema versions.

#[path = "../common/mod.rs"]
mod common;

use common::*;

/// A complete version 1 document as an early producer wrote it
const LEGACY_V1: &str = r#"
version: 1
owner: admin
config:
  name: legacy
  uuid: bd3fae18-5ea1-4bc5-8837-45400cf1f8f6
cloud: ec2
cloud-region: us-east-1
sequences:
  machine: 1
  application-ubuntu: 1
status:
  version: 1
  status:
    value: available
    updated: 2016-01-28T11:50:00Z
status-history:
  version: 1
  history:
  - value: busy
    message: importing
    updated: 2016-01-28T11:49:00Z
users: {version: 1, users: []}
machines:
  version: 1
  machines:
  - id: "0"
    nonce: machine-nonce
    password-hash: pw-0
    series: trusty
    jobs: [host-units]
    instance:
      version: 1
      instance:
        instance-id: i-0a1b2c
        status: running
        memory: 2048
    status:
      version: 1
      status:
        value: started
        updated: 2016-01-28T11:50:00Z
    status-history: {version: 1, history: []}
    containers: []
    block-devices: {version: 1, block-devices: []}
applications:
  version: 1
  applications:
  - name: ubuntu
    series: trusty
    charm-url: cs:trusty/ubuntu-10
    leader: ubuntu/0
    status:
      version: 1
      status:
        value: active
        updated: 2016-01-28T11:50:00Z
    status-history: {version: 1, history: []}
    settings: {}
    leadership-settings: {}
    units:
      version: 1
      units:
      - name: ubuntu/0
        machine: "0"
        password-hash: pw-u0
        agent-status:
          version: 1
          status:
            value: idle
            updated: 2016-01-28T11:50:00Z
        agent-status-history: {version: 1, history: []}
        workload-status:
          version: 1
          status:
            value: active
            message: ready
            updated: 2016-01-28T11:50:00Z
        workload-status-history: {version: 1, history: []}
relations: {version: 1, relations: []}
spaces: {version: 1, spaces: []}
link-layer-devices: {version: 1, link-layer-devices: []}
ip-addresses: {version: 1, ip-addresses: []}
subnets:
  version: 1
  subnets:
  - cidr: 10.0.0.0/24
    availability-zone: bar
cloud-image-metadata: {version: 1, cloud-image-metadata: []}
actions: {version: 1, actions: []}
ssh-host-keys: {version: 1, ssh-host-keys: []}
storages: {version: 1, storages: []}
storage-pools: {version: 1, storage-pools: []}
volumes: {version: 1, volumes: []}
filesystems: {version: 1, filesystems: []}
"#;

#[test]
fn test_legacy_document_imports_and_validates() {
    let model = deserialize_with(LEGACY_V1.as_bytes(), &DescriptionConfig::strict()).unwrap();
    assert_eq!(model.type_(), ModelType::Iaas);
    assert_eq!(model.uuid(), Some(MODEL_UUID));
    assert_eq!(model.sequences().get("machine"), Some(&1));
    assert_eq!(model.status_history()[0].message(), "importing");

    let machine = &model.machines()[0];
    assert_eq!(machine.base(), "ubuntu@14.04");
    let instance = machine.instance().unwrap();
    assert_eq!(instance.memory(), Some(2048));
    assert_eq!(instance.status().unwrap().value(), "unknown");

    let unit = &model.applications()[0].units()[0];
    assert_eq!(unit.machine(), "0");
    assert_eq!(unit.workload_status().unwrap().message(), "ready");

    assert_eq!(model.subnets()[0].availability_zones(), ["bar"]);
}

#[test]
fn test_legacy_document_reexports_at_current_versions() {
    let model = deserialize(LEGACY_V1.as_bytes()).unwrap();
    let doc = wire(&model);
    assert_eq!(doc.get("version"), Some(&Value::Int(3)));
    let machine = map_at(&mut doc.clone(), &["machines", "machines", "0"]).clone();
    assert_eq!(machine.get("base"), Some(&Value::from("ubuntu@14.04")));
    assert!(machine.get("series").is_none());

    let again = deserialize(&serialize(&model).unwrap()).unwrap();
    assert_eq!(again, model);
}

#[test]
fn test_machine_series_becomes_base() {
    let mut doc = wire(&populated_model());
    set_version(&mut doc, &["machines"], 1);
    for path in [
        &["machines", "machines", "0"][..],
        &["machines", "machines", "0", "containers", "0"][..],
    ] {
        let machine = map_at(&mut doc, path);
        machine.remove("base");
        machine.insert("series".into(), Value::from("trusty"));
    }
    let model = from_value(&doc).unwrap();
    let bases: Vec<&str> = model.all_machines().iter().map(|m| m.base()).collect();
    assert_eq!(bases, ["ubuntu@14.04", "ubuntu@14.04"]);
}

#[test]
fn test_unknown_series_is_rejected() {
    let mut doc = wire(&populated_model());
    set_version(&mut doc, &["machines"], 2);
    let machine = map_at(&mut doc, &["machines", "machines", "0"]);
    machine.remove("base");
    machine.insert("series".into(), Value::from("warty"));
    let err = from_value(&doc).unwrap_err();
    assert!(err.root().is_not_valid());
    assert_eq!(
        err.to_string(),
        "machines: machine 0: series \"warty\" not valid"
    );
}

#[test]
fn test_singular_zone_becomes_list() {
    let mut doc = wire(&populated_model());
    set_version(&mut doc, &["subnets"], 1);
    let subnet = map_at(&mut doc, &["subnets", "subnets", "0"]);
    subnet.insert("availability-zone".into(), Value::from("bar"));
    let model = from_value(&doc).unwrap();
    assert_eq!(model.subnets()[0].availability_zones(), ["bar"]);
    assert_eq!(model.subnets()[0].cidr(), "10.0.0.0/24");
}

#[test]
fn test_both_core_spellings_rejected() {
    let mut doc = wire(&empty_model());
    let mut payload = Map::new();
    payload.insert("cores".into(), Value::Int(4));
    payload.insert("cpu-cores".into(), Value::Int(4));
    let mut envelope = Map::new();
    envelope.insert("version".into(), Value::Int(1));
    envelope.insert("constraints".into(), Value::Map(payload));
    map_at(&mut doc, &[]).insert("constraints".into(), Value::Map(envelope));

    let err = from_value(&doc).unwrap_err();
    assert!(err.is_conflict());
    assert!(!err.is_validation());
    assert!(
        err.to_string()
            .contains("can not specify both cores and cores constraints"),
        "{err}"
    );
}

#[test]
fn test_v1_instance_status_reads_as_unknown() {
    let mut doc = wire(&populated_model());
    let instance = map_at(&mut doc, &["machines", "machines", "0", "instance"]);
    instance.insert("version".into(), Value::Int(1));
    let payload = map_at(&mut doc, &["machines", "machines", "0", "instance", "instance"]);
    payload.insert("status".into(), Value::from("running"));

    let model = from_value(&doc).unwrap();
    let instance = model.machines()[0].instance().unwrap();
    assert_eq!(instance.instance_id(), "juju-bd3fae-0");
    assert_eq!(instance.status().unwrap().value(), "unknown");
    assert!(instance.status_history().is_empty());
}

#[test]
fn test_v1_model_is_iaas() {
    let mut model = Model::new(ModelArgs {
        type_: ModelType::Caas,
        owner: "admin".into(),
        config: empty_model().config().clone(),
        cloud: "k8s".into(),
        environ_version: 4,
        ..Default::default()
    });
    model.set_status(status("available"));

    let mut doc = wire(&model);
    assert_eq!(from_value(&doc).unwrap().type_(), ModelType::Caas);
    set_version(&mut doc, &[], 1);
    let back = from_value(&doc).unwrap();
    assert_eq!(back.type_(), ModelType::Iaas);
    assert_eq!(back.environ_version(), 0);
}

#[test]
fn test_unknown_document_version() {
    let mut doc = wire(&populated_model());
    set_version(&mut doc, &[], 99);
    let err = from_value(&doc).unwrap_err();
    assert!(err.is_not_valid());
    assert_eq!(err.to_string(), "version 99 not valid");
}

#[test]
fn test_unknown_collection_version() {
    let mut doc = wire(&populated_model());
    set_version(&mut doc, &["machines"], 99);
    let err = from_value(&doc).unwrap_err();
    assert!(err.root().is_not_valid());
    assert_eq!(err.to_string(), "machines: version 99 not valid");
}

#[test]
fn test_missing_envelope_version() {
    let mut doc = wire(&populated_model());
    map_at(&mut doc, &["subnets"]).remove("version");
    let err = from_value(&doc).unwrap_err();
    assert!(err.root().is_type_mismatch());
    assert_eq!(
        err.to_string(),
        "subnets version schema check failed: version: expected int, got nothing"
    );
}

#[test]
fn test_type_mismatch_names_field() {
    let mut doc = wire(&populated_model());
    map_at(&mut doc, &["machines", "machines", "0"]).insert("nonce".into(), Value::Int(5));
    let err = from_value(&doc).unwrap_err();
    assert!(err.root().is_type_mismatch());
    assert_eq!(
        err.to_string(),
        "machines: machine 0 v3 schema check failed: nonce: expected string, got int(5)"
    );

    let mut doc = wire(&populated_model());
    map_at(&mut doc, &[]).insert("owner".into(), Value::Bool(true));
    let err = from_value(&doc).unwrap_err();
    assert_eq!(
        err.to_string(),
        "model v3 schema check failed: owner: expected string, got bool(true)"
    );
}

#[test]
fn test_null_collection_is_rejected() {
    for key in ["machines", "relations"] {
        let mut doc = wire(&populated_model());
        map_at(&mut doc, &[]).insert(key.into(), Value::Null);
        let err = from_value(&doc).unwrap_err();
        assert!(err.root().is_type_mismatch());
        assert_eq!(
            err.to_string(),
            format!("model v3 schema check failed: {key}: expected map, got nothing")
        );
    }
}

#[test]
fn test_null_nested_envelope_is_rejected() {
    let mut doc = wire(&populated_model());
    map_at(&mut doc, &["machines", "machines", "0"]).insert("block-devices".into(), Value::Null);
    let err = from_value(&doc).unwrap_err();
    assert_eq!(
        err.to_string(),
        "machines: machine 0 v3 schema check failed: block-devices: expected map, got nothing"
    );

    let mut doc = wire(&populated_model());
    map_at(&mut doc, &["relations", "relations", "0"]).insert("endpoints".into(), Value::Null);
    let err = from_value(&doc).unwrap_err();
    assert!(err.root().is_type_mismatch());
    assert!(
        err.to_string().ends_with("endpoints: expected map, got nothing"),
        "{err}"
    );
}

#[test]
fn test_later_collections_ignored_by_older_versions() {
    let mut doc = wire(&populated_model());
    let mut op = Map::new();
    op.insert("id".into(), Value::from("1"));
    let mut envelope = Map::new();
    envelope.insert("version".into(), Value::Int(2));
    envelope.insert("operations".into(), Value::List(vec![Value::Map(op)]));
    map_at(&mut doc, &[]).insert("operations".into(), Value::Map(envelope));

    // version 3 reads operations and rejects the incomplete entry
    assert!(from_value(&doc).is_err());
    set_version(&mut doc, &[], 2);
    let model = from_value(&doc).unwrap();
    assert!(model.operations().is_empty());
    assert_eq!(model.machines().len(), 1);
}
