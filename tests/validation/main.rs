//! Cross-entity validation of imported documents.

#[path = "../common/mod.rs"]
mod common;

use common::*;

/// Apply `edit` to the populated document, import it and return the
/// validation failure
fn invalid_after(edit: impl FnOnce(&mut Value)) -> Error {
    let mut doc = wire(&populated_model());
    edit(&mut doc);
    let model = from_value(&doc).expect("edited document still imports");
    model.validate().expect_err("edited document should not validate")
}

fn set(doc: &mut Value, path: &[&str], key: &str, value: impl Into<Value>) {
    map_at(doc, path).insert(key.to_string(), value.into());
}

const HOST: &[&str] = &["machines", "machines", "0"];
const WORDPRESS: &[&str] = &["applications", "applications", "0"];
const MYSQL_UNIT: &[&str] = &[
    "applications",
    "applications",
    "1",
    "units",
    "units",
    "0",
];
const WORDPRESS_ENDPOINT: &[&str] = &["relations", "relations", "0", "endpoints", "endpoints", "0"];
const MYSQL_ENDPOINT: &[&str] = &["relations", "relations", "0", "endpoints", "endpoints", "1"];
const HOST_ETH0: &[&str] = &["link-layer-devices", "link-layer-devices", "0"];
const HOST_BRIDGE: &[&str] = &["link-layer-devices", "link-layer-devices", "1"];
const CONTAINER_ETH0: &[&str] = &["link-layer-devices", "link-layer-devices", "2"];
const HOST_ADDRESS: &[&str] = &["ip-addresses", "ip-addresses", "0"];

// ============================================================================
// Model identity
// ============================================================================

#[test]
fn test_missing_uuid() {
    let err = invalid_after(|doc| {
        map_at(doc, &["config"]).remove("uuid");
    });
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "model missing uuid");
}

#[test]
fn test_malformed_uuid() {
    let err = invalid_after(|doc| set(doc, &["config"], "uuid", "not-a-uuid"));
    assert!(err.is_not_valid());
    assert_eq!(err.to_string(), "model uuid \"not-a-uuid\" not valid");
}

#[test]
fn test_missing_model_status() {
    let model = Model::new(ModelArgs {
        owner: "admin".into(),
        config: empty_model().config().clone(),
        ..Default::default()
    });
    let err = model.validate().unwrap_err();
    assert_eq!(err.to_string(), "model missing status");
}

// ============================================================================
// Machines and applications
// ============================================================================

#[test]
fn test_malformed_machine_base() {
    let err = invalid_after(|doc| set(doc, HOST, "base", "ubuntu"));
    assert!(err.root().is_not_valid());
    assert_eq!(err.to_string(), "machine \"0\": base \"ubuntu\" not valid");
}

#[test]
fn test_leader_must_be_a_unit() {
    let err = invalid_after(|doc| set(doc, WORDPRESS, "leader", "wordpress/7"));
    assert_eq!(
        err.to_string(),
        "application \"wordpress\" leader \"wordpress/7\" is not one of its units"
    );
}

#[test]
fn test_unit_on_unknown_machine() {
    let err = invalid_after(|doc| set(doc, MYSQL_UNIT, "machine", "5"));
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "unit \"mysql/0\" assigned to unknown machine \"5\""
    );
}

#[test]
fn test_unit_on_container_is_known() {
    let err = invalid_after(|doc| set(doc, MYSQL_UNIT, "machine", "0/lxd/1"));
    assert!(err.to_string().contains("unknown machine \"0/lxd/1\""), "{err}");

    let mut doc = wire(&populated_model());
    set(&mut doc, MYSQL_UNIT, "machine", "0/lxd/0");
    from_value(&doc).unwrap().validate().unwrap();
}

// ============================================================================
// Relations
// ============================================================================

#[test]
fn test_relation_to_unknown_application() {
    let err = invalid_after(|doc| set(doc, MYSQL_ENDPOINT, "application-name", "postgresql"));
    assert_eq!(
        err.to_string(),
        "unknown application \"postgresql\" for relation 1"
    );
}

#[test]
fn test_missing_unit_settings() {
    let err = invalid_after(|doc| {
        let settings = map_at(doc, WORDPRESS_ENDPOINT)
            .get_mut("unit-settings")
            .unwrap();
        if let Value::Map(m) = settings {
            m.remove("wordpress/1");
        }
    });
    assert_eq!(
        err.to_string(),
        "missing relation settings for unit \"wordpress/1\" in relation 1"
    );
}

#[test]
fn test_settings_for_unknown_unit() {
    let err = invalid_after(|doc| {
        let mut path = WORDPRESS_ENDPOINT.to_vec();
        path.push("unit-settings");
        set(doc, &path, "wordpress/9", Value::Map(Map::new()));
    });
    assert_eq!(
        err.to_string(),
        "settings for unknown unit \"wordpress/9\" in relation 1"
    );
}

// ============================================================================
// Networking
// ============================================================================

#[test]
fn test_subnet_in_unknown_space() {
    let err = invalid_after(|doc| set(doc, &["subnets", "subnets", "0"], "space-id", "9"));
    assert_eq!(
        err.to_string(),
        "subnet \"10.0.0.0/24\" references unknown space \"9\""
    );
}

#[test]
fn test_device_on_unknown_machine() {
    let err = invalid_after(|doc| set(doc, HOST_ETH0, "machine-id", "7"));
    assert_eq!(err.to_string(), "device \"eth0\" on unknown machine \"7\"");
}

#[test]
fn test_device_with_unknown_local_parent() {
    let err = invalid_after(|doc| set(doc, HOST_BRIDGE, "parent-name", "bond0"));
    assert_eq!(
        err.to_string(),
        "device \"br-eth0\" on machine \"0\" has unknown parent \"bond0\""
    );
}

#[test]
fn test_container_parent_must_be_on_host() {
    let err = invalid_after(|doc| set(doc, CONTAINER_ETH0, "parent-name", "m#1#d#br-eth0"));
    assert_eq!(
        err.to_string(),
        "device \"eth0\" on machine \"0/lxd/0\" has parent on \"1\", which is not its host"
    );
}

#[test]
fn test_container_parent_must_be_bridge() {
    let err = invalid_after(|doc| set(doc, HOST_BRIDGE, "type", "ethernet"));
    assert_eq!(
        err.to_string(),
        "device \"eth0\" on machine \"0/lxd/0\" has parent \"m#0#d#br-eth0\" of type \"ethernet\", expected \"bridge\""
    );
}

#[test]
fn test_malformed_parent_key() {
    let err = invalid_after(|doc| set(doc, CONTAINER_ETH0, "parent-name", "m#0#br-eth0"));
    assert!(err.is_not_valid());
    assert_eq!(err.to_string(), "device parent \"m#0#br-eth0\" not valid");
}

#[test]
fn test_malformed_ip_address() {
    let err = invalid_after(|doc| set(doc, HOST_ADDRESS, "value", "10.0.0.300"));
    assert!(err.is_not_valid());
    assert_eq!(err.to_string(), "IP address \"10.0.0.300\" not valid");
}

#[test]
fn test_ip_address_on_unknown_device() {
    let err = invalid_after(|doc| set(doc, HOST_ADDRESS, "device-name", "eth9"));
    assert_eq!(
        err.to_string(),
        "IP address \"10.0.0.2\" on unknown device \"eth9\" of machine \"0\""
    );
}

#[test]
fn test_ip_address_subnet_and_gateway() {
    let err = invalid_after(|doc| set(doc, HOST_ADDRESS, "subnet-cidr", "10.0.0.0/33"));
    assert_eq!(
        err.to_string(),
        "IP address \"10.0.0.2\" subnet CIDR \"10.0.0.0/33\" not valid"
    );

    let err = invalid_after(|doc| set(doc, HOST_ADDRESS, "gateway-address", "gateway"));
    assert_eq!(
        err.to_string(),
        "IP address \"10.0.0.2\" gateway \"gateway\" not valid"
    );
}

// ============================================================================
// Storage
// ============================================================================

#[test]
fn test_storage_owned_by_unknown_unit() {
    let err = invalid_after(|doc| {
        set(doc, &["storages", "storages", "0"], "unit-owner", "ghost/0")
    });
    assert_eq!(
        err.to_string(),
        "storage \"data/0\" owned by unknown unit \"ghost/0\""
    );
}

#[test]
fn test_volume_attached_to_unknown_machine() {
    let err = invalid_after(|doc| {
        set(
            doc,
            &["volumes", "volumes", "0", "attachments", "attachments", "0"],
            "host-id",
            "machine-9",
        )
    });
    assert_eq!(err.to_string(), "volume \"0\" attached to unknown machine \"9\"");
}

#[test]
fn test_filesystem_backs_unknown_storage() {
    let err = invalid_after(|doc| {
        set(doc, &["filesystems", "filesystems", "0"], "storage-id", "data/9")
    });
    assert_eq!(
        err.to_string(),
        "filesystem \"0\" backs unknown storage \"data/9\""
    );
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_identity_checked_before_references() {
    let err = invalid_after(|doc| {
        set(doc, MYSQL_UNIT, "machine", "5");
        map_at(doc, &["config"]).remove("uuid");
    });
    assert_eq!(err.to_string(), "model missing uuid");
}

#[test]
fn test_devices_checked_before_storage() {
    let err = invalid_after(|doc| {
        set(doc, &["filesystems", "filesystems", "0"], "storage-id", "data/9");
        set(doc, HOST_ETH0, "machine-id", "7");
    });
    assert!(err.to_string().starts_with("device \"eth0\""), "{err}");
}

#[test]
fn test_strict_import_reports_first_violation() {
    let mut doc = wire(&populated_model());
    set(&mut doc, WORDPRESS, "leader", "wordpress/7");
    set(&mut doc, &["subnets", "subnets", "0"], "space-id", "9");
    let bytes = serialize(&from_value(&doc).unwrap()).unwrap();

    assert!(deserialize(&bytes).is_ok());
    let err = deserialize_with(&bytes, &DescriptionConfig::strict()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("leader"), "{err}");
}
