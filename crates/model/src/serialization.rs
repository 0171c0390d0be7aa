//! Export and import of whole model documents
//!
//! Export always writes every entity at its current schema version. Import
//! accepts any version each registry knows and upgrades on the way in.
//!
//! ```text
//! bytes ──size check──▶ codec decode ──depth check──▶ Value ──import──▶ Model
//! ```

use crate::config::DescriptionConfig;
use crate::model::Model;
use modeldoc_core::{Result, Value};
use modeldoc_schema::{import_document, ToWire};
use tracing::debug;

/// Encode a model with the default configuration (YAML)
pub fn serialize(model: &Model) -> Result<Vec<u8>> {
    serialize_with(model, &DescriptionConfig::default())
}

/// Encode a model with the given configuration
pub fn serialize_with(model: &Model, config: &DescriptionConfig) -> Result<Vec<u8>> {
    config.validate()?;
    let codec = config.codec()?;
    let bytes = codec.encode(&model.to_wire())?;
    debug!(codec = codec.codec_id(), bytes = bytes.len(), "serialized model");
    Ok(bytes)
}

/// Decode a model with the default configuration (YAML, no validation)
pub fn deserialize(bytes: &[u8]) -> Result<Model> {
    deserialize_with(bytes, &DescriptionConfig::default())
}

/// Decode a model with the given configuration
pub fn deserialize_with(bytes: &[u8], config: &DescriptionConfig) -> Result<Model> {
    config.validate()?;
    let limits = config.limits();
    limits.validate_document_size(bytes.len())?;
    let codec = config.codec()?;
    let value = codec.decode(bytes)?;
    limits.validate_value(&value)?;
    let model = from_value(&value)?;
    if config.validate_on_import {
        model.validate()?;
    }
    debug!(codec = codec.codec_id(), bytes = bytes.len(), "deserialized model");
    Ok(model)
}

/// Import a model from an already decoded tree
pub fn from_value(value: &Value) -> Result<Model> {
    import_document::<Model>(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelArgs;
    use crate::status::StatusArgs;
    use chrono::{TimeZone, Utc};
    use modeldoc_core::Map;

    fn model_with(config: Map) -> Model {
        let mut m = Model::new(ModelArgs {
            owner: "admin".into(),
            config,
            cloud: "lxd".into(),
            ..Default::default()
        });
        m.set_status(StatusArgs {
            value: "available".into(),
            message: String::new(),
            data: Map::new(),
            updated: Utc.with_ymd_and_hms(2023, 3, 3, 3, 3, 3).unwrap(),
            never_set: false,
        });
        m
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }

    fn model() -> Model {
        let mut config = Map::new();
        config.insert(
            "uuid".into(),
            Value::from("bd3fae18-5ea1-4bc5-8837-45400cf1f8f6"),
        );
        model_with(config)
    }

    #[test]
    fn test_yaml_and_json_agree() {
        init_tracing();
        let m = model();
        let yaml = deserialize(&serialize(&m).unwrap()).unwrap();
        let json_config = DescriptionConfig::json();
        let json =
            deserialize_with(&serialize_with(&m, &json_config).unwrap(), &json_config).unwrap();
        assert_eq!(yaml, m);
        assert_eq!(json, m);
    }

    #[test]
    fn test_size_limit_checked_before_decode() {
        let bytes = serialize(&model()).unwrap();
        let config = DescriptionConfig::default().with_max_document_bytes(16);
        let err = deserialize_with(&bytes, &config).unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
    }

    #[test]
    fn test_not_a_map() {
        let err = deserialize(b"- just\n- a list\n").unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_validate_on_import() {
        init_tracing();
        let bytes = serialize(&model()).unwrap();
        assert!(deserialize_with(&bytes, &DescriptionConfig::strict()).is_ok());

        let bytes = serialize(&model_with(Map::new())).unwrap();
        assert!(deserialize(&bytes).is_ok());
        let err = deserialize_with(&bytes, &DescriptionConfig::strict()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "model missing uuid");
    }
}
