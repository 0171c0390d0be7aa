//! Wire codec definitions
//!
//! A codec turns bytes into a decoded [`Value`] tree and back. The protocol
//! layers above never look at bytes; they only see `Value`s, so any
//! self-describing map/list/scalar format can carry a document.
//!
//! # Codecs
//!
//! - [`YamlCodec`] (`"yaml"`): the reference format
//! - [`JsonCodec`] (`"json"`): an alternative for tooling that prefers JSON
//!
//! # Scalar mapping
//!
//! | Value    | YAML                                  | JSON                 |
//! |----------|---------------------------------------|----------------------|
//! | `Time`   | `!timestamp` RFC 3339 string, UTC     | RFC 3339 string      |
//! | `Bytes`  | `!binary` base64 string               | base64 string        |
//! | `Uint`   | integer                               | integer              |
//!
//! YAML tags both scalars so they decode back to `Time` and `Bytes` wherever
//! they sit, including free-form maps. Untagged timestamps in older documents
//! stay strings and are read by the `time` checker. JSON has no tags: a `Time`
//! or `Bytes` inside a free-form map (status data, settings, config) comes
//! back as a string, while declared time and byte fields coerce it back.
//!
//! Non-string map keys (`1: foo`) decode to their canonical string form.

use crate::error::{Error, Result};
use crate::value::{format_time, parse_time, Map, Value};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::trace;

const BINARY_TAG: &str = "binary";
const TIMESTAMP_TAG: &str = "timestamp";

/// Wire codec trait.
///
/// Codecs must be `Send + Sync` so independent documents can be encoded and
/// decoded from multiple threads.
pub trait WireCodec: Send + Sync {
    /// Encode a decoded tree into bytes
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode bytes into a decoded tree
    fn decode(&self, data: &[u8]) -> Result<Value>;

    /// Unique codec identifier
    fn codec_id(&self) -> &str;
}

/// Look up a codec by identifier
pub fn get_codec(codec_id: &str) -> Result<Box<dyn WireCodec>> {
    match codec_id {
        "yaml" => Ok(Box::new(YamlCodec)),
        "json" => Ok(Box::new(JsonCodec)),
        other => Err(Error::not_valid(format!("codec {other:?}"))),
    }
}

// =============================================================================
// YAML
// =============================================================================

/// YAML wire codec (reference format)
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl WireCodec for YamlCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let yaml = to_yaml(value)?;
        let text = serde_yaml::to_string(&yaml).map_err(|e| Error::encoding("yaml", e.to_string()))?;
        trace!(bytes = text.len(), "encoded yaml document");
        Ok(text.into_bytes())
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_slice(data).map_err(|e| Error::encoding("yaml", e.to_string()))?;
        from_yaml(yaml)
    }

    fn codec_id(&self) -> &str {
        "yaml"
    }
}

fn to_yaml(value: &Value) -> Result<serde_yaml::Value> {
    use serde_yaml::Value as Y;
    Ok(match value {
        Value::Null => Y::Null,
        Value::Bool(b) => Y::Bool(*b),
        Value::Int(i) => Y::Number((*i).into()),
        Value::Uint(u) => Y::Number((*u).into()),
        Value::Float(f) => Y::Number((*f).into()),
        Value::String(s) => Y::String(s.clone()),
        Value::Bytes(b) => tagged(BINARY_TAG, BASE64.encode(b)),
        Value::Time(t) => tagged(TIMESTAMP_TAG, format_time(t)),
        Value::List(items) => Y::Sequence(items.iter().map(to_yaml).collect::<Result<_>>()?),
        Value::Map(map) => {
            let mut out = serde_yaml::Mapping::new();
            for (k, v) in map {
                out.insert(Y::String(k.clone()), to_yaml(v)?);
            }
            Y::Mapping(out)
        }
    })
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Y;
    Ok(match value {
        Y::Null => Value::Null,
        Y::Bool(b) => Value::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                return Err(Error::encoding("yaml", format!("unsupported number {n}")));
            }
        }
        Y::String(s) => Value::String(s),
        Y::Sequence(items) => {
            Value::List(items.into_iter().map(from_yaml).collect::<Result<_>>()?)
        }
        Y::Mapping(mapping) => {
            let mut out = Map::new();
            for (k, v) in mapping {
                out.insert(yaml_key(k)?, from_yaml(v)?);
            }
            Value::Map(out)
        }
        Y::Tagged(tagged) => {
            let tagged = *tagged;
            let tag = tagged.tag.to_string();
            if tag.ends_with(BINARY_TAG) {
                Value::Bytes(decode_base64("yaml", &tagged_string(&tag, tagged.value)?)?)
            } else if tag.ends_with(TIMESTAMP_TAG) {
                let s = tagged_string(&tag, tagged.value)?;
                let t = parse_time(&s)
                    .ok_or_else(|| Error::encoding("yaml", format!("invalid timestamp {s:?}")))?;
                Value::Time(t)
            } else {
                from_yaml(tagged.value)?
            }
        }
    })
}

fn tagged(tag: &str, text: String) -> serde_yaml::Value {
    serde_yaml::Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
        tag: serde_yaml::value::Tag::new(tag),
        value: serde_yaml::Value::String(text),
    }))
}

fn tagged_string(tag: &str, value: serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        other => Err(Error::encoding(
            "yaml",
            format!("{tag} tag on non-string value {other:?}"),
        )),
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Y;
    match key {
        Y::String(s) => Ok(s),
        Y::Number(n) => Ok(n.to_string()),
        Y::Bool(b) => Ok(b.to_string()),
        other => Err(Error::encoding(
            "yaml",
            format!("unsupported map key {other:?}"),
        )),
    }
}

// =============================================================================
// JSON
// =============================================================================

/// JSON wire codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let json = to_json(value)?;
        serde_json::to_vec_pretty(&json).map_err(|e| Error::encoding("json", e.to_string()))
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        let json: serde_json::Value =
            serde_json::from_slice(data).map_err(|e| Error::encoding("json", e.to_string()))?;
        Ok(from_json(json))
    }

    fn codec_id(&self) -> &str {
        "json"
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value> {
    use serde_json::Value as J;
    Ok(match value {
        Value::Null => J::Null,
        Value::Bool(b) => J::Bool(*b),
        Value::Int(i) => J::Number((*i).into()),
        Value::Uint(u) => J::Number((*u).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(J::Number)
            .ok_or_else(|| Error::encoding("json", format!("float {f} has no JSON form")))?,
        Value::String(s) => J::String(s.clone()),
        Value::Bytes(b) => J::String(BASE64.encode(b)),
        Value::Time(t) => J::String(format_time(t)),
        Value::List(items) => J::Array(items.iter().map(to_json).collect::<Result<_>>()?),
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), to_json(v)?);
            }
            J::Object(out)
        }
    })
}

fn from_json(value: serde_json::Value) -> Value {
    use serde_json::Value as J;
    match value {
        J::Null => Value::Null,
        J::Bool(b) => Value::Bool(b),
        J::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::Uint(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        J::String(s) => Value::String(s),
        J::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        J::Object(obj) => Value::Map(obj.into_iter().map(|(k, v)| (k, from_json(v))).collect()),
    }
}

/// Decode a base64 string, ignoring embedded whitespace
pub fn decode_base64(codec_id: &str, s: &str) -> Result<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::encoding(codec_id, format!("invalid base64: {e}")))
}

/// Encode bytes as a standard base64 string
pub fn encode_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}
