//! Checker algebra
//!
//! A [`Checker`] coerces a dynamically typed [`Value`] into its canonical typed
//! form, or fails with a [`Error::TypeMismatch`] naming the field path, the
//! expected type and what was actually found.
//!
//! Checkers compose: `list(string())`, `string_map(any())`,
//! `map(int(), string())`, and `fields(schema)` nest to any depth.
//!
//! ## Coercion rules
//!
//! | Checker     | Accepts                                     | Produces |
//! |-------------|---------------------------------------------|----------|
//! | `string`    | strings                                     | `String` |
//! | `int`       | integers in range, decimal strings          | `Int`    |
//! | `force_int` | as `int`, plus floats (truncated)           | `Int`    |
//! | `force_uint`| any non-negative number or numeric string   | `Uint`   |
//! | `float`     | floats, integers, numeric strings           | `Float`  |
//! | `bool`      | booleans, `true`/`false` style strings      | `Bool`   |
//! | `time`      | timestamps, RFC 3339 strings                | `Time`   |
//! | `bytes`     | bytes, base64 strings                       | `Bytes`  |
//! | `any`       | anything, including null                    | as is    |
//!
//! Coercion is total and deterministic: the same input always yields the same
//! output or the same error.

use crate::fields::FieldSchema;
use crate::path::Path;
use modeldoc_core::codec::decode_base64;
use modeldoc_core::{parse_time, Error, Map, Result, Value};

/// A composable value checker
#[derive(Debug, Clone, PartialEq)]
pub enum Checker {
    /// UTF-8 strings only
    String,
    /// Signed integers
    Int,
    /// Signed integers, accepting floats by truncation
    ForceInt,
    /// Non-negative numbers of any representation
    ForceUint,
    /// Floating point numbers
    Float,
    /// Booleans
    Bool,
    /// Timestamps
    Time,
    /// Byte blobs
    Bytes,
    /// Passthrough
    Any,
    /// List with a checked element type
    List(Box<Checker>),
    /// Map with checked keys and values
    Map(Box<Checker>, Box<Checker>),
    /// String-keyed map with checked values
    StringMap(Box<Checker>),
    /// Map with a declared set of fields
    Fields(FieldSchema),
}

/// Checker for strings
pub fn string() -> Checker {
    Checker::String
}

/// Checker for signed integers
pub fn int() -> Checker {
    Checker::Int
}

/// Checker for signed integers that also accepts floats
pub fn force_int() -> Checker {
    Checker::ForceInt
}

/// Checker for non-negative numbers
pub fn force_uint() -> Checker {
    Checker::ForceUint
}

/// Checker for floats
pub fn float() -> Checker {
    Checker::Float
}

/// Checker for booleans
pub fn bool() -> Checker {
    Checker::Bool
}

/// Checker for timestamps
pub fn time() -> Checker {
    Checker::Time
}

/// Checker for byte blobs
pub fn bytes() -> Checker {
    Checker::Bytes
}

/// Passthrough checker
pub fn any() -> Checker {
    Checker::Any
}

/// Checker for a list whose elements satisfy `elem`
pub fn list(elem: Checker) -> Checker {
    Checker::List(Box::new(elem))
}

/// Checker for a map whose keys satisfy `key` and values satisfy `value`
pub fn map(key: Checker, value: Checker) -> Checker {
    Checker::Map(Box::new(key), Box::new(value))
}

/// Checker for a string-keyed map whose values satisfy `value`
pub fn string_map(value: Checker) -> Checker {
    Checker::StringMap(Box::new(value))
}

/// Checker for a self-versioned envelope or collection
///
/// The payload is passed through unchecked; the envelope itself must be a
/// map, so a null or scalar in its place fails.
pub fn envelope() -> Checker {
    string_map(any())
}

/// Checker for a map with declared fields
pub fn fields(schema: FieldSchema) -> Checker {
    Checker::Fields(schema)
}

impl Checker {
    /// Name of the type this checker produces, for error messages
    pub fn expected(&self) -> &'static str {
        match self {
            Checker::String => "string",
            Checker::Int | Checker::ForceInt => "int",
            Checker::ForceUint => "uint",
            Checker::Float => "float",
            Checker::Bool => "bool",
            Checker::Time => "time",
            Checker::Bytes => "bytes",
            Checker::Any => "any",
            Checker::List(_) => "list",
            Checker::Map(_, _) | Checker::StringMap(_) | Checker::Fields(_) => "map",
        }
    }

    /// Coerce `value` into the canonical form for this checker
    pub fn coerce(&self, value: &Value, path: &Path) -> Result<Value> {
        let mismatch = || Error::mismatch(path.as_str(), self.expected(), value.describe());
        match self {
            Checker::String => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                _ => Err(mismatch()),
            },
            Checker::Int => coerce_int(value, false).map(Value::Int).ok_or_else(mismatch),
            Checker::ForceInt => coerce_int(value, true).map(Value::Int).ok_or_else(mismatch),
            Checker::ForceUint => coerce_uint(value).map(Value::Uint).ok_or_else(mismatch),
            Checker::Float => coerce_float(value).map(Value::Float).ok_or_else(mismatch),
            Checker::Bool => coerce_bool(value).map(Value::Bool).ok_or_else(mismatch),
            Checker::Time => match value {
                Value::Time(t) => Ok(Value::Time(*t)),
                Value::String(s) => parse_time(s).map(Value::Time).ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            Checker::Bytes => match value {
                Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
                Value::String(s) => decode_base64("schema", s)
                    .map(Value::Bytes)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            Checker::Any => Ok(value.clone()),
            Checker::List(elem) => match value {
                Value::List(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| elem.coerce(item, &path.index(i)))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List),
                _ => Err(mismatch()),
            },
            Checker::Map(key_checker, value_checker) => match value {
                Value::Map(entries) => {
                    let mut out = Map::new();
                    for (k, v) in entries {
                        let key = key_checker.coerce(&Value::String(k.clone()), &path.field(k))?;
                        let key = canonical_key(&key)
                            .ok_or_else(|| Error::mismatch(path.field(k).as_str(), "scalar key", key.describe()))?;
                        let coerced = value_checker.coerce(v, &path.field(k))?;
                        out.insert(key, coerced);
                    }
                    Ok(Value::Map(out))
                }
                _ => Err(mismatch()),
            },
            Checker::StringMap(value_checker) => match value {
                Value::Map(entries) => entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), value_checker.coerce(v, &path.field(k))?)))
                    .collect::<Result<Map>>()
                    .map(Value::Map),
                _ => Err(mismatch()),
            },
            Checker::Fields(schema) => schema.coerce(value, path).map(Value::Map),
        }
    }
}

fn coerce_int(value: &Value, force: bool) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Uint(u) => i64::try_from(*u).ok(),
        Value::Float(f) if force && f.is_finite() => Some(f.trunc() as i64),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                if force {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                } else {
                    None
                }
            })
        }
        _ => None,
    }
}

fn coerce_uint(value: &Value) -> Option<u64> {
    match value {
        Value::Int(i) => u64::try_from(*i).ok(),
        Value::Uint(u) => Some(*u),
        Value::Float(f) if f.is_finite() && *f >= 0.0 => Some(f.trunc() as u64),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        }
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Uint(u) => Some(*u as f64),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn canonical_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Uint(u) => Some(u.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn root() -> Path {
        Path::root()
    }

    #[test]
    fn test_string_accepts_only_strings() {
        assert_eq!(
            string().coerce(&Value::from("x"), &root()).unwrap(),
            Value::from("x")
        );
        let err = string()
            .coerce(&Value::Bool(true), &root().field("name"))
            .unwrap_err();
        assert_eq!(err.to_string(), "name: expected string, got bool(true)");
    }

    #[test]
    fn test_int_accepts_numeric_strings() {
        assert_eq!(
            int().coerce(&Value::from(" 42 "), &root()).unwrap(),
            Value::Int(42)
        );
        assert_eq!(int().coerce(&Value::Uint(7), &root()).unwrap(), Value::Int(7));
        assert!(int().coerce(&Value::Float(1.5), &root()).is_err());
        assert!(int().coerce(&Value::Uint(u64::MAX), &root()).is_err());
    }

    #[test]
    fn test_force_int_truncates_floats() {
        assert_eq!(
            force_int().coerce(&Value::Float(3.9), &root()).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            force_int().coerce(&Value::from("2.5"), &root()).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn test_force_uint_rejects_negative() {
        assert_eq!(
            force_uint().coerce(&Value::Int(5), &root()).unwrap(),
            Value::Uint(5)
        );
        assert_eq!(
            force_uint().coerce(&Value::Float(8.0), &root()).unwrap(),
            Value::Uint(8)
        );
        assert_eq!(
            force_uint().coerce(&Value::from("1024"), &root()).unwrap(),
            Value::Uint(1024)
        );
        let err = force_uint()
            .coerce(&Value::Int(-1), &root().field("memory"))
            .unwrap_err();
        assert_eq!(err.to_string(), "memory: expected uint, got int(-1)");
        assert!(force_uint().coerce(&Value::Float(-0.5), &root()).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        assert_eq!(
            float().coerce(&Value::Int(2), &root()).unwrap(),
            Value::Float(2.0)
        );
    }

    #[test]
    fn test_bool_accepts_bool_strings() {
        assert_eq!(
            bool().coerce(&Value::from("true"), &root()).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            bool().coerce(&Value::from("F"), &root()).unwrap(),
            Value::Bool(false)
        );
        assert!(bool().coerce(&Value::from("yes"), &root()).is_err());
        assert!(bool().coerce(&Value::Int(1), &root()).is_err());
    }

    #[test]
    fn test_time_parses_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2016, 1, 28, 11, 50, 0).unwrap();
        assert_eq!(
            time()
                .coerce(&Value::from("2016-01-28T11:50:00Z"), &root())
                .unwrap(),
            Value::Time(expected)
        );
        let err = time()
            .coerce(&Value::from("last tuesday"), &root().field("updated"))
            .unwrap_err();
        assert!(err.to_string().starts_with("updated: expected time"));
    }

    #[test]
    fn test_bytes_decode_base64() {
        assert_eq!(
            bytes().coerce(&Value::from("aGk="), &root()).unwrap(),
            Value::Bytes(b"hi".to_vec())
        );
        assert!(bytes().coerce(&Value::from("*"), &root()).is_err());
    }

    #[test]
    fn test_any_passes_null() {
        assert_eq!(any().coerce(&Value::Null, &root()).unwrap(), Value::Null);
    }

    #[test]
    fn test_envelope_rejects_null_and_scalars() {
        let err = envelope()
            .coerce(&Value::Null, &root().field("machines"))
            .unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(err.to_string(), "machines: expected map, got nothing");
        assert!(envelope().coerce(&Value::from("x"), &root()).is_err());

        let mut m = Map::new();
        m.insert("version".into(), Value::Int(1));
        m.insert("machines".into(), Value::List(vec![Value::Null]));
        assert_eq!(
            envelope().coerce(&Value::Map(m.clone()), &root()).unwrap(),
            Value::Map(m)
        );
    }

    #[test]
    fn test_null_reports_nothing() {
        let err = string()
            .coerce(&Value::Null, &root().field("value"))
            .unwrap_err();
        assert_eq!(err.to_string(), "value: expected string, got nothing");
    }

    #[test]
    fn test_list_reports_element_path() {
        let checker = list(string());
        let value = Value::List(vec![Value::from("a"), Value::Int(1)]);
        let err = checker.coerce(&value, &root().field("jobs")).unwrap_err();
        assert_eq!(err.to_string(), "jobs[1]: expected string, got int(1)");
    }

    #[test]
    fn test_map_with_int_keys_canonicalises_keys() {
        let checker = map(int(), string());
        let mut m = Map::new();
        m.insert("007".into(), Value::from("x"));
        let out = checker.coerce(&Value::Map(m), &root()).unwrap();
        assert_eq!(out.get("7"), Some(&Value::from("x")));
    }

    #[test]
    fn test_map_rejects_bad_keys() {
        let checker = map(int(), string());
        let mut m = Map::new();
        m.insert("seven".into(), Value::from("x"));
        let err = checker
            .coerce(&Value::Map(m), &root().field("state"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "state.seven: expected int, got string(\"seven\")"
        );
    }

    #[test]
    fn test_string_map_of_string_maps() {
        let checker = string_map(string_map(any()));
        let mut inner = Map::new();
        inner.insert("k".into(), Value::Int(1));
        let mut outer = Map::new();
        outer.insert("foo/0".into(), Value::Map(inner));
        outer.insert("foo/1".into(), Value::Int(2));
        let err = checker
            .coerce(&Value::Map(outer), &root().field("unit-settings"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unit-settings.foo/1: expected map, got int(2)"
        );
    }

    proptest! {
        #[test]
        fn prop_int_string_coercion_is_deterministic(i in proptest::arbitrary::any::<i64>()) {
            let value = Value::String(i.to_string());
            let first = int().coerce(&value, &Path::root()).unwrap();
            let second = int().coerce(&value, &Path::root()).unwrap();
            prop_assert_eq!(&first, &Value::Int(i));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_force_uint_never_accepts_negative_ints(i in i64::MIN..0i64) {
            prop_assert!(force_uint().coerce(&Value::Int(i), &Path::root()).is_err());
        }

        #[test]
        fn prop_string_checker_rejects_non_strings(
            b in proptest::arbitrary::any::<bool>(),
            i in proptest::arbitrary::any::<i64>()
        ) {
            prop_assert!(string().coerce(&Value::Bool(b), &Path::root()).is_err());
            prop_assert!(string().coerce(&Value::Int(i), &Path::root()).is_err());
        }
    }
}
