//! Decoded value tree
//!
//! This module defines [`Value`], the universal intermediate representation
//! between the wire codecs and the checkers. A codec turns bytes into a `Value`
//! tree; checkers turn a `Value` tree into canonically typed values.
//!
//! ## Variants
//!
//! - Null, Bool, Int, Uint, Float, String, Bytes, Time, List, Map
//!
//! ## Type Rules
//!
//! - Different variants are NEVER equal: `Int(1) != Float(1.0)`,
//!   `Int(1) != Uint(1)`
//! - Float equality follows IEEE-754 (`NaN != NaN`)
//! - Maps are ordered by key, so every traversal and every encoding is
//!   deterministic

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

/// Ordered string-keyed map of values
pub type Map = BTreeMap<String, Value>;

/// A dynamically typed decoded value
#[derive(Debug, Clone)]
pub enum Value {
    /// Null / absent value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit unsigned integer (produced by unsigned coercion)
    Uint(u64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// UTC timestamp
    Time(DateTime<Utc>),
    /// Ordered list of values
    List(Vec<Value>),
    /// String-keyed map of values
    Map(Map),
}

// Custom PartialEq implementation for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Get the type name as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nothing",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Time(_) => "time",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Describe the value for a type mismatch message
    ///
    /// Scalars include their content (`bool(true)`, `string("x")`); containers
    /// only report their kind so messages stay short.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "nothing".to_string(),
            Value::Bool(b) => format!("bool({b})"),
            Value::Int(i) => format!("int({i})"),
            Value::Uint(u) => format!("uint({u})"),
            Value::Float(f) => format!("float({f})"),
            Value::String(s) => format!("string({s:?})"),
            Value::Bytes(b) => format!("bytes(len {})", b.len()),
            Value::Time(t) => format!("time({})", format_time(t)),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as u64 if this is a Uint value
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get the timestamp if this is a Time value
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Get as &[Value] if this is a List value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Get as &Map if this is a Map value
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key if this is a Map value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

/// Render a timestamp in the canonical wire form (RFC 3339, UTC, `Z` suffix)
pub fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a canonical wire timestamp
pub fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// ============================================================================
// From implementations for ergonomic construction
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Vec<String>> for Value {
    fn from(l: Vec<String>) -> Self {
        Value::List(l.into_iter().map(Value::String).collect())
    }
}

impl From<&[String]> for Value {
    fn from(l: &[String]) -> Self {
        Value::List(l.iter().cloned().map(Value::String).collect())
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<&BTreeMap<String, String>> for Value {
    fn from(m: &BTreeMap<String, String>) -> Self {
        Value::Map(
            m.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_different_types_never_equal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Uint(1));
        assert_ne!(Value::String("a".into()), Value::Bytes(b"a".to_vec()));
    }

    #[test]
    fn test_float_ieee_equality() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn test_describe_scalars() {
        assert_eq!(Value::Bool(true).describe(), "bool(true)");
        assert_eq!(Value::Int(-3).describe(), "int(-3)");
        assert_eq!(Value::String("x".into()).describe(), "string(\"x\")");
        assert_eq!(Value::Null.describe(), "nothing");
        assert_eq!(Value::List(vec![]).describe(), "list");
    }

    #[test]
    fn test_map_get() {
        let mut m = Map::new();
        m.insert("a".into(), Value::Int(1));
        let v = Value::Map(m);
        assert_eq!(v.get("a"), Some(&Value::Int(1)));
        assert_eq!(v.get("b"), None);
        assert_eq!(Value::Int(1).get("a"), None);
    }

    #[test]
    fn test_time_round_trip_keeps_nanoseconds() {
        let t = Utc.timestamp_opt(1_600_000_000, 123_456_789).unwrap();
        let s = format_time(&t);
        assert!(s.ends_with('Z'));
        assert_eq!(parse_time(&s), Some(t));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(parse_time("yesterday"), None);
    }

    #[test]
    fn test_from_string_list() {
        let v = Value::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            v,
            Value::List(vec![Value::String("a".into()), Value::String("b".into())])
        );
    }
}
