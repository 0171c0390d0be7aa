//! Core types for model documents
//!
//! This crate defines the foundational types used by every other layer:
//! - Value: the decoded tree every checker operates on
//! - Error: error hierarchy with context annotation
//! - Tag: structured string identifiers (`unit-foo-0` ⇔ `foo/0`)
//! - WireCodec: byte-level encoders/decoders (YAML, JSON)
//! - Limits: document size and nesting limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod limits;
pub mod tag;
pub mod value;

pub use codec::{get_codec, JsonCodec, WireCodec, YamlCodec};
pub use error::{Error, Result, ResultExt};
pub use limits::{LimitError, Limits};
pub use tag::Tag;
pub use value::{format_time, parse_time, Map, Value};
