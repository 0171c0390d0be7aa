//! modeldoc - versioned model description documents
//!
//! A model document describes a whole deployment: machines, applications and
//! units, relations, networking, storage and cross-model state. Documents are
//! written at the newest schema version of every entity kind and read back
//! from any version ever written.
//!
//! # Quick Start
//!
//! ```ignore
//! use modeldoc::{Model, ModelArgs, DescriptionConfig};
//!
//! let mut model = Model::new(ModelArgs { owner: "admin".into(), ..Default::default() });
//! let bytes = modeldoc::serialize(&model)?;
//! let back = modeldoc::deserialize_with(&bytes, &DescriptionConfig::strict())?;
//! ```
//!
//! # Layout
//!
//! - [`core`]: the dynamic value tree, errors, tags, wire codecs and limits
//! - [`schema`]: field checkers, schema registries and the envelope protocol
//! - everything else is re-exported from the entity crate

pub use modeldoc_core as core;
pub use modeldoc_schema as schema;

pub use modeldoc_core::{Error, Map, Result, Tag, Value};
pub use modeldoc_model::*;
