//! Structured string identifiers
//!
//! Some historical document versions refer to entities by tag (`unit-foo-0`,
//! `machine-0-lxd-1`) where newer versions use the bare id (`foo/0`,
//! `0/lxd/1`). This module converts between the two forms and validates the
//! id grammar for each kind.
//!
//! ```
//! use modeldoc_core::tag::Tag;
//!
//! let tag = Tag::parse("unit-mysql-router-2").unwrap();
//! assert_eq!(tag, Tag::Unit("mysql-router/2".to_string()));
//! assert_eq!(tag.to_string(), "unit-mysql-router-2");
//! ```

use crate::error::{Error, Result};
use std::fmt;

/// A typed entity identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `machine-0-lxd-1` ⇔ `0/lxd/1`
    Machine(String),
    /// `unit-foo-0` ⇔ `foo/0`
    Unit(String),
    /// `application-foo` ⇔ `foo`
    Application(String),
    /// `model-<uuid>` ⇔ `<uuid>`
    Model(String),
    /// `user-admin` ⇔ `admin`
    User(String),
    /// `storage-data-0` ⇔ `data/0`
    Storage(String),
    /// `volume-0-1` ⇔ `0/1`
    Volume(String),
    /// `filesystem-0-1` ⇔ `0/1`
    Filesystem(String),
}

impl Tag {
    /// Parse a tag string
    pub fn parse(s: &str) -> Result<Tag> {
        let (kind, rest) = s
            .split_once('-')
            .ok_or_else(|| Error::not_valid(format!("tag {s:?}")))?;
        if rest.is_empty() {
            return Err(Error::not_valid(format!("tag {s:?}")));
        }
        let tag = match kind {
            "machine" => Tag::Machine(rest.replace('-', "/")),
            "unit" => Tag::Unit(split_last_number(rest, s)?),
            "application" => Tag::Application(rest.to_string()),
            "model" => Tag::Model(rest.to_string()),
            "user" => Tag::User(rest.to_string()),
            "storage" => Tag::Storage(split_last_number(rest, s)?),
            "volume" => Tag::Volume(rest.replace('-', "/")),
            "filesystem" => Tag::Filesystem(rest.replace('-', "/")),
            _ => return Err(Error::not_valid(format!("tag kind {kind:?}"))),
        };
        match &tag {
            Tag::Machine(id) if !is_valid_machine_id(id) => {
                Err(Error::not_valid(format!("machine tag {s:?}")))
            }
            Tag::Unit(name) if !is_valid_unit_name(name) => {
                Err(Error::not_valid(format!("unit tag {s:?}")))
            }
            _ => Ok(tag),
        }
    }

    /// The tag kind prefix
    pub fn kind(&self) -> &'static str {
        match self {
            Tag::Machine(_) => "machine",
            Tag::Unit(_) => "unit",
            Tag::Application(_) => "application",
            Tag::Model(_) => "model",
            Tag::User(_) => "user",
            Tag::Storage(_) => "storage",
            Tag::Volume(_) => "volume",
            Tag::Filesystem(_) => "filesystem",
        }
    }

    /// The bare id the tag refers to
    pub fn id(&self) -> &str {
        match self {
            Tag::Machine(id)
            | Tag::Unit(id)
            | Tag::Application(id)
            | Tag::Model(id)
            | Tag::User(id)
            | Tag::Storage(id)
            | Tag::Volume(id)
            | Tag::Filesystem(id) => id,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind(), self.id().replace('/', "-"))
    }
}

fn split_last_number(rest: &str, original: &str) -> Result<String> {
    let (name, number) = rest
        .rsplit_once('-')
        .ok_or_else(|| Error::not_valid(format!("tag {original:?}")))?;
    if name.is_empty() || number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::not_valid(format!("tag {original:?}")));
    }
    Ok(format!("{name}/{number}"))
}

/// Check an application name: lowercase segments joined by `-`, starting
/// with a letter, with no segment made only of digits.
pub fn is_valid_application_name(name: &str) -> bool {
    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return false;
    }
    name.split('-').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            && !segment.bytes().all(|b| b.is_ascii_digit())
    })
}

/// Check a unit name of the form `<application>/<number>`
pub fn is_valid_unit_name(name: &str) -> bool {
    match name.rsplit_once('/') {
        Some((app, number)) => {
            is_valid_application_name(app)
                && !number.is_empty()
                && number.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Check a machine id: `0`, or a container id such as `0/lxd/1`
pub fn is_valid_machine_id(id: &str) -> bool {
    let parts: Vec<&str> = id.split('/').collect();
    if parts.len() % 2 == 0 {
        return false;
    }
    parts.iter().enumerate().all(|(i, part)| {
        !part.is_empty()
            && if i % 2 == 0 {
                part.bytes().all(|b| b.is_ascii_digit())
            } else {
                part.bytes().all(|b| b.is_ascii_lowercase())
            }
    })
}

/// The application part of a unit name (`foo/0` ⇒ `foo`)
pub fn unit_application(name: &str) -> &str {
    name.rsplit_once('/').map(|(app, _)| app).unwrap_or(name)
}

/// The host machine of a container id (`0/lxd/1` ⇒ `Some("0")`)
pub fn machine_parent(id: &str) -> Option<&str> {
    let mut parts = id.rsplitn(3, '/');
    let _number = parts.next()?;
    let _container_type = parts.next()?;
    parts.next()
}
