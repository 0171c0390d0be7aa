//! Operating system bases
//!
//! Current documents name a machine's OS as a base (`ubuntu@22.04`). Older
//! documents stored a series codename instead, which is mapped here.

use modeldoc_core::{Error, Result};

const SERIES_BASES: &[(&str, &str)] = &[
    ("precise", "ubuntu@12.04"),
    ("trusty", "ubuntu@14.04"),
    ("xenial", "ubuntu@16.04"),
    ("bionic", "ubuntu@18.04"),
    ("focal", "ubuntu@20.04"),
    ("jammy", "ubuntu@22.04"),
    ("kinetic", "ubuntu@22.10"),
    ("lunar", "ubuntu@23.04"),
    ("mantic", "ubuntu@23.10"),
    ("noble", "ubuntu@24.04"),
    ("centos7", "centos@7"),
    ("centos8", "centos@8"),
    ("centos9", "centos@9"),
];

/// Map a series codename to its base
pub fn series_to_base(series: &str) -> Result<String> {
    SERIES_BASES
        .iter()
        .find(|(s, _)| *s == series)
        .map(|(_, base)| base.to_string())
        .ok_or_else(|| Error::not_valid(format!("series {series:?}")))
}

/// Check that `base` is `<os>@<channel>` with both parts non-empty
pub fn validate_base(base: &str) -> Result<()> {
    let mut parts = base.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(os), Some(channel), None) if !os.is_empty() && !channel.is_empty() => Ok(()),
        _ => Err(Error::not_valid(format!("base {base:?}"))),
    }
}
