//! Field paths used in type mismatch messages

use std::fmt;

/// Location of a value inside a decoded document (`endpoints[1].name`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(String);

impl Path {
    /// The empty path (document root)
    pub fn root() -> Self {
        Path(String::new())
    }

    /// Path to a named field below this one
    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Path(name.to_string())
        } else {
            Path(format!("{}.{}", self.0, name))
        }
    }

    /// Path to a list element below this one
    pub fn index(&self, i: usize) -> Self {
        Path(format!("{}[{}]", self.0, i))
    }

    /// The rendered path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the document root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let p = Path::root().field("endpoints").index(1).field("name");
        assert_eq!(p.as_str(), "endpoints[1].name");
        assert_eq!(Path::root().index(0).as_str(), "[0]");
        assert!(Path::root().is_root());
        assert!(!p.is_root());
    }
}
