//! Serialization configuration
//!
//! Controls which wire codec documents use, how large a document may be and
//! whether import runs the cross-entity validator. The same settings can be
//! read from a `modeldoc.toml` file:
//!
//! ```toml
//! codec = "yaml"
//! max_document_bytes = 67108864
//! max_nesting_depth = 128
//! validate_on_import = false
//! ```

use modeldoc_core::{get_codec, Error, Limits, WireCodec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for [`serialize_with`](crate::serialize_with) and
/// [`deserialize_with`](crate::deserialize_with)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    /// Codec identifier: `"yaml"` (default) or `"json"`
    #[serde(rename = "codec")]
    pub codec_id: String,
    /// Largest encoded document accepted, in bytes
    pub max_document_bytes: usize,
    /// Deepest nesting accepted in a decoded document
    pub max_nesting_depth: usize,
    /// Run [`Model::validate`](crate::Model::validate) after import
    pub validate_on_import: bool,
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        let limits = Limits::default();
        DescriptionConfig {
            codec_id: "yaml".to_string(),
            max_document_bytes: limits.max_document_bytes,
            max_nesting_depth: limits.max_nesting_depth,
            validate_on_import: false,
        }
    }
}

impl DescriptionConfig {
    /// YAML documents that are validated on import
    pub fn strict() -> Self {
        DescriptionConfig {
            validate_on_import: true,
            ..Default::default()
        }
    }

    /// JSON documents, otherwise default
    pub fn json() -> Self {
        DescriptionConfig {
            codec_id: "json".to_string(),
            ..Default::default()
        }
    }

    /// Set the codec identifier
    pub fn with_codec(mut self, codec_id: impl Into<String>) -> Self {
        self.codec_id = codec_id.into();
        self
    }

    /// Set the document size limit
    pub fn with_max_document_bytes(mut self, bytes: usize) -> Self {
        self.max_document_bytes = bytes;
        self
    }

    /// Set the nesting depth limit
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Turn validation on import on or off
    pub fn with_validate_on_import(mut self, validate: bool) -> Self {
        self.validate_on_import = validate;
        self
    }

    /// Size limits derived from this configuration
    pub fn limits(&self) -> Limits {
        Limits {
            max_document_bytes: self.max_document_bytes,
            max_nesting_depth: self.max_nesting_depth,
        }
    }

    /// The configured codec
    pub fn codec(&self) -> Result<Box<dyn WireCodec>, ConfigError> {
        get_codec(&self.codec_id).map_err(|e| ConfigError::InvalidCodec(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.codec()?;
        if self.max_document_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_document_bytes must be positive".to_string(),
            ));
        }
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_nesting_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: DescriptionConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Serialize this configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Unknown codec identifier
    #[error("invalid codec: {0}")]
    InvalidCodec(String),

    /// Zero or otherwise unusable limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// Malformed TOML
    #[error("invalid config file: {0}")]
    Parse(String),

    /// Config file could not be read
    #[error("cannot read config file {0}")]
    Io(String),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::validation(e.to_string()).annotate("configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DescriptionConfig::default();
        assert_eq!(config.codec_id, "yaml");
        assert_eq!(config.max_document_bytes, 64 * 1024 * 1024);
        assert!(!config.validate_on_import);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = DescriptionConfig::default()
            .with_codec("json")
            .with_max_document_bytes(4096)
            .with_max_nesting_depth(16)
            .with_validate_on_import(true);
        assert_eq!(config.codec().unwrap().codec_id(), "json");
        assert_eq!(config.limits().max_document_bytes, 4096);
        assert_eq!(config.limits().max_nesting_depth, 16);
        assert!(config.validate_on_import);
    }

    #[test]
    fn test_invalid_codec() {
        let err = DescriptionConfig::default().with_codec("xml").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCodec(_)));
        let err: Error = err.into();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("configuration: invalid codec"));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = DescriptionConfig::default()
            .with_max_nesting_depth(0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidLimit("max_nesting_depth must be positive".into())
        );
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = DescriptionConfig::from_toml("codec = \"json\"\nvalidate_on_import = true\n")
            .unwrap();
        assert_eq!(config.codec_id, "json");
        assert!(config.validate_on_import);
        assert_eq!(config.max_nesting_depth, 128);
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modeldoc.toml");
        let config = DescriptionConfig::strict().with_max_document_bytes(1 << 20);
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();
        assert_eq!(DescriptionConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_toml_rejects_bad_types() {
        let err = DescriptionConfig::from_toml("max_document_bytes = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
