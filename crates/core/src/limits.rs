//! Size limits for documents
//!
//! Limits are applied by the facade before and after decoding: the raw byte
//! length is checked before the codec runs, and the nesting depth of the
//! decoded tree is checked before any checker walks it.

use crate::error::Error;
use crate::value::Value;
use thiserror::Error;

/// Size limits for decoded documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum encoded document size in bytes (default: 64MB)
    pub max_document_bytes: usize,

    /// Maximum nesting depth of the decoded tree (default: 128)
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_document_bytes: 64 * 1024 * 1024, // 64MB
            max_nesting_depth: 128,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_document_bytes: 1000,
            max_nesting_depth: 10,
        }
    }

    /// Validate the encoded size of a document
    pub fn validate_document_size(&self, len: usize) -> Result<(), LimitError> {
        if len > self.max_document_bytes {
            return Err(LimitError::DocumentTooLarge {
                actual: len,
                max: self.max_document_bytes,
            });
        }
        Ok(())
    }

    /// Validate the nesting depth of a decoded tree
    pub fn validate_value(&self, value: &Value) -> Result<(), LimitError> {
        self.validate_value_impl(value, 0)
    }

    fn validate_value_impl(&self, value: &Value, depth: usize) -> Result<(), LimitError> {
        if depth > self.max_nesting_depth {
            return Err(LimitError::NestingTooDeep {
                actual: depth,
                max: self.max_nesting_depth,
            });
        }
        match value {
            Value::List(items) => items
                .iter()
                .try_for_each(|v| self.validate_value_impl(v, depth + 1)),
            Value::Map(map) => map
                .values()
                .try_for_each(|v| self.validate_value_impl(v, depth + 1)),
            _ => Ok(()),
        }
    }
}

/// Limit validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Document exceeds the size limit
    #[error("document too large: {actual} bytes exceeds maximum {max}")]
    DocumentTooLarge {
        /// Actual size in bytes
        actual: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Decoded tree nests deeper than allowed
    #[error("nesting too deep: {actual} levels exceeds maximum {max}")]
    NestingTooDeep {
        /// Actual nesting depth
        actual: usize,
        /// Maximum allowed depth
        max: usize,
    },
}

impl From<LimitError> for Error {
    fn from(e: LimitError) -> Self {
        match e {
            LimitError::DocumentTooLarge { actual, max } => Error::TooLarge {
                size: actual,
                limit: max,
            },
            LimitError::NestingTooDeep { actual, .. } => {
                Error::not_valid(format!("nesting depth {actual}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_nested_list(depth: usize) -> Value {
        let mut value = Value::Null;
        for _ in 0..depth {
            value = Value::List(vec![value]);
        }
        value
    }

    #[test]
    fn test_document_at_max_size() {
        let limits = Limits::with_small_limits();
        assert!(limits.validate_document_size(1000).is_ok());
    }

    #[test]
    fn test_document_exceeds_max_size() {
        let limits = Limits::with_small_limits();
        let err = limits.validate_document_size(1001).unwrap_err();
        assert!(matches!(err, LimitError::DocumentTooLarge { actual: 1001, .. }));
        assert_eq!(
            Error::from(err),
            Error::TooLarge {
                size: 1001,
                limit: 1000
            }
        );
    }

    #[test]
    fn test_nesting_at_max_depth() {
        let limits = Limits::with_small_limits();
        let value = create_nested_list(limits.max_nesting_depth);
        assert!(limits.validate_value(&value).is_ok());
    }

    #[test]
    fn test_nesting_exceeds_max_depth() {
        let limits = Limits::with_small_limits();
        let value = create_nested_list(limits.max_nesting_depth + 1);
        let err = limits.validate_value(&value).unwrap_err();
        assert!(matches!(err, LimitError::NestingTooDeep { .. }));
        assert!(Error::from(err).is_not_valid());
    }

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_document_bytes, 64 * 1024 * 1024);
        assert_eq!(limits.max_nesting_depth, 128);
    }
}
