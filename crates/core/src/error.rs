//! Error types for model documents
//!
//! Every failure in the import, export and validation paths is reported through
//! the single [`Error`] enum defined here. We use `thiserror` for the `Display`
//! and `Error` implementations.
//!
//! ## Taxonomy
//!
//! - **Shape errors** (`TypeMismatch`, `NotValid`, `Conflict`): a decoded
//!   value does not have the type a checker expects, a required field is
//!   missing, a declared version is unknown, or two fields that exclude each
//!   other are both present.
//! - **Invariant errors** (`Validation`, `NotFound`): business rules checked by
//!   an explicit `validate()` call.
//! - **Codec errors** (`Encoding`, `TooLarge`): the byte stream itself could
//!   not be turned into a decoded tree.
//!
//! Errors gain context as they cross each recursive boundary through
//! [`Error::annotate`] / [`ResultExt`]. The annotated chain renders as
//! `"machines: machine 0: instance: version 9 not valid"`, while
//! [`Error::root`] recovers the innermost error for classification.

use thiserror::Error;

/// Result type alias for model document operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for model documents
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A value had the wrong dynamic type, or a required value was absent
    #[error("{}", render_mismatch(.path, .expected, .got))]
    TypeMismatch {
        /// Field path of the offending value (empty at the root)
        path: String,
        /// Name of the expected type
        expected: String,
        /// Description of what was found (`nothing` when absent)
        got: String,
    },

    /// Something was recognised but is not acceptable (e.g. `version 7`)
    #[error("{0} not valid")]
    NotValid(String),

    /// Fields that exclude each other were both present in a document
    #[error("{0}")]
    Conflict(String),

    /// A referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A business rule was violated
    #[error("{0}")]
    Validation(String),

    /// The wire codec failed to encode or decode a document
    #[error("encoding error (codec={codec_id}): {detail}")]
    Encoding {
        /// Codec that attempted the operation
        codec_id: String,
        /// Human-readable error description
        detail: String,
    },

    /// The document exceeded the configured size limit
    #[error("document too large: {size} bytes > limit {limit}")]
    TooLarge {
        /// Actual document size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// An error with additional context prepended
    #[error("{context}: {source}")]
    Annotated {
        /// Context added at a call boundary
        context: String,
        /// The wrapped error
        #[source]
        source: Box<Error>,
    },
}

fn render_mismatch(path: &str, expected: &str, got: &str) -> String {
    if path.is_empty() {
        format!("expected {expected}, got {got}")
    } else {
        format!("{path}: expected {expected}, got {got}")
    }
}

impl Error {
    /// Create a type mismatch error
    pub fn mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a not-valid error
    pub fn not_valid(what: impl Into<String>) -> Self {
        Error::NotValid(what.into())
    }

    /// Create a conflicting-fields error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(codec_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Encoding {
            codec_id: codec_id.into(),
            detail: detail.into(),
        }
    }

    /// Wrap this error with additional context
    pub fn annotate(self, context: impl Into<String>) -> Self {
        Error::Annotated {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost, unannotated error
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Annotated { source, .. } = err {
            err = source;
        }
        err
    }

    /// Context strings from the outermost annotation inwards
    pub fn contexts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut err = self;
        while let Error::Annotated { context, source } = err {
            out.push(context.as_str());
            err = source;
        }
        out
    }

    /// Check if the root cause is a type mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.root(), Error::TypeMismatch { .. })
    }

    /// Check if the root cause is a not-valid error
    pub fn is_not_valid(&self) -> bool {
        matches!(self.root(), Error::NotValid(_))
    }

    /// Check if the root cause is a conflicting-fields error
    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), Error::Conflict(_))
    }

    /// Check if the root cause is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound(_))
    }

    /// Check if the root cause is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Error::Validation(_))
    }
}

/// Extension methods for annotating errors carried in a `Result`
pub trait ResultExt<T> {
    /// Prepend a fixed context string to any error
    fn annotate(self, context: impl Into<String>) -> Result<T>;

    /// Prepend a lazily-built context string to any error
    fn annotate_with<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn annotate(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.annotate(context))
    }

    fn annotate_with<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.annotate(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_mismatch_with_path() {
        let err = Error::mismatch("name", "string", "bool(true)");
        assert_eq!(err.to_string(), "name: expected string, got bool(true)");
    }

    #[test]
    fn test_error_display_mismatch_at_root() {
        let err = Error::mismatch("", "map", "nothing");
        assert_eq!(err.to_string(), "expected map, got nothing");
    }

    #[test]
    fn test_error_display_not_valid() {
        let err = Error::not_valid("version 42");
        assert_eq!(err.to_string(), "version 42 not valid");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::not_found("machine \"3\"");
        assert_eq!(err.to_string(), "machine \"3\" not found");
    }

    #[test]
    fn test_error_display_encoding() {
        let err = Error::encoding("yaml", "unexpected end of stream");
        let msg = err.to_string();
        assert!(msg.contains("yaml"));
        assert!(msg.contains("unexpected end of stream"));
    }

    #[test]
    fn test_error_display_too_large() {
        let err = Error::TooLarge { size: 10, limit: 5 };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("5"));
    }

    #[test]
    fn test_annotations_compose() {
        let err = Error::not_valid("version 9")
            .annotate("instance")
            .annotate("machine 0")
            .annotate("machines");
        assert_eq!(
            err.to_string(),
            "machines: machine 0: instance: version 9 not valid"
        );
        assert_eq!(err.contexts(), vec!["machines", "machine 0", "instance"]);
        assert!(err.is_not_valid());
        assert_eq!(err.root(), &Error::not_valid("version 9"));
    }

    #[test]
    fn test_result_ext_annotate() {
        let result: Result<()> = Err(Error::mismatch("id", "string", "nothing"));
        let err = result.annotate("space 2").unwrap_err();
        assert_eq!(err.to_string(), "space 2: id: expected string, got nothing");
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_result_ext_annotate_with_is_lazy() {
        let ok: Result<i32> = Ok(3);
        let value = ok
            .annotate_with(|| -> String { panic!("context must not be built on success") })
            .unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn test_conflict_is_not_a_validation_error() {
        let err = Error::conflict("can not specify both a and b").annotate("constraints");
        assert_eq!(err.to_string(), "constraints: can not specify both a and b");
        assert!(err.is_conflict());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::validation("x").is_validation());
        assert!(Error::not_found("x").annotate("ctx").is_not_found());
        assert!(!Error::validation("x").is_not_valid());
    }
}
