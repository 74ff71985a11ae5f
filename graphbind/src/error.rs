//! Error types for graph normalization, copying and formatting.

use thiserror::Error;

/// Failure converting a [`Value`](crate::Value) into a concrete Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The value has a shape the target type cannot accept.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A numeric value does not fit the target type.
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// A string could not be parsed into the target type.
    #[error("cannot parse '{value}' as {target}")]
    Unparsable { value: String, target: &'static str },

    /// A record handed to a generated reader or writer was of another type.
    #[error("record is not a {0}")]
    Downcast(&'static str),

    /// A setter returned an error for the converted value.
    #[error("{setter} rejected the value: {message}")]
    Rejected {
        setter: &'static str,
        message: String,
    },
}

impl ConversionError {
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn downcast(type_name: &'static str) -> Self {
        Self::Downcast(type_name)
    }

    pub fn rejected(setter: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Rejected {
            setter,
            message: error.to_string(),
        }
    }
}

/// Failure while evaluating the metadata attached to a single field.
///
/// Never surfaces from traversal: the cache logs it and treats the field
/// as carrying no metadata.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("metadata for field '{field}' failed: {message}")]
pub struct IntrospectionError {
    pub field: &'static str,
    pub message: String,
}

impl IntrospectionError {
    pub fn attribute(field: &'static str, error: impl std::fmt::Display) -> Self {
        Self {
            field,
            message: error.to_string(),
        }
    }
}

/// Errors raised by copy and bind operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// The target cannot receive named fields (for example a bare list).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A resolved field or setter rejected the value.
    #[error("cannot write field '{field}': {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },
}

impl BindError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn conversion(field: impl Into<String>, source: ConversionError) -> Self {
        Self::Conversion {
            field: field.into(),
            source,
        }
    }
}

/// Errors raised while encoding normalized output.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer flush failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid XML element name '{0}'")]
    XmlName(String),

    #[error("XML encoding failed: {0}")]
    Xml(String),

    #[error("formatter write failed: {0}")]
    Write(#[from] std::fmt::Error),
}

/// Errors raised while building a serializer from textual input.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML input: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Result alias for copy operations.
pub type BindResult<T> = Result<T, BindError>;

/// Result alias for formatter output.
pub type FormatResult<T> = Result<T, FormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindError::invalid_argument("target must be a record, found a list");
        assert_eq!(
            err.to_string(),
            "invalid argument: target must be a record, found a list"
        );

        let err = BindError::conversion("age", ConversionError::mismatch("integer", "string"));
        assert_eq!(
            err.to_string(),
            "cannot write field 'age': expected integer, found string"
        );

        let err = IntrospectionError::attribute("_name", "boom");
        assert_eq!(err.to_string(), "metadata for field '_name' failed: boom");
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let err = BindError::conversion("id", ConversionError::downcast("Model"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("record is not a Model"));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BindError>();
        assert_send_sync::<ConversionError>();
        assert_send_sync::<FormatError>();
        assert_send_sync::<SerializeError>();
    }
}
