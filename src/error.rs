//! Error types for notedown library.

use thiserror::Error;

/// Result type alias for notedown operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or serializing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not valid JSON or does not have the document shape.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A node `type` is not registered in the schema.
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// A mark `type` is not registered in the schema.
    #[error("Unknown mark kind: {0}")]
    UnknownMarkKind(String),

    /// A node kind is registered in the schema but the serializer has no renderer for it.
    #[error("No renderer registered for node kind: {0}")]
    MissingNodeRenderer(String),

    /// A mark kind is registered in the schema but the serializer has no renderer for it.
    #[error("No renderer registered for mark kind: {0}")]
    MissingMarkRenderer(String),

    /// The input is neither a document nor a notes export.
    #[error("Unknown input format: expected a document or a notes export")]
    UnknownFormat,
}

impl Error {
    /// Whether the error is caused by the input data rather than by the
    /// serializer configuration.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedInput(_)
                | Error::UnknownNodeKind(_)
                | Error::UnknownMarkKind(_)
                | Error::UnknownFormat
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownNodeKind("carousel".to_string());
        assert_eq!(err.to_string(), "Unknown node kind: carousel");

        let err = Error::MissingMarkRenderer("sparkle".to_string());
        assert_eq!(
            err.to_string(),
            "No renderer registered for mark kind: sparkle"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_is_data_error() {
        assert!(Error::UnknownMarkKind("x".into()).is_data_error());
        assert!(Error::MalformedInput("x".into()).is_data_error());
        assert!(!Error::MissingNodeRenderer("x".into()).is_data_error());
    }
}
