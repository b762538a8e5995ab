//! Input shape detection.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::TOP_NODE;

/// Kind of JSON input accepted by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A single document: `{"type": "doc", ...}`
    Document,
    /// A notes export: `{"notes": [...]}`
    NotesExport {
        /// Number of records in the export
        count: usize,
    },
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Document => write!(f, "document"),
            InputKind::NotesExport { count } => write!(f, "notes export ({} notes)", count),
        }
    }
}

/// Detect the input kind of a parsed JSON value.
///
/// # Arguments
/// * `value` - The parsed input
///
/// # Returns
/// * `Ok(InputKind)` for a document or a notes export
/// * `Err(Error::UnknownFormat)` for anything else
///
/// # Example
/// ```
/// use notedown::detect::{detect_input, InputKind};
/// use serde_json::json;
///
/// let kind = detect_input(&json!({"type": "doc", "content": []})).unwrap();
/// assert_eq!(kind, InputKind::Document);
/// ```
pub fn detect_input(value: &Value) -> Result<InputKind> {
    if value.get("type").and_then(Value::as_str) == Some(TOP_NODE) {
        return Ok(InputKind::Document);
    }
    match value.get("notes").and_then(Value::as_array) {
        Some(notes) => Ok(InputKind::NotesExport { count: notes.len() }),
        None => Err(Error::UnknownFormat),
    }
}

/// Detect the input kind of JSON text.
///
/// Fails with `MalformedInput` if the text is not JSON.
pub fn detect_input_str(json: &str) -> Result<InputKind> {
    let value: Value = serde_json::from_str(json)?;
    detect_input(&value)
}

/// Check if a JSON value is a single document.
pub fn is_document(value: &Value) -> bool {
    matches!(detect_input(value), Ok(InputKind::Document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_document() {
        let value = json!({"type": "doc", "content": []});
        assert_eq!(detect_input(&value).unwrap(), InputKind::Document);
        assert!(is_document(&value));
    }

    #[test]
    fn test_detect_notes_export() {
        let value = json!({"notes": [{"document_json": "{}"}, {"document_json": "{}"}]});
        assert_eq!(
            detect_input(&value).unwrap(),
            InputKind::NotesExport { count: 2 }
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert!(matches!(
            detect_input(&json!({"type": "paragraph"})),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(detect_input(&json!([1, 2])), Err(Error::UnknownFormat)));
        assert!(matches!(
            detect_input(&json!({"notes": "none"})),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_str_malformed() {
        assert!(matches!(
            detect_input_str("{oops"),
            Err(Error::MalformedInput(_))
        ));
        assert_eq!(
            detect_input_str(r#"{"type":"doc"}"#).unwrap(),
            InputKind::Document
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(InputKind::Document.to_string(), "document");
        assert_eq!(
            InputKind::NotesExport { count: 3 }.to_string(),
            "notes export (3 notes)"
        );
    }
}
