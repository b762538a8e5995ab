//! # notedown
//!
//! Deterministic conversion of rich-text editor documents (JSON trees of
//! typed nodes and marks) into Markdown.
//!
//! ## Quick Start
//!
//! ```
//! let json = r#"{
//!     "type": "doc",
//!     "content": [
//!         {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Plan"}]},
//!         {"type": "paragraph", "content": [
//!             {"type": "text", "text": "Ship it", "marks": [{"type": "bold"}]}
//!         ]}
//!     ]
//! }"#;
//!
//! let markdown = notedown::to_markdown(json)?;
//! assert_eq!(markdown, "## Plan\n\n**Ship it**");
//! # Ok::<(), notedown::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Type registry**: node and mark kinds composed by add, replace and alias
//! - **List fidelity**: tight and loose lists, nesting, ordered numbering, task items
//! - **Mark interleaving**: shared marks stay open across adjacent runs
//! - **Batch conversion**: notes exports converted in parallel with Rayon

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod render;
pub mod schema;

// Re-export commonly used types
pub use batch::{
    convert_notes, convert_notes_str, BatchOptions, BatchOutcome, BatchReport, NoteRecord,
    NotesExport,
};
pub use detect::{detect_input, detect_input_str, InputKind};
pub use error::{Error, Result};
pub use model::{Document, Mark, Node};
pub use render::{MarkSpec, MarkdownSerializer, NodeRenderer, SerializerOptions};
pub use schema::{MarkType, NodeType, Schema};

use std::io::Read;

use once_cell::sync::Lazy;
use serde_json::Value;

static NOTES_SCHEMA: Lazy<Schema> = Lazy::new(Schema::notes);
static NOTES_SERIALIZER: Lazy<MarkdownSerializer> = Lazy::new(MarkdownSerializer::notes);

/// The shared notes schema.
pub fn notes_schema() -> &'static Schema {
    &NOTES_SCHEMA
}

/// The shared notes serializer with default options.
pub fn notes_serializer() -> &'static MarkdownSerializer {
    &NOTES_SERIALIZER
}

/// Parse a document from JSON text against the notes schema.
///
/// # Example
///
/// ```
/// let doc = notedown::parse_str(r#"{"type": "doc", "content": []}"#).unwrap();
/// assert!(doc.is_empty());
/// ```
pub fn parse_str(json: &str) -> Result<Document> {
    Document::from_str(notes_schema(), json)
}

/// Parse a document from a reader against the notes schema.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    Document::from_reader(notes_schema(), reader)
}

/// Convert document JSON text to Markdown with the notes presets.
pub fn to_markdown(json: &str) -> Result<String> {
    let doc = parse_str(json)?;
    notes_serializer().serialize(&doc)
}

/// Convert a parsed JSON document to Markdown with the notes presets.
pub fn to_markdown_value(value: &Value) -> Result<String> {
    let doc = Document::from_value(notes_schema(), value)?;
    notes_serializer().serialize(&doc)
}

/// Builder for parsing and converting documents.
///
/// # Example
///
/// ```
/// use notedown::Notedown;
///
/// let markdown = Notedown::new()
///     .loose_lists()
///     .to_markdown(r#"{"type": "doc", "content": [
///         {"type": "list", "attrs": {"tight": null}, "content": [
///             {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "a"}]}]},
///             {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "b"}]}]}
///         ]}
///     ]}"#)?;
/// assert_eq!(markdown, "- a\n\n- b");
/// # Ok::<(), notedown::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Notedown {
    schema: Schema,
    serializer: MarkdownSerializer,
}

impl Notedown {
    /// Create a converter with the notes presets.
    pub fn new() -> Self {
        Self {
            schema: notes_schema().clone(),
            serializer: notes_serializer().clone(),
        }
    }

    /// Use a custom schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Use a custom serializer.
    pub fn with_serializer(mut self, serializer: MarkdownSerializer) -> Self {
        self.serializer = serializer;
        self
    }

    /// Set serializer options.
    pub fn with_options(mut self, options: SerializerOptions) -> Self {
        self.serializer = self.serializer.with_options(options);
        self
    }

    /// Render lists whose `tight` attribute is unset or null as loose lists.
    ///
    /// The notes schema defaults `list.tight` to true, so this only reaches
    /// `list` nodes with an explicit null `tight` and `orderedList` nodes.
    pub fn loose_lists(self) -> Self {
        let options = self.serializer.options().clone().with_tight_lists(false);
        self.with_options(options)
    }

    /// Disable text escaping.
    pub fn without_escaping(self) -> Self {
        let options = self.serializer.options().clone().with_escape(false);
        self.with_options(options)
    }

    /// The schema in use.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The serializer in use.
    pub fn serializer(&self) -> &MarkdownSerializer {
        &self.serializer
    }

    /// Check that every schema kind has a renderer.
    pub fn verify(&self) -> Result<()> {
        self.serializer.verify(&self.schema)
    }

    /// Parse document JSON text.
    pub fn parse(&self, json: &str) -> Result<Document> {
        Document::from_str(&self.schema, json)
    }

    /// Parse a document from a reader.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Document> {
        Document::from_reader(&self.schema, reader)
    }

    /// Serialize a parsed document.
    pub fn serialize(&self, doc: &Document) -> Result<String> {
        self.serializer.serialize(doc)
    }

    /// Convert document JSON text to Markdown.
    pub fn to_markdown(&self, json: &str) -> Result<String> {
        let doc = self.parse(json)?;
        self.serialize(&doc)
    }

    /// Convert a parsed JSON document to Markdown.
    pub fn to_markdown_value(&self, value: &Value) -> Result<String> {
        let doc = Document::from_value(&self.schema, value)?;
        self.serialize(&doc)
    }

    /// Convert every record of a notes export.
    pub fn convert_notes(&self, export: &NotesExport, options: &BatchOptions) -> BatchReport {
        batch::convert_notes(export, &self.schema, &self.serializer, options)
    }
}

impl Default for Notedown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notedown_builder() {
        let converter = Notedown::new().loose_lists().without_escaping();
        assert!(!converter.serializer().options().tight_lists);
        assert!(!converter.serializer().options().escape_text);
        converter.verify().unwrap();
    }

    #[test]
    fn test_to_markdown_simple() {
        let json = r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"Hello"}]}]}"#;
        assert_eq!(to_markdown(json).unwrap(), "Hello");
    }

    #[test]
    fn test_to_markdown_value() {
        let value = json!({"type": "doc", "content": []});
        assert_eq!(to_markdown_value(&value).unwrap(), "");
    }

    #[test]
    fn test_to_markdown_malformed() {
        assert!(matches!(to_markdown("not json"), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_parse_reader() {
        let json = br#"{"type":"doc","content":[{"type":"paragraph"}]}"#;
        let doc = parse_reader(&json[..]).unwrap();
        assert_eq!(doc.content().len(), 1);
    }

    #[test]
    fn test_custom_schema_without_renderer() {
        let schema = Schema::notes()
            .extend()
            .add_node(NodeType::new("callout").content("block+").group("block"))
            .build()
            .unwrap();
        let converter = Notedown::new().with_schema(schema);
        assert!(matches!(
            converter.verify(),
            Err(Error::MissingNodeRenderer(ref k)) if k == "callout"
        ));
    }
}
