//! Rendering module for converting document trees to Markdown.

mod escape;
mod marks;
mod nodes;
mod options;
mod serializer;
mod state;

pub use escape::Escaper;
pub use marks::{MarkSpec, MarkStyle};
pub use nodes::NodeRenderer;
pub use options::SerializerOptions;
pub use serializer::{MarkdownSerializer, SerializerBuilder};
pub use state::SerializerState;

use crate::error::Result;
use crate::model::Document;

/// Serialize a document with the given serializer.
pub fn to_markdown(doc: &Document, serializer: &MarkdownSerializer) -> Result<String> {
    serializer.serialize(doc)
}
