//! Markdown serializer: node and mark renderer tables.

use std::collections::BTreeMap;

use log::debug;

use super::escape::Escaper;
use super::marks::MarkSpec;
use super::nodes::NodeRenderer;
use super::state::SerializerState;
use super::SerializerOptions;
use crate::error::{Error, Result};
use crate::model::{Document, Node};
use crate::schema::{Schema, TOP_NODE};

/// Renderer tables plus options; serializes documents to Markdown.
///
/// The tables are fixed once built. Serializing never mutates the
/// serializer, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct MarkdownSerializer {
    nodes: BTreeMap<String, NodeRenderer>,
    marks: BTreeMap<String, MarkSpec>,
    options: SerializerOptions,
    escaper: Escaper,
}

impl MarkdownSerializer {
    /// Start an empty serializer table.
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::new()
    }

    /// Start a builder pre-populated with this serializer's tables and options.
    pub fn extend(&self) -> SerializerBuilder {
        SerializerBuilder {
            nodes: self.nodes.clone(),
            marks: self.marks.clone(),
            options: self.options.clone(),
            errors: Vec::new(),
        }
    }

    /// Renderers for the kinds of [`Schema::basic`].
    pub fn basic() -> Self {
        SerializerBuilder::new()
            .add_node("text", NodeRenderer::Text)
            .add_node("paragraph", NodeRenderer::Paragraph)
            .add_node("heading", NodeRenderer::Heading)
            .add_node("blockquote", NodeRenderer::Blockquote)
            .add_node("code_block", NodeRenderer::CodeBlock)
            .add_node("horizontal_rule", NodeRenderer::HorizontalRule)
            .add_node("bullet_list", NodeRenderer::BulletList)
            .add_node("ordered_list", NodeRenderer::OrderedList)
            .add_node("list_item", NodeRenderer::ListItem)
            .add_node("image", NodeRenderer::Image)
            .add_node("hard_break", NodeRenderer::HardBreak)
            .add_mark("em", MarkSpec::symmetric("*").mixable().expel_whitespace())
            .add_mark("strong", MarkSpec::symmetric("**").mixable().expel_whitespace())
            .add_mark("link", MarkSpec::link())
            .add_mark("code", MarkSpec::code())
            .build()
            .expect("basic serializer is well-formed")
    }

    /// Renderers for the kinds of [`Schema::notes`].
    pub fn notes() -> Self {
        Self::basic()
            .extend()
            .replace_node("paragraph", NodeRenderer::ListAwareParagraph)
            .add_node("list", NodeRenderer::NoteList)
            .alias_node("listItem", "list_item")
            .alias_node("orderedList", "ordered_list")
            .alias_node("bulletList", "bullet_list")
            .add_node("tag", NodeRenderer::Tag)
            .add_node("backlink", NodeRenderer::Backlink)
            .add_node("tweet", NodeRenderer::Tweet)
            .add_node("hardBreak", NodeRenderer::LineBreak)
            .add_node("iframe", NodeRenderer::VideoEmbed)
            .add_node("horizontalRule", NodeRenderer::HorizontalRule)
            .add_node("codeBlock", NodeRenderer::FencedCode)
            .add_node("file", NodeRenderer::FileAttachment)
            .alias_mark("italic", "em")
            .alias_mark("bold", "strong")
            .add_mark("textHighlight", MarkSpec::symmetric("==").mixable().expel_whitespace())
            .add_mark("underline", MarkSpec::symmetric("__").mixable().expel_whitespace())
            .add_mark("strike", MarkSpec::symmetric("~~").mixable().expel_whitespace())
            .build()
            .expect("notes serializer is well-formed")
    }

    /// Replace the options.
    pub fn with_options(mut self, options: SerializerOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    pub(crate) fn escaper(&self) -> &Escaper {
        &self.escaper
    }

    /// Renderer for a node kind.
    pub fn node_renderer(&self, name: &str) -> Result<NodeRenderer> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingNodeRenderer(name.to_string()))
    }

    /// Renderer for a mark kind.
    pub fn mark_spec(&self, name: &str) -> Result<&MarkSpec> {
        self.marks
            .get(name)
            .ok_or_else(|| Error::MissingMarkRenderer(name.to_string()))
    }

    /// Node kind names with their renderers, sorted by name.
    pub fn node_renderers(&self) -> impl Iterator<Item = (&str, NodeRenderer)> {
        self.nodes.iter().map(|(name, r)| (name.as_str(), *r))
    }

    /// Mark kind names with their renderers, sorted by name.
    pub fn mark_specs(&self) -> impl Iterator<Item = (&str, &MarkSpec)> {
        self.marks.iter().map(|(name, m)| (name.as_str(), m))
    }

    /// Check that every kind of `schema` has a renderer.
    pub fn verify(&self, schema: &Schema) -> Result<()> {
        for node_type in schema.node_types() {
            if node_type.name() != TOP_NODE {
                self.node_renderer(node_type.name())?;
            }
        }
        for mark_type in schema.mark_types() {
            self.mark_spec(mark_type.name())?;
        }
        Ok(())
    }

    /// Serialize a document to Markdown.
    pub fn serialize(&self, doc: &Document) -> Result<String> {
        self.serialize_content(doc.root())
    }

    /// Serialize the children of any node as a sequence of blocks.
    pub fn serialize_content(&self, node: &Node) -> Result<String> {
        let mut state = SerializerState::new(self);
        state.render_content(node)?;
        let out = state.finish();
        debug!(
            "serialized {} nodes into {} bytes",
            node.subtree_size(),
            out.len()
        );
        Ok(out)
    }
}

impl Default for MarkdownSerializer {
    fn default() -> Self {
        Self::notes()
    }
}

/// Incremental builder for a [`MarkdownSerializer`].
#[derive(Debug, Default)]
pub struct SerializerBuilder {
    nodes: BTreeMap<String, NodeRenderer>,
    marks: BTreeMap<String, MarkSpec>,
    options: SerializerOptions,
    errors: Vec<Error>,
}

impl SerializerBuilder {
    /// Create an empty builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for a node kind, overwriting any existing one.
    pub fn add_node(mut self, name: impl Into<String>, renderer: NodeRenderer) -> Self {
        self.nodes.insert(name.into(), renderer);
        self
    }

    /// Replace the renderer of an already registered node kind.
    pub fn replace_node(mut self, name: &str, renderer: NodeRenderer) -> Self {
        match self.nodes.get_mut(name) {
            Some(slot) => *slot = renderer,
            None => self.errors.push(Error::MissingNodeRenderer(name.to_string())),
        }
        self
    }

    /// Render `alias` with the renderer of `target`.
    pub fn alias_node(mut self, alias: &str, target: &str) -> Self {
        match self.nodes.get(target).copied() {
            Some(renderer) => self.add_node(alias, renderer),
            None => {
                self.errors.push(Error::MissingNodeRenderer(target.to_string()));
                self
            }
        }
    }

    /// Register a renderer for a mark kind, overwriting any existing one.
    pub fn add_mark(mut self, name: impl Into<String>, spec: MarkSpec) -> Self {
        self.marks.insert(name.into(), spec);
        self
    }

    /// Replace the renderer of an already registered mark kind.
    pub fn replace_mark(mut self, name: &str, spec: MarkSpec) -> Self {
        match self.marks.get_mut(name) {
            Some(slot) => *slot = spec,
            None => self.errors.push(Error::MissingMarkRenderer(name.to_string())),
        }
        self
    }

    /// Render `alias` with the renderer of `target`.
    pub fn alias_mark(mut self, alias: &str, target: &str) -> Self {
        match self.marks.get(target).cloned() {
            Some(spec) => self.add_mark(alias, spec),
            None => {
                self.errors.push(Error::MissingMarkRenderer(target.to_string()));
                self
            }
        }
    }

    /// Set the serializer options.
    pub fn options(mut self, options: SerializerOptions) -> Self {
        self.options = options;
        self
    }

    /// Finish the serializer.
    ///
    /// Fails with the first replace/alias that referred to an unregistered kind.
    pub fn build(mut self) -> Result<MarkdownSerializer> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }
        Ok(MarkdownSerializer {
            nodes: self.nodes,
            marks: self.marks,
            options: self.options,
            escaper: Escaper::new(),
        })
    }
}
