//! Node and mark type registry.
//!
//! A [`Schema`] is the static description of every node kind and mark kind a
//! document tree may contain. Schemas are assembled once from a base set with
//! [`SchemaBuilder`], which supports three composition operations:
//!
//! - **add** a new kind (appended; an existing kind of the same name is dropped first)
//! - **replace** an existing kind in place
//! - **alias** an existing kind under a second name
//!
//! # Example
//!
//! ```
//! use notedown::schema::{NodeType, Schema};
//!
//! let schema = Schema::basic()
//!     .extend()
//!     .add_node(NodeType::new("callout").content("block+").group("block"))
//!     .alias_node("note", "callout")
//!     .build()
//!     .unwrap();
//!
//! assert!(schema.node_type("note").is_ok());
//! ```

mod mark_type;
mod node_type;

pub use mark_type::MarkType;
pub use node_type::{AttrSpec, Attrs, NodeType};

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Mark, Node};

/// Name of the root node kind.
pub const TOP_NODE: &str = "doc";

/// Registry of node and mark kinds.
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<Arc<NodeType>>,
    node_index: HashMap<String, usize>,
    marks: Vec<Arc<MarkType>>,
    mark_index: HashMap<String, usize>,
}

impl Schema {
    /// Start an empty schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Start a builder pre-populated with this schema's kinds.
    pub fn extend(&self) -> SchemaBuilder {
        SchemaBuilder {
            nodes: self.nodes.iter().map(|n| NodeType::clone(n)).collect(),
            marks: self.marks.iter().map(|m| MarkType::clone(m)).collect(),
            errors: Vec::new(),
        }
    }

    /// The universally-known Markdown kinds.
    pub fn basic() -> Self {
        SchemaBuilder::new()
            .add_node(NodeType::new(TOP_NODE).content("block+"))
            .add_node(NodeType::new("paragraph").content("inline*").group("block"))
            .add_node(NodeType::new("blockquote").content("block+").group("block"))
            .add_node(NodeType::new("horizontal_rule").group("block").attr("markup", "---"))
            .add_node(
                NodeType::new("heading")
                    .attr("level", 1)
                    .content("(text | image)*")
                    .group("block"),
            )
            .add_node(
                NodeType::new("code_block")
                    .content("text*")
                    .group("block")
                    .attr("params", ""),
            )
            .add_node(
                NodeType::new("ordered_list")
                    .content("list_item+")
                    .group("block")
                    .attr("order", 1)
                    .attr("tight", false),
            )
            .add_node(
                NodeType::new("bullet_list")
                    .content("list_item+")
                    .group("block")
                    .attr("tight", false),
            )
            .add_node(NodeType::new("list_item").content("paragraph block*"))
            .add_node(NodeType::new("text").group("inline"))
            .add_node(
                NodeType::new("image")
                    .inline()
                    .group("inline")
                    .required_attr("src")
                    .attr("alt", Value::Null)
                    .attr("title", Value::Null),
            )
            .add_node(NodeType::new("hard_break").inline().group("inline"))
            .add_mark(MarkType::new("em"))
            .add_mark(MarkType::new("strong"))
            .add_mark(
                MarkType::new("link")
                    .required_attr("href")
                    .attr("title", Value::Null),
            )
            .add_mark(MarkType::new("code"))
            .build()
            .expect("basic schema is well-formed")
    }

    /// The basic kinds extended with the note-taking product kinds.
    pub fn notes() -> Self {
        Self::basic()
            .extend()
            .add_node(
                NodeType::new("tag")
                    .inline()
                    .atom()
                    .group("inline")
                    .attr("id", "")
                    .attr("label", "")
                    .attr("graphId", ""),
            )
            .add_node(
                NodeType::new("backlink")
                    .inline()
                    .atom()
                    .group("inline")
                    .attr("id", "")
                    .attr("label", ""),
            )
            .add_node(
                NodeType::new("list")
                    .content("list_item+")
                    .group("block")
                    .attr("kind", "bullet")
                    .attr("checked", false)
                    .attr("collapsed", false)
                    .attr("guid", "")
                    .attr("tight", true),
            )
            .replace_node(
                NodeType::new("list_item")
                    .content("paragraph block*")
                    .attr("checked", Value::Null),
            )
            .alias_node("listItem", "list_item")
            .add_node(
                NodeType::new("orderedList")
                    .content("listItem+")
                    .group("block")
                    .attr("order", 1),
            )
            .alias_node("bulletList", "bullet_list")
            .add_node(
                NodeType::new("tweet")
                    .group("block")
                    .atom()
                    .attr("tweetData", Value::Null),
            )
            .add_node(NodeType::new("hardBreak").inline().group("inline"))
            .add_node(NodeType::new("iframe").group("block").atom().attr("src", ""))
            .add_node(NodeType::new("horizontalRule").group("block"))
            .add_node(
                NodeType::new("codeBlock")
                    .content("text*")
                    .group("block")
                    .attr("params", ""),
            )
            .add_node(
                NodeType::new("file")
                    .group("block")
                    .atom()
                    .attr("url", "")
                    .attr("fileName", "")
                    .attr("fileType", "")
                    .attr("fileSize", 0),
            )
            .alias_mark("italic", "em")
            .alias_mark("bold", "strong")
            .add_mark(MarkType::new("textHighlight").attr("color", Value::Null))
            .add_mark(MarkType::new("underline"))
            .add_mark(MarkType::new("strike"))
            .build()
            .expect("notes schema is well-formed")
    }

    /// Look up a node kind.
    pub fn node_type(&self, name: &str) -> Result<&Arc<NodeType>> {
        self.node_index
            .get(name)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| Error::UnknownNodeKind(name.to_string()))
    }

    /// Look up a mark kind.
    pub fn mark_type(&self, name: &str) -> Result<&Arc<MarkType>> {
        self.mark_index
            .get(name)
            .map(|&i| &self.marks[i])
            .ok_or_else(|| Error::UnknownMarkKind(name.to_string()))
    }

    /// Registered node kinds, in registration order.
    pub fn node_types(&self) -> impl Iterator<Item = &Arc<NodeType>> {
        self.nodes.iter()
    }

    /// Registered mark kinds, in registration order.
    pub fn mark_types(&self) -> impl Iterator<Item = &Arc<MarkType>> {
        self.marks.iter()
    }

    /// Build a node of the given kind.
    pub fn node(&self, name: &str, attrs: Option<&Attrs>, children: Vec<Node>) -> Result<Node> {
        let kind = self.node_type(name)?;
        if kind.is_text() {
            return Err(Error::MalformedInput(
                "text nodes must be built with Schema::text".to_string(),
            ));
        }
        let attrs = kind.compute_attrs(attrs)?;
        Ok(Node::element(kind.clone(), attrs, children, Vec::new()))
    }

    /// Build a text node carrying `marks`.
    pub fn text(&self, text: impl Into<String>, marks: Vec<Mark>) -> Result<Node> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::MalformedInput("empty text node".to_string()));
        }
        let kind = self.node_type("text")?;
        let attrs = kind.compute_attrs(None)?;
        Ok(Node::text_run(kind.clone(), attrs, text, Mark::set_from(marks)))
    }

    /// Build a mark of the given kind.
    pub fn mark(&self, name: &str, attrs: Option<&Attrs>) -> Result<Mark> {
        let kind = self.mark_type(name)?;
        let attrs = kind.compute_attrs(attrs)?;
        Ok(Mark::new(kind.clone(), attrs))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::notes()
    }
}

/// Incremental builder for a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<NodeType>,
    marks: Vec<MarkType>,
    errors: Vec<Error>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node kind at the end, dropping any existing kind of the same name.
    pub fn add_node(mut self, node: NodeType) -> Self {
        self.nodes.retain(|n| n.name() != node.name());
        self.nodes.push(node);
        self
    }

    /// Replace an existing node kind in place.
    pub fn replace_node(mut self, node: NodeType) -> Self {
        match self.nodes.iter_mut().find(|n| n.name() == node.name()) {
            Some(slot) => *slot = node,
            None => self
                .errors
                .push(Error::UnknownNodeKind(node.name().to_string())),
        }
        self
    }

    /// Register `target`'s descriptor under the additional name `alias`.
    pub fn alias_node(mut self, alias: &str, target: &str) -> Self {
        let aliased = self
            .nodes
            .iter()
            .find(|n| n.name() == target)
            .map(|n| n.renamed(alias));
        match aliased {
            Some(node) => self.add_node(node),
            None => {
                self.errors.push(Error::UnknownNodeKind(target.to_string()));
                self
            }
        }
    }

    /// Add a mark kind at the end, dropping any existing kind of the same name.
    pub fn add_mark(mut self, mark: MarkType) -> Self {
        self.marks.retain(|m| m.name() != mark.name());
        self.marks.push(mark);
        self
    }

    /// Replace an existing mark kind in place.
    pub fn replace_mark(mut self, mark: MarkType) -> Self {
        match self.marks.iter_mut().find(|m| m.name() == mark.name()) {
            Some(slot) => *slot = mark,
            None => self
                .errors
                .push(Error::UnknownMarkKind(mark.name().to_string())),
        }
        self
    }

    /// Register `target`'s descriptor under the additional name `alias`.
    pub fn alias_mark(mut self, alias: &str, target: &str) -> Self {
        let aliased = self
            .marks
            .iter()
            .find(|m| m.name() == target)
            .map(|m| m.renamed(alias));
        match aliased {
            Some(mark) => self.add_mark(mark),
            None => {
                self.errors.push(Error::UnknownMarkKind(target.to_string()));
                self
            }
        }
    }

    /// Finish the schema.
    ///
    /// Fails with the first replace/alias that referred to an unknown kind.
    pub fn build(mut self) -> Result<Schema> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }

        let nodes: Vec<Arc<NodeType>> = self.nodes.into_iter().map(Arc::new).collect();
        let marks: Vec<Arc<MarkType>> = self.marks.into_iter().map(Arc::new).collect();
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name().to_string(), i))
            .collect();
        let mark_index = marks
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name().to_string(), i))
            .collect();

        Ok(Schema {
            nodes,
            node_index,
            marks,
            mark_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_schema_kinds() {
        let schema = Schema::basic();
        for name in ["doc", "paragraph", "heading", "blockquote", "text", "code_block"] {
            assert!(schema.node_type(name).is_ok(), "missing {}", name);
        }
        assert!(schema.node_type("list").is_err());
        assert!(schema.mark_type("em").is_ok());
        assert!(schema.mark_type("textHighlight").is_err());
    }

    #[test]
    fn test_notes_schema_extends_basic() {
        let schema = Schema::notes();
        for name in ["list", "listItem", "tag", "backlink", "file", "codeBlock", "tweet"] {
            assert!(schema.node_type(name).is_ok(), "missing {}", name);
        }
        assert!(schema.mark_type("italic").is_ok());
        assert!(schema.mark_type("bold").is_ok());
    }

    #[test]
    fn test_unknown_kind() {
        let schema = Schema::notes();
        assert!(matches!(
            schema.node_type("carousel"),
            Err(Error::UnknownNodeKind(_))
        ));
        assert!(matches!(
            schema.mark_type("sparkle"),
            Err(Error::UnknownMarkKind(_))
        ));
    }

    #[test]
    fn test_add_moves_existing_kind_to_end() {
        let schema = Schema::builder()
            .add_node(NodeType::new("a"))
            .add_node(NodeType::new("b"))
            .add_node(NodeType::new("a").attr("x", 1))
            .build()
            .unwrap();
        let names: Vec<&str> = schema.node_types().map(|n| n.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(schema.node_type("a").unwrap().attr_specs().len(), 1);
    }

    #[test]
    fn test_replace_keeps_position() {
        let schema = Schema::builder()
            .add_node(NodeType::new("a"))
            .add_node(NodeType::new("b"))
            .replace_node(NodeType::new("a").content("text*"))
            .build()
            .unwrap();
        let names: Vec<&str> = schema.node_types().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.node_type("a").unwrap().content_expr(), Some("text*"));
    }

    #[test]
    fn test_replace_unknown_fails() {
        let result = Schema::builder()
            .replace_node(NodeType::new("ghost"))
            .build();
        assert!(matches!(result, Err(Error::UnknownNodeKind(_))));
    }

    #[test]
    fn test_alias_shares_descriptor() {
        let schema = Schema::notes();
        let item = schema.node_type("list_item").unwrap();
        let alias = schema.node_type("listItem").unwrap();
        assert_eq!(item.content_expr(), alias.content_expr());
        assert_eq!(alias.name(), "listItem");
    }

    #[test]
    fn test_alias_unknown_target_fails() {
        let result = Schema::builder().alias_mark("bold", "strong").build();
        assert!(matches!(result, Err(Error::UnknownMarkKind(_))));
    }
}
