//! Document-level types and construction from JSON.

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;
use serde_json::Value;

use super::{Mark, Node};
use crate::error::{Error, Result};
use crate::schema::{Attrs, Schema, TOP_NODE};

/// Wire shape of a node: `{type, attrs?, content?, text?, marks?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeJson {
    /// Node kind name
    #[serde(rename = "type")]
    pub kind: String,

    /// Attributes
    #[serde(default)]
    pub attrs: Option<Attrs>,

    /// Child nodes
    #[serde(default)]
    pub content: Option<Vec<NodeJson>>,

    /// Text of a text run
    #[serde(default)]
    pub text: Option<String>,

    /// Marks, in application order
    #[serde(default)]
    pub marks: Option<Vec<MarkJson>>,
}

/// Wire shape of a mark: `{type, attrs?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkJson {
    /// Mark kind name
    #[serde(rename = "type")]
    pub kind: String,

    /// Attributes
    #[serde(default)]
    pub attrs: Option<Attrs>,
}

impl NodeJson {
    /// Resolve this wire node (and its subtree) against `schema`.
    pub fn to_node(&self, schema: &Schema) -> Result<Node> {
        let kind = schema.node_type(&self.kind)?;
        let marks = match &self.marks {
            Some(marks) => Mark::set_from(
                marks
                    .iter()
                    .map(|m| schema.mark(&m.kind, m.attrs.as_ref()))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => Vec::new(),
        };
        let attrs = kind.compute_attrs(self.attrs.as_ref())?;

        if kind.is_text() {
            let text = self
                .text
                .clone()
                .ok_or_else(|| Error::MalformedInput("text node without `text`".to_string()))?;
            if text.is_empty() {
                return Err(Error::MalformedInput("empty text node".to_string()));
            }
            return Ok(Node::text_run(kind.clone(), attrs, text, marks));
        }

        let children = self
            .content
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|child| child.to_node(schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(Node::element(kind.clone(), attrs, children, marks))
    }
}

/// A document: the root `doc` node owning the whole tree.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Build a document from a parsed JSON value.
    pub fn from_value(schema: &Schema, value: &Value) -> Result<Self> {
        let wire = NodeJson::deserialize(value)?;
        Self::from_wire(schema, &wire)
    }

    /// Build a document from JSON text.
    pub fn from_str(schema: &Schema, json: &str) -> Result<Self> {
        let wire: NodeJson = serde_json::from_str(json)?;
        Self::from_wire(schema, &wire)
    }

    /// Build a document from a JSON reader.
    pub fn from_reader<R: Read>(schema: &Schema, reader: R) -> Result<Self> {
        let wire: NodeJson = serde_json::from_reader(reader)?;
        Self::from_wire(schema, &wire)
    }

    /// Build a document from an already-decoded wire node.
    pub fn from_wire(schema: &Schema, wire: &NodeJson) -> Result<Self> {
        if wire.kind != TOP_NODE {
            return Err(Error::MalformedInput(format!(
                "expected root of type `{}`, found `{}`",
                TOP_NODE, wire.kind
            )));
        }
        Ok(Self {
            root: wire.to_node(schema)?,
        })
    }

    /// Wrap an already-built root node.
    pub fn from_root(root: Node) -> Result<Self> {
        if root.name() != TOP_NODE {
            return Err(Error::MalformedInput(format!(
                "expected root of type `{}`, found `{}`",
                TOP_NODE,
                root.name()
            )));
        }
        Ok(Self { root })
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Top-level block nodes.
    pub fn content(&self) -> &[Node] {
        self.root.children()
    }

    /// Root attributes (e.g. the editor `version`).
    pub fn attrs(&self) -> &Attrs {
        self.root.attrs()
    }

    /// Whether the document has no top-level content.
    pub fn is_empty(&self) -> bool {
        self.root.child_count() == 0
    }

    /// Number of nodes per kind name, including the root.
    pub fn kind_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in self.root.descendants() {
            *counts.entry(node.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of mark applications per mark kind name.
    pub fn mark_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in self.root.descendants() {
            for mark in node.marks() {
                *counts.entry(mark.name().to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}
