//! Node and mark instances.

use std::sync::Arc;

use serde_json::Value;

use crate::schema::{Attrs, MarkType, NodeType};

/// An inline annotation applied to a node.
#[derive(Debug, Clone)]
pub struct Mark {
    kind: Arc<MarkType>,
    attrs: Attrs,
}

impl Mark {
    pub(crate) fn new(kind: Arc<MarkType>, attrs: Attrs) -> Self {
        Self { kind, attrs }
    }

    /// Build an ordered mark set from marks in application order.
    ///
    /// Duplicates are dropped; a mark replaces an earlier mark whose kind it
    /// excludes (e.g. a second `link` replaces the first).
    pub fn set_from(marks: impl IntoIterator<Item = Mark>) -> Vec<Mark> {
        let mut set: Vec<Mark> = Vec::new();
        for mark in marks {
            if set.contains(&mark) {
                continue;
            }
            match set.iter().position(|m| mark.kind.excludes_kind(&m.kind)) {
                Some(i) => set[i] = mark,
                None => set.push(mark),
            }
        }
        set
    }

    /// The mark kind.
    pub fn kind(&self) -> &MarkType {
        &self.kind
    }

    /// The mark kind name.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// All attributes.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// String attribute, `None` if absent or not a string.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }

    /// Whether an equal mark is present in `set`.
    pub fn is_in<'m>(&self, set: impl IntoIterator<Item = &'m Mark>) -> bool {
        set.into_iter().any(|m| m == self)
    }
}

impl PartialEq for Mark {
    fn eq(&self, other: &Self) -> bool {
        self.kind.name() == other.kind.name() && self.attrs == other.attrs
    }
}

/// A node of the document tree.
///
/// Nodes own their children exclusively and are never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Node {
    kind: Arc<NodeType>,
    attrs: Attrs,
    children: Vec<Node>,
    text: Option<String>,
    marks: Vec<Mark>,
}

impl Node {
    pub(crate) fn element(
        kind: Arc<NodeType>,
        attrs: Attrs,
        children: Vec<Node>,
        marks: Vec<Mark>,
    ) -> Self {
        Self {
            kind,
            attrs,
            children,
            text: None,
            marks,
        }
    }

    pub(crate) fn text_run(kind: Arc<NodeType>, attrs: Attrs, text: String, marks: Vec<Mark>) -> Self {
        Self {
            kind,
            attrs,
            children: Vec::new(),
            text: Some(text),
            marks,
        }
    }

    /// The node kind.
    pub fn kind(&self) -> &NodeType {
        &self.kind
    }

    /// The node kind name.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Whether this is a text run.
    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    /// All attributes, defaults filled in.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Raw attribute value.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// String attribute, `None` if absent or not a string.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    /// Boolean attribute, `None` if absent or not a boolean.
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        self.attr(name).and_then(Value::as_bool)
    }

    /// Unsigned integer attribute, `None` if absent or not a non-negative integer.
    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attr(name).and_then(Value::as_u64)
    }

    /// Child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child at `index`.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Text of a text run.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Marks applied to this node, in application order.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Concatenated text of all descendant text runs.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_size).sum::<usize>()
    }

    /// Visit this node and all descendants in document order.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.subtree_size());
        self.push_descendants(&mut out);
        out
    }

    fn push_descendants<'n>(&'n self, out: &mut Vec<&'n Node>) {
        out.push(self);
        for child in &self.children {
            child.push_descendants(out);
        }
    }
}
