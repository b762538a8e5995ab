//! Node kind descriptors.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Attribute map carried by nodes and marks.
pub type Attrs = Map<String, Value>;

/// Declaration of a single attribute on a node or mark kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    /// Attribute name
    pub name: String,

    /// Default value; `None` means the attribute is required
    pub default: Option<Value>,
}

impl AttrSpec {
    /// Create an optional attribute with a default value.
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// Create a required attribute.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }
}

/// Fill `given` attributes from the declared defaults.
///
/// Attributes present in `given` but not declared are kept as-is.
pub(crate) fn compute_attrs(specs: &[AttrSpec], given: Option<&Attrs>, owner: &str) -> Result<Attrs> {
    let mut attrs = given.cloned().unwrap_or_default();
    for spec in specs {
        if attrs.contains_key(&spec.name) {
            continue;
        }
        match &spec.default {
            Some(default) => {
                attrs.insert(spec.name.clone(), default.clone());
            }
            None => {
                return Err(Error::MalformedInput(format!(
                    "missing required attribute `{}` on `{}`",
                    spec.name, owner
                )));
            }
        }
    }
    Ok(attrs)
}

/// Immutable descriptor of a node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    name: String,
    attrs: Vec<AttrSpec>,
    content: Option<String>,
    group: Option<String>,
    inline: bool,
    atom: bool,
}

impl NodeType {
    /// Create a block-level leaf kind with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            content: None,
            group: None,
            inline: false,
            atom: false,
        }
    }

    /// Declare an optional attribute.
    pub fn attr(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.attrs.push(AttrSpec::with_default(name, default));
        self
    }

    /// Declare a required attribute.
    pub fn required_attr(mut self, name: impl Into<String>) -> Self {
        self.attrs.push(AttrSpec::required(name));
        self
    }

    /// Set the content expression (e.g. `"paragraph block*"`).
    pub fn content(mut self, expr: impl Into<String>) -> Self {
        self.content = Some(expr.into());
        self
    }

    /// Set the group this kind belongs to (e.g. `"block"`).
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Mark the kind as inline.
    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    /// Mark the kind as an atom (no directly editable content).
    pub fn atom(mut self) -> Self {
        self.atom = true;
        self
    }

    /// Copy of this descriptor registered under another name.
    pub(crate) fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared attributes.
    pub fn attr_specs(&self) -> &[AttrSpec] {
        &self.attrs
    }

    /// Content expression, `None` for leaves.
    pub fn content_expr(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Group name, if any.
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Whether this is the text kind.
    pub fn is_text(&self) -> bool {
        self.name == "text"
    }

    /// Whether this kind is inline.
    pub fn is_inline(&self) -> bool {
        self.inline || self.is_text()
    }

    /// Whether this kind is block-level.
    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    /// Whether this kind has no content expression.
    pub fn is_leaf(&self) -> bool {
        self.content.is_none()
    }

    /// Whether this kind has no renderable children.
    pub fn is_atom(&self) -> bool {
        self.atom || self.is_leaf()
    }

    pub(crate) fn compute_attrs(&self, given: Option<&Attrs>) -> Result<Attrs> {
        compute_attrs(&self.attrs, given, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_type_classification() {
        let text = NodeType::new("text").group("inline");
        assert!(text.is_text());
        assert!(text.is_inline());
        assert!(text.is_leaf());

        let para = NodeType::new("paragraph").content("inline*").group("block");
        assert!(para.is_block());
        assert!(!para.is_atom());

        let tag = NodeType::new("tag").inline().atom().attr("id", "");
        assert!(tag.is_inline());
        assert!(tag.is_atom());
    }

    #[test]
    fn test_compute_attrs_fills_defaults() {
        let heading = NodeType::new("heading").attr("level", 1);
        let given = json!({"extra": true});
        let attrs = heading.compute_attrs(given.as_object()).unwrap();
        assert_eq!(attrs["level"], json!(1));
        assert_eq!(attrs["extra"], json!(true));
    }

    #[test]
    fn test_compute_attrs_keeps_null() {
        let heading = NodeType::new("heading").attr("level", 1);
        let given = json!({"level": null});
        let attrs = heading.compute_attrs(given.as_object()).unwrap();
        assert!(attrs["level"].is_null());
    }

    #[test]
    fn test_compute_attrs_missing_required() {
        let image = NodeType::new("image").required_attr("src");
        let result = image.compute_attrs(None);
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }
}
