//! Mark kind descriptors.

use serde_json::Value;

use super::node_type::{compute_attrs, AttrSpec, Attrs};
use crate::error::Result;

/// Immutable descriptor of a mark kind.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkType {
    name: String,
    attrs: Vec<AttrSpec>,
    excludes: Vec<String>,
}

impl MarkType {
    /// Create a mark kind that excludes only itself.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            excludes: vec![name.clone()],
            name,
            attrs: Vec::new(),
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

    /// Replace the set of kinds this mark cannot coexist with.
    pub fn excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = names.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn renamed(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        let excludes = self
            .excludes
            .iter()
            .map(|e| if *e == self.name { name.clone() } else { e.clone() })
            .collect();
        Self {
            name,
            attrs: self.attrs.clone(),
            excludes,
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

    /// Whether a mark of this kind replaces a mark of `other` on the same run.
    pub fn excludes_kind(&self, other: &MarkType) -> bool {
        self.excludes.iter().any(|e| e == other.name())
    }

    pub(crate) fn compute_attrs(&self, given: Option<&Attrs>) -> Result<Attrs> {
        compute_attrs(&self.attrs, given, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_excludes_itself_by_default() {
        let link = MarkType::new("link");
        assert!(link.excludes_kind(&link));
        assert!(!link.excludes_kind(&MarkType::new("em")));
    }

    #[test]
    fn test_renamed_mark_excludes_new_name() {
        let em = MarkType::new("em");
        let italic = em.renamed("italic");
        assert_eq!(italic.name(), "italic");
        assert!(italic.excludes_kind(&italic));
        assert!(!italic.excludes_kind(&em));
    }
}
