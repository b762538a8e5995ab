//! Serializer options and configuration.

/// Options controlling Markdown serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializerOptions {
    /// Default tightness for lists whose `tight` attribute is unset or null
    pub tight_lists: bool,

    /// Escape Markdown-significant characters in plain text
    pub escape_text: bool,

    /// Node kind after which closing marks are pulled forward
    pub hard_break_node_name: String,

    /// Indentation unit for nested content of `list` nodes
    pub indent_unit: String,
}

impl SerializerOptions {
    /// Create new serializer options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default list tightness.
    pub fn with_tight_lists(mut self, tight: bool) -> Self {
        self.tight_lists = tight;
        self
    }

    /// Enable or disable text escaping.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_text = escape;
        self
    }

    /// Set the hard-break node kind name.
    pub fn with_hard_break_node(mut self, name: impl Into<String>) -> Self {
        self.hard_break_node_name = name.into();
        self
    }

    /// Set the nested-list indentation unit.
    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            tight_lists: true,
            escape_text: true,
            hard_break_node_name: "hard_break".to_string(),
            indent_unit: "  ".to_string(),
        }
    }
}
