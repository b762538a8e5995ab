//! Mark renderer table entries.

/// How a mark kind produces its open and close tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkStyle {
    /// Fixed delimiter pair, e.g. `**` / `**`.
    Delimited {
        /// Opening token
        open: String,
        /// Closing token
        close: String,
    },
    /// `[text](href "title")`, or `<href>` for plain URLs.
    Link,
    /// Backtick fence sized to the wrapped text.
    Code,
}

/// Renderer for one mark kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpec {
    /// Token style
    pub style: MarkStyle,

    /// May be reordered relative to other mixable marks
    pub mixable: bool,

    /// Leading and trailing whitespace is moved outside the delimiters
    pub expel_enclosing_whitespace: bool,

    /// Wrapped text is escaped
    pub escape: bool,
}

impl MarkSpec {
    /// Mark with identical open and close delimiters.
    pub fn symmetric(delim: impl Into<String>) -> Self {
        let delim = delim.into();
        Self::delimited(delim.clone(), delim)
    }

    /// Mark with distinct open and close delimiters.
    pub fn delimited(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            style: MarkStyle::Delimited {
                open: open.into(),
                close: close.into(),
            },
            mixable: false,
            expel_enclosing_whitespace: false,
            escape: true,
        }
    }

    /// Link mark.
    pub fn link() -> Self {
        Self {
            style: MarkStyle::Link,
            mixable: true,
            expel_enclosing_whitespace: false,
            escape: true,
        }
    }

    /// Inline code mark; its text is never escaped.
    pub fn code() -> Self {
        Self {
            style: MarkStyle::Code,
            mixable: false,
            expel_enclosing_whitespace: false,
            escape: false,
        }
    }

    /// Allow interleaving with other mixable marks.
    pub fn mixable(mut self) -> Self {
        self.mixable = true;
        self
    }

    /// Move boundary whitespace outside the delimiters.
    pub fn expel_whitespace(mut self) -> Self {
        self.expel_enclosing_whitespace = true;
        self
    }

    /// Short description used in listings.
    pub fn describe(&self) -> String {
        match &self.style {
            MarkStyle::Delimited { open, close } => format!("{}…{}", open, close),
            MarkStyle::Link => "[…](href)".to_string(),
            MarkStyle::Code => "`…`".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric() {
        let strong = MarkSpec::symmetric("**").mixable().expel_whitespace();
        assert_eq!(
            strong.style,
            MarkStyle::Delimited {
                open: "**".into(),
                close: "**".into()
            }
        );
        assert!(strong.mixable);
        assert!(strong.expel_enclosing_whitespace);
        assert!(strong.escape);
    }

    #[test]
    fn test_code_is_not_escaped() {
        assert!(!MarkSpec::code().escape);
        assert_eq!(MarkSpec::code().describe(), "`…`");
    }
}
