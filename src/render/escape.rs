//! Markdown escaping helpers.

use regex::Regex;

/// Backslash-escapes Markdown-significant characters in plain text.
#[derive(Debug, Clone)]
pub struct Escaper {
    bullet_start: Regex,
    heading_start: Regex,
    ordered_start: Regex,
}

impl Escaper {
    /// Create a new escaper with compiled patterns.
    pub fn new() -> Self {
        Self {
            bullet_start: Regex::new(r"^(\+ |[\-*>])").unwrap(),
            heading_start: Regex::new(r"^(\s*)(#{1,6})(\s|$)").unwrap(),
            ordered_start: Regex::new(r"^(\s*[0-9]+)\.\s").unwrap(),
        }
    }

    /// Escape `text`. With `start_of_line`, also escape constructs that
    /// would start a block (bullets, quotes, ATX headings, ordered items).
    pub fn escape(&self, text: &str, start_of_line: bool) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len() + 8);

        for (i, &c) in chars.iter().enumerate() {
            match c {
                '_' if i > 0
                    && i + 1 < chars.len()
                    && is_word_char(chars[i - 1])
                    && is_word_char(chars[i + 1]) =>
                {
                    out.push(c)
                }
                '`' | '*' | '\\' | '~' | '[' | ']' | '_' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }

        if start_of_line {
            out = self.bullet_start.replace(&out, r"\${0}").into_owned();
            out = self
                .heading_start
                .replace(&out, r"${1}\${2}${3}")
                .into_owned();
            out = self.ordered_start.replace(&out, r"${1}\. ").into_owned();
        }
        out
    }
}

impl Default for Escaper {
    fn default() -> Self {
        Self::new()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of the longest run of consecutive backticks in `text`.
pub fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Fence for a code block: three backticks, or one more than the longest
/// run of three or more backticks in the content.
pub fn code_fence(content: &str) -> String {
    let run = longest_backtick_run(content);
    if run >= 3 {
        "`".repeat(run + 1)
    } else {
        "```".to_string()
    }
}

/// Escape a link destination: `(`, `)` and `"` get a backslash.
pub fn escape_href(href: &str) -> String {
    escape_chars(href, &['(', ')', '"'])
}

/// Escape an image source: `(` and `)` get a backslash.
pub fn escape_src(src: &str) -> String {
    escape_chars(src, &['(', ')'])
}

/// Quote a link or image title, escaping inner double quotes.
pub fn quote_title(title: &str) -> String {
    format!(" \"{}\"", title.replace('"', "\\\""))
}

fn escape_chars(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
