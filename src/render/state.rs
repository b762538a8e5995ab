//! Serializer state machine.
//!
//! One [`SerializerState`] lives for the duration of a single document
//! serialization. Node renderers compose its primitives:
//!
//! - [`write`](SerializerState::write) appends text, first flushing any
//!   pending block close and re-emitting the indentation at line starts
//! - [`close_block`](SerializerState::close_block) records the last closed
//!   block and defers the separator to the next write; a tight list item
//!   uses [`close_block_with`](SerializerState::close_block_with) to defer
//!   a single line break instead
//! - [`flush_close`](SerializerState::flush_close) emits a pending close as
//!   exactly `n` line breaks
//! - [`wrap_block`](SerializerState::wrap_block) renders nested content
//!   under an extra indentation unit

use log::trace;

use super::escape::{escape_href, longest_backtick_run, quote_title};
use super::marks::MarkStyle;
use super::serializer::MarkdownSerializer;
use super::SerializerOptions;
use crate::error::Result;
use crate::model::{Mark, Node};

/// Mutable output state threaded through every renderer call.
#[derive(Debug)]
pub struct SerializerState<'a> {
    serializer: &'a MarkdownSerializer,
    out: String,
    delim: String,
    closed: Option<&'a Node>,
    close_size: usize,
    in_tight_list: bool,
    in_autolink: Option<bool>,
    at_block_start: bool,
}

impl<'a> SerializerState<'a> {
    /// Create a fresh state for one serialization.
    pub fn new(serializer: &'a MarkdownSerializer) -> Self {
        Self {
            serializer,
            out: String::new(),
            delim: String::new(),
            closed: None,
            close_size: 2,
            in_tight_list: false,
            in_autolink: None,
            at_block_start: false,
        }
    }

    /// Serializer options in effect.
    pub fn options(&self) -> &'a SerializerOptions {
        self.serializer.options()
    }

    /// Output accumulated so far.
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Consume the state and return the output.
    pub fn finish(self) -> String {
        self.out
    }

    /// Current indentation prefix.
    pub fn delim(&self) -> &str {
        &self.delim
    }

    /// Last closed block whose separator is still pending.
    pub fn closed(&self) -> Option<&'a Node> {
        self.closed
    }

    /// Whether rendering is inside a tight list.
    pub fn in_tight_list(&self) -> bool {
        self.in_tight_list
    }

    /// Set the tight-list context, returning the previous value.
    pub fn set_tight_list(&mut self, tight: bool) -> bool {
        std::mem::replace(&mut self.in_tight_list, tight)
    }

    /// Whether the output ends at the start of a line.
    pub fn at_blank(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    /// Emit a pending block close as `size` line breaks.
    pub fn flush_close(&mut self, size: usize) {
        if self.closed.is_none() {
            return;
        }
        if !self.at_blank() {
            self.out.push('\n');
        }
        if size > 1 {
            let delim_min = self.delim.trim_end();
            for _ in 1..size {
                self.out.push_str(delim_min);
                self.out.push('\n');
            }
        }
        self.closed = None;
    }

    /// Append `content`, flushing a pending close and indenting line starts.
    pub fn write(&mut self, content: &str) {
        self.flush_close(self.close_size);
        if !self.delim.is_empty() && self.at_blank() {
            self.out.push_str(&self.delim);
        }
        self.out.push_str(content);
    }

    /// Mark `node` as closed; the separator is emitted by the next write.
    pub fn close_block(&mut self, node: &'a Node) {
        self.close_block_with(node, 2);
    }

    /// Mark `node` as closed with a separator of `size` line breaks.
    pub fn close_block_with(&mut self, node: &'a Node, size: usize) {
        self.closed = Some(node);
        self.close_size = size;
    }

    /// End the current line unless already at a line start.
    pub fn ensure_new_line(&mut self) {
        if !self.at_blank() {
            self.out.push('\n');
        }
    }

    /// Render `f` with `delim` appended to the indentation.
    ///
    /// The first line gets `first_delim` instead of `delim` when given.
    pub fn wrap_block<F>(
        &mut self,
        delim: &str,
        first_delim: Option<&str>,
        node: &'a Node,
        f: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let old_len = self.delim.len();
        self.write(first_delim.unwrap_or(delim));
        self.delim.push_str(delim);
        let result = f(self);
        self.delim.truncate(old_len);
        self.close_block(node);
        result
    }

    /// Escape `text` according to the serializer options.
    pub fn esc(&self, text: &str, start_of_line: bool) -> String {
        if self.options().escape_text {
            self.serializer.escaper().escape(text, start_of_line)
        } else {
            text.to_string()
        }
    }

    /// Write possibly multi-line text, indenting each line.
    pub fn text(&mut self, text: &str, escape: bool) {
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            self.write("");
            if !escape && line.starts_with('[') && ends_with_unescaped_bang(&self.out) {
                self.out.pop();
                self.out.push_str("\\!");
            }
            if escape {
                let escaped = self.esc(line, self.at_block_start);
                self.out.push_str(&escaped);
            } else {
                self.out.push_str(line);
            }
            if lines.peek().is_some() {
                self.out.push('\n');
            }
        }
    }

    /// Write the text of a text run; autolink text is left unescaped.
    pub fn render_text(&mut self, text: &str) {
        let escape = self.in_autolink != Some(true);
        self.text(text, escape);
    }

    /// Render one node through its registered renderer.
    pub fn render(&mut self, node: &'a Node, parent: &'a Node, index: usize) -> Result<()> {
        let renderer = self.serializer.node_renderer(node.name())?;
        trace!("render {} with {}", node.name(), renderer.label());
        renderer.render(self, node, parent, index)
    }

    /// Render every child of `parent` in order.
    pub fn render_content(&mut self, parent: &'a Node) -> Result<()> {
        for (index, child) in parent.children().iter().enumerate() {
            self.render(child, parent, index)?;
        }
        Ok(())
    }

    /// Render the inline children of `parent`, opening and closing marks
    /// so that runs sharing a mark stay inside one delimiter pair.
    pub fn render_inline(&mut self, parent: &'a Node, from_block_start: bool) -> Result<()> {
        self.at_block_start = from_block_start;
        let mut active: Vec<&'a Mark> = Vec::new();
        let mut trailing = String::new();
        for index in 0..=parent.child_count() {
            self.progress(parent, index, &mut active, &mut trailing)?;
        }
        self.at_block_start = false;
        Ok(())
    }

    fn progress(
        &mut self,
        parent: &'a Node,
        index: usize,
        active: &mut Vec<&'a Mark>,
        trailing: &mut String,
    ) -> Result<()> {
        let mut node = parent.child(index);
        let next = parent.child(index + 1);
        let mut marks: Vec<&'a Mark> = node.map(|n| n.marks().iter().collect()).unwrap_or_default();

        // Marks ending right after a hard break would close on the next line.
        if let Some(n) = node {
            if n.name() == self.options().hard_break_node_name {
                marks.retain(|m| match next {
                    Some(next) => {
                        m.is_in(next.marks())
                            && (!next.is_text() || next.text().is_some_and(has_non_whitespace))
                    }
                    None => false,
                });
            }
        }

        let mut leading = std::mem::take(trailing);
        let mut text: Option<&'a str> = node.and_then(Node::text);

        if let Some(t) = text {
            if self.expels_leading(&marks, active.as_slice())? {
                let rest = t.trim_start();
                if rest.len() < t.len() {
                    leading.push_str(&t[..t.len() - rest.len()]);
                    if rest.is_empty() {
                        node = None;
                        text = None;
                        marks = active.clone();
                    } else {
                        text = Some(rest);
                    }
                }
            }
        }
        if let Some(t) = text {
            if self.expels_trailing(&marks, next)? {
                let rest = t.trim_end();
                if rest.len() < t.len() {
                    trailing.push_str(&t[rest.len()..]);
                    if rest.is_empty() {
                        node = None;
                        text = None;
                        marks = active.clone();
                    } else {
                        text = Some(rest);
                    }
                }
            }
        }

        let inner = marks.last().copied();
        let no_esc = match inner {
            Some(mark) => !self.serializer.mark_spec(mark.name())?.escape,
            None => false,
        };
        let len = marks.len() - usize::from(no_esc);

        // Open mixable marks in the order they already have in the active set.
        'outer: for i in 0..len {
            let Some(&mark) = marks.get(i) else { break };
            if !self.serializer.mark_spec(mark.name())?.mixable {
                break;
            }
            for (j, &other) in active.iter().enumerate() {
                if !self.serializer.mark_spec(other.name())?.mixable {
                    break;
                }
                if mark == other {
                    if i > j {
                        marks = [
                            clamped(&marks, 0, j),
                            &[mark][..],
                            clamped(&marks, j, i),
                            clamped(&marks, i + 1, len),
                        ]
                        .concat();
                    } else if j > i {
                        marks = [
                            clamped(&marks, 0, i),
                            clamped(&marks, i + 1, j),
                            &[mark][..],
                            clamped(&marks, j, len),
                        ]
                        .concat();
                    }
                    continue 'outer;
                }
            }
        }

        let mut keep = 0;
        while keep < active.len().min(len) && marks.get(keep) == active.get(keep) {
            keep += 1;
        }

        while keep < active.len() {
            if let Some(mark) = active.pop() {
                let close = self.mark_string(mark, false, parent, index)?;
                self.text(&close, false);
            }
        }

        if !leading.is_empty() {
            self.text(&leading, true);
        }

        if let Some(node) = node {
            while active.len() < len {
                let Some(&add) = marks.get(active.len()) else { break };
                active.push(add);
                let open = self.mark_string(add, true, parent, index)?;
                self.text(&open, false);
                self.at_block_start = false;
            }

            match (inner, text) {
                (Some(inner), Some(t)) if no_esc => {
                    let open = self.mark_string(inner, true, parent, index)?;
                    let close = self.mark_string(inner, false, parent, index + 1)?;
                    self.text(&format!("{}{}{}", open, t, close), false);
                }
                (_, Some(t)) => {
                    let renderer = self.serializer.node_renderer(node.name())?;
                    renderer.render_run(self, node, t, parent, index)?;
                }
                (_, None) => self.render(node, parent, index)?,
            }
            self.at_block_start = false;
        }
        Ok(())
    }

    fn expels_leading(&self, marks: &[&'a Mark], active: &[&'a Mark]) -> Result<bool> {
        for mark in marks {
            if self.serializer.mark_spec(mark.name())?.expel_enclosing_whitespace
                && !mark.is_in(active.iter().copied())
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn expels_trailing(&self, marks: &[&'a Mark], next: Option<&'a Node>) -> Result<bool> {
        for mark in marks {
            if self.serializer.mark_spec(mark.name())?.expel_enclosing_whitespace
                && next.map_or(true, |n| !mark.is_in(n.marks()))
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Opening or closing token of `mark` around the child at `index`.
    fn mark_string(
        &mut self,
        mark: &Mark,
        open: bool,
        parent: &'a Node,
        index: usize,
    ) -> Result<String> {
        let serializer = self.serializer;
        let spec = serializer.mark_spec(mark.name())?;
        let token = match (&spec.style, open) {
            (MarkStyle::Delimited { open, .. }, true) => open.clone(),
            (MarkStyle::Delimited { close, .. }, false) => close.clone(),
            (MarkStyle::Link, true) => {
                let auto = is_plain_url(mark, parent, index);
                self.in_autolink = Some(auto);
                (if auto { "<" } else { "[" }).to_string()
            }
            (MarkStyle::Link, false) => {
                if self.in_autolink.take() == Some(true) {
                    ">".to_string()
                } else {
                    let href = mark.attr_str("href").unwrap_or_default();
                    let title = mark
                        .attr_str("title")
                        .filter(|t| !t.is_empty())
                        .map(quote_title)
                        .unwrap_or_default();
                    format!("]({}{})", escape_href(href), title)
                }
            }
            (MarkStyle::Code, true) => backticks_for(parent.child(index), true),
            (MarkStyle::Code, false) => {
                backticks_for(index.checked_sub(1).and_then(|i| parent.child(i)), false)
            }
        };
        Ok(token)
    }
}

/// A link whose text is its own absolute URL renders as `<href>`.
fn is_plain_url(link: &Mark, parent: &Node, index: usize) -> bool {
    let href = link.attr_str("href").unwrap_or_default();
    if link.attr_str("title").is_some_and(|t| !t.is_empty()) || !has_scheme(href) {
        return false;
    }
    let Some(content) = parent.child(index) else {
        return false;
    };
    if !content.is_text() || content.text() != Some(href) || content.marks().last() != Some(link)
    {
        return false;
    }
    match parent.child(index + 1) {
        Some(next) => !link.is_in(next.marks()),
        None => true,
    }
}

fn has_scheme(href: &str) -> bool {
    match href.find(':') {
        Some(i) => i > 0 && href[..i].chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    }
}

fn backticks_for(node: Option<&Node>, open: bool) -> String {
    let len = node
        .filter(|n| n.is_text())
        .and_then(Node::text)
        .map_or(0, longest_backtick_run);
    let mut result = if len > 0 && !open { " `" } else { "`" }.to_string();
    result.push_str(&"`".repeat(len));
    if len > 0 && open {
        result.push(' ');
    }
    result
}

fn ends_with_unescaped_bang(out: &str) -> bool {
    let mut rev = out.chars().rev();
    rev.next() == Some('!') && rev.next() != Some('\\')
}

fn has_non_whitespace(text: &str) -> bool {
    text.chars().any(|c| !c.is_whitespace())
}

fn clamped<T>(items: &[T], from: usize, to: usize) -> &[T] {
    let to = to.min(items.len());
    &items[from.min(to)..to]
}
