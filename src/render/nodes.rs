//! Node renderer dispatch.

use log::debug;
use serde_json::Value;

use super::escape::{code_fence, escape_src, quote_title};
use super::state::SerializerState;
use crate::error::{Error, Result};
use crate::model::Node;

/// Renderer for one node kind.
///
/// The serializer table maps kind names to these values; aliased kinds
/// share one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRenderer {
    /// Text run, escaped unless inside an autolink
    Text,
    /// Inline content followed by a block break
    Paragraph,
    /// Paragraph that ends with a single newline inside tight lists
    ListAwareParagraph,
    /// `#`-prefixed heading
    Heading,
    /// `> `-prefixed block content
    Blockquote,
    /// Fenced code block sized to its content
    CodeBlock,
    /// Fixed three-backtick fenced code block
    FencedCode,
    /// Thematic break
    HorizontalRule,
    /// `*`-bulleted list
    BulletList,
    /// Numbered list starting at `order`
    OrderedList,
    /// Container rendered through its content
    ListItem,
    /// Bullet, ordered or task list chosen by `kind`
    NoteList,
    /// `![alt](src "title")`
    Image,
    /// Backslash line break
    HardBreak,
    /// Plain newline
    LineBreak,
    /// `@[label](id)`
    Tag,
    /// `[[label]]`
    Backlink,
    /// Embedded tweet quote
    Tweet,
    /// `[View Video](src)`
    VideoEmbed,
    /// `[download file (type): name](url)`
    FileAttachment,
}

impl NodeRenderer {
    /// Short name used in listings and traces.
    pub fn label(self) -> &'static str {
        match self {
            NodeRenderer::Text => "text",
            NodeRenderer::Paragraph => "paragraph",
            NodeRenderer::ListAwareParagraph => "list-aware paragraph",
            NodeRenderer::Heading => "heading",
            NodeRenderer::Blockquote => "blockquote",
            NodeRenderer::CodeBlock => "code block",
            NodeRenderer::FencedCode => "fenced code",
            NodeRenderer::HorizontalRule => "horizontal rule",
            NodeRenderer::BulletList => "bullet list",
            NodeRenderer::OrderedList => "ordered list",
            NodeRenderer::ListItem => "list item",
            NodeRenderer::NoteList => "note list",
            NodeRenderer::Image => "image",
            NodeRenderer::HardBreak => "hard break",
            NodeRenderer::LineBreak => "line break",
            NodeRenderer::Tag => "tag",
            NodeRenderer::Backlink => "backlink",
            NodeRenderer::Tweet => "tweet",
            NodeRenderer::VideoEmbed => "video embed",
            NodeRenderer::FileAttachment => "file attachment",
        }
    }

    /// Render `node`, the child of `parent` at `index`.
    pub fn render<'a>(
        self,
        state: &mut SerializerState<'a>,
        node: &'a Node,
        parent: &'a Node,
        index: usize,
    ) -> Result<()> {
        match self {
            NodeRenderer::Text => {
                state.render_text(node.text().unwrap_or_default());
            }
            NodeRenderer::Paragraph => {
                state.render_inline(node, true)?;
                state.close_block(node);
            }
            NodeRenderer::ListAwareParagraph => {
                state.render_inline(node, true)?;
                if state.in_tight_list() {
                    state.close_block_with(node, 1);
                } else {
                    state.close_block(node);
                }
            }
            NodeRenderer::Heading => {
                let level = node.attr_u64("level").unwrap_or(1).clamp(1, 6) as usize;
                state.write(&format!("{} ", "#".repeat(level)));
                state.render_inline(node, false)?;
                state.close_block(node);
            }
            NodeRenderer::Blockquote => {
                state.wrap_block("> ", None, node, |s| s.render_content(node))?;
            }
            NodeRenderer::CodeBlock => {
                let content = node.text_content();
                let fence = code_fence(&content);
                let params = node.attr_str("params").unwrap_or_default();
                state.write(&format!("{}{}\n", fence, params));
                state.text(&content, false);
                state.write("\n");
                state.write(&fence);
                state.close_block(node);
            }
            NodeRenderer::FencedCode => {
                let params = node.attr_str("params").unwrap_or_default();
                state.write(&format!("```{}\n", params));
                state.text(&node.text_content(), false);
                state.ensure_new_line();
                state.write("```");
                state.close_block(node);
            }
            NodeRenderer::HorizontalRule => {
                let markup = node
                    .attr_str("markup")
                    .filter(|m| !m.is_empty())
                    .unwrap_or("---");
                state.write(markup);
                state.close_block(node);
            }
            NodeRenderer::BulletList => {
                let bullet = node
                    .attr_str("bullet")
                    .filter(|b| !b.is_empty())
                    .unwrap_or("*");
                let marker = format!("{} ", bullet);
                render_list(state, node, "  ", |_| marker.clone())?;
            }
            NodeRenderer::OrderedList => {
                let start = node.attr_u64("order").filter(|&n| n > 0).unwrap_or(1);
                let last = last_number(start, node.child_count())?;
                let width = last.to_string().len();
                let space = " ".repeat(width + 2);
                render_list(state, node, &space, |i| {
                    format!("{:>width$}. ", start + i as u64, width = width)
                })?;
            }
            NodeRenderer::ListItem => {
                state.render_content(node)?;
            }
            NodeRenderer::NoteList => render_note_list(state, node)?,
            NodeRenderer::Image => {
                let alt = state.esc(node.attr_str("alt").unwrap_or_default(), false);
                let src = escape_src(node.attr_str("src").unwrap_or_default());
                let title = node
                    .attr_str("title")
                    .filter(|t| !t.is_empty())
                    .map(quote_title)
                    .unwrap_or_default();
                state.write(&format!("![{}]({}{})", alt, src, title));
            }
            NodeRenderer::HardBreak => {
                let followed = parent
                    .children()
                    .get(index + 1..)
                    .unwrap_or_default()
                    .iter()
                    .any(|sibling| sibling.name() != node.name());
                if followed {
                    state.write("\\\n");
                }
            }
            NodeRenderer::LineBreak => state.write("\n"),
            NodeRenderer::Tag => {
                let label = node.attr_str("label").unwrap_or_default();
                let id = node.attr_str("id").unwrap_or_default();
                state.write(&format!("@[{}]({})", label, id));
            }
            NodeRenderer::Backlink => {
                let label = node.attr_str("label").unwrap_or_default();
                state.write(&format!("[[{}]]", label));
            }
            NodeRenderer::Tweet => render_tweet(state, node)?,
            NodeRenderer::VideoEmbed => {
                let src = node.attr_str("src").unwrap_or_default();
                state.write(&format!("[View Video]({})", src));
                state.close_block(node);
            }
            NodeRenderer::FileAttachment => {
                let url = node.attr_str("url").unwrap_or_default();
                let name = node.attr_str("fileName").unwrap_or_default();
                let file_type = node.attr_str("fileType").unwrap_or_default();
                state.write(&format!("[download file ({}): {}]({})", file_type, name, url));
                state.close_block(node);
            }
        }
        Ok(())
    }

    /// Render a text run whose text was trimmed by whitespace expulsion.
    pub fn render_run<'a>(
        self,
        state: &mut SerializerState<'a>,
        node: &'a Node,
        text: &str,
        parent: &'a Node,
        index: usize,
    ) -> Result<()> {
        match self {
            NodeRenderer::Text => {
                state.render_text(text);
                Ok(())
            }
            other => other.render(state, node, parent, index),
        }
    }
}

/// Shared list algorithm of `bullet_list` and `ordered_list`.
fn render_list<'a, F>(
    state: &mut SerializerState<'a>,
    node: &'a Node,
    delim: &str,
    first_delim: F,
) -> Result<()>
where
    F: Fn(usize) -> String,
{
    match state.closed() {
        Some(closed) if closed.name() == node.name() => state.flush_close(3),
        _ if state.in_tight_list() => state.flush_close(1),
        _ => {}
    }

    let is_tight = node
        .attr_bool("tight")
        .unwrap_or(state.options().tight_lists);
    let prev_tight = state.set_tight_list(is_tight);
    let result = node.children().iter().enumerate().try_for_each(|(i, child)| {
        if i > 0 && is_tight {
            state.flush_close(1);
        }
        let first = first_delim(i);
        state.wrap_block(delim, Some(first.as_str()), node, |s| s.render(child, node, i))
    });
    state.set_tight_list(prev_tight);
    result
}

/// The `list` kind: bullet, ordered or task items selected by `kind`.
///
/// Nested `list` children get indentation but no marker of their own.
fn render_note_list<'a>(state: &mut SerializerState<'a>, node: &'a Node) -> Result<()> {
    let is_tight = node
        .attr_bool("tight")
        .unwrap_or(state.options().tight_lists);
    let kind = node.attr_str("kind").unwrap_or("bullet");
    debug!(
        "list kind={} tight={} items={}",
        kind,
        is_tight,
        node.child_count()
    );
    let prev_tight = state.set_tight_list(is_tight);

    if let Some(closed) = state.closed() {
        if closed.name() == "heading" {
            state.flush_close(2);
        } else if is_tight {
            state.flush_close(1);
        } else {
            state.flush_close(2);
        }
    }

    let indent = state.options().indent_unit.clone();
    let mut number = node
        .attr_u64("order")
        .or_else(|| node.attr_u64("start"))
        .filter(|&n| n > 0)
        .unwrap_or(1);
    if kind == "ordered" {
        let items = node
            .children()
            .iter()
            .filter(|c| c.name() != node.name())
            .count();
        last_number(number, items)?;
    }

    let result = node.children().iter().enumerate().try_for_each(|(i, child)| {
        if i > 0 && is_tight {
            state.flush_close(1);
        }
        if child.name() == node.name() {
            return state.wrap_block(&indent, None, child, |s| s.render(child, node, i));
        }
        let marker = match kind {
            "ordered" => {
                let marker = format!("{}. ", number);
                number = number.saturating_add(1);
                marker
            }
            "task" => {
                let checked = child
                    .attr_bool("checked")
                    .or_else(|| node.attr_bool("checked"))
                    .unwrap_or(false);
                (if checked { "[x] " } else { "[ ] " }).to_string()
            }
            _ => "- ".to_string(),
        };
        state.wrap_block(&indent, Some(marker.as_str()), child, |s| s.render(child, node, i))
    });

    state.set_tight_list(prev_tight);
    result
}

/// Number of the last item in an ordered list of `items` starting at `start`.
fn last_number(start: u64, items: usize) -> Result<u64> {
    start
        .checked_add((items as u64).saturating_sub(1))
        .ok_or_else(|| {
            Error::MalformedInput(format!(
                "list numbering from {} overflows with {} items",
                start, items
            ))
        })
}

/// `#tweet from NAME (@SCREEN_NAME)` followed by the tweet text.
fn render_tweet<'a>(state: &mut SerializerState<'a>, node: &'a Node) -> Result<()> {
    let data = node
        .attr("tweetData")
        .filter(|v| v.is_object())
        .ok_or_else(|| Error::MalformedInput("tweet without tweetData".to_string()))?;
    let user = data
        .get("user")
        .filter(|v| v.is_object())
        .ok_or_else(|| Error::MalformedInput("tweet without user".to_string()))?;
    let delim = state.delim();
    let base_indent = delim
        .get(..delim.len().saturating_sub(2))
        .unwrap_or_default()
        .to_string();

    state.write(&format!(
        "#tweet from {} (@{})\n",
        str_field(user, "name"),
        str_field(user, "screen_name")
    ));
    let mut lines = str_field(data, "text").split('\n').peekable();
    while let Some(line) = lines.next() {
        state.write(&format!("{}{}", base_indent, line));
        if lines.peek().is_some() {
            state.write("\n");
        }
    }
    state.close_block(node);
    Ok(())
}

fn str_field<'v>(value: &'v Value, key: &str) -> &'v str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}
