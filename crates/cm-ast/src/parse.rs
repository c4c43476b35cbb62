//! Build a [`Document`] from markdown text using pulldown-cmark.
//!
//! pulldown-cmark produces a flat event stream; this module folds it back into
//! a tree. Two shapes differ from the event stream:
//!
//! - Tight list items carry their inline content directly. The builder wraps
//!   it in an implicit [`NodeKind::Paragraph`] and keeps the list marked tight.
//! - Code block and raw HTML block text arrives in chunks and is concatenated
//!   into the node literal.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::node::{Document, LinkData, ListData, NodeId, NodeKind, SourcePos};

/// Markdown front end producing [`Document`] trees.
///
/// # Example
///
/// ```
/// use cm_ast::{MarkdownParser, NodeKind};
///
/// let doc = MarkdownParser::new().parse("Hello *world*");
/// let para = doc.root().children().next().unwrap();
/// assert_eq!(para.kind(), &NodeKind::Paragraph);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MarkdownParser {
    source_pos: bool,
}

impl MarkdownParser {
    /// Create a parser for plain CommonMark.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record source positions on block nodes.
    #[must_use]
    pub fn with_source_pos(mut self, enabled: bool) -> Self {
        self.source_pos = enabled;
        self
    }

    /// Parse markdown text into a tree.
    pub fn parse(&self, markdown: &str) -> Document {
        let mut builder = TreeBuilder::new(markdown, self.source_pos);
        for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
            builder.event(event, range);
        }
        let doc = builder.finish();
        tracing::debug!(nodes = doc.len(), bytes = markdown.len(), "Parsed markdown");
        doc
    }
}

/// Parse CommonMark text with default settings.
pub fn parse_markdown(markdown: &str) -> Document {
    MarkdownParser::new().parse(markdown)
}

/// Convert heading level enum to number (1-6).
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

enum Frame {
    /// A node opened by a start tag.
    Node(NodeId),
    /// Paragraph synthesized around tight list item content.
    Implicit(NodeId),
    /// Construct outside CommonMark; children go to the enclosing node.
    Skipped,
}

struct TreeBuilder<'s> {
    source: &'s str,
    doc: Document,
    stack: Vec<Frame>,
    line_starts: Option<Vec<usize>>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str, source_pos: bool) -> Self {
        let line_starts = source_pos.then(|| {
            std::iter::once(0)
                .chain(source.match_indices('\n').map(|(i, _)| i + 1))
                .collect()
        });
        Self {
            source,
            doc: Document::new(),
            stack: Vec::new(),
            line_starts,
        }
    }

    fn finish(self) -> Document {
        self.doc
    }

    fn parent(&self) -> NodeId {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Node(id) | Frame::Implicit(id) => Some(*id),
                Frame::Skipped => None,
            })
            .unwrap_or_else(|| self.doc.root_id())
    }

    fn parent_kind(&self) -> Option<&NodeKind> {
        self.doc.get(self.parent()).map(|node| node.kind())
    }

    fn close_implicit(&mut self) {
        if matches!(self.stack.last(), Some(Frame::Implicit(_))) {
            self.stack.pop();
        }
    }

    /// Parent for inline content, opening an implicit paragraph in tight items.
    fn inline_parent(&mut self) -> NodeId {
        if matches!(self.parent_kind(), Some(NodeKind::Item)) {
            let item = self.parent();
            let para = self.doc.append(item, NodeKind::Paragraph);
            self.stack.push(Frame::Implicit(para));
        }
        self.parent()
    }

    fn append_block(&mut self, kind: NodeKind, range: &Range<usize>) -> NodeId {
        self.close_implicit();
        let parent = self.parent();
        let id = self.doc.append(parent, kind);
        if let Some(pos) = self.source_pos(range) {
            self.doc.set_source_pos(id, pos);
        }
        id
    }

    fn append_inline(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.inline_parent();
        self.doc.append(parent, kind)
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, &range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.append_inline(NodeKind::Code(code.into_string()));
            }
            Event::Html(html) => {
                if let Some(NodeKind::HtmlBlock(literal)) = self.current_kind_mut() {
                    literal.push_str(&html);
                } else {
                    self.append_block(NodeKind::HtmlBlock(html.into_string()), &range);
                }
            }
            Event::InlineHtml(html) => {
                self.append_inline(NodeKind::HtmlInline(html.into_string()));
            }
            Event::SoftBreak => {
                self.append_inline(NodeKind::SoftBreak);
            }
            Event::HardBreak => {
                self.append_inline(NodeKind::LineBreak);
            }
            Event::Rule => {
                self.append_block(NodeKind::ThematicBreak, &range);
            }
            Event::FootnoteReference(_)
            | Event::TaskListMarker(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                tracing::trace!("Skipping non-CommonMark event");
            }
        }
    }

    fn current_kind_mut(&mut self) -> Option<&mut NodeKind> {
        match self.stack.last() {
            Some(Frame::Node(id)) => self.doc.kind_mut(*id),
            _ => None,
        }
    }

    fn text(&mut self, text: &str) {
        match self.current_kind_mut() {
            Some(NodeKind::CodeBlock { literal, .. } | NodeKind::HtmlBlock(literal)) => {
                literal.push_str(text);
            }
            _ => {
                self.append_inline(NodeKind::Text(text.to_owned()));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: &Range<usize>) {
        let frame = match tag {
            Tag::Paragraph => {
                // An explicit paragraph inside an item makes the list loose.
                if matches!(self.parent_kind(), Some(NodeKind::Item)) {
                    self.mark_list_loose();
                }
                Frame::Node(self.append_block(NodeKind::Paragraph, range))
            }
            Tag::Heading { level, .. } => {
                let level = heading_level_to_num(level);
                Frame::Node(self.append_block(NodeKind::Heading { level }, range))
            }
            Tag::BlockQuote(_) => Frame::Node(self.append_block(NodeKind::BlockQuote, range)),
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.into_string())
                    }
                    _ => None,
                };
                let literal = String::new();
                Frame::Node(self.append_block(NodeKind::CodeBlock { info, literal }, range))
            }
            Tag::HtmlBlock => {
                Frame::Node(self.append_block(NodeKind::HtmlBlock(String::new()), range))
            }
            Tag::List(start) => {
                let data = match start {
                    Some(n) => ListData::ordered(n),
                    None => ListData::bullet(),
                };
                Frame::Node(self.append_block(NodeKind::List(data), range))
            }
            Tag::Item => Frame::Node(self.append_block(NodeKind::Item, range)),
            Tag::Emphasis => Frame::Node(self.append_inline(NodeKind::Emph)),
            Tag::Strong => Frame::Node(self.append_inline(NodeKind::Strong)),
            Tag::Link {
                dest_url, title, ..
            } => Frame::Node(self.append_inline(NodeKind::Link(link_data(&dest_url, &title)))),
            Tag::Image {
                dest_url, title, ..
            } => Frame::Node(self.append_inline(NodeKind::Image(link_data(&dest_url, &title)))),
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript
            | Tag::MetadataBlock(_) => Frame::Skipped,
        };
        self.stack.push(frame);
    }

    fn end(&mut self, tag: TagEnd) {
        self.close_implicit();
        if self.stack.pop().is_none() {
            tracing::warn!(?tag, "Unbalanced end tag");
        }
    }

    fn mark_list_loose(&mut self) {
        let list = self
            .doc
            .get(self.parent())
            .and_then(|item| item.parent())
            .map(|list| list.id());
        if let Some(list) = list
            && let Some(NodeKind::List(data)) = self.doc.kind_mut(list)
        {
            data.tight = false;
        }
    }

    fn source_pos(&self, range: &Range<usize>) -> Option<SourcePos> {
        let line_starts = self.line_starts.as_ref()?;
        let bytes = self.source.as_bytes();
        let mut end = range.end.min(bytes.len());
        while end > range.start && matches!(bytes[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        let locate = |offset: usize| {
            let line = line_starts.partition_point(|&start| start <= offset).max(1);
            (line, offset - line_starts[line - 1] + 1)
        };
        let start = locate(range.start);
        let end = if end > range.start { locate(end - 1) } else { start };
        Some(SourcePos::new(start, end))
    }
}

fn link_data(dest_url: &str, title: &str) -> LinkData {
    let data = LinkData::new(dest_url);
    if title.is_empty() {
        data
    } else {
        data.with_title(title)
    }
}
