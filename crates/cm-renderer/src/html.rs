//! HTML renderer.
//!
//! Produces the CommonMark reference HTML serialization of a document tree.

use std::borrow::Cow;

use cm_ast::{Document, LinkData, ListType, NodeKind, NodeRef};

use crate::error::RenderError;
use crate::escape::escape_xml;
use crate::options::RenderOptions;
use crate::safety::is_potentially_unsafe;
use crate::session::{Attr, RenderSession};
use crate::walker::{WalkEvent, Walker};

/// Replacement for raw HTML in safe mode.
const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Renders document trees to HTML fragments.
///
/// The renderer only holds its options. Output state is created afresh for
/// every [`render`](Self::render) call, so one renderer can be reused for any
/// number of documents, including from several threads at once.
///
/// # Example
///
/// ```
/// use cm_ast::{Document, NodeKind};
/// use cm_renderer::{HtmlRenderer, RenderOptions};
///
/// let mut doc = Document::new();
/// let para = doc.append(doc.root_id(), NodeKind::Paragraph);
/// doc.append(para, NodeKind::Text("a & b".to_owned()));
///
/// let html = HtmlRenderer::new(RenderOptions::default()).render(&doc).unwrap();
/// assert_eq!(html, "<p>a &amp; b</p>\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Options this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the tree is malformed. No partial output is
    /// returned in that case.
    pub fn render(&self, doc: &Document) -> Result<String, RenderError> {
        tracing::debug!(
            nodes = doc.len(),
            safe = self.options.safe,
            "Rendering document"
        );
        let mut session = RenderSession::new();
        for WalkEvent { node, entering } in Walker::new(doc) {
            self.visit(&mut session, node, entering)?;
        }
        let html = session.finish();
        tracing::debug!(bytes = html.len(), "Rendered document");
        Ok(html)
    }

    #[allow(clippy::too_many_lines)]
    fn visit(
        &self,
        out: &mut RenderSession,
        node: NodeRef<'_>,
        entering: bool,
    ) -> Result<(), RenderError> {
        match node.kind() {
            NodeKind::Document => {}
            NodeKind::Text(literal) => self.text(out, literal),
            NodeKind::SoftBreak => {
                let soft_break = self.options.soft_break();
                if out.is_suppressed() && self.options.alt_text {
                    out.write_raw(&escape_xml(soft_break, false));
                } else {
                    out.lit(soft_break);
                }
            }
            NodeKind::LineBreak => {
                out.tag("br", &[], true);
                out.cr();
            }
            NodeKind::Emph => out.tag(if entering { "em" } else { "/em" }, &[], false),
            NodeKind::Strong => {
                out.tag(if entering { "strong" } else { "/strong" }, &[], false);
            }
            NodeKind::Link(link) => self.link(out, node, link, entering),
            NodeKind::Image(link) => self.image(out, link, entering),
            NodeKind::Paragraph => self.paragraph(out, node, entering),
            NodeKind::Heading { level } => {
                if !(1..=6).contains(level) {
                    return Err(RenderError::InvalidHeadingLevel {
                        node: node.id(),
                        level: *level,
                    });
                }
                if entering {
                    out.cr();
                    out.tag(&format!("h{level}"), &self.attrs(node), false);
                } else {
                    out.tag(&format!("/h{level}"), &[], false);
                    out.cr();
                }
            }
            NodeKind::Code(literal) => {
                out.tag("code", &[], false);
                self.text(out, literal);
                out.tag("/code", &[], false);
            }
            NodeKind::CodeBlock { info, literal } => {
                let mut attrs = self.attrs(node);
                let lang = info.as_deref().and_then(|i| i.split_whitespace().next());
                if let Some(lang) = lang {
                    attrs.push(("class", format!("language-{}", escape_xml(lang, true))));
                }
                out.cr();
                out.tag("pre", &[], false);
                out.tag("code", &attrs, false);
                out.out(literal);
                out.tag("/code", &[], false);
                out.tag("/pre", &[], false);
                out.cr();
            }
            NodeKind::ThematicBreak => {
                out.cr();
                out.tag("hr", &self.attrs(node), true);
                out.cr();
            }
            NodeKind::BlockQuote => {
                out.cr();
                if entering {
                    out.tag("blockquote", &self.attrs(node), false);
                } else {
                    out.tag("/blockquote", &[], false);
                }
                out.cr();
            }
            NodeKind::List(data) => {
                let name = match data.list_type {
                    ListType::Bullet => "ul",
                    ListType::Ordered => "ol",
                };
                out.cr();
                if entering {
                    let mut attrs = self.attrs(node);
                    if data.list_type == ListType::Ordered
                        && let Some(start) = data.start.filter(|&n| n != 1)
                    {
                        attrs.push(("start", start.to_string()));
                    }
                    out.tag(name, &attrs, false);
                } else {
                    out.tag(&format!("/{name}"), &[], false);
                }
                out.cr();
            }
            NodeKind::Item => {
                if entering {
                    out.tag("li", &self.attrs(node), false);
                } else {
                    out.tag("/li", &[], false);
                    out.cr();
                }
            }
            NodeKind::HtmlInline(literal) => self.raw_html(out, literal),
            NodeKind::HtmlBlock(literal) => {
                out.cr();
                self.raw_html(out, literal);
                out.cr();
            }
            NodeKind::CustomInline(custom) => {
                let markup = if entering {
                    &custom.on_enter
                } else {
                    &custom.on_exit
                };
                if let Some(markup) = markup {
                    out.lit(markup);
                }
            }
            NodeKind::CustomBlock(custom) => {
                let markup = if entering {
                    &custom.on_enter
                } else {
                    &custom.on_exit
                };
                out.cr();
                if let Some(markup) = markup {
                    out.lit(markup);
                }
                out.cr();
            }
        }
        Ok(())
    }

    fn text(&self, out: &mut RenderSession, literal: &str) {
        if out.is_suppressed() && self.options.alt_text {
            out.write_raw(&escape_xml(literal, false));
        } else {
            out.out(literal);
        }
    }

    fn link(&self, out: &mut RenderSession, node: NodeRef<'_>, link: &LinkData, entering: bool) {
        if !entering {
            out.tag("/a", &[], false);
            return;
        }
        let mut attrs = self.attrs(node);
        if let Some(href) = self.destination(&link.destination) {
            attrs.push(("href", href.into_owned()));
        }
        if let Some(title) = title(link) {
            attrs.push(("title", escape_xml(title, true).into_owned()));
        }
        out.tag("a", &attrs, false);
    }

    fn image(&self, out: &mut RenderSession, link: &LinkData, entering: bool) {
        if entering {
            if !out.is_suppressed() {
                let src = self.destination(&link.destination).unwrap_or_default();
                out.write_raw("<img src=\"");
                out.write_raw(&src);
                out.write_raw("\" alt=\"");
            }
            out.suppress();
        } else if out.unsuppress() {
            if let Some(title) = title(link) {
                out.write_raw("\" title=\"");
                out.write_raw(&escape_xml(title, true));
            }
            out.write_raw("\" />");
        }
    }

    fn paragraph(&self, out: &mut RenderSession, node: NodeRef<'_>, entering: bool) {
        let grandparent = node.parent().and_then(|parent| parent.parent());
        if let Some(NodeKind::List(data)) = grandparent.map(|list| list.kind())
            && data.tight
        {
            return;
        }
        if entering {
            out.cr();
            out.tag("p", &self.attrs(node), false);
        } else {
            out.tag("/p", &[], false);
            out.cr();
        }
    }

    fn raw_html(&self, out: &mut RenderSession, literal: &str) {
        if self.options.safe {
            tracing::debug!("Omitting raw HTML in safe mode");
            out.lit(RAW_HTML_OMITTED);
        } else {
            out.lit(literal);
        }
    }

    /// Escaped destination, or `None` when safe mode rejects it.
    fn destination<'a>(&self, url: &'a str) -> Option<Cow<'a, str>> {
        if self.options.safe && is_potentially_unsafe(url) {
            tracing::debug!(destination = %url, "Dropping unsafe destination");
            None
        } else {
            Some(escape_xml(url, true))
        }
    }

    fn attrs(&self, node: NodeRef<'_>) -> Vec<Attr> {
        match node.source_pos() {
            Some(pos) if self.options.source_pos => vec![(
                "data-sourcepos",
                format!(
                    "{}:{}-{}:{}",
                    pos.start.0, pos.start.1, pos.end.0, pos.end.1
                ),
            )],
            _ => Vec::new(),
        }
    }
}

/// Title of a link or image, treating an empty title as absent.
fn title(link: &LinkData) -> Option<&str> {
    link.title.as_deref().filter(|t| !t.is_empty())
}

/// Render a document with the given options.
///
/// # Errors
///
/// Returns [`RenderError`] if the tree is malformed.
pub fn render_html(doc: &Document, options: &RenderOptions) -> Result<String, RenderError> {
    HtmlRenderer::new(options.clone()).render(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_ast::{CustomData, ListData, NodeId, SourcePos};
    use pretty_assertions::assert_eq;

    fn render(doc: &Document) -> String {
        HtmlRenderer::default().render(doc).unwrap()
    }

    fn render_safe(doc: &Document) -> String {
        HtmlRenderer::new(RenderOptions::new().with_safe(true))
            .render(doc)
            .unwrap()
    }

    fn text(doc: &mut Document, parent: NodeId, literal: &str) -> NodeId {
        doc.append(parent, NodeKind::Text(literal.to_owned()))
    }

    fn paragraph(doc: &mut Document, literal: &str) -> NodeId {
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        text(doc, para, literal);
        para
    }

    fn link_doc(kind: NodeKind) -> Document {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let link = doc.append(para, kind);
        text(&mut doc, link, "x");
        doc
    }

    /// Two-item list whose items each hold one paragraph.
    fn list_doc(data: ListData) -> Document {
        let mut doc = Document::new();
        let root = doc.root_id();
        let list = doc.append(root, NodeKind::List(data));
        for word in ["one", "two"] {
            let item = doc.append(list, NodeKind::Item);
            let para = doc.append(item, NodeKind::Paragraph);
            text(&mut doc, para, word);
        }
        doc
    }

    #[test]
    fn test_paragraph_round_trip() {
        let mut doc = Document::new();
        paragraph(&mut doc, "a & b");
        assert_eq!(render(&doc), "<p>a &amp; b</p>\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(&Document::new()), "");
    }

    #[test]
    fn test_text_escaping() {
        let mut doc = Document::new();
        paragraph(&mut doc, "<b>\"x\" & &amp;</b>");
        assert_eq!(
            render(&doc),
            "<p>&lt;b&gt;&quot;x&quot; &amp; &amp;amp;&lt;/b&gt;</p>\n"
        );
    }

    #[test]
    fn test_soft_break_default_and_custom() {
        let mut doc = Document::new();
        let para = paragraph(&mut doc, "a");
        doc.append(para, NodeKind::SoftBreak);
        text(&mut doc, para, "b");
        assert_eq!(render(&doc), "<p>a\nb</p>\n");

        let html = HtmlRenderer::new(RenderOptions::new().with_soft_break("<br />\n"))
            .render(&doc)
            .unwrap();
        assert_eq!(html, "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_line_break() {
        let mut doc = Document::new();
        let para = paragraph(&mut doc, "a");
        doc.append(para, NodeKind::LineBreak);
        text(&mut doc, para, "b");
        assert_eq!(render(&doc), "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_emphasis_and_strong() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let em = doc.append(para, NodeKind::Emph);
        text(&mut doc, em, "a");
        let strong = doc.append(para, NodeKind::Strong);
        text(&mut doc, strong, "b");
        assert_eq!(render(&doc), "<p><em>a</em><strong>b</strong></p>\n");
    }

    #[test]
    fn test_link_with_title() {
        let doc = link_doc(NodeKind::Link(
            LinkData::new("/url?a=1&b=2").with_title("say \"hi\""),
        ));
        assert_eq!(
            render(&doc),
            "<p><a href=\"/url?a=1&amp;b=2\" title=\"say &quot;hi&quot;\">x</a></p>\n"
        );
    }

    #[test]
    fn test_link_empty_title_is_omitted() {
        let doc = link_doc(NodeKind::Link(LinkData::new("/u").with_title("")));
        assert_eq!(render(&doc), "<p><a href=\"/u\">x</a></p>\n");
    }

    #[test]
    fn test_link_preserves_entities() {
        let doc = link_doc(NodeKind::Link(LinkData::new("/a&amp;b")));
        assert_eq!(render(&doc), "<p><a href=\"/a&amp;b\">x</a></p>\n");
    }

    #[test]
    fn test_safe_mode_javascript_link() {
        let doc = link_doc(NodeKind::Link(LinkData::new("javascript:alert(1)")));
        assert_eq!(render_safe(&doc), "<p><a>x</a></p>\n");
        assert_eq!(
            render(&doc),
            "<p><a href=\"javascript:alert(1)\">x</a></p>\n"
        );
    }

    #[test]
    fn test_safe_mode_data_links() {
        let doc = link_doc(NodeKind::Link(LinkData::new("data:image/png;base64,AAAA")));
        assert_eq!(
            render_safe(&doc),
            "<p><a href=\"data:image/png;base64,AAAA\">x</a></p>\n"
        );

        let doc = link_doc(NodeKind::Link(LinkData::new("data:text/html,<b>x</b>")));
        assert_eq!(render_safe(&doc), "<p><a>x</a></p>\n");
    }

    #[test]
    fn test_image() {
        let doc = link_doc(NodeKind::Image(LinkData::new("/img.png").with_title("T")));
        assert_eq!(
            render(&doc),
            "<p><img src=\"/img.png\" alt=\"\" title=\"T\" /></p>\n"
        );
    }

    #[test]
    fn test_image_drops_nested_markup_and_text() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let img = doc.append(para, NodeKind::Image(LinkData::new("a.png")));
        text(&mut doc, img, "foo ");
        let em = doc.append(img, NodeKind::Emph);
        text(&mut doc, em, "bar");
        doc.append(img, NodeKind::SoftBreak);
        doc.append(img, NodeKind::HtmlInline("<b>".to_owned()));

        let html = render(&doc);
        assert_eq!(html, "<p><img src=\"a.png\" alt=\"\" /></p>\n");
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn test_image_alt_text_option() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let img = doc.append(para, NodeKind::Image(LinkData::new("a.png")));
        text(&mut doc, img, "foo ");
        let em = doc.append(img, NodeKind::Emph);
        text(&mut doc, em, "\"bar\"");
        doc.append(img, NodeKind::Code("c".to_owned()));

        let html = HtmlRenderer::new(RenderOptions::new().with_alt_text(true))
            .render(&doc)
            .unwrap();
        assert_eq!(
            html,
            "<p><img src=\"a.png\" alt=\"foo &quot;bar&quot;c\" /></p>\n"
        );
    }

    #[test]
    fn test_nested_images() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let outer = doc.append(para, NodeKind::Image(LinkData::new("outer.png")));
        let inner = doc.append(
            outer,
            NodeKind::Image(LinkData::new("inner.png").with_title("inner")),
        );
        text(&mut doc, inner, "x");
        text(&mut doc, para, " after");
        assert_eq!(
            render(&doc),
            "<p><img src=\"outer.png\" alt=\"\" /> after</p>\n"
        );
    }

    #[test]
    fn test_image_inside_link() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let link = doc.append(para, NodeKind::Link(LinkData::new("/a")));
        doc.append(link, NodeKind::Image(LinkData::new("b.png")));
        assert_eq!(
            render(&doc),
            "<p><a href=\"/a\"><img src=\"b.png\" alt=\"\" /></a></p>\n"
        );
    }

    #[test]
    fn test_safe_mode_image() {
        let doc = link_doc(NodeKind::Image(LinkData::new("javascript:x")));
        assert_eq!(render_safe(&doc), "<p><img src=\"\" alt=\"\" /></p>\n");

        let doc = link_doc(NodeKind::Image(LinkData::new("data:image/gif;base64,R0")));
        assert_eq!(
            render_safe(&doc),
            "<p><img src=\"data:image/gif;base64,R0\" alt=\"\" /></p>\n"
        );
    }

    #[test]
    fn test_tight_list_drops_paragraph_tags() {
        let doc = list_doc(ListData::bullet());
        assert_eq!(render(&doc), "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_list_keeps_paragraph_tags() {
        let doc = list_doc(ListData::bullet().with_tight(false));
        assert_eq!(
            render(&doc),
            "<ul>\n<li>\n<p>one</p>\n</li>\n<li>\n<p>two</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = list_doc(ListData::ordered(5));
        assert!(render(&doc).starts_with("<ol start=\"5\">\n"));

        let doc = list_doc(ListData::ordered(1));
        assert!(render(&doc).starts_with("<ol>\n"));
    }

    #[test]
    fn test_bullet_list_ignores_start() {
        let mut data = ListData::bullet();
        data.start = Some(5);
        let html = render(&list_doc(data));
        assert!(html.starts_with("<ul>\n"));
        assert!(!html.contains("start="));
        assert!(!html.contains("<ol"));
    }

    #[test]
    fn test_heading_levels() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let h = doc.append(root, NodeKind::Heading { level: 3 });
        text(&mut doc, h, "Title");
        paragraph(&mut doc, "body");
        assert_eq!(render(&doc), "<h3>Title</h3>\n<p>body</p>\n");
    }

    #[test]
    fn test_invalid_heading_level() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let h = doc.append(root, NodeKind::Heading { level: 7 });
        let err = HtmlRenderer::default().render(&doc).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidHeadingLevel { node, level: 7 } if node == h
        ));
    }

    #[test]
    fn test_code_span() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        doc.append(para, NodeKind::Code("a < b".to_owned()));
        assert_eq!(render(&doc), "<p><code>a &lt; b</code></p>\n");
    }

    #[test]
    fn test_code_block_language_class() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(
            root,
            NodeKind::CodeBlock {
                info: Some("rust extra words".to_owned()),
                literal: "fn main() {}\n".to_owned(),
            },
        );
        assert_eq!(
            render(&doc),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_without_info() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(
            root,
            NodeKind::CodeBlock {
                info: Some("   ".to_owned()),
                literal: "<x>\n".to_owned(),
            },
        );
        assert_eq!(render(&doc), "<pre><code>&lt;x&gt;\n</code></pre>\n");
    }

    #[test]
    fn test_adjacent_thematic_breaks() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(root, NodeKind::ThematicBreak);
        doc.append(root, NodeKind::ThematicBreak);
        assert_eq!(render(&doc), "<hr />\n<hr />\n");
    }

    #[test]
    fn test_block_quote() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let quote = doc.append(root, NodeKind::BlockQuote);
        let para = doc.append(quote, NodeKind::Paragraph);
        text(&mut doc, para, "q");
        assert_eq!(render(&doc), "<blockquote>\n<p>q</p>\n</blockquote>\n");
    }

    #[test]
    fn test_raw_html() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(root, NodeKind::HtmlBlock("<div>x</div>".to_owned()));
        let para = doc.append(root, NodeKind::Paragraph);
        doc.append(para, NodeKind::HtmlInline("<span>".to_owned()));
        assert_eq!(render(&doc), "<div>x</div>\n<p><span></p>\n");
        assert_eq!(
            render_safe(&doc),
            "<!-- raw HTML omitted -->\n<p><!-- raw HTML omitted --></p>\n"
        );
    }

    #[test]
    fn test_custom_nodes() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let block = doc.append(
            root,
            NodeKind::CustomBlock(CustomData::new("<section>", "</section>")),
        );
        let para = doc.append(block, NodeKind::Paragraph);
        let inline = doc.append(
            para,
            NodeKind::CustomInline(CustomData {
                on_enter: Some("<mark>".to_owned()),
                on_exit: None,
            }),
        );
        text(&mut doc, inline, "x");
        assert_eq!(render(&doc), "<section>\n<p><mark>x</p>\n</section>\n");
    }

    #[test]
    fn test_source_positions() {
        let mut doc = Document::new();
        let para = paragraph(&mut doc, "x");
        doc.set_source_pos(para, SourcePos::new((1, 1), (1, 5)));
        let root = doc.root_id();
        let hr = doc.append(root, NodeKind::ThematicBreak);
        doc.set_source_pos(hr, SourcePos::new((3, 1), (3, 3)));

        assert_eq!(render(&doc), "<p>x</p>\n<hr />\n");
        let html = HtmlRenderer::new(RenderOptions::new().with_source_pos(true))
            .render(&doc)
            .unwrap();
        assert_eq!(
            html,
            "<p data-sourcepos=\"1:1-1:5\">x</p>\n<hr data-sourcepos=\"3:1-3:3\" />\n"
        );
    }

    #[test]
    fn test_link_source_position() {
        let mut doc = link_doc(NodeKind::Link(LinkData::new("/u").with_title("t")));
        let para = doc.root().children().next().unwrap();
        let link = para.children().next().unwrap().id();
        doc.set_source_pos(link, SourcePos::new((1, 1), (1, 9)));
        let html = HtmlRenderer::new(RenderOptions::new().with_source_pos(true))
            .render(&doc)
            .unwrap();
        assert_eq!(
            html,
            "<p><a data-sourcepos=\"1:1-1:9\" href=\"/u\" title=\"t\">x</a></p>\n"
        );
    }

    #[test]
    fn test_renderer_is_reusable() {
        let renderer = HtmlRenderer::default();
        let mut first = Document::new();
        let root = first.root_id();
        let para = first.append(root, NodeKind::Paragraph);
        first.append(para, NodeKind::Image(LinkData::new("a.png")));

        let mut second = Document::new();
        paragraph(&mut second, "after");

        renderer.render(&first).unwrap();
        assert_eq!(renderer.render(&second).unwrap(), "<p>after</p>\n");
    }

    #[test]
    fn test_render_html_function() {
        let mut doc = Document::new();
        paragraph(&mut doc, "x");
        assert_eq!(
            render_html(&doc, &RenderOptions::default()).unwrap(),
            "<p>x</p>\n"
        );
    }
}
