//! Depth-first traversal of a document tree.

use cm_ast::{Document, NodeRef};

/// One visit of a node during a walk.
#[derive(Clone, Copy, Debug)]
pub struct WalkEvent<'a> {
    /// The visited node.
    pub node: NodeRef<'a>,
    /// `true` on the way down, `false` on the way back up.
    pub entering: bool,
}

/// Iterator over enter and exit events of a tree, in document order.
///
/// Container nodes produce an entering event, the events of their children,
/// then an exiting event. Leaf nodes produce a single entering event.
///
/// # Example
///
/// ```
/// use cm_ast::{Document, NodeKind};
/// use cm_renderer::Walker;
///
/// let mut doc = Document::new();
/// let para = doc.append(doc.root_id(), NodeKind::Paragraph);
/// doc.append(para, NodeKind::Text("hi".to_owned()));
///
/// let visits: Vec<_> = Walker::new(&doc)
///     .map(|ev| (ev.node.kind().name(), ev.entering))
///     .collect();
/// assert_eq!(
///     visits,
///     vec![
///         ("document", true),
///         ("paragraph", true),
///         ("text", true),
///         ("paragraph", false),
///         ("document", false),
///     ]
/// );
/// ```
pub struct Walker<'a> {
    /// Pending visits; popped from the end.
    stack: Vec<WalkEvent<'a>>,
}

impl<'a> Walker<'a> {
    /// Walk a whole document, starting at its root.
    pub fn new(doc: &'a Document) -> Self {
        Self::from_node(doc.root())
    }

    /// Walk the subtree rooted at `node`.
    pub fn from_node(node: NodeRef<'a>) -> Self {
        Self {
            stack: vec![WalkEvent {
                node,
                entering: true,
            }],
        }
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.stack.pop()?;
        if event.entering && event.node.kind().is_container() {
            self.stack.push(WalkEvent {
                node: event.node,
                entering: false,
            });
            self.stack
                .extend(event.node.children().rev().map(|node| WalkEvent {
                    node,
                    entering: true,
                }));
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_ast::{LinkData, NodeKind};

    fn trace(doc: &Document) -> Vec<String> {
        Walker::new(doc)
            .map(|ev| {
                let marker = if ev.entering { '+' } else { '-' };
                format!("{marker}{}", ev.node.kind().name())
            })
            .collect()
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert_eq!(trace(&doc), vec!["+document", "-document"]);
    }

    #[test]
    fn test_leaves_visited_once() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(root, NodeKind::ThematicBreak);
        doc.append(
            root,
            NodeKind::CodeBlock {
                info: None,
                literal: "x".to_owned(),
            },
        );
        assert_eq!(
            trace(&doc),
            vec!["+document", "+thematic_break", "+code_block", "-document"]
        );
    }

    #[test]
    fn test_nested_order() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let para = doc.append(root, NodeKind::Paragraph);
        let emph = doc.append(para, NodeKind::Emph);
        doc.append(emph, NodeKind::Text("a".to_owned()));
        doc.append(para, NodeKind::SoftBreak);
        let img = doc.append(para, NodeKind::Image(LinkData::new("x.png")));
        doc.append(img, NodeKind::Text("alt".to_owned()));

        assert_eq!(
            trace(&doc),
            vec![
                "+document",
                "+paragraph",
                "+emph",
                "+text",
                "-emph",
                "+softbreak",
                "+image",
                "+text",
                "-image",
                "-paragraph",
                "-document",
            ]
        );
    }

    #[test]
    fn test_empty_container_still_exits() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(root, NodeKind::BlockQuote);
        assert_eq!(
            trace(&doc),
            vec!["+document", "+block_quote", "-block_quote", "-document"]
        );
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut doc = Document::new();
        let mut parent = doc.root_id();
        for _ in 0..50_000 {
            parent = doc.append(parent, NodeKind::BlockQuote);
        }
        assert_eq!(Walker::new(&doc).count(), 2 * 50_001);
    }
}
