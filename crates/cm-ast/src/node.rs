//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` owned by [`Document`] and refer to each other
//! by [`NodeId`]. Parent links are plain indices, so ancestor lookups never
//! take part in ownership.

/// Index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Source span of a block, 1-based `(line, column)` pairs, end inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePos {
    /// Line and column of the first character.
    pub start: (usize, usize),
    /// Line and column of the last character.
    pub end: (usize, usize),
}

impl SourcePos {
    /// Create a span from start and end positions.
    pub fn new(start: (usize, usize), end: (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// Bullet or ordered list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListType {
    /// `-`, `+` or `*` markers.
    Bullet,
    /// Numbered markers.
    Ordered,
}

/// List metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListData {
    /// Marker family.
    pub list_type: ListType,
    /// Whether item paragraphs render without `<p>` wrappers.
    pub tight: bool,
    /// First number of an ordered list.
    pub start: Option<u64>,
}

impl ListData {
    /// Tight bullet list.
    pub fn bullet() -> Self {
        Self {
            list_type: ListType::Bullet,
            tight: true,
            start: None,
        }
    }

    /// Tight ordered list starting at `start`.
    pub fn ordered(start: u64) -> Self {
        Self {
            list_type: ListType::Ordered,
            tight: true,
            start: Some(start),
        }
    }

    /// Set the tightness flag.
    #[must_use]
    pub fn with_tight(mut self, tight: bool) -> Self {
        self.tight = tight;
        self
    }
}

/// Destination and title shared by links and images.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkData {
    /// Link target, as written in the source.
    pub destination: String,
    /// Optional title.
    pub title: Option<String>,
}

impl LinkData {
    /// Link data without a title.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            title: None,
        }
    }

    /// Attach a title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// User supplied markup for custom nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomData {
    /// Emitted verbatim when the node is entered.
    pub on_enter: Option<String>,
    /// Emitted verbatim when the node is exited.
    pub on_exit: Option<String>,
}

impl CustomData {
    /// Custom markup with both strings set.
    pub fn new(on_enter: impl Into<String>, on_exit: impl Into<String>) -> Self {
        Self {
            on_enter: Some(on_enter.into()),
            on_exit: Some(on_exit.into()),
        }
    }
}

/// Closed set of node kinds, with the payload each kind carries.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Root of every tree.
    Document,
    /// Literal text.
    Text(String),
    /// Line ending inside a paragraph.
    SoftBreak,
    /// Hard line break.
    LineBreak,
    /// Emphasis.
    Emph,
    /// Strong emphasis.
    Strong,
    /// Hyperlink.
    Link(LinkData),
    /// Image; children form the alt text.
    Image(LinkData),
    /// Paragraph.
    Paragraph,
    /// ATX or setext heading.
    Heading {
        /// 1 to 6.
        level: u8,
    },
    /// Inline code span.
    Code(String),
    /// Fenced or indented code block.
    CodeBlock {
        /// Fence info string.
        info: Option<String>,
        /// Block content.
        literal: String,
    },
    /// Thematic break.
    ThematicBreak,
    /// Block quote.
    BlockQuote,
    /// Bullet or ordered list.
    List(ListData),
    /// List item.
    Item,
    /// Raw inline HTML.
    HtmlInline(String),
    /// Raw HTML block.
    HtmlBlock(String),
    /// Inline node with caller-provided markup.
    CustomInline(CustomData),
    /// Block node with caller-provided markup.
    CustomBlock(CustomData),
}

impl NodeKind {
    /// Whether the walker visits this kind on both enter and exit.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::BlockQuote
                | Self::List(_)
                | Self::Item
                | Self::Paragraph
                | Self::Heading { .. }
                | Self::Emph
                | Self::Strong
                | Self::Link(_)
                | Self::Image(_)
                | Self::CustomInline(_)
                | Self::CustomBlock(_)
        )
    }

    /// Short lowercase name, as used in debug output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Text(_) => "text",
            Self::SoftBreak => "softbreak",
            Self::LineBreak => "linebreak",
            Self::Emph => "emph",
            Self::Strong => "strong",
            Self::Link(_) => "link",
            Self::Image(_) => "image",
            Self::Paragraph => "paragraph",
            Self::Heading { .. } => "heading",
            Self::Code(_) => "code",
            Self::CodeBlock { .. } => "code_block",
            Self::ThematicBreak => "thematic_break",
            Self::BlockQuote => "block_quote",
            Self::List(_) => "list",
            Self::Item => "item",
            Self::HtmlInline(_) => "html_inline",
            Self::HtmlBlock(_) => "html_block",
            Self::CustomInline(_) => "custom_inline",
            Self::CustomBlock(_) => "custom_block",
        }
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    source_pos: Option<SourcePos>,
}

/// A document tree. Node 0 is always the [`NodeKind::Document`] root.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                source_pos: None,
            }],
        }
    }

    /// Id of the root node.
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow the root node.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            doc: self,
            id: NodeId(0),
        }
    }

    /// Append a new last child to `parent` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "unknown parent {parent:?}");
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            source_pos: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Record the source span of a node. Unknown ids are ignored.
    pub fn set_source_pos(&mut self, id: NodeId, pos: SourcePos) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.source_pos = Some(pos);
        }
    }

    /// Mutable access to a node's kind, for fixing up payloads while building.
    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id.0).map(|node| &mut node.kind)
    }

    /// Borrow a node by id.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { doc: self, id })
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no content besides the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.doc.nodes[self.id.0]
    }

    /// Id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Kind and payload.
    pub fn kind(&self) -> &'a NodeKind {
        &self.data().kind
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| NodeRef { doc: self.doc, id })
    }

    /// Children in document order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + ExactSizeIterator {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { doc, id })
    }

    /// Source span, if one was recorded.
    pub fn source_pos(&self) -> Option<SourcePos> {
        self.data().source_pos
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", self.kind())
            .finish()
    }
}
