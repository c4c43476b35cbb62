//! CommonMark document tree.
//!
//! [`Document`] is an arena of nodes addressed by [`NodeId`]. Each node has a
//! [`NodeKind`] carrying its payload, an ordered list of children and a
//! non-owning parent index used for ancestor lookups.
//!
//! Trees can be assembled by hand with [`Document::append`] or produced from
//! markdown text with [`MarkdownParser`], which folds pulldown-cmark events
//! into the same shape the HTML renderer expects.
//!
//! # Example
//!
//! ```
//! use cm_ast::{Document, NodeKind};
//!
//! let mut doc = Document::new();
//! let para = doc.append(doc.root_id(), NodeKind::Paragraph);
//! doc.append(para, NodeKind::Text("a & b".to_owned()));
//! assert_eq!(doc.len(), 3);
//! ```

mod node;
mod parse;

pub use node::{
    CustomData, Document, LinkData, ListData, ListType, NodeId, NodeKind, NodeRef, SourcePos,
};
pub use parse::{MarkdownParser, parse_markdown};
