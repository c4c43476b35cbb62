//! Render error types.

use cm_ast::NodeId;

/// Error raised when the input tree is malformed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Heading level outside `1..=6`.
    #[error("invalid heading level {level} at node {}", .node.index())]
    InvalidHeadingLevel {
        /// Offending node.
        node: NodeId,
        /// Level found on the node.
        level: u8,
    },
}
