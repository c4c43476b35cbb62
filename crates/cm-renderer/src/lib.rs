//! HTML renderer for CommonMark document trees.
//!
//! This crate turns a [`cm_ast::Document`] into the HTML serialization used by
//! the CommonMark reference implementations.
//!
//! # Architecture
//!
//! - [`Walker`] visits every node depth-first, yielding an entering event for
//!   each node and an exiting event for containers.
//! - [`HtmlRenderer`] matches on the node kind of each event and appends tags
//!   and escaped text to a per-call output buffer. The buffer collapses
//!   repeated newline requests between blocks and suppresses all markup
//!   nested inside images.
//! - [`is_potentially_unsafe`] screens link and image destinations in safe
//!   mode; [`escape_xml`] escapes text and attribute values.
//!
//! # Example
//!
//! ```
//! use cm_ast::parse_markdown;
//! use cm_renderer::{HtmlRenderer, RenderOptions};
//!
//! let doc = parse_markdown("# Hello\n\n[link](javascript:alert(1))");
//! let html = HtmlRenderer::new(RenderOptions::new().with_safe(true))
//!     .render(&doc)
//!     .unwrap();
//! assert_eq!(html, "<h1>Hello</h1>\n<p><a>link</a></p>\n");
//! ```

mod error;
mod escape;
mod html;
mod options;
mod safety;
mod session;
mod walker;

pub use error::RenderError;
pub use escape::escape_xml;
pub use html::{HtmlRenderer, render_html};
pub use options::{DEFAULT_SOFT_BREAK, RenderOptions};
pub use safety::is_potentially_unsafe;
pub use walker::{WalkEvent, Walker};
