//! Markdown document tree.
//!
//! The tree is stored as an arena ([`Document`]) of [`Node`]s addressed by
//! [`NodeId`]. Each node owns its children by index and keeps its parent
//! index for read-only ancestor queries, which avoids reference cycles.
//!
//! Trees come from [`Document::parse`] (a bridge over `pulldown-cmark`) or
//! from any other parser through [`DocumentBuilder`].
//!
//! # Example
//!
//! ```
//! use mdview_tree::{Document, NodeKind};
//!
//! let document = Document::parse("# Hello\n\n**Bold** text");
//! let heading = document.children(document.root())[0];
//! assert_eq!(document.kind(heading), &NodeKind::Heading { level: 1 });
//! assert_eq!(document.plain_text(heading), "Hello");
//! ```

mod document;
mod dump;
mod node;
mod parse;

pub use document::{Descendants, Document, DocumentBuilder, MAX_NESTING};
pub use node::{Checkbox, ColumnAlignment, Node, NodeId, NodeKind, SourceRange};
