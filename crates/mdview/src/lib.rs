//! Markdown rendering for native text views.
//!
//! [`Markdown`] bundles a style sheet, render options and optional
//! collaborators (highlighter, image resolver, layout callback) and renders
//! sources to styled rich text, HTML or a heading outline.
//! [`RenderWorker`] moves that work onto a dedicated thread.
//!
//! The building blocks live in their own crates and are re-exported here:
//! [`tree`] (document model), [`style`] (style sheet and attributes) and
//! [`renderer`] (renderers and collaborator traits).

mod markdown;
mod worker;

pub use markdown::{Markdown, RenderOptions};
pub use worker::{
    Executor, InlineExecutor, PoolExecutor, RenderOutput, RenderTarget, RenderWorker, Task,
};

pub use mdview_renderer as renderer;
pub use mdview_style as style;
pub use mdview_tree as tree;

pub use mdview_renderer::{OutlineToken, StyledDocument};
pub use mdview_style::StyleSheet;
pub use mdview_tree::Document;
