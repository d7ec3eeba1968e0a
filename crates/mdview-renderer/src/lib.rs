//! Renderers over the mdview document tree.
//!
//! Three targets share one [`Document`](mdview_tree::Document):
//! - [`RichTextRenderer`]: styled text runs for a native text view, driven
//!   by a [`StyleSheet`](mdview_style::StyleSheet)
//! - [`HtmlRenderer`]: an HTML fragment
//! - [`extract_outline`]: the heading outline
//!
//! Collaborators plug in at trait seams: [`Highlighter`] for code blocks,
//! [`HtmlConverter`] for raw HTML, and [`ImageResolver`] (or
//! [`ImageFetcher`] via [`CallbackResolver`]) for images.
//!
//! # Example
//!
//! ```
//! use mdview_renderer::{HtmlRenderer, RichTextRenderer, extract_outline};
//! use mdview_style::StyleSheet;
//! use mdview_tree::Document;
//!
//! let document = Document::parse("# Title\n\n- [x] done\n");
//! let sheet = StyleSheet::default();
//!
//! let styled = RichTextRenderer::new(&sheet).render(&document);
//! assert!(styled.text().starts_with("Title\n"));
//!
//! let html = HtmlRenderer::default().render(&document);
//! assert!(html.starts_with("<h1>Title</h1>"));
//!
//! assert_eq!(extract_outline(&document)[0].text, "Title");
//! ```

mod error;
mod highlight;
mod html;
mod html_bridge;
mod image;
mod outline;
mod rich_text;
mod state;
mod styled;

pub use error::ConversionError;
pub use highlight::{
    HighlightSpan, HighlightTheme, Highlighter, PlainHighlighter, RegexHighlighter, TokenClass,
};
pub use html::{HtmlOptions, HtmlRenderer, ImageUrlRewriter};
pub use html_bridge::{HtmlConverter, XmlHtmlConverter};
pub use image::{
    CallbackResolver, FetchCallback, ImageBounds, ImageFetcher, ImageRequest, ImageResolver,
    ImageSlot, LayoutCallback, LayoutNotifier, ResolvedImage,
};
pub use outline::{OutlineToken, extract_outline};
pub use rich_text::RichTextRenderer;
pub use state::{escape_html, slugify};
pub use styled::{Attachment, OBJECT_REPLACEMENT, StyledDocument, StyledRun, StyledText};
