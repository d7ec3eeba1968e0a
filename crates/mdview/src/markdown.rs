//! One-stop rendering entry point.

use std::fmt;
use std::sync::Arc;

use mdview_renderer::{
    Highlighter, HtmlOptions, HtmlRenderer, ImageResolver, ImageUrlRewriter, LayoutCallback,
    OutlineToken, RichTextRenderer, StyledDocument, extract_outline,
};
use mdview_style::StyleSheet;
use mdview_tree::Document;
use tracing::debug;

/// Switches shared by every output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Log the document tree at debug level after parsing. Output is unaffected.
    pub debug: bool,
    /// Add source line attributes to HTML block elements.
    pub emit_line_ranges: bool,
    /// Add unique `id` anchors to HTML headings.
    pub heading_anchors: bool,
}

/// Markdown renderer configured once and reused across documents.
///
/// Cheap to clone and safe to share between threads.
///
/// # Example
///
/// ```
/// use mdview::{Markdown, RenderOptions};
///
/// let markdown = Markdown::new().with_options(RenderOptions {
///     heading_anchors: true,
///     ..RenderOptions::default()
/// });
/// assert_eq!(markdown.render_html("# Hi\n"), "<h1 id=\"hi\">Hi</h1>\n");
/// ```
#[derive(Clone, Default)]
pub struct Markdown {
    sheet: Arc<StyleSheet>,
    options: RenderOptions,
    highlighter: Option<Arc<dyn Highlighter>>,
    image_resolver: Option<Arc<dyn ImageResolver>>,
    layout_callback: Option<LayoutCallback>,
    image_url_rewriter: Option<ImageUrlRewriter>,
}

impl Markdown {
    /// Renderer with the default style sheet and options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_style_sheet(mut self, sheet: StyleSheet) -> Self {
        self.sheet = Arc::new(sheet);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Highlight code blocks with `highlighter` instead of the built-in one.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    /// Resolve rich-text images through `resolver`.
    #[must_use]
    pub fn with_image_resolver(mut self, resolver: impl ImageResolver + 'static) -> Self {
        self.image_resolver = Some(Arc::new(resolver));
        self
    }

    /// Called with the attachment id whenever a deferred image arrives.
    #[must_use]
    pub fn with_layout_callback(
        mut self,
        callback: impl Fn(usize) + Send + Sync + 'static,
    ) -> Self {
        self.layout_callback = Some(Arc::new(callback));
        self
    }

    /// Rewrite image sources in HTML output.
    #[must_use]
    pub fn with_image_url_rewriter(
        mut self,
        rewriter: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.image_url_rewriter = Some(Arc::new(rewriter));
        self
    }

    pub fn style_sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Parse `source` into a document tree.
    #[must_use]
    pub fn parse(&self, source: &str) -> Document {
        let document = Document::parse(source);
        if self.options.debug {
            debug!("document tree:\n{}", document.dump());
        }
        document
    }

    /// Parse and render `source` as styled rich text.
    #[must_use]
    pub fn render_rich_text(&self, source: &str) -> StyledDocument {
        self.rich_text(&self.parse(source))
    }

    /// Render an already parsed document as styled rich text.
    #[must_use]
    pub fn rich_text(&self, document: &Document) -> StyledDocument {
        let mut renderer = RichTextRenderer::new(&self.sheet);
        if let Some(highlighter) = &self.highlighter {
            renderer = renderer.with_highlighter(highlighter.as_ref());
        }
        if let Some(resolver) = &self.image_resolver {
            renderer = renderer.with_image_resolver(resolver.as_ref());
        }
        if let Some(callback) = &self.layout_callback {
            renderer = renderer.with_layout_callback(Arc::clone(callback));
        }
        renderer.render(document)
    }

    /// Parse and render `source` as an HTML fragment.
    #[must_use]
    pub fn render_html(&self, source: &str) -> String {
        self.html(&self.parse(source))
    }

    /// Render an already parsed document as an HTML fragment.
    #[must_use]
    pub fn html(&self, document: &Document) -> String {
        let options = HtmlOptions {
            emit_line_ranges: self.options.emit_line_ranges,
            heading_anchors: self.options.heading_anchors,
            image_url_rewriter: self.image_url_rewriter.clone(),
        };
        HtmlRenderer::new(options).render(document)
    }

    /// Parse `source` and collect its heading outline.
    #[must_use]
    pub fn extract_outline(&self, source: &str) -> Vec<OutlineToken> {
        extract_outline(&self.parse(source))
    }
}

impl fmt::Debug for Markdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markdown")
            .field("options", &self.options)
            .field("highlighter", &self.highlighter.is_some())
            .field("image_resolver", &self.image_resolver.is_some())
            .field("layout_callback", &self.layout_callback.is_some())
            .field("image_url_rewriter", &self.image_url_rewriter.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mdview_renderer::{
        HighlightSpan, ImageBounds, ImageRequest, ImageSlot, PlainHighlighter, ResolvedImage,
    };
    use mdview_style::{Construct, StyleRecordPatch};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_all_outputs() {
        let markdown = Markdown::new();
        let source = "# Title\n\nSome *text*.\n\n## Next\n";

        let styled = markdown.render_rich_text(source);
        assert_eq!(
            styled.text().lines().next(),
            Some("Title"),
            "heading text comes first"
        );

        let html = markdown.render_html(source);
        assert_eq!(
            html,
            "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n<h2>Next</h2>\n"
        );

        let titles: Vec<_> = markdown
            .extract_outline(source)
            .into_iter()
            .map(|t| (t.level, t.text))
            .collect();
        assert_eq!(titles, vec![(1, "Title".to_owned()), (2, "Next".to_owned())]);
    }

    #[test]
    fn test_debug_option_does_not_change_output() {
        let source = "> quote\n\n- item\n";
        let plain = Markdown::new();
        let debug = Markdown::new().with_options(RenderOptions {
            debug: true,
            ..RenderOptions::default()
        });

        assert_eq!(plain.render_html(source), debug.render_html(source));
        assert_eq!(
            plain.render_rich_text(source).text(),
            debug.render_rich_text(source).text()
        );
    }

    #[test]
    fn test_deeply_nested_source_renders() {
        let markdown = Markdown::new().with_options(RenderOptions {
            debug: true,
            ..RenderOptions::default()
        });
        let source = format!("{}- x\n", "> ".repeat(10_000));

        assert!(markdown.render_rich_text(&source).text().ends_with('x'));
        assert!(markdown.render_html(&source).contains('x'));
        assert!(markdown.extract_outline(&source).is_empty());
    }

    #[test]
    fn test_html_options_forwarded() {
        let markdown = Markdown::new()
            .with_options(RenderOptions {
                heading_anchors: true,
                ..RenderOptions::default()
            })
            .with_image_url_rewriter(|src| format!("/assets/{src}"));

        let html = markdown.render_html("## Same\n\n## Same\n\n![x](a.png)\n");
        assert!(html.contains("<h2 id=\"same\">"), "{html}");
        assert!(html.contains("<h2 id=\"same-1\">"), "{html}");
        assert!(html.contains("src=\"/assets/a.png\""), "{html}");
    }

    #[test]
    fn test_style_sheet_used_for_rich_text() {
        let mut sheet = StyleSheet::default();
        StyleRecordPatch {
            size: Some(40.0),
            ..StyleRecordPatch::default()
        }
        .apply(sheet.record_mut(Construct::Heading(1)));

        let markdown = Markdown::new().with_style_sheet(sheet);
        let styled = markdown.render_rich_text("# Big\n");
        let font = styled.attributes_of("Big").unwrap().font.clone().unwrap();
        assert_eq!(font.size, 40.0);
    }

    #[test]
    fn test_custom_highlighter() {
        struct Counting(Arc<AtomicUsize>);

        impl Highlighter for Counting {
            fn highlight(&self, code: &str, language: Option<&str>) -> Vec<HighlightSpan> {
                self.0.fetch_add(1, Ordering::SeqCst);
                PlainHighlighter.highlight(code, language)
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let markdown = Markdown::new().with_highlighter(Counting(Arc::clone(&calls)));
        let _ = markdown.render_rich_text("```rust\nfn main() {}\n```\n\n```\nplain\n```\n");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_image_resolver_and_layout_callback() {
        struct Immediate;

        impl ImageResolver for Immediate {
            fn resolve(&self, request: ImageRequest, slot: ImageSlot) {
                slot.fill(ResolvedImage {
                    bytes: request.url.into_bytes(),
                    bounds: ImageBounds::default(),
                });
                request.layout.invalidate();
            }
        }

        let invalidated = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&invalidated);
        let markdown = Markdown::new()
            .with_image_resolver(Immediate)
            .with_layout_callback(move |id| sink.lock().unwrap().push(id));

        let styled = markdown.render_rich_text("![a](one.png) ![b](two.png)\n");
        let sources: Vec<_> = styled
            .attachments()
            .iter()
            .map(|a| a.slot.get().map(|image| image.bytes))
            .collect();
        assert_eq!(
            sources,
            vec![Some(b"one.png".to_vec()), Some(b"two.png".to_vec())]
        );
        assert_eq!(*invalidated.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_markdown_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Markdown>();
    }
}
