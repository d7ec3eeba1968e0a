//! HTML rendering.
//!
//! Produces an HTML fragment from a [`Document`] in one pass. Every
//! block-level element is followed by a newline; inline content is emitted
//! as-is. Raw HTML nodes pass through unescaped.

use std::fmt::{self, Write};
use std::sync::Arc;

use mdview_tree::{Checkbox, ColumnAlignment, Document, MAX_NESTING, NodeId, NodeKind};
use tracing::debug;

use crate::state::{HeadingAnchors, escape_html};

/// Rewrites image sources before they are emitted.
pub type ImageUrlRewriter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// HTML rendering options.
#[derive(Clone, Default)]
pub struct HtmlOptions {
    /// Add `begin-line`/`end-line` attributes to elements with a source range.
    pub emit_line_ranges: bool,
    /// Add unique slug `id`s to headings.
    pub heading_anchors: bool,
    /// Transform applied to every image `src`.
    pub image_url_rewriter: Option<ImageUrlRewriter>,
}

impl HtmlOptions {
    /// Set the image source rewriter.
    #[must_use]
    pub fn with_image_url_rewriter(
        mut self,
        rewriter: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.image_url_rewriter = Some(Arc::new(rewriter));
        self
    }
}

impl fmt::Debug for HtmlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlOptions")
            .field("emit_line_ranges", &self.emit_line_ranges)
            .field("heading_anchors", &self.heading_anchors)
            .field("image_url_rewriter", &self.image_url_rewriter.is_some())
            .finish()
    }
}

/// Per-call HTML traversal state.
#[derive(Debug, Default)]
struct HtmlState {
    anchors: HeadingAnchors,
    /// Node levels above the current node.
    nesting: usize,
}

/// Stateless HTML renderer.
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer {
    options: HtmlOptions,
}

impl HtmlRenderer {
    #[must_use]
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    /// Render `document` to an HTML string.
    #[must_use]
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        let mut state = HtmlState::default();
        self.node(document, document.root(), &mut state, &mut out);
        out
    }

    fn children(
        &self,
        document: &Document,
        id: NodeId,
        state: &mut HtmlState,
        out: &mut String,
    ) {
        for &child in document.children(id) {
            self.node(document, child, state, out);
        }
    }

    /// Emit `<tag attrs>children</tag>`.
    fn element(
        &self,
        document: &Document,
        id: NodeId,
        tag: &str,
        attrs: &str,
        state: &mut HtmlState,
        out: &mut String,
    ) {
        write!(out, "<{tag}{attrs}{}>", self.line_attrs(document, id)).unwrap();
        self.children(document, id, state, out);
        write!(out, "</{tag}>").unwrap();
        if document.kind(id).is_block() {
            out.push('\n');
        }
    }

    fn line_attrs(&self, document: &Document, id: NodeId) -> String {
        match document.range(id) {
            Some(range) if self.options.emit_line_ranges => format!(
                r#" begin-line="{}" end-line="{}""#,
                range.start_line, range.end_line
            ),
            _ => String::new(),
        }
    }

    fn node(&self, document: &Document, id: NodeId, state: &mut HtmlState, out: &mut String) {
        if state.nesting >= MAX_NESTING {
            debug!(
                node = document.kind(id).name(),
                "nesting limit reached, emitting plain text"
            );
            out.push_str(&escape_html(&document.plain_text(id)));
            return;
        }
        state.nesting += 1;
        self.construct(document, id, state, out);
        state.nesting -= 1;
    }

    #[allow(clippy::too_many_lines)]
    fn construct(
        &self,
        document: &Document,
        id: NodeId,
        state: &mut HtmlState,
        out: &mut String,
    ) {
        match document.kind(id) {
            NodeKind::Document | NodeKind::Unsupported(_) => {
                self.children(document, id, state, out);
            }
            NodeKind::Paragraph => {
                write!(out, "<p{}>", self.line_attrs(document, id)).unwrap();
                if let Some(checkbox) = task_checkbox(document, id) {
                    out.push_str(checkbox_input(checkbox));
                }
                self.children(document, id, state, out);
                out.push_str("</p>\n");
            }
            NodeKind::Heading { level } => {
                let id_attr = if self.options.heading_anchors {
                    format!(
                        r#" id="{}""#,
                        escape_html(&state.anchors.next(&document.plain_text(id)))
                    )
                } else {
                    String::new()
                };
                self.element(document, id, &format!("h{level}"), &id_attr, state, out);
            }
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Emphasis => self.element(document, id, "em", "", state, out),
            NodeKind::Strong => self.element(document, id, "strong", "", state, out),
            NodeKind::Strikethrough => self.element(document, id, "del", "", state, out),
            NodeKind::InlineCode(code) => {
                write!(out, "<code>{}</code>", escape_html(code)).unwrap();
            }
            NodeKind::CodeBlock { code, language } => {
                let class = language
                    .as_deref()
                    .map(|lang| format!(r#" class="language-{}""#, escape_html(lang)))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "<pre{}><code{class}>{}</code></pre>",
                    self.line_attrs(document, id),
                    escape_html(code)
                )
                .unwrap();
            }
            NodeKind::Link { destination, title } => {
                let mut attrs = String::new();
                if let Some(destination) = destination {
                    write!(attrs, r#" href="{}""#, escape_html(destination)).unwrap();
                }
                if let Some(title) = title {
                    write!(attrs, r#" title="{}""#, escape_html(title)).unwrap();
                }
                self.element(document, id, "a", &attrs, state, out);
            }
            NodeKind::Image { source, title } => {
                let source = source.as_deref().unwrap_or_default();
                let source = match &self.options.image_url_rewriter {
                    Some(rewrite) => rewrite(source),
                    None => source.to_owned(),
                };
                let title_attr = title
                    .as_deref()
                    .map(|title| format!(r#" title="{}""#, escape_html(title)))
                    .unwrap_or_default();
                write!(
                    out,
                    r#"<img src="{}" alt="{}"{title_attr}{}>"#,
                    escape_html(&source),
                    escape_html(&document.plain_text(id)),
                    self.line_attrs(document, id)
                )
                .unwrap();
            }
            NodeKind::OrderedList { start } => {
                let attrs = if *start == 1 {
                    String::new()
                } else {
                    format!(r#" start="{start}""#)
                };
                writeln!(out, "<ol{attrs}{}>", self.line_attrs(document, id)).unwrap();
                self.children(document, id, state, out);
                out.push_str("</ol>\n");
            }
            NodeKind::UnorderedList => {
                writeln!(out, "<ul{}>", self.line_attrs(document, id)).unwrap();
                self.children(document, id, state, out);
                out.push_str("</ul>\n");
            }
            NodeKind::ListItem { checkbox } => {
                write!(out, "<li{}>", self.line_attrs(document, id)).unwrap();
                let loose = document
                    .children(id)
                    .first()
                    .is_some_and(|&first| matches!(document.kind(first), NodeKind::Paragraph));
                if let Some(checkbox) = checkbox
                    && !loose
                {
                    out.push_str(checkbox_input(*checkbox));
                }
                self.children(document, id, state, out);
                out.push_str("</li>\n");
            }
            NodeKind::Table { .. } => {
                writeln!(out, "<table{}>", self.line_attrs(document, id)).unwrap();
                self.children(document, id, state, out);
                out.push_str("</table>\n");
            }
            NodeKind::TableHead => {
                writeln!(out, "<thead{}>", self.line_attrs(document, id)).unwrap();
                out.push_str("<tr>\n");
                self.children(document, id, state, out);
                out.push_str("</tr>\n</thead>\n");
            }
            NodeKind::TableBody => {
                out.push_str("<tbody>\n");
                self.children(document, id, state, out);
                out.push_str("</tbody>\n");
            }
            NodeKind::TableRow => {
                writeln!(out, "<tr{}>", self.line_attrs(document, id)).unwrap();
                self.children(document, id, state, out);
                out.push_str("</tr>\n");
            }
            NodeKind::TableCell { column } => {
                let tag = if document.is_in_table_head(id) { "th" } else { "td" };
                let alignment = document
                    .enclosing_table(id)
                    .and_then(|table| document.column_alignments(table).get(*column).copied())
                    .flatten()
                    .unwrap_or(ColumnAlignment::Center);
                let attrs = format!(r#" align="{}""#, alignment_name(alignment));
                self.element(document, id, tag, &attrs, state, out);
            }
            NodeKind::BlockQuote => {
                writeln!(out, "<blockquote{}>", self.line_attrs(document, id)).unwrap();
                self.children(document, id, state, out);
                out.push_str("</blockquote>\n");
            }
            NodeKind::ThematicBreak => {
                writeln!(out, "<hr{}>", self.line_attrs(document, id)).unwrap();
            }
            NodeKind::SoftBreak | NodeKind::LineBreak => out.push_str("<br>\n"),
            NodeKind::HtmlBlock(html) | NodeKind::InlineHtml(html) => out.push_str(html),
        }
    }
}

/// Checkbox of the task item whose first paragraph is `paragraph`.
fn task_checkbox(document: &Document, paragraph: NodeId) -> Option<Checkbox> {
    let item = document.parent(paragraph)?;
    if document.index_in_parent(paragraph) != 0 {
        return None;
    }
    document.checkbox(item)
}

fn checkbox_input(checkbox: Checkbox) -> &'static str {
    match checkbox {
        Checkbox::Checked => r#"<input type="checkbox" disabled checked> "#,
        Checkbox::Unchecked => r#"<input type="checkbox" disabled> "#,
    }
}

fn alignment_name(alignment: ColumnAlignment) -> &'static str {
    match alignment {
        ColumnAlignment::Left => "left",
        ColumnAlignment::Center => "center",
        ColumnAlignment::Right => "right",
    }
}
