//! Styled rich-text rendering.
//!
//! The renderer walks the tree depth-first and children-first: each node
//! renders its children, concatenates them, then applies its own construct
//! style to the result. Style flows from the outside in while content flows
//! from the inside out. Container constructs (document, lists, block
//! quotes, tables) only supply a font to runs that do not already have one.

use std::fmt::Write;

use mdview_style::{AttributeSet, Construct, ParagraphStyle, StyleSheet, merge_paragraph};
use mdview_tree::{Checkbox, ColumnAlignment, Document, MAX_NESTING, NodeId, NodeKind};
use tracing::{debug, trace};

use crate::highlight::{Highlighter, RegexHighlighter};
use crate::html_bridge::{HtmlConverter, XmlHtmlConverter};
use crate::image::{ImageRequest, ImageResolver, ImageSlot, LayoutCallback, LayoutNotifier};
use crate::state::{RenderState, escape_html, link_target};
use crate::styled::{StyledDocument, StyledText};

/// Renders a [`Document`] into a [`StyledDocument`].
pub struct RichTextRenderer<'a> {
    sheet: &'a StyleSheet,
    highlighter: Option<&'a dyn Highlighter>,
    html_converter: Option<&'a dyn HtmlConverter>,
    image_resolver: Option<&'a dyn ImageResolver>,
    layout_callback: Option<LayoutCallback>,
}

impl<'a> RichTextRenderer<'a> {
    /// Renderer using `sheet`, the built-in highlighter and HTML converter,
    /// and no image resolver.
    #[must_use]
    pub fn new(sheet: &'a StyleSheet) -> Self {
        Self {
            sheet,
            highlighter: None,
            html_converter: None,
            image_resolver: None,
            layout_callback: None,
        }
    }

    /// Use `highlighter` for code blocks.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: &'a dyn Highlighter) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Use `converter` for raw HTML and resolver-less images.
    #[must_use]
    pub fn with_html_converter(mut self, converter: &'a dyn HtmlConverter) -> Self {
        self.html_converter = Some(converter);
        self
    }

    /// Resolve images through `resolver`.
    #[must_use]
    pub fn with_image_resolver(mut self, resolver: &'a dyn ImageResolver) -> Self {
        self.image_resolver = Some(resolver);
        self
    }

    /// Host callback for layout invalidation after deferred image loads.
    #[must_use]
    pub fn with_layout_callback(mut self, callback: LayoutCallback) -> Self {
        self.layout_callback = Some(callback);
        self
    }

    /// Render `document`.
    ///
    /// Never fails and never waits for image resolution.
    #[must_use]
    pub fn render(&self, document: &Document) -> StyledDocument {
        let mut state = RenderState::default();
        self.node(document, document.root(), &mut state)
            .into_document()
    }

    fn children(&self, document: &Document, id: NodeId, state: &mut RenderState) -> StyledText {
        let mut out = StyledText::new();
        for &child in document.children(id) {
            out.append(self.node(document, child, state));
        }
        out
    }

    fn node(&self, document: &Document, id: NodeId, state: &mut RenderState) -> StyledText {
        if state.nesting() >= MAX_NESTING {
            debug!(
                node = document.kind(id).name(),
                "nesting limit reached, rendering plain text"
            );
            return StyledText::plain(&document.plain_text(id));
        }
        state.enter_node(|state| self.construct(document, id, state))
    }

    fn construct(&self, document: &Document, id: NodeId, state: &mut RenderState) -> StyledText {
        trace!(
            node = document.kind(id).name(),
            list_depth = state.list_depth(),
            blockquote_depth = state.blockquote_depth(),
            "render"
        );
        match document.kind(id) {
            NodeKind::Document => {
                let mut out = self.children(document, id, state);
                self.apply_container(&mut out, Construct::Body, None);
                out
            }
            NodeKind::Paragraph => {
                let mut out = self.children(document, id, state);
                out.push("\n", AttributeSet::default());
                out.append(spacer(self.sheet.layout.paragraph_spacer));
                out
            }
            NodeKind::Heading { level } => {
                let record = self.sheet.record(Construct::Heading(*level));
                let style = record.to_attributes();
                let mut out = self.children(document, id, state);
                out.overwrite(&style);
                out.push("\n", style);
                out.append(spacer(record.spacing));
                out
            }
            NodeKind::Text(text) => StyledText::plain(text),
            NodeKind::Emphasis => self.inline(document, id, state, Construct::Emphasis, None),
            NodeKind::Strong => self.inline(document, id, state, Construct::Strong, None),
            NodeKind::Strikethrough => {
                let extra = AttributeSet {
                    strikethrough: Some(true),
                    ..AttributeSet::default()
                };
                self.inline(document, id, state, Construct::Strikethrough, Some(extra))
            }
            NodeKind::Link { destination, .. } => {
                match destination.as_deref().and_then(link_target) {
                    Some(target) => {
                        let extra = AttributeSet {
                            link: Some(target),
                            ..AttributeSet::default()
                        };
                        self.inline(document, id, state, Construct::Link, Some(extra))
                    }
                    None => {
                        trace!(?destination, "link without usable destination");
                        self.children(document, id, state)
                    }
                }
            }
            NodeKind::InlineCode(code) => {
                StyledText::styled(code, self.sheet.attributes(Construct::InlineCode))
            }
            NodeKind::CodeBlock { code, language } => self.code_block(code, language.as_deref()),
            NodeKind::OrderedList { .. } | NodeKind::UnorderedList => {
                let indent = self.sheet.layout.list_indent;
                state.enter_list(indent, |state| {
                    let mut out = self.children(document, id, state);
                    self.apply_container(&mut out, Construct::List, None);
                    out
                })
            }
            NodeKind::ListItem { checkbox } => self.list_item(document, id, *checkbox, state),
            NodeKind::Table { .. } => self.table(document, id, state),
            NodeKind::BlockQuote => {
                let layout = &self.sheet.layout;
                state.enter_block_quote(layout.block_quote_indent, |state| {
                    let mut out = self.children(document, id, state);
                    out.prepend(StyledText::plain(&layout.block_quote_glyph));
                    let indent = ParagraphStyle::indented(state.indent());
                    self.apply_container(&mut out, Construct::BlockQuote, Some(indent));
                    out
                })
            }
            NodeKind::Image { source, title } => {
                self.image(document, id, source.as_deref(), title.as_deref(), state)
            }
            NodeKind::ThematicBreak => {
                let style = AttributeSet {
                    strikethrough: Some(true),
                    ..self.sheet.attributes(Construct::ThematicBreak)
                };
                let mut out =
                    StyledText::styled(&" ".repeat(self.sheet.layout.thematic_break_width), style);
                out.push("\n", AttributeSet::default());
                out
            }
            NodeKind::SoftBreak => {
                let mut out = StyledText::plain("\n");
                out.append(spacer(self.sheet.layout.soft_break_spacer));
                out
            }
            NodeKind::LineBreak => StyledText::plain("\n"),
            NodeKind::HtmlBlock(html) => {
                let mut out = self.raw_html(html, state);
                if !out.is_empty() && !out.ends_with_newline() {
                    out.push("\n", AttributeSet::default());
                }
                out
            }
            NodeKind::InlineHtml(html) => self.raw_html(html, state),
            NodeKind::TableHead
            | NodeKind::TableBody
            | NodeKind::TableRow
            | NodeKind::TableCell { .. }
            | NodeKind::Unsupported(_) => self.children(document, id, state),
        }
    }

    /// Children with the construct style merged underneath.
    fn inline(
        &self,
        document: &Document,
        id: NodeId,
        state: &mut RenderState,
        construct: Construct,
        extra: Option<AttributeSet>,
    ) -> StyledText {
        let mut style = self.sheet.attributes(construct);
        if let Some(extra) = extra {
            style = style.overwritten_by(&extra);
        }
        let mut out = self.children(document, id, state);
        out.merge_under(&style);
        out
    }

    /// Merge a container style under `out`; its font only fills runs
    /// without one.
    fn apply_container(
        &self,
        out: &mut StyledText,
        construct: Construct,
        paragraph: Option<ParagraphStyle>,
    ) {
        let mut style = self.sheet.attributes(construct);
        let font = style.font.take();
        if let Some(paragraph) = paragraph {
            style.paragraph = Some(merge_paragraph(
                &style.paragraph.unwrap_or_default(),
                &paragraph,
            ));
        }
        out.merge_under(&style);
        if let Some(font) = font {
            out.fill(&AttributeSet::with_font(font));
        }
    }

    fn code_block(&self, code: &str, language: Option<&str>) -> StyledText {
        let record = self.sheet.record(Construct::CodeBlock);
        let layout = &self.sheet.layout;
        let code = code.strip_suffix('\n').unwrap_or(code);

        let mut style = record.to_attributes();
        style.paragraph = Some(ParagraphStyle {
            head_indent: layout.code_block_head_indent,
            first_line_head_indent: layout.code_block_head_indent,
            tail_indent: layout.code_block_tail_indent,
            ..record.paragraph
        });
        let spacer = AttributeSet {
            paragraph: Some(ParagraphStyle::fixed_height(record.spacing)),
            ..style.clone()
        };

        let mut out = StyledText::styled("\n", spacer.clone());
        let start = out.len();
        out.push(code, style.clone());
        out.push("\n", style);
        out.push("\n", spacer);

        let spans = match self.highlighter {
            Some(highlighter) => highlighter.highlight(code, language),
            None => RegexHighlighter::default().highlight(code, language),
        };
        for span in spans {
            out.merge_range(start + span.range.start..start + span.range.end, &span.attributes);
        }
        out
    }

    fn list_item(
        &self,
        document: &Document,
        id: NodeId,
        checkbox: Option<Checkbox>,
        state: &mut RenderState,
    ) -> StyledText {
        let layout = &self.sheet.layout;
        let prefix = match (checkbox, document.parent(id).map(|p| document.kind(p))) {
            (Some(Checkbox::Checked), _) => layout.checked_glyph.clone(),
            (Some(Checkbox::Unchecked), _) => layout.unchecked_glyph.clone(),
            (None, Some(NodeKind::OrderedList { start })) => {
                let index = u64::try_from(document.index_in_parent(id)).unwrap_or(u64::MAX);
                format!("{}.", start.saturating_add(index))
            }
            (None, _) => {
                let depth = state.list_depth().saturating_sub(1);
                layout.bullets.for_depth(depth).to_owned()
            }
        };

        let mut out = StyledText::plain(&format!("{prefix} "));
        for &child in document.children(id) {
            let rendered = self.node(document, child, state);
            let after_inline = out.len() > prefix.len() + 1 && !out.ends_with_newline();
            if after_inline && document.kind(child).is_block() {
                out.push("\n", AttributeSet::default());
            }
            out.append(rendered);
        }
        if !out.ends_with_newline() {
            out.push("\n", AttributeSet::default());
        }
        out.merge_under(&AttributeSet::with_paragraph(ParagraphStyle::indented(
            state.indent(),
        )));
        out
    }

    fn table(&self, document: &Document, id: NodeId, state: &mut RenderState) -> StyledText {
        let alignments = document.column_alignments(id);
        state.enter_table(|state| {
            // Pass 1: render every cell and record column widths.
            let mut rows: Vec<(bool, Vec<(usize, StyledText)>)> = Vec::new();
            for &section in document.children(id) {
                match document.kind(section) {
                    NodeKind::TableHead => rows.push((true, self.cells(document, section, state))),
                    NodeKind::TableBody => {
                        for &row in document.children(section) {
                            rows.push((false, self.cells(document, row, state)));
                        }
                    }
                    NodeKind::TableRow => rows.push((false, self.cells(document, section, state))),
                    _ => {}
                }
            }
            for (_, cells) in &rows {
                for (column, cell) in cells {
                    state.widen_column(*column, cell.width());
                }
            }

            // Pass 2: pad cells to their column width.
            let padding = self.sheet.layout.table_cell_padding;
            let header = self.sheet.attributes(Construct::TableHeader);
            let mut out = StyledText::new();
            for (is_head, cells) in rows {
                for (column, cell) in cells {
                    let total = state.column_width(column) + padding - cell.width();
                    let alignment = alignments
                        .get(column)
                        .copied()
                        .flatten()
                        .unwrap_or(ColumnAlignment::Center);
                    let (leading, trailing) = split_padding(total, alignment);

                    let mut padded = StyledText::plain(&" ".repeat(leading));
                    padded.append(cell);
                    padded.push(&" ".repeat(trailing), AttributeSet::default());
                    if is_head {
                        padded.merge_under(&header);
                    }
                    out.append(padded);
                }
                out.push("\n", AttributeSet::default());
            }
            self.apply_container(&mut out, Construct::Table, None);
            out
        })
    }

    fn cells(
        &self,
        document: &Document,
        row: NodeId,
        state: &mut RenderState,
    ) -> Vec<(usize, StyledText)> {
        document
            .children(row)
            .iter()
            .filter_map(|&cell| match document.kind(cell) {
                NodeKind::TableCell { column } => {
                    Some((*column, self.children(document, cell, state)))
                }
                _ => None,
            })
            .collect()
    }

    fn image(
        &self,
        document: &Document,
        id: NodeId,
        source: Option<&str>,
        title: Option<&str>,
        state: &mut RenderState,
    ) -> StyledText {
        let Some(source) = source else {
            debug!("image without source");
            return StyledText::new();
        };

        let Some(resolver) = self.image_resolver else {
            let alt = document.plain_text(id);
            let mut html = format!(
                r#"<img src="{}" alt="{}""#,
                escape_html(source),
                escape_html(&alt)
            );
            if let Some(title) = title {
                write!(html, r#" title="{}""#, escape_html(title)).unwrap();
            }
            html.push_str(" />");
            let out = self.convert_html(&html).unwrap_or_else(|| StyledText::plain(&alt));
            state.reserve_attachments(out.attachments().len());
            return out;
        };

        let attachment = state.reserve_attachments(1);
        let slot = ImageSlot::new();
        let mut out = StyledText::new();
        out.attach(source, title, slot.clone());
        resolver.resolve(
            ImageRequest {
                attachment,
                url: source.to_owned(),
                title: title.map(str::to_owned),
                layout: LayoutNotifier::new(attachment, self.layout_callback.clone()),
            },
            slot,
        );
        out
    }

    fn raw_html(&self, html: &str, state: &mut RenderState) -> StyledText {
        let out = self
            .convert_html(html)
            .unwrap_or_else(|| StyledText::plain(html));
        state.reserve_attachments(out.attachments().len());
        out
    }

    fn convert_html(&self, html: &str) -> Option<StyledText> {
        let result = match self.html_converter {
            Some(converter) => converter.convert(html),
            None => XmlHtmlConverter::new(self.sheet.record(Construct::Body).font.clone())
                .convert(html),
        };
        result
            .inspect_err(|e| debug!(error = %e, "HTML conversion failed, using raw text"))
            .ok()
    }
}

/// Blank line pinned to `height`.
fn spacer(height: f32) -> StyledText {
    StyledText::styled(
        "\n",
        AttributeSet::with_paragraph(ParagraphStyle::fixed_height(height)),
    )
}

/// Split `total` padding into leading and trailing spaces.
fn split_padding(total: usize, alignment: ColumnAlignment) -> (usize, usize) {
    let edge = total.min(1);
    match alignment {
        ColumnAlignment::Left => (edge, total - edge),
        ColumnAlignment::Right => (total - edge, edge),
        ColumnAlignment::Center => (total / 2, total - total / 2),
    }
}
