//! Bridge from `pulldown-cmark` events to a [`Document`] tree.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::document::{Document, DocumentBuilder};
use crate::node::{Checkbox, ColumnAlignment, NodeKind, SourceRange};

/// Markdown extensions enabled for every parse.
fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

impl Document {
    /// Parse markdown source into a document tree.
    ///
    /// Tables, strikethrough and task lists are enabled. Parsing never fails:
    /// malformed input produces whatever structure `pulldown-cmark` recovers.
    #[must_use]
    pub fn parse(markdown: &str) -> Self {
        let mut bridge = TreeBridge::new(markdown);
        for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
            bridge.process_event(event, range);
        }
        let document = bridge.builder.finish();
        tracing::trace!(nodes = document.len(), "Parsed markdown document");
        document
    }
}

/// Byte offset to line number lookup.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line containing `offset`.
    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    fn range(&self, bytes: &Range<usize>) -> SourceRange {
        let last = bytes.end.saturating_sub(1).max(bytes.start);
        SourceRange::new(self.line_of(bytes.start), self.line_of(last))
    }
}

/// Raw text accumulated for a code block or HTML block.
struct PendingBlock {
    language: Option<String>,
    content: String,
    range: SourceRange,
}

/// Table position tracking.
#[derive(Default)]
struct TableCursor {
    cell_index: usize,
    body_open: bool,
}

struct TreeBridge {
    builder: DocumentBuilder,
    lines: LineIndex,
    code: Option<PendingBlock>,
    html: Option<PendingBlock>,
    table: TableCursor,
}

impl TreeBridge {
    fn new(source: &str) -> Self {
        Self {
            builder: DocumentBuilder::new(),
            lines: LineIndex::new(source),
            code: None,
            html: None,
            table: TableCursor::default(),
        }
    }

    fn process_event(&mut self, event: Event<'_>, bytes: Range<usize>) {
        let range = self.lines.range(&bytes);
        match event {
            Event::Start(tag) => self.start_tag(tag, range),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text, range),
            Event::Code(code) => {
                self.builder
                    .leaf(NodeKind::InlineCode(code.into_string()), Some(range));
            }
            Event::Html(html) => {
                if let Some(block) = self.html.as_mut() {
                    block.content.push_str(&html);
                } else {
                    self.builder
                        .leaf(NodeKind::HtmlBlock(html.into_string()), Some(range));
                }
            }
            Event::InlineHtml(html) => {
                self.builder
                    .leaf(NodeKind::InlineHtml(html.into_string()), Some(range));
            }
            Event::SoftBreak => {
                if let Some(block) = self.code.as_mut() {
                    block.content.push('\n');
                } else {
                    self.builder.leaf(NodeKind::SoftBreak, Some(range));
                }
            }
            Event::HardBreak => {
                self.builder.leaf(NodeKind::LineBreak, Some(range));
            }
            Event::Rule => {
                self.builder.leaf(NodeKind::ThematicBreak, Some(range));
            }
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(label) => {
                self.unsupported_with_text("FootnoteReference", &label, range);
            }
            Event::InlineMath(math) => self.unsupported_with_text("InlineMath", &math, range),
            Event::DisplayMath(math) => self.unsupported_with_text("DisplayMath", &math, range),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, range: SourceRange) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                level: heading_level_to_num(level),
            },
            Tag::BlockQuote(_) => NodeKind::BlockQuote,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(PendingBlock {
                    language,
                    content: String::new(),
                    range,
                });
                return;
            }
            Tag::HtmlBlock => {
                self.html = Some(PendingBlock {
                    language: None,
                    content: String::new(),
                    range,
                });
                return;
            }
            Tag::List(Some(start)) => NodeKind::OrderedList { start },
            Tag::List(None) => NodeKind::UnorderedList,
            Tag::Item => NodeKind::ListItem { checkbox: None },
            Tag::Table(alignments) => {
                self.table = TableCursor::default();
                NodeKind::Table {
                    alignments: alignments.into_iter().map(convert_alignment).collect(),
                }
            }
            Tag::TableHead => {
                self.table.cell_index = 0;
                NodeKind::TableHead
            }
            Tag::TableRow => {
                if !self.table.body_open {
                    self.builder.open(NodeKind::TableBody, Some(range));
                    self.table.body_open = true;
                }
                self.table.cell_index = 0;
                NodeKind::TableRow
            }
            Tag::TableCell => NodeKind::TableCell {
                column: self.table.cell_index,
            },
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::Strong,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                destination: non_empty(&dest_url),
                title: non_empty(&title),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeKind::Image {
                source: non_empty(&dest_url),
                title: non_empty(&title),
            },
            Tag::FootnoteDefinition(_) => NodeKind::Unsupported("FootnoteDefinition".to_owned()),
            Tag::DefinitionList => NodeKind::Unsupported("DefinitionList".to_owned()),
            Tag::DefinitionListTitle => NodeKind::Unsupported("DefinitionListTitle".to_owned()),
            Tag::DefinitionListDefinition => {
                NodeKind::Unsupported("DefinitionListDefinition".to_owned())
            }
            Tag::Superscript => NodeKind::Unsupported("Superscript".to_owned()),
            Tag::Subscript => NodeKind::Unsupported("Subscript".to_owned()),
            Tag::MetadataBlock(_) => NodeKind::Unsupported("MetadataBlock".to_owned()),
        };
        self.builder.open(kind, Some(range));
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => {
                if let Some(block) = self.code.take() {
                    self.builder.leaf(
                        NodeKind::CodeBlock {
                            code: block.content,
                            language: block.language,
                        },
                        Some(block.range),
                    );
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(block) = self.html.take() {
                    self.builder
                        .leaf(NodeKind::HtmlBlock(block.content), Some(block.range));
                }
            }
            TagEnd::TableCell => {
                self.builder.close();
                self.table.cell_index += 1;
            }
            TagEnd::Table => {
                if self.table.body_open {
                    self.builder.close();
                    self.table.body_open = false;
                }
                self.builder.close();
            }
            _ => {
                self.builder.close();
            }
        }
    }

    fn text(&mut self, text: &str, range: SourceRange) {
        if let Some(block) = self.code.as_mut() {
            block.content.push_str(text);
        } else if let Some(block) = self.html.as_mut() {
            block.content.push_str(text);
        } else {
            self.builder.text(text, Some(range));
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        let item = self
            .builder
            .find_open(|kind| matches!(kind, NodeKind::ListItem { .. }));
        if let Some(item) = item
            && let NodeKind::ListItem { checkbox } = self.builder.kind_mut(item)
        {
            *checkbox = Some(if checked {
                Checkbox::Checked
            } else {
                Checkbox::Unchecked
            });
        }
    }

    fn unsupported_with_text(&mut self, name: &str, text: &str, range: SourceRange) {
        self.builder
            .open(NodeKind::Unsupported(name.to_owned()), Some(range));
        self.builder.text(text, Some(range));
        self.builder.close();
    }
}

/// Convert pulldown-cmark heading level to a number.
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn convert_alignment(alignment: Alignment) -> Option<ColumnAlignment> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some(ColumnAlignment::Left),
        Alignment::Center => Some(ColumnAlignment::Center),
        Alignment::Right => Some(ColumnAlignment::Right),
    }
}

/// Language identifier from a fence info string (`rust ignore` → `rust`).
fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace().next().map(str::to_owned)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::NodeId;

    fn kinds(document: &Document, id: NodeId) -> Vec<&str> {
        document
            .children(id)
            .iter()
            .map(|&child| document.kind(child).name())
            .collect()
    }

    #[test]
    fn test_line_index() {
        let lines = LineIndex::new("a\nbc\n\nd");
        assert_eq!(lines.line_of(0), 1);
        assert_eq!(lines.line_of(2), 2);
        assert_eq!(lines.line_of(5), 3);
        assert_eq!(lines.line_of(6), 4);
        assert_eq!(lines.range(&(2..6)), SourceRange::new(2, 3));
    }

    #[test]
    fn test_parse_blocks() {
        let document = Document::parse("# Title\n\nSome *text*\n\n---\n");
        assert_eq!(
            kinds(&document, document.root()),
            vec!["Heading", "Paragraph", "ThematicBreak"]
        );
        let heading = document.children(document.root())[0];
        assert_eq!(document.kind(heading), &NodeKind::Heading { level: 1 });
        assert_eq!(document.range(heading), Some(SourceRange::new(1, 1)));
        let paragraph = document.children(document.root())[1];
        assert_eq!(document.range(paragraph), Some(SourceRange::new(3, 3)));
        assert_eq!(kinds(&document, paragraph), vec!["Text", "Emphasis"]);
    }

    #[test]
    fn test_parse_code_block() {
        let document = Document::parse("```rust ignore\nfn main() {}\n```\n");
        let block = document.children(document.root())[0];
        assert_eq!(document.language(block), Some("rust"));
        assert_eq!(document.code(block), Some("fn main() {}\n"));
        assert_eq!(document.range(block), Some(SourceRange::new(1, 3)));
    }

    #[test]
    fn test_parse_indented_code_block_has_no_language() {
        let document = Document::parse("    let x = 1;\n");
        let block = document.children(document.root())[0];
        assert_eq!(document.language(block), None);
        assert_eq!(document.code(block), Some("let x = 1;\n"));
    }

    #[test]
    fn test_parse_task_list() {
        let document = Document::parse("- [x] A\n- [ ] B\n- C\n");
        let list = document.children(document.root())[0];
        let items = document.children(list);
        assert_eq!(document.checkbox(items[0]), Some(Checkbox::Checked));
        assert_eq!(document.checkbox(items[1]), Some(Checkbox::Unchecked));
        assert_eq!(document.checkbox(items[2]), None);
    }

    #[test]
    fn test_parse_ordered_list_start() {
        let document = Document::parse("3. three\n4. four\n");
        let list = document.children(document.root())[0];
        assert_eq!(document.kind(list), &NodeKind::OrderedList { start: 3 });
        assert_eq!(document.child_count(list), 2);
    }

    #[test]
    fn test_parse_table_structure() {
        let document = Document::parse("| A | B |\n|:--|---|\n| 1 | 2 |\n| 3 | 4 |\n");
        let table = document.children(document.root())[0];
        assert_eq!(kinds(&document, table), vec!["TableHead", "TableBody"]);
        assert_eq!(
            document.column_alignments(table),
            &[Some(ColumnAlignment::Left), None]
        );

        let head = document.children(table)[0];
        assert_eq!(kinds(&document, head), vec!["TableCell", "TableCell"]);
        let body = document.children(table)[1];
        assert_eq!(document.child_count(body), 2);

        let row = document.children(body)[1];
        let second_cell = document.children(row)[1];
        assert_eq!(document.kind(second_cell), &NodeKind::TableCell { column: 1 });
        assert_eq!(document.plain_text(second_cell), "4");
        assert_eq!(document.enclosing_table(second_cell), Some(table));
    }

    #[test]
    fn test_parse_links_and_images() {
        let document = Document::parse("[site](https://example.com \"Home\") ![logo](logo.png)");
        let paragraph = document.children(document.root())[0];
        let children = document.children(paragraph);
        assert_eq!(document.destination(children[0]), Some("https://example.com"));
        assert_eq!(
            document.kind(children[0]),
            &NodeKind::Link {
                destination: Some("https://example.com".to_owned()),
                title: Some("Home".to_owned()),
            }
        );
        let image = children[2];
        assert_eq!(document.source(image), Some("logo.png"));
        assert_eq!(document.plain_text(image), "logo");
    }

    #[test]
    fn test_parse_html_block() {
        let document = Document::parse("<div>\n<b>hi</b>\n</div>\n\ntext <i>x</i>\n");
        let block = document.children(document.root())[0];
        assert_eq!(
            document.kind(block),
            &NodeKind::HtmlBlock("<div>\n<b>hi</b>\n</div>\n".to_owned())
        );
        let paragraph = document.children(document.root())[1];
        assert!(
            document
                .children(paragraph)
                .iter()
                .any(|&c| document.kind(c) == &NodeKind::InlineHtml("<i>".to_owned()))
        );
    }

    #[test]
    fn test_parse_nested_blockquote() {
        let document = Document::parse("> > text\n");
        let text = document
            .descendants(document.root())
            .find(|&id| matches!(document.kind(id), NodeKind::Text(_)))
            .unwrap();
        assert_eq!(document.blockquote_depth(text), 2);
    }

    #[test]
    fn test_parse_breaks() {
        let document = Document::parse("a\nb  \nc\n");
        let paragraph = document.children(document.root())[0];
        assert_eq!(
            kinds(&document, paragraph),
            vec!["Text", "SoftBreak", "Text", "LineBreak", "Text"]
        );
    }

    #[test]
    fn test_parse_empty_input() {
        let document = Document::parse("");
        assert!(document.is_empty());
    }
}
