//! Structural dump of a document tree for diagnostics.

use std::fmt::Write;

use crate::document::{Document, MAX_NESTING};
use crate::node::NodeKind;

impl Document {
    /// Render an indented outline of the tree.
    ///
    /// ```text
    /// Document
    /// ├─ Heading level: 1 @1-1
    /// │  └─ Text "Title" @1-1
    /// └─ Paragraph @3-3
    ///    └─ Text "Body" @3-3
    /// ```
    ///
    /// Levels below [`MAX_NESTING`] are summarized by a node count.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // (node, level, last sibling)
        let mut stack = vec![(self.root(), 0usize, true)];
        // One entry per enclosing level below the root: siblings still follow.
        let mut open: Vec<bool> = Vec::new();

        while let Some((id, level, last)) = stack.pop() {
            open.truncate(level.saturating_sub(1));
            push_prefix(&open, level, last, &mut out);
            let _ = write!(out, "{}", describe(self.kind(id)));
            if let Some(range) = self.range(id) {
                let _ = write!(out, " @{}-{}", range.start_line, range.end_line);
            }
            out.push('\n');
            if level > 0 {
                open.push(!last);
            }

            let children = self.children(id);
            if children.is_empty() {
                continue;
            }
            if level >= MAX_NESTING {
                let hidden = self.descendants(id).count() - 1;
                push_prefix(&open, level + 1, true, &mut out);
                let _ = writeln!(out, "… {hidden} nested nodes");
                continue;
            }
            stack.extend(
                children
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(i, &child)| (child, level + 1, i + 1 == children.len())),
            );
        }
        out
    }
}

fn push_prefix(open: &[bool], level: usize, last: bool, out: &mut String) {
    for &more in open {
        out.push_str(if more { "│  " } else { "   " });
    }
    if level > 0 {
        out.push_str(if last { "└─ " } else { "├─ " });
    }
}

fn describe(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Heading { level } => format!("Heading level: {level}"),
        NodeKind::Text(text) => format!("Text {text:?}"),
        NodeKind::InlineCode(code) => format!("InlineCode {code:?}"),
        NodeKind::CodeBlock { language, code } => match language {
            Some(language) => {
                format!("CodeBlock language: {language} lines: {}", code.lines().count())
            }
            None => format!("CodeBlock lines: {}", code.lines().count()),
        },
        NodeKind::Link { destination, .. } => {
            format!("Link destination: {:?}", destination.as_deref().unwrap_or_default())
        }
        NodeKind::Image { source, .. } => {
            format!("Image source: {:?}", source.as_deref().unwrap_or_default())
        }
        NodeKind::OrderedList { start } => format!("OrderedList start: {start}"),
        NodeKind::ListItem {
            checkbox: Some(checkbox),
        } => format!("ListItem checkbox: {checkbox:?}"),
        NodeKind::Table { alignments } => format!("Table columns: {}", alignments.len()),
        NodeKind::TableCell { column } => format!("TableCell column: {column}"),
        NodeKind::HtmlBlock(html) | NodeKind::InlineHtml(html) => {
            format!("{} {html:?}", kind.name())
        }
        _ => kind.name().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_dump_structure() {
        let document = Document::parse("# Title\n\nBody\n");
        let expected = [
            "Document",
            "├─ Heading level: 1 @1-1",
            "│  └─ Text \"Title\" @1-1",
            "└─ Paragraph @3-3",
            "   └─ Text \"Body\" @3-3",
        ]
        .join("\n")
            + "\n";
        assert_eq!(document.dump(), expected);
    }

    #[test]
    fn test_dump_describes_payloads() {
        let document = Document::parse("- [x] done\n\n```rust\nfn a() {}\n```\n");
        let dump = document.dump();
        assert!(dump.contains("ListItem checkbox: Checked"));
        assert!(dump.contains("CodeBlock language: rust lines: 1"));
    }

    #[test]
    fn test_dump_deep_nesting_is_summarized() {
        let document = Document::parse(&format!("{} x\n", ">".repeat(10_000)));
        let dump = document.dump();
        assert_eq!(dump.lines().count(), MAX_NESTING + 2, "{dump}");
        assert!(dump.lines().last().unwrap().ends_with("nested nodes"));
    }
}
