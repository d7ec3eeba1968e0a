//! Heading outline extraction.

use mdview_tree::{Document, NodeKind, SourceRange};

use crate::state::HeadingAnchors;

/// Heading entry of a document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlineToken {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading plain text.
    pub text: String,
    pub range: Option<SourceRange>,
    /// Unique anchor slug.
    pub anchor: String,
}

/// Collect every heading of `document` in document order.
#[must_use]
pub fn extract_outline(document: &Document) -> Vec<OutlineToken> {
    let mut anchors = HeadingAnchors::default();
    document
        .descendants(document.root())
        .filter_map(|id| match document.kind(id) {
            NodeKind::Heading { level } => {
                let text = document.plain_text(id).trim().to_owned();
                Some(OutlineToken {
                    level: *level,
                    anchor: anchors.next(&text),
                    text,
                    range: document.range(id),
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_levels_in_document_order() {
        let document =
            Document::parse("# Guide\n\ntext\n\n## Install\n\n## Usage\n\n> ### Deep *dive*\n");
        let outline = extract_outline(&document);

        let levels: Vec<_> = outline.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![1, 2, 2, 3]);
        let texts: Vec<_> = outline.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Guide", "Install", "Usage", "Deep dive"]);
        assert_eq!(outline[1].range, Some(SourceRange::new(5, 5)));
    }

    #[test]
    fn test_duplicate_titles_get_unique_anchors() {
        let document = Document::parse("## Notes\n\n## Notes\n\n## Notes\n");
        let anchors: Vec<_> = extract_outline(&document)
            .into_iter()
            .map(|t| t.anchor)
            .collect();
        assert_eq!(anchors, vec!["notes", "notes-1", "notes-2"]);
    }

    #[test]
    fn test_no_headings() {
        assert!(extract_outline(&Document::parse("just text\n")).is_empty());
        assert!(extract_outline(&Document::parse("")).is_empty());
    }
}
