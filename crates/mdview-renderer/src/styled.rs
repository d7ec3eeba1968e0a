//! Styled text: a string plus attribute runs covering it.

use std::ops::Range;

use mdview_style::{AttributeSet, merge};
use unicode_segmentation::UnicodeSegmentation;

use crate::image::ImageSlot;

/// Character inserted where an attachment is anchored.
pub const OBJECT_REPLACEMENT: &str = "\u{FFFC}";

/// Contiguous byte range of the text with its resolved attributes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StyledRun {
    pub range: Range<usize>,
    pub attributes: AttributeSet,
}

/// Inline image placeholder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attachment {
    /// Index of the attachment in its text.
    pub id: usize,
    /// Image source as written in the document.
    pub source: String,
    pub title: Option<String>,
    /// Placeholder content, filled by an image resolver.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub slot: ImageSlot,
}

/// Mutable styled fragment built up during rendering.
///
/// Runs always cover the whole text in increasing order without gaps.
#[derive(Clone, Debug, Default)]
pub struct StyledText {
    text: String,
    runs: Vec<StyledRun>,
    attachments: Vec<Attachment>,
}

impl StyledText {
    /// Create an empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment with `text` and no attributes.
    #[must_use]
    pub fn plain(text: &str) -> Self {
        Self::styled(text, AttributeSet::default())
    }

    /// Fragment with `text` carrying `attributes`.
    #[must_use]
    pub fn styled(text: &str, attributes: AttributeSet) -> Self {
        let mut out = Self::new();
        out.push(text, attributes);
        out
    }

    /// Text content.
    #[must_use]
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// Attribute runs.
    #[must_use]
    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Attachments anchored in the text.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Display width in grapheme clusters.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Whether the text ends with a line break.
    #[must_use]
    pub fn ends_with_newline(&self) -> bool {
        self.text.ends_with('\n')
    }

    /// Append `text` with `attributes`.
    pub fn push(&mut self, text: &str, attributes: AttributeSet) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        self.push_run(start..self.text.len(), attributes);
    }

    /// Append another fragment, renumbering its attachments.
    pub fn append(&mut self, other: Self) {
        let offset = self.text.len();
        let first_attachment = self.attachments.len();
        self.text.push_str(&other.text);

        for run in other.runs {
            let mut attributes = run.attributes;
            if let Some(id) = attributes.attachment.as_mut() {
                *id += first_attachment;
            }
            self.push_run(run.range.start + offset..run.range.end + offset, attributes);
        }
        self.attachments
            .extend(other.attachments.into_iter().map(|mut attachment| {
                attachment.id += first_attachment;
                attachment
            }));
    }

    /// Insert `other` at the start of this fragment.
    pub fn prepend(&mut self, mut other: Self) {
        other.append(std::mem::take(self));
        *self = other;
    }

    /// Append an attachment placeholder and return its index.
    pub fn attach(&mut self, source: &str, title: Option<&str>, slot: ImageSlot) -> usize {
        let id = self.attachments.len();
        self.attachments.push(Attachment {
            id,
            source: source.to_owned(),
            title: title.map(str::to_owned),
            slot,
        });
        self.push(
            OBJECT_REPLACEMENT,
            AttributeSet {
                attachment: Some(id),
                ..AttributeSet::default()
            },
        );
        id
    }

    /// Merge `style` underneath every run: existing attributes are the
    /// incoming side of [`merge`].
    pub fn merge_under(&mut self, style: &AttributeSet) {
        for run in &mut self.runs {
            run.attributes = merge(style, &run.attributes);
        }
        self.coalesce();
    }

    /// Replace every key `style` specifies on every run.
    pub fn overwrite(&mut self, style: &AttributeSet) {
        for run in &mut self.runs {
            run.attributes = run.attributes.overwritten_by(style);
        }
        self.coalesce();
    }

    /// Set keys of `style` only where a run has none.
    pub fn fill(&mut self, style: &AttributeSet) {
        for run in &mut self.runs {
            run.attributes = style.overwritten_by(&run.attributes);
        }
        self.coalesce();
    }

    /// Merge `incoming` over the runs inside `range`, splitting runs at the
    /// boundaries. The range is clamped to the text.
    pub fn merge_range(&mut self, range: Range<usize>, incoming: &AttributeSet) {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        if start == end {
            return;
        }
        self.split_at(start);
        self.split_at(end);
        for run in &mut self.runs {
            if run.range.start >= start && run.range.end <= end {
                run.attributes = merge(&run.attributes, incoming);
            }
        }
        self.coalesce();
    }

    /// Finish the fragment.
    #[must_use]
    pub fn into_document(mut self) -> StyledDocument {
        self.coalesce();
        StyledDocument {
            text: self.text,
            runs: self.runs,
            attachments: self.attachments,
        }
    }

    fn push_run(&mut self, range: Range<usize>, attributes: AttributeSet) {
        if let Some(last) = self.runs.last_mut()
            && last.attributes == attributes
            && last.range.end == range.start
        {
            last.range.end = range.end;
            return;
        }
        self.runs.push(StyledRun { range, attributes });
    }

    fn split_at(&mut self, offset: usize) {
        let Some(index) = self
            .runs
            .iter()
            .position(|run| run.range.start < offset && offset < run.range.end)
        else {
            return;
        };
        let tail = StyledRun {
            range: offset..self.runs[index].range.end,
            attributes: self.runs[index].attributes.clone(),
        };
        self.runs[index].range.end = offset;
        self.runs.insert(index + 1, tail);
    }

    fn coalesce(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        for run in runs {
            self.push_run(run.range, run.attributes);
        }
    }
}

/// Final rich-text rendering result.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StyledDocument {
    text: String,
    runs: Vec<StyledRun>,
    attachments: Vec<Attachment>,
}

impl StyledDocument {
    /// Text content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attribute runs: contiguous, non-overlapping, increasing, covering
    /// the whole text, with no two adjacent runs sharing attributes.
    #[must_use]
    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Image placeholders, indexed by the `attachment` attribute.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Attributes of the run containing byte `offset`.
    #[must_use]
    pub fn attributes_at(&self, offset: usize) -> Option<&AttributeSet> {
        self.runs
            .iter()
            .find(|run| run.range.contains(&offset))
            .map(|run| &run.attributes)
    }

    /// Attributes at the first occurrence of `needle`.
    #[must_use]
    pub fn attributes_of(&self, needle: &str) -> Option<&AttributeSet> {
        self.text
            .find(needle)
            .and_then(|offset| self.attributes_at(offset))
    }
}

#[cfg(test)]
mod tests {
    use mdview_style::{Color, Font};
    use pretty_assertions::assert_eq;

    use super::*;

    fn red() -> AttributeSet {
        AttributeSet {
            foreground: Some(Color::from_hex(0xFF0000)),
            ..AttributeSet::default()
        }
    }

    fn assert_covering(text: &StyledText) {
        let mut expected = 0;
        for run in text.runs() {
            assert_eq!(run.range.start, expected);
            assert!(run.range.end > run.range.start);
            expected = run.range.end;
        }
        assert_eq!(expected, text.len());
    }

    #[test]
    fn test_push_coalesces_equal_runs() {
        let mut text = StyledText::plain("a");
        text.push("b", AttributeSet::default());
        text.push("", red());
        text.push("c", red());
        assert_eq!(text.plain_text(), "abc");
        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.runs()[0].range, 0..2);
        assert_covering(&text);
    }

    #[test]
    fn test_append_offsets_runs_and_attachments() {
        let mut first = StyledText::plain("x");
        first.attach("a.png", None, ImageSlot::new());

        let mut second = StyledText::styled("y", red());
        second.attach("b.png", Some("B"), ImageSlot::new());

        first.append(second);
        assert_covering(&first);
        let ids: Vec<_> = first.attachments().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1]);

        let document = first.into_document();
        let offset = document.text().rfind(OBJECT_REPLACEMENT).unwrap();
        assert_eq!(document.attributes_at(offset).unwrap().attachment, Some(1));
        assert_eq!(document.attachments()[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn test_merge_range_splits_runs() {
        let mut text =
            StyledText::styled("hello world", AttributeSet::with_font(Font::monospace(14.0)));
        text.merge_range(6..11, &red());
        assert_covering(&text);
        assert_eq!(text.runs().len(), 2);
        assert_eq!(text.runs()[1].range, 6..11);
        assert_eq!(text.runs()[1].attributes.foreground, red().foreground);
        assert_eq!(
            text.runs()[1].attributes.font,
            Some(Font::monospace(14.0))
        );
    }

    #[test]
    fn test_merge_range_clamps() {
        let mut text = StyledText::plain("abc");
        text.merge_range(2..10, &red());
        text.merge_range(8..9, &red());
        assert_covering(&text);
        assert_eq!(text.runs()[1].range, 2..3);
    }

    #[test]
    fn test_fill_keeps_existing_keys() {
        let mut text = StyledText::styled("a", red());
        text.push("b", AttributeSet::default());
        text.fill(&AttributeSet {
            foreground: Some(Color::from_hex(0x000000)),
            ..AttributeSet::default()
        });
        let document = text.into_document();
        assert_eq!(document.attributes_of("a").unwrap().foreground, red().foreground);
        assert_eq!(
            document.attributes_of("b").unwrap().foreground,
            Some(Color::from_hex(0x000000))
        );
    }

    #[test]
    fn test_prepend() {
        let mut text = StyledText::styled("body", red());
        text.prepend(StyledText::plain("> "));
        assert_eq!(text.plain_text(), "> body");
        assert_covering(&text);
    }

    #[test]
    fn test_width_counts_graphemes() {
        assert_eq!(StyledText::plain("héllo").width(), 5);
        assert_eq!(StyledText::plain("e\u{301}").width(), 1);
    }
}
