//! Conflict resolution for overlapping attribute sets.
//!
//! [`merge`] combines a `base` set with an `incoming` set:
//!
//! - Font: the larger point size wins (ties keep `base`); bold and italic
//!   accumulate from both sides and are never cleared.
//! - Colors: `incoming` wins when both sides specify one.
//! - Paragraph formatting: each numeric field takes the maximum, so an outer
//!   spacing request is never shrunk by an inner node.
//! - Everything else, including unrecognized `extra` keys: `incoming` wins.
//!
//! Renderers pass the construct's own style as `base` and the attributes
//! already present on the rendered children as `incoming`, so inner colors
//! survive while traits accumulate outward.

use crate::attributes::{AttributeSet, Color, Font, ParagraphStyle};

/// Merge `incoming` over `base`.
#[must_use]
pub fn merge(base: &AttributeSet, incoming: &AttributeSet) -> AttributeSet {
    let mut extra = base.extra.clone();
    extra.extend(
        incoming
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    AttributeSet {
        font: merge_option(base.font.as_ref(), incoming.font.as_ref(), merge_font),
        paragraph: merge_option(
            base.paragraph.as_ref(),
            incoming.paragraph.as_ref(),
            merge_paragraph,
        ),
        foreground: merge_color(base.foreground, incoming.foreground),
        background: merge_color(base.background, incoming.background),
        link: incoming.link.clone().or_else(|| base.link.clone()),
        strikethrough: incoming.strikethrough.or(base.strikethrough),
        attachment: incoming.attachment.or(base.attachment),
        extra,
    }
}

fn merge_option<T: Clone>(
    base: Option<&T>,
    incoming: Option<&T>,
    both: impl FnOnce(&T, &T) -> T,
) -> Option<T> {
    match (base, incoming) {
        (Some(base), Some(incoming)) => Some(both(base, incoming)),
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (None, None) => None,
    }
}

/// Larger size wins, traits are the union of both fonts.
#[must_use]
pub fn merge_font(base: &Font, incoming: &Font) -> Font {
    let larger = if incoming.size > base.size {
        incoming
    } else {
        base
    };
    Font {
        family: larger.family.clone(),
        size: larger.size,
        bold: base.bold || incoming.bold,
        italic: base.italic || incoming.italic,
    }
}

/// Field-wise maximum.
#[must_use]
pub fn merge_paragraph(base: &ParagraphStyle, incoming: &ParagraphStyle) -> ParagraphStyle {
    ParagraphStyle {
        head_indent: base.head_indent.max(incoming.head_indent),
        first_line_head_indent: base
            .first_line_head_indent
            .max(incoming.first_line_head_indent),
        tail_indent: base.tail_indent.max(incoming.tail_indent),
        paragraph_spacing: base.paragraph_spacing.max(incoming.paragraph_spacing),
        paragraph_spacing_before: base
            .paragraph_spacing_before
            .max(incoming.paragraph_spacing_before),
        line_spacing: base.line_spacing.max(incoming.line_spacing),
        min_line_height: base.min_line_height.max(incoming.min_line_height),
        max_line_height: base.max_line_height.max(incoming.max_line_height),
    }
}

fn merge_color(base: Option<Color>, incoming: Option<Color>) -> Option<Color> {
    incoming.or(base)
}
