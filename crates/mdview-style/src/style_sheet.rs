//! Per-construct visual styles and layout constants.

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeSet, Color, Font, FontFamily, ParagraphStyle};

/// Markdown construct a style record applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Construct {
    /// Heading level 1-6. Levels 5 and 6 share the level-4 record.
    Heading(u8),
    Body,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    InlineCode,
    CodeBlock,
    BlockQuote,
    List,
    Table,
    TableHeader,
    ThematicBreak,
}

impl Construct {
    /// Every construct with its own record.
    pub const ALL: [Self; 16] = [
        Self::Heading(1),
        Self::Heading(2),
        Self::Heading(3),
        Self::Heading(4),
        Self::Body,
        Self::Emphasis,
        Self::Strong,
        Self::Strikethrough,
        Self::Link,
        Self::InlineCode,
        Self::CodeBlock,
        Self::BlockQuote,
        Self::List,
        Self::Table,
        Self::TableHeader,
        Self::ThematicBreak,
    ];

    /// Name used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(3) => "h3",
            Self::Heading(_) => "h4",
            Self::Body => "body",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Strikethrough => "strikethrough",
            Self::Link => "link",
            Self::InlineCode => "inline_code",
            Self::CodeBlock => "code_block",
            Self::BlockQuote => "block_quote",
            Self::List => "list",
            Self::Table => "table",
            Self::TableHeader => "table_header",
            Self::ThematicBreak => "thematic_break",
        }
    }

    /// Look up a construct by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Visual style of one construct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub font: Font,
    #[serde(default)]
    pub paragraph: ParagraphStyle,
    #[serde(default)]
    pub foreground: Option<Color>,
    #[serde(default)]
    pub background: Option<Color>,
    /// Height of the spacer line emitted after the construct, when it has one.
    #[serde(default)]
    pub spacing: f32,
}

impl StyleRecord {
    fn new(font: Font) -> Self {
        Self {
            font,
            paragraph: ParagraphStyle::default(),
            foreground: None,
            background: None,
            spacing: 0.0,
        }
    }

    fn foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Attributes applied to runs styled with this record.
    #[must_use]
    pub fn to_attributes(&self) -> AttributeSet {
        AttributeSet {
            font: Some(self.font.clone()),
            paragraph: Some(self.paragraph),
            foreground: self.foreground,
            background: self.background,
            ..AttributeSet::default()
        }
    }
}

/// Partial style record used to override defaults from configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleRecordPatch {
    pub family: Option<FontFamily>,
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub paragraph: Option<ParagraphStyle>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub spacing: Option<f32>,
}

impl StyleRecordPatch {
    /// Apply the specified fields onto `record`.
    pub fn apply(&self, record: &mut StyleRecord) {
        if let Some(family) = &self.family {
            record.font.family = family.clone();
        }
        if let Some(size) = self.size {
            record.font.size = size;
        }
        if let Some(bold) = self.bold {
            record.font.bold = bold;
        }
        if let Some(italic) = self.italic {
            record.font.italic = italic;
        }
        if let Some(paragraph) = self.paragraph {
            record.paragraph = paragraph;
        }
        if self.foreground.is_some() {
            record.foreground = self.foreground;
        }
        if self.background.is_some() {
            record.background = self.background;
        }
        if let Some(spacing) = self.spacing {
            record.spacing = spacing;
        }
    }
}

/// List bullet glyphs by nesting depth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletGlyphs {
    /// Bullet for lists nested shallower than `secondary_from_depth`.
    pub primary: String,
    /// Bullet for lists nested at `secondary_from_depth` or deeper.
    pub secondary: String,
    /// Number of enclosing lists from which `secondary` is used.
    pub secondary_from_depth: usize,
}

impl BulletGlyphs {
    /// Bullet for an item whose list is enclosed by `depth` other lists.
    #[must_use]
    pub fn for_depth(&self, depth: usize) -> &str {
        if depth >= self.secondary_from_depth {
            &self.secondary
        } else {
            &self.primary
        }
    }
}

impl Default for BulletGlyphs {
    fn default() -> Self {
        Self {
            primary: "•".to_owned(),
            secondary: "⁃".to_owned(),
            secondary_from_depth: 2,
        }
    }
}

/// Layout constants shared by all constructs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Height of the blank line after a paragraph.
    pub paragraph_spacer: f32,
    /// Height of the spacer emitted after a soft break.
    pub soft_break_spacer: f32,
    /// Indent added per list level.
    pub list_indent: f32,
    /// Indent added per block quote level.
    pub block_quote_indent: f32,
    /// Leading indent of code block lines.
    pub code_block_head_indent: f32,
    /// Trailing indent of code block lines.
    pub code_block_tail_indent: f32,
    /// Characters added to the widest cell of each table column.
    pub table_cell_padding: usize,
    /// Number of spaces in a thematic break.
    pub thematic_break_width: usize,
    pub bullets: BulletGlyphs,
    pub checked_glyph: String,
    pub unchecked_glyph: String,
    /// Glyph prepended once to every block quote.
    pub block_quote_glyph: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            paragraph_spacer: 8.0,
            soft_break_spacer: 2.0,
            list_indent: 20.0,
            block_quote_indent: 16.0,
            code_block_head_indent: 12.0,
            code_block_tail_indent: 12.0,
            table_cell_padding: 2,
            thematic_break_width: 40,
            bullets: BulletGlyphs::default(),
            checked_glyph: "☑".to_owned(),
            unchecked_glyph: "☐".to_owned(),
            block_quote_glyph: "▎".to_owned(),
        }
    }
}

/// Mapping from construct to visual style, plus layout constants.
///
/// Built once and read-only for the duration of a render.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    h1: StyleRecord,
    h2: StyleRecord,
    h3: StyleRecord,
    h4: StyleRecord,
    body: StyleRecord,
    emphasis: StyleRecord,
    strong: StyleRecord,
    strikethrough: StyleRecord,
    link: StyleRecord,
    inline_code: StyleRecord,
    code_block: StyleRecord,
    block_quote: StyleRecord,
    list: StyleRecord,
    table: StyleRecord,
    table_header: StyleRecord,
    thematic_break: StyleRecord,
    /// Layout constants.
    pub layout: Layout,
}

impl StyleSheet {
    /// Style record of a construct.
    #[must_use]
    pub fn record(&self, construct: Construct) -> &StyleRecord {
        match construct {
            Construct::Heading(1) => &self.h1,
            Construct::Heading(2) => &self.h2,
            Construct::Heading(3) => &self.h3,
            Construct::Heading(_) => &self.h4,
            Construct::Body => &self.body,
            Construct::Emphasis => &self.emphasis,
            Construct::Strong => &self.strong,
            Construct::Strikethrough => &self.strikethrough,
            Construct::Link => &self.link,
            Construct::InlineCode => &self.inline_code,
            Construct::CodeBlock => &self.code_block,
            Construct::BlockQuote => &self.block_quote,
            Construct::List => &self.list,
            Construct::Table => &self.table,
            Construct::TableHeader => &self.table_header,
            Construct::ThematicBreak => &self.thematic_break,
        }
    }

    /// Mutable style record of a construct.
    pub fn record_mut(&mut self, construct: Construct) -> &mut StyleRecord {
        match construct {
            Construct::Heading(1) => &mut self.h1,
            Construct::Heading(2) => &mut self.h2,
            Construct::Heading(3) => &mut self.h3,
            Construct::Heading(_) => &mut self.h4,
            Construct::Body => &mut self.body,
            Construct::Emphasis => &mut self.emphasis,
            Construct::Strong => &mut self.strong,
            Construct::Strikethrough => &mut self.strikethrough,
            Construct::Link => &mut self.link,
            Construct::InlineCode => &mut self.inline_code,
            Construct::CodeBlock => &mut self.code_block,
            Construct::BlockQuote => &mut self.block_quote,
            Construct::List => &mut self.list,
            Construct::Table => &mut self.table,
            Construct::TableHeader => &mut self.table_header,
            Construct::ThematicBreak => &mut self.thematic_break,
        }
    }

    /// Attributes of a construct's record.
    #[must_use]
    pub fn attributes(&self, construct: Construct) -> AttributeSet {
        self.record(construct).to_attributes()
    }

    /// Iterate over `(construct, record)` pairs.
    pub fn records(&self) -> impl Iterator<Item = (Construct, &StyleRecord)> {
        Construct::ALL.into_iter().map(|c| (c, self.record(c)))
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        let text = Color::from_hex(0x1F_23_28);
        let muted = Color::from_hex(0x59_63_6E);
        let code_background = Color::from_hex(0xF6_F8_FA);

        Self {
            h1: StyleRecord::new(Font::system(32.0).bold()).spacing(12.0),
            h2: StyleRecord::new(Font::system(28.0).bold()).spacing(10.0),
            h3: StyleRecord::new(Font::system(24.0).bold()).spacing(8.0),
            h4: StyleRecord::new(Font::system(20.0).bold()).spacing(6.0),
            body: StyleRecord::new(Font::system(16.0)).foreground(text),
            emphasis: StyleRecord::new(Font::system(16.0).italic()),
            strong: StyleRecord::new(Font::system(16.0).bold()),
            strikethrough: StyleRecord::new(Font::system(16.0)).foreground(muted),
            link: StyleRecord::new(Font::system(16.0)).foreground(Color::from_hex(0x09_69_DA)),
            inline_code: StyleRecord::new(Font::monospace(14.0)).background(code_background),
            code_block: StyleRecord::new(Font::monospace(14.0))
                .foreground(text)
                .background(code_background)
                .spacing(6.0),
            block_quote: StyleRecord::new(Font::system(16.0)).foreground(muted),
            list: StyleRecord::new(Font::system(16.0)),
            table: StyleRecord::new(Font::monospace(14.0)),
            table_header: StyleRecord::new(Font::monospace(14.0).bold()),
            thematic_break: StyleRecord::new(Font::system(16.0)).foreground(muted),
            layout: Layout::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_heading_levels_degrade_to_h4() {
        let sheet = StyleSheet::default();
        assert_eq!(
            sheet.record(Construct::Heading(5)),
            sheet.record(Construct::Heading(4))
        );
        assert_eq!(
            sheet.record(Construct::Heading(6)),
            sheet.record(Construct::Heading(4))
        );
        assert!(
            sheet.record(Construct::Heading(1)).font.size
                > sheet.record(Construct::Heading(4)).font.size
        );
    }

    #[test]
    fn test_construct_names_round_trip() {
        for construct in Construct::ALL {
            assert_eq!(Construct::from_name(construct.name()), Some(construct));
        }
        assert_eq!(Construct::from_name("h9"), None);
    }

    #[test]
    fn test_bullets_by_depth() {
        let bullets = BulletGlyphs::default();
        assert_eq!(bullets.for_depth(0), "•");
        assert_eq!(bullets.for_depth(1), "•");
        assert_eq!(bullets.for_depth(2), "⁃");
        assert_eq!(bullets.for_depth(5), "⁃");
    }

    #[test]
    fn test_patch_applies_only_given_fields() {
        let mut sheet = StyleSheet::default();
        let before = sheet.record(Construct::Heading(1)).clone();
        let patch = StyleRecordPatch {
            foreground: Some(Color::from_hex(0xFF0000)),
            size: Some(40.0),
            ..StyleRecordPatch::default()
        };
        patch.apply(sheet.record_mut(Construct::Heading(1)));

        let after = sheet.record(Construct::Heading(1));
        assert_eq!(after.font.size, 40.0);
        assert!(after.font.bold);
        assert_eq!(after.foreground, Some(Color::from_hex(0xFF0000)));
        assert_eq!(after.spacing, before.spacing);
    }

    #[test]
    fn test_patch_from_toml() {
        let patch: StyleRecordPatch =
            toml::from_str("family = \"Menlo\"\nforeground = \"#FC5FA3\"\nitalic = true\n")
                .unwrap();
        assert_eq!(patch.family, Some(FontFamily::Named("Menlo".to_owned())));
        assert_eq!(patch.foreground, Some(Color::from_hex(0xFC5FA3)));
        assert_eq!(patch.italic, Some(true));
    }

    #[test]
    fn test_layout_from_partial_toml() {
        let layout: Layout =
            toml::from_str("list_indent = 32.0\n[bullets]\nprimary = \"-\"\n").unwrap();
        assert_eq!(layout.list_indent, 32.0);
        assert_eq!(layout.bullets.primary, "-");
        assert_eq!(layout.bullets.secondary, "⁃");
        assert_eq!(layout.table_cell_padding, 2);
    }

    #[test]
    fn test_record_attributes() {
        let sheet = StyleSheet::default();
        let attrs = sheet.attributes(Construct::InlineCode);
        assert_eq!(attrs.font.unwrap().family, FontFamily::Monospace);
        assert!(attrs.background.is_some());
        assert!(attrs.link.is_none());
    }
}
