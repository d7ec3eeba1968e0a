//! Presentation attributes attached to styled runs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// RGBA color.
///
/// Serialized as a `#RRGGBB` or `#RRGGBBAA` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent color.
    pub const CLEAR: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from components with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Self::rgb(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_owned()))?;
        if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex(s.to_owned()));
        }
        let component = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        let alpha = if hex.len() == 8 { component(6)? } else { 255 };
        Ok(Self::rgba(component(0)?, component(2)?, component(4)?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Font family.
///
/// Serialized as `"system"`, `"monospace"`, or any other family name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    #[default]
    System,
    Monospace,
    Named(String),
}

impl From<String> for FontFamily {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "monospace" => Self::Monospace,
            _ => Self::Named(value),
        }
    }
}

impl From<FontFamily> for String {
    fn from(family: FontFamily) -> Self {
        match family {
            FontFamily::System => "system".to_owned(),
            FontFamily::Monospace => "monospace".to_owned(),
            FontFamily::Named(name) => name,
        }
    }
}

/// Font description: family, point size and symbolic traits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default)]
    pub family: FontFamily,
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Font {
    /// Regular system font.
    #[must_use]
    pub fn system(size: f32) -> Self {
        Self {
            family: FontFamily::System,
            size,
            bold: false,
            italic: false,
        }
    }

    /// Regular monospaced font.
    #[must_use]
    pub fn monospace(size: f32) -> Self {
        Self {
            family: FontFamily::Monospace,
            ..Self::system(size)
        }
    }

    /// Same font with the bold trait.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Same font with the italic trait.
    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::system(16.0)
    }
}

/// Paragraph formatting. A value of `0.0` means "unspecified".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphStyle {
    pub head_indent: f32,
    pub first_line_head_indent: f32,
    pub tail_indent: f32,
    pub paragraph_spacing: f32,
    pub paragraph_spacing_before: f32,
    pub line_spacing: f32,
    pub min_line_height: f32,
    pub max_line_height: f32,
}

impl ParagraphStyle {
    /// Paragraph indented by `indent` on every line.
    #[must_use]
    pub fn indented(indent: f32) -> Self {
        Self {
            head_indent: indent,
            first_line_head_indent: indent,
            ..Self::default()
        }
    }

    /// Paragraph pinned to a fixed line height.
    #[must_use]
    pub fn fixed_height(height: f32) -> Self {
        Self {
            min_line_height: height,
            max_line_height: height,
            ..Self::default()
        }
    }
}

/// Resolved attributes of a styled run.
///
/// Every key is optional; absent keys let the host text view fall back to
/// its defaults. `extra` carries keys the renderer does not interpret.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<ParagraphStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Link target, absolute or relative to the document.
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    /// Index of the image attachment anchored at this run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl AttributeSet {
    /// Attribute set with only a font.
    #[must_use]
    pub fn with_font(font: Font) -> Self {
        Self {
            font: Some(font),
            ..Self::default()
        }
    }

    /// Attribute set with only paragraph formatting.
    #[must_use]
    pub fn with_paragraph(paragraph: ParagraphStyle) -> Self {
        Self {
            paragraph: Some(paragraph),
            ..Self::default()
        }
    }

    /// Whether no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Replace every key that `style` specifies, keeping the others.
    ///
    /// Unlike [`merge`](crate::merge), nothing is accumulated: a bold
    /// existing font is replaced by a regular `style` font.
    #[must_use]
    pub fn overwritten_by(&self, style: &Self) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(style.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            font: style.font.clone().or_else(|| self.font.clone()),
            paragraph: style.paragraph.or(self.paragraph),
            foreground: style.foreground.or(self.foreground),
            background: style.background.or(self.background),
            link: style.link.clone().or_else(|| self.link.clone()),
            strikethrough: style.strikethrough.or(self.strikethrough),
            attachment: style.attachment.or(self.attachment),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!("#FC5FA3".parse::<Color>().unwrap(), Color::from_hex(0xFC5FA3));
        assert_eq!(
            "#00000080".parse::<Color>().unwrap(),
            Color::rgba(0, 0, 0, 0x80)
        );
        assert!(matches!(
            "FC5FA3".parse::<Color>(),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            "#FC5F".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "#GGGGGG".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::from_hex(0x0969DA).to_string(), "#0969DA");
        assert_eq!(Color::CLEAR.to_string(), "#00000000");
    }

    #[test]
    fn test_font_family_from_string() {
        assert_eq!(FontFamily::from("system".to_owned()), FontFamily::System);
        assert_eq!(FontFamily::from("monospace".to_owned()), FontFamily::Monospace);
        assert_eq!(
            FontFamily::from("Menlo".to_owned()),
            FontFamily::Named("Menlo".to_owned())
        );
    }

    #[test]
    fn test_overwritten_by_replaces_specified_keys() {
        let existing = AttributeSet {
            font: Some(Font::system(16.0).italic()),
            foreground: Some(Color::from_hex(0x111111)),
            link: Some("https://example.com".to_owned()),
            ..AttributeSet::default()
        };
        let style = AttributeSet {
            font: Some(Font::system(32.0).bold()),
            ..AttributeSet::default()
        };
        let result = existing.overwritten_by(&style);
        assert_eq!(result.font, Some(Font::system(32.0).bold()));
        assert_eq!(result.foreground, existing.foreground);
        assert_eq!(result.link, existing.link);
    }

    #[test]
    fn test_is_empty() {
        assert!(AttributeSet::default().is_empty());
        assert!(!AttributeSet::with_font(Font::default()).is_empty());
    }
}
