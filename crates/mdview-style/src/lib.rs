//! Style model for mdview rich-text rendering.
//!
//! - [`StyleSheet`]: construct → [`StyleRecord`] mapping plus [`Layout`]
//!   constants (indents, spacers, glyphs)
//! - [`AttributeSet`]: resolved attributes of a styled run
//! - [`merge`]: conflict resolution when nested constructs style the same text

mod attributes;
mod error;
mod merge;
mod style_sheet;

pub use attributes::{AttributeSet, Color, Font, FontFamily, ParagraphStyle};
pub use error::ColorParseError;
pub use merge::{merge, merge_font, merge_paragraph};
pub use style_sheet::{BulletGlyphs, Construct, Layout, StyleRecord, StyleRecordPatch, StyleSheet};
