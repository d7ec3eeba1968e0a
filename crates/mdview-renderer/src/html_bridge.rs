//! Raw HTML to styled text conversion.

use std::borrow::Cow;

use mdview_style::{AttributeSet, Font, merge};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ConversionError;
use crate::image::ImageSlot;
use crate::state::link_target;
use crate::styled::StyledText;

/// HTML-to-rich-text collaborator.
pub trait HtmlConverter: Send + Sync {
    /// Convert an HTML fragment.
    fn convert(&self, html: &str) -> Result<StyledText, ConversionError>;
}

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr"];

/// Streaming converter for the inline formatting subset of HTML.
///
/// Recognizes `b`/`strong`, `i`/`em`, `s`/`del`/`strike`, `code`, `a href`,
/// `br` and `img src`; other tags are transparent. Void elements may be
/// written without a closing slash and unmatched closing tags are ignored,
/// but syntax errors fail the conversion, including malformed attributes
/// of recognized tags.
#[derive(Clone, Debug, Default)]
pub struct XmlHtmlConverter {
    base_font: Font,
}

impl XmlHtmlConverter {
    /// Converter whose formatting tags derive from `base_font`.
    #[must_use]
    pub fn new(base_font: Font) -> Self {
        Self { base_font }
    }

    fn element_style(
        &self,
        reader: &Reader<&[u8]>,
        name: &str,
        e: &BytesStart,
    ) -> Result<AttributeSet, ConversionError> {
        let style = match name {
            "b" | "strong" => AttributeSet::with_font(self.base_font.clone().bold()),
            "i" | "em" => AttributeSet::with_font(self.base_font.clone().italic()),
            "s" | "del" | "strike" => AttributeSet {
                strikethrough: Some(true),
                ..AttributeSet::default()
            },
            "code" => AttributeSet::with_font(Font::monospace(self.base_font.size)),
            "a" => AttributeSet {
                link: attribute(reader, e, "href")?.as_deref().and_then(link_target),
                ..AttributeSet::default()
            },
            _ => AttributeSet::default(),
        };
        Ok(style)
    }
}

impl HtmlConverter for XmlHtmlConverter {
    fn convert(&self, html: &str) -> Result<StyledText, ConversionError> {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut out = StyledText::new();
        // Open elements with the attributes in effect inside them.
        let mut stack: Vec<(String, AttributeSet)> = Vec::new();

        loop {
            let current = stack
                .last()
                .map(|(_, attributes)| attributes.clone())
                .unwrap_or_default();
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = tag_name(&reader, e.name().as_ref());
                    if VOID_ELEMENTS.contains(&name.as_str()) {
                        void_element(&reader, &name, &e, &current, &mut out)?;
                    } else {
                        let style = merge(&current, &self.element_style(&reader, &name, &e)?);
                        stack.push((name, style));
                    }
                }
                Event::Empty(e) => {
                    let name = tag_name(&reader, e.name().as_ref());
                    void_element(&reader, &name, &e, &current, &mut out)?;
                }
                Event::End(e) => {
                    let name = tag_name(&reader, e.name().as_ref());
                    if let Some(position) = stack.iter().rposition(|(open, _)| *open == name) {
                        stack.truncate(position);
                    }
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    out.push(&text, current);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    out.push(&decode_entity(&entity), current);
                }
                Event::CData(e) => {
                    out.push(&String::from_utf8_lossy(&e), current);
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        Ok(out)
    }
}

fn void_element(
    reader: &Reader<&[u8]>,
    name: &str,
    e: &BytesStart,
    current: &AttributeSet,
    out: &mut StyledText,
) -> Result<(), ConversionError> {
    match name {
        "br" => out.push("\n", current.clone()),
        "img" => {
            if let Some(source) = attribute(reader, e, "src")? {
                let title = attribute(reader, e, "title")?;
                out.attach(&source, title.as_deref(), ImageSlot::new());
            }
        }
        _ => {}
    }
    Ok(())
}

fn tag_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader
        .decoder()
        .decode(name)
        .map_or_else(|_| String::from_utf8_lossy(name).into_owned(), Cow::into_owned)
        .to_ascii_lowercase()
}

/// Value of attribute `key`, matched case-insensitively. Attributes before
/// the match must parse.
fn attribute(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
    key: &str,
) -> Result<Option<String>, ConversionError> {
    for attr in e.attributes() {
        let attr = attr?;
        let name = reader.decoder().decode(attr.key.as_ref())?;
        if !name.eq_ignore_ascii_case(key) {
            continue;
        }
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        return Ok(Some(value));
    }
    Ok(None)
}

/// Decode an entity reference name (without `&` and `;`).
fn decode_entity(entity: &str) -> Cow<'static, str> {
    let named = match entity {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "bull" => "\u{2022}",
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            return code
                .and_then(char::from_u32)
                .map_or_else(|| Cow::Owned(format!("&{entity};")), |c| Cow::Owned(c.to_string()));
        }
        _ => return Cow::Owned(format!("&{entity};")),
    };
    Cow::Borrowed(named)
}
