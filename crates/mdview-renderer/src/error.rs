//! Renderer error types.

/// Error converting an HTML fragment to styled text.
///
/// Never escapes a render call: the rich-text renderer falls back to the
/// raw markup as unstyled text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConversionError {
    /// Markup is not well-formed enough to tokenize.
    #[error("malformed HTML")]
    Markup(#[from] quick_xml::Error),

    /// Attribute could not be parsed.
    #[error("malformed HTML attribute")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Text could not be decoded.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
