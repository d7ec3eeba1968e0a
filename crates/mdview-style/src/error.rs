//! Style error types.

use std::num::ParseIntError;

/// Error parsing a hex color string.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ColorParseError {
    /// Color does not start with `#`.
    #[error("color must start with '#': {0}")]
    MissingHash(String),
    /// Not six or eight hex digits.
    #[error("color must be #RRGGBB or #RRGGBBAA: {0}")]
    InvalidHex(String),
    /// Component is not a valid hex byte.
    #[error("invalid color component")]
    Component(#[from] ParseIntError),
}
