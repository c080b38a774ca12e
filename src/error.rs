//! Error types

use crate::binary::read::ReadEof;
use crate::tag::DisplayTag;
use std::fmt;

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    LimitExceeded,
    MissingTable(u32),
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::LimitExceeded => write!(f, "limit exceeded"),
            ParseError::MissingTable(tag) => {
                write!(f, "font is missing '{}' table", DisplayTag(*tag))
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors that originate when writing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WriteError {
    /// zlib failed to compress the output.
    CompressionError,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::CompressionError => write!(f, "compression failed"),
        }
    }
}

impl std::error::Error for WriteError {}

/// Errors raised while resolving fonts, glyphs, and metrics.
///
/// `Malformed` is fatal for the font it was produced for but nothing else: callers are expected
/// to substitute a fallback font or skip metric-dependent work for runs that use it.
/// `GlyphOutOfRange` and `UnresolvedCharacter` are recoverable.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FontError {
    /// The font data could not be parsed.
    Malformed(ParseError),
    /// A glyph id at or beyond the number of glyphs in the font was requested.
    GlyphOutOfRange { glyph_id: u16, num_glyphs: u16 },
    /// No character map subtable maps this character code.
    UnresolvedCharacter(u32),
    /// The font bytes could not be obtained from their source.
    Source(String),
}

impl From<ParseError> for FontError {
    fn from(error: ParseError) -> Self {
        FontError::Malformed(error)
    }
}

impl From<ReadEof> for FontError {
    fn from(_error: ReadEof) -> Self {
        FontError::Malformed(ParseError::BadEof)
    }
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Malformed(err) => write!(f, "malformed font: {}", err),
            FontError::GlyphOutOfRange {
                glyph_id,
                num_glyphs,
            } => write!(
                f,
                "glyph id {} out of range, font has {} glyphs",
                glyph_id, num_glyphs
            ),
            FontError::UnresolvedCharacter(code) => {
                write!(f, "no glyph for character code 0x{:04X}", code)
            }
            FontError::Source(msg) => write!(f, "unable to load font data: {}", msg),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Malformed(err) => Some(err),
            _ => None,
        }
    }
}
