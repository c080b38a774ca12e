#![warn(rust_2018_idioms)]

//! Font metrics and reading order for text extracted from documents.
//!
//! Embedded TrueType fonts are parsed into a [FontTableSet](font::FontTableSet) which resolves
//! character codes to glyphs and glyphs to scaled metrics. Positioned text runs are classified as
//! horizontal or vertical and sorted into reading order.

/// Reading and writing of binary data.
pub mod binary;
/// A shared cache of parsed fonts.
pub mod cache;
pub mod charmap;
/// Checksum calculation routines.
pub mod checksum;
pub mod descriptor;
pub mod error;
pub mod font;
pub mod get_name;
pub mod glyph_metrics;
pub mod placement;
pub mod post;
pub mod reading_order;
pub mod resource;
pub mod tables;
pub mod tag;
pub mod text;
pub mod writing_mode;

pub use crate::cache::FontCache;
pub use crate::error::{FontError, ParseError};
pub use crate::font::FontTableSet;
