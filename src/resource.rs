//! Font resources referenced by text runs.

use std::fmt;

use crate::descriptor::FontDescriptor;
use crate::text::WritingMode;

/// Identifies an embedded font across pages.
///
/// Subset fonts carry a six letter tag such as `ABCDEF+` before their name. It is removed so the
/// subsets of one font embedded on different pages share a key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontKey(String);

/// The encoding assumed for fonts that don't name one.
pub const DEFAULT_ENCODING: &str = "WinAnsiEncoding";

/// A font resource, either a simple font or a composite font with a CID descendant.
#[derive(Clone, Debug, PartialEq)]
pub enum FontResource {
    Simple {
        base_font: String,
        descriptor: Option<FontDescriptor>,
    },
    Composite {
        base_font: String,
        /// The name of the encoding CMap, such as `Identity-V`.
        encoding: String,
        wmode: WritingMode,
        descriptor: Option<FontDescriptor>,
        descendant: CidFont,
    },
}

/// The descendant of a composite font.
#[derive(Clone, Debug, PartialEq)]
pub struct CidFont {
    pub base_font: String,
    pub descriptor: Option<FontDescriptor>,
}

impl FontKey {
    pub fn new(key: impl Into<String>) -> FontKey {
        FontKey(key.into())
    }

    /// Derive the key for a font from its encoding and base font name.
    pub fn for_font(encoding: Option<&str>, base_font: &str) -> FontKey {
        let encoding = encoding.unwrap_or(DEFAULT_ENCODING);
        FontKey(format!("{}+{}", encoding, strip_subset_tag(base_font)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove a subset tag, six upper case letters followed by `+`, from the start of `name`.
pub fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

impl FontResource {
    pub fn base_font(&self) -> &str {
        match self {
            FontResource::Simple { base_font, .. } | FontResource::Composite { base_font, .. } => {
                base_font
            }
        }
    }

    /// The writing mode of text in this font. Simple fonts are always horizontal.
    pub fn writing_mode(&self) -> WritingMode {
        match self {
            FontResource::Simple { .. } => WritingMode::Horizontal,
            FontResource::Composite { wmode, .. } => *wmode,
        }
    }

    /// The descriptor of this font, falling back to that of a composite font's descendant.
    pub fn resolve_descriptor(&self) -> Option<&FontDescriptor> {
        match self {
            FontResource::Simple { descriptor, .. } => descriptor.as_ref(),
            FontResource::Composite {
                descriptor,
                descendant,
                ..
            } => descriptor.as_ref().or(descendant.descriptor.as_ref()),
        }
    }

    /// The key used to cache the parsed tables of this font.
    pub fn key(&self) -> FontKey {
        match self {
            FontResource::Simple { base_font, .. } => FontKey::for_font(None, base_font),
            FontResource::Composite {
                base_font,
                encoding,
                ..
            } => FontKey::for_font(Some(encoding), base_font),
        }
    }
}
