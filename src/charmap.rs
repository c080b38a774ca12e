//! Mapping character codes to glyph ids.
//!
//! Subtables are consulted in a fixed order: Windows Unicode BMP (3, 1), Windows Unicode full
//! repertoire (3, 10), then Macintosh Roman (1, 0). Fonts that have been embedded in documents for
//! years depend on exactly this order, so it must not change.

use log::warn;

use crate::binary::write::{WriteBuffer, WriteContext};
use crate::binary::U16Be;
use crate::error::{FontError, ParseError, WriteError};
use crate::tables::cmap::{Cmap, CmapSubtable, EncodingId, PlatformId};

/// The number of entries in a CID to glyph id map, one for every 16-bit code.
pub const CID_TO_GID_MAP_LEN: usize = 0x10000;

/// What to do when a character can't be mapped to a glyph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum NotdefPolicy {
    /// Substitute the `.notdef` glyph, glyph id 0.
    #[default]
    UseNotdef,
    /// Report `FontError::UnresolvedCharacter`.
    Error,
}

/// Resolves character codes against the preferred subtables of a `cmap` table.
pub struct CharMapResolver<'a> {
    subtables: Vec<CmapSubtable<'a>>,
    identity: bool,
    num_glyphs: u16,
}

/// A dense map from every 16-bit CID to a glyph id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidToGidMap {
    glyph_ids: Vec<u16>,
}

/// Platform and encoding pairs, most preferred first.
const SUBTABLE_PRIORITY: [(PlatformId, EncodingId); 3] = [
    (PlatformId::WINDOWS, EncodingId::WINDOWS_UNICODE_BMP_UCS2),
    (PlatformId::WINDOWS, EncodingId::WINDOWS_UNICODE_UCS4),
    (PlatformId::MACINTOSH, EncodingId::MACINTOSH_APPLE_ROMAN),
];

impl<'a> CharMapResolver<'a> {
    /// Select the subtables of `cmap` to resolve characters against.
    ///
    /// When none of the preferred subtables is present character codes are used as glyph ids.
    pub fn new(cmap: &Cmap<'a>, num_glyphs: u16) -> Result<Self, ParseError> {
        let mut subtables = Vec::new();
        for (platform_id, encoding_id) in SUBTABLE_PRIORITY {
            if let Some(record) = cmap.find_subtable(platform_id, encoding_id) {
                match cmap.read_subtable(&record) {
                    Ok(subtable) => subtables.push(subtable),
                    Err(err) => warn!(
                        "skipping unreadable cmap subtable ({}, {}): {}",
                        platform_id.0, encoding_id.0, err
                    ),
                }
            }
        }
        let identity = subtables.is_empty();
        Ok(CharMapResolver {
            subtables,
            identity,
            num_glyphs,
        })
    }

    /// A resolver for a font without a `cmap` table.
    pub fn identity(num_glyphs: u16) -> Self {
        CharMapResolver {
            subtables: Vec::new(),
            identity: true,
            num_glyphs,
        }
    }

    /// Whether character codes are used directly as glyph ids.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Resolve `code` to a glyph id.
    ///
    /// Mappings to the missing glyph, or to a glyph id the font doesn't have, fall through to the
    /// next subtable. `None` means no subtable maps `code`.
    pub fn resolve(&self, code: u32) -> Option<u16> {
        if self.identity {
            return u16::try_from(code)
                .ok()
                .filter(|&glyph_id| glyph_id < self.num_glyphs);
        }
        self.subtables
            .iter()
            .filter_map(|subtable| match subtable.map_glyph(code) {
                Ok(glyph_id) => glyph_id,
                Err(err) => {
                    warn!("cmap lookup for 0x{:04X} failed: {}", code, err);
                    None
                }
            })
            .find(|&glyph_id| glyph_id != 0 && glyph_id < self.num_glyphs)
    }

    /// Resolve `code` applying `policy` when it isn't mapped.
    pub fn resolve_with(&self, code: u32, policy: NotdefPolicy) -> Result<u16, FontError> {
        match self.resolve(code) {
            Some(glyph_id) => Ok(glyph_id),
            None => match policy {
                NotdefPolicy::UseNotdef => {
                    warn!("no glyph for character 0x{:04X}, using .notdef", code);
                    Ok(0)
                }
                NotdefPolicy::Error => Err(FontError::UnresolvedCharacter(code)),
            },
        }
    }

    /// Resolve every code in `0..=0xFFFF`, recording 0 for unresolved codes.
    pub fn build_full_map(&self) -> CidToGidMap {
        let glyph_ids = (0..CID_TO_GID_MAP_LEN as u32)
            .map(|code| self.resolve(code).unwrap_or(0))
            .collect();
        CidToGidMap { glyph_ids }
    }
}

impl CidToGidMap {
    pub fn len(&self) -> usize {
        self.glyph_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyph_ids.is_empty()
    }

    pub fn get(&self, cid: u16) -> u16 {
        self.glyph_ids.get(usize::from(cid)).copied().unwrap_or(0)
    }

    pub fn glyph_ids(&self) -> &[u16] {
        &self.glyph_ids
    }

    /// Serialise the map as big-endian glyph ids, two bytes per entry.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WriteError> {
        let mut buffer = WriteBuffer::with_capacity(self.glyph_ids.len() * 2);
        buffer.write_iter::<U16Be, _>(self.glyph_ids.iter().copied())?;
        Ok(buffer.into_inner())
    }

    /// Serialise the map and compress it with zlib (`FlateDecode`).
    #[cfg(feature = "flate2")]
    pub fn to_compressed_bytes(&self) -> Result<Vec<u8>, WriteError> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let bytes = self.to_bytes()?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&bytes)
            .map_err(|_err| WriteError::CompressionError)?;
        encoder.finish().map_err(|_err| WriteError::CompressionError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::tests::writer::{self, TtfType::*};

    // A format 6 subtable mapping `first_code..` to `glyph_ids`.
    fn format6(first_code: u16, glyph_ids: &[u16]) -> Vec<writer::TtfType> {
        let mut data = vec![
            UInt16(6),
            UInt16(10 + 2 * glyph_ids.len() as u16),
            UInt16(0),
            UInt16(first_code),
            UInt16(glyph_ids.len() as u16),
        ];
        data.extend(glyph_ids.iter().map(|&id| UInt16(id)));
        data
    }

    // A cmap table with one subtable per `(platform, encoding, subtable)`.
    fn cmap(subtables: &[(u16, u16, Vec<writer::TtfType>)]) -> Vec<u8> {
        let header_len = 4 + 8 * subtables.len();
        let mut header = vec![UInt16(0), UInt16(subtables.len() as u16)];
        let mut body = Vec::new();
        for (platform, encoding, subtable) in subtables {
            let offset = header_len + body.len();
            header.extend([UInt16(*platform), UInt16(*encoding), UInt32(offset as u32)]);
            body.extend(writer::convert(subtable));
        }
        let mut data = writer::convert(&header);
        data.extend(body);
        data
    }

    fn resolver(data: &[u8], num_glyphs: u16) -> CharMapResolver<'_> {
        let cmap = ReadScope::new(data).read::<Cmap<'_>>().unwrap();
        CharMapResolver::new(&cmap, num_glyphs).unwrap()
    }

    #[test]
    fn windows_is_preferred_over_mac() {
        let data = cmap(&[
            (1, 0, format6(0x41, &[7, 8])),
            (3, 1, format6(0x41, &[3, 0])),
        ]);
        let resolver = resolver(&data, 10);

        assert_eq!(resolver.resolve(0x41), Some(3));
        // Windows maps 0x42 to the missing glyph so the Mac subtable is consulted
        assert_eq!(resolver.resolve(0x42), Some(8));
        assert_eq!(resolver.resolve(0x43), None);
    }

    #[test]
    fn glyph_ids_past_the_end_are_unresolved() {
        let data = cmap(&[(3, 1, format6(0x20, &[1, 12]))]);
        let resolver = resolver(&data, 4);

        assert_eq!(resolver.resolve(0x20), Some(1));
        assert_eq!(resolver.resolve(0x21), None);
    }

    #[test]
    fn overflowing_group_falls_through() {
        let ucs4 = vec![
            UInt16(12),
            UInt16(0),
            UInt32(28),
            UInt32(0),
            UInt32(1),
            UInt32(0x41),
            UInt32(0x42),
            UInt32(0xFFFF_FFFF),
        ];
        let data = cmap(&[(3, 10, ucs4), (1, 0, format6(0x41, &[0, 5]))]);
        let resolver = resolver(&data, 10);

        assert_eq!(resolver.resolve(0x42), Some(5));
        assert_eq!(resolver.resolve(0x41), None);
        assert_eq!(resolver.build_full_map().get(0x42), 5);
    }

    #[test]
    fn other_platforms_fall_back_to_identity() {
        let data = cmap(&[(0, 3, format6(0x20, &[1]))]);
        let resolver = resolver(&data, 4);

        assert!(resolver.is_identity());
        assert_eq!(resolver.resolve(3), Some(3));
        assert_eq!(resolver.resolve(4), None);
    }

    #[test]
    fn notdef_policy() {
        let resolver = CharMapResolver::identity(2);

        assert_eq!(resolver.resolve_with(9, NotdefPolicy::UseNotdef), Ok(0));
        assert_eq!(
            resolver.resolve_with(9, NotdefPolicy::Error),
            Err(FontError::UnresolvedCharacter(9))
        );
    }

    #[test]
    fn full_map_covers_every_code() {
        let data = cmap(&[(3, 1, format6(0x30, &[1, 2, 3]))]);
        let map = resolver(&data, 4).build_full_map();

        assert_eq!(map.len(), CID_TO_GID_MAP_LEN);
        assert_eq!(map.get(0x30), 1);
        assert_eq!(map.get(0x32), 3);
        assert_eq!(map.get(0x33), 0);
        assert_eq!(map.get(0xFFFF), 0);

        let bytes = map.to_bytes().unwrap();
        assert_eq!(bytes.len(), 0x20000);
        assert_eq!(&bytes[0x60..0x66], &[0, 1, 0, 2, 0, 3]);
    }

    #[cfg(feature = "flate2")]
    #[test]
    fn compressed_map_inflates_to_raw_map() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let map = CharMapResolver::identity(300).build_full_map();
        let compressed = map.to_compressed_bytes().unwrap();
        let mut inflated = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();

        assert!(compressed.len() < inflated.len());
        assert_eq!(inflated, map.to_bytes().unwrap());
    }
}
