//! A parsed TrueType font.
//!
//! [FontTableSet] holds every table needed to resolve glyphs and metrics. It owns its data so it
//! can be shared between threads and outlive the bytes it was parsed from.

use std::borrow::Cow;
use std::convert::TryFrom;

use log::{debug, warn};

use crate::binary::read::ReadScope;
use crate::charmap::CharMapResolver;
use crate::error::{FontError, ParseError};
use crate::get_name::{FAMILY_NAME, FULL_NAME, POSTSCRIPT_NAME, SUBFAMILY_NAME};
use crate::post::PostTable;
use crate::tables::cmap::Cmap;
use crate::tables::glyf::{BoundingBox, GlyfTable};
use crate::tables::loca::LocaTable;
use crate::tables::os2::Os2;
use crate::tables::{
    FontTableProvider, HeadTable, HheaTable, HmtxTable, MaxpTable, NameTable,
    OffsetTableFontProvider,
};
use crate::tag::{self, DisplayTag};

/// The tables of one TrueType font, parsed once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FontTableSet {
    head: HeadTable,
    maxp: MaxpTable,
    hhea: HheaTable,
    hmtx: HmtxTable,
    vertical: Option<(HheaTable, HmtxTable)>,
    glyf: GlyfTable,
    os2: Option<Os2>,
    post: Option<PostTable>,
    names: FontNames,
    cmap_table: Option<Box<[u8]>>,
}

/// Strings from the `name` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontNames {
    pub family: Option<String>,
    pub subfamily: Option<String>,
    pub full_name: Option<String>,
    pub postscript_name: Option<String>,
}

impl FontTableSet {
    /// Parse a TrueType font held in memory.
    pub fn parse(data: &[u8]) -> Result<FontTableSet, FontError> {
        let provider = OffsetTableFontProvider::new(ReadScope::new(data))?;
        let mismatches = provider.verify_checksums();
        if mismatches > 0 {
            debug!("{} table checksum(s) did not match", mismatches);
        }
        let font = FontTableSet::new(&provider)?;
        Ok(font)
    }

    /// Read the tables of a font from `provider`.
    ///
    /// `head`, `maxp`, `hhea`, `hmtx`, `loca`, and `glyf` are required. A required table that is
    /// absent is reported as `MissingTable`. The remaining tables are optional: fonts embedded in
    /// documents are frequently subset down to the bare minimum.
    pub fn new(provider: &impl FontTableProvider) -> Result<FontTableSet, ParseError> {
        let head = ReadScope::new(&provider.read_table_data(tag::HEAD)?).read::<HeadTable>()?;
        if head.units_per_em == 0 {
            return Err(ParseError::BadValue);
        }
        let maxp = ReadScope::new(&provider.read_table_data(tag::MAXP)?).read::<MaxpTable>()?;
        let num_glyphs = maxp.num_glyphs;

        let hhea = ReadScope::new(&provider.read_table_data(tag::HHEA)?).read::<HheaTable>()?;
        let hmtx = ReadScope::new(&provider.read_table_data(tag::HMTX)?).read_dep::<HmtxTable>(
            (usize::from(num_glyphs), usize::from(hhea.num_h_metrics)),
        )?;
        let vertical = load_vertical_metrics(provider, num_glyphs)?;

        let loca_data = provider.read_table_data(tag::LOCA)?;
        let loca = ReadScope::new(&loca_data)
            .read_dep::<LocaTable<'_>>((num_glyphs, head.index_to_loc_format))?;
        let glyf_data = provider.read_table_data(tag::GLYF)?;
        let glyf = ReadScope::new(&glyf_data).read_dep::<GlyfTable>(&loca)?;

        let os2 = load_optional(provider, tag::OS_2, |data| {
            ReadScope::new(data).read_dep::<Os2>(data.len())
        })?;
        let post = load_optional(provider, tag::POST, |data| {
            ReadScope::new(data).read::<PostTable>()
        })?;
        let names = load_optional(provider, tag::NAME, |data| {
            let name_table = ReadScope::new(data).read::<NameTable<'_>>()?;
            Ok(FontNames::from_name_table(&name_table))
        })?
        .unwrap_or_default();
        let cmap_table = read_and_box_optional_table(provider, tag::CMAP)?;

        Ok(FontTableSet {
            head,
            maxp,
            hhea,
            hmtx,
            vertical,
            glyf,
            os2,
            post,
            names,
            cmap_table,
        })
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    /// The font-wide bounding box from the `head` table, in font units.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x_min: self.head.x_min,
            y_min: self.head.y_min,
            x_max: self.head.x_max,
            y_max: self.head.y_max,
        }
    }

    pub fn ascender(&self) -> i16 {
        self.hhea.ascender
    }

    pub fn descender(&self) -> i16 {
        self.hhea.descender
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp.num_glyphs
    }

    pub fn num_h_metrics(&self) -> u16 {
        self.hhea.num_h_metrics
    }

    /// The number of long vertical metrics, if the font has vertical metrics.
    pub fn num_v_metrics(&self) -> Option<u16> {
        self.vertical.as_ref().map(|(vhea, _)| vhea.num_h_metrics)
    }

    pub fn head_table(&self) -> &HeadTable {
        &self.head
    }

    pub fn hhea_table(&self) -> &HheaTable {
        &self.hhea
    }

    pub fn hmtx_table(&self) -> &HmtxTable {
        &self.hmtx
    }

    pub fn vhea_table(&self) -> Option<&HheaTable> {
        self.vertical.as_ref().map(|(vhea, _)| vhea)
    }

    pub fn vmtx_table(&self) -> Option<&HmtxTable> {
        self.vertical.as_ref().map(|(_, vmtx)| vmtx)
    }

    pub fn glyf_table(&self) -> &GlyfTable {
        &self.glyf
    }

    pub fn os2_table(&self) -> Option<&Os2> {
        self.os2.as_ref()
    }

    pub fn post_table(&self) -> Option<&PostTable> {
        self.post.as_ref()
    }

    pub fn names(&self) -> &FontNames {
        &self.names
    }

    /// The raw `cmap` table, if present.
    pub fn cmap_data(&self) -> Option<&[u8]> {
        self.cmap_table.as_deref()
    }

    /// Build a resolver over the character map subtables of this font.
    pub fn char_map(&self) -> Result<CharMapResolver<'_>, ParseError> {
        match self.cmap_data() {
            Some(data) => {
                let cmap = ReadScope::new(data).read::<Cmap<'_>>()?;
                CharMapResolver::new(&cmap, self.num_glyphs())
            }
            None => Ok(CharMapResolver::identity(self.num_glyphs())),
        }
    }

    /// The unscaled bounding box of the glyph with the given post script name.
    pub fn bounding_box_for_name(&self, name: &str) -> Option<BoundingBox> {
        let glyph_id = self.post.as_ref()?.glyph_id_for_name(name)?;
        self.glyf.bounding_box(glyph_id)
    }
}

impl FontNames {
    fn from_name_table(name_table: &NameTable<'_>) -> FontNames {
        FontNames {
            family: name_table.string_for_id(FAMILY_NAME),
            subfamily: name_table.string_for_id(SUBFAMILY_NAME),
            full_name: name_table.string_for_id(FULL_NAME),
            postscript_name: name_table.string_for_id(POSTSCRIPT_NAME),
        }
    }
}

fn load_vertical_metrics(
    provider: &impl FontTableProvider,
    num_glyphs: u16,
) -> Result<Option<(HheaTable, HmtxTable)>, ParseError> {
    let vhea_data = provider.table_data(tag::VHEA)?;
    let vmtx_data = provider.table_data(tag::VMTX)?;
    match (vhea_data, vmtx_data) {
        (Some(vhea_data), Some(vmtx_data)) => {
            let vhea = match ReadScope::new(&vhea_data).read::<HheaTable>() {
                Ok(vhea) => vhea,
                Err(err) => {
                    warn!("ignoring unreadable 'vhea' table: {}", err);
                    return Ok(None);
                }
            };
            let vmtx = ReadScope::new(&vmtx_data).read_dep::<HmtxTable>((
                usize::from(num_glyphs),
                usize::from(vhea.num_h_metrics),
            ));
            match vmtx {
                Ok(vmtx) => Ok(Some((vhea, vmtx))),
                // A metric count that disagrees with the glyph count is malformed
                Err(ParseError::BadValue) => Err(ParseError::BadValue),
                Err(err) => {
                    warn!("ignoring unreadable 'vmtx' table: {}", err);
                    Ok(None)
                }
            }
        }
        (Some(_), None) => {
            warn!("font has a 'vhea' table but no 'vmtx' table");
            Ok(None)
        }
        (None, Some(_)) => {
            warn!("font has a 'vmtx' table but no 'vhea' table");
            Ok(None)
        }
        (None, None) => Ok(None),
    }
}

/// Load an optional table, treating a table that fails to parse as absent.
fn load_optional<T>(
    provider: &impl FontTableProvider,
    tag: u32,
    load: impl FnOnce(&[u8]) -> Result<T, ParseError>,
) -> Result<Option<T>, ParseError> {
    match provider.table_data(tag)? {
        Some(data) => match load(&data) {
            Ok(table) => Ok(Some(table)),
            Err(err) => {
                warn!("ignoring unreadable '{}' table: {}", DisplayTag(tag), err);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

fn read_and_box_optional_table(
    provider: &impl FontTableProvider,
    tag: u32,
) -> Result<Option<Box<[u8]>>, ParseError> {
    Ok(provider
        .table_data(tag)?
        .map(|table: Cow<'_, [u8]>| Box::from(table.into_owned())))
}

impl TryFrom<&[u8]> for FontTableSet {
    type Error = FontError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        FontTableSet::parse(data)
    }
}
