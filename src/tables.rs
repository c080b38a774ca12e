//! TrueType font table parsing.

pub mod cmap;
pub mod glyf;
pub mod loca;
pub mod os2;

use crate::binary::read::{
    ReadArray, ReadBinary, ReadBinaryDep, ReadCtxt, ReadFixed, ReadFrom, ReadScope,
};
use crate::binary::{I16Be, I32Be, U16Be, U32Be};
use crate::checksum;
use crate::error::ParseError;
use crate::tag::{self, DisplayTag};

use log::warn;
use std::borrow::Cow;
use std::convert::TryFrom;

/// Magic number identifying TrueType 1.0
///
/// The version number 1.0 as a 16.16 fixed-point value, indicating TrueType glyph data.
pub const TTF_MAGIC: u32 = 0x00010000;

/// Magic value used by older Apple TrueType fonts (`true`)
pub const TRUE_MAGIC: u32 = tag::TRUE;

/// Value of the `magicNumber` field of the `head` table
const HEAD_MAGIC: u32 = 0x5F0F3CF5;

/// 32-bit signed fixed-point number (16.16)
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fixed(i32);

pub trait FontTableProvider {
    /// Return data for the specified table if present
    fn table_data<'a>(&'a self, tag: u32) -> Result<Option<Cow<'a, [u8]>>, ParseError>;

    fn has_table(&self, tag: u32) -> bool;

    /// Return data for the specified table, or `MissingTable` if it's absent
    fn read_table_data<'a>(&'a self, tag: u32) -> Result<Cow<'a, [u8]>, ParseError> {
        self.table_data(tag)?.ok_or(ParseError::MissingTable(tag))
    }
}

/// The size of the offsets in the `loca` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/loca>
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexToLocFormat {
    /// Offsets are 16-bit. The actual local offset divided by 2 is stored.
    Short,
    /// Offsets are 32-bit. The actual local offset is stored.
    Long,
}

/// TrueType Offset Table (the table directory)
///
/// Every table record is checked against the bounds of the font data when the directory is
/// read, so a directory that reads successfully only refers to data that exists.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>
#[derive(Clone)]
pub struct OffsetTable<'a> {
    pub sfnt_version: u32,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
    pub table_records: ReadArray<'a, TableRecord>,
}

/// A `FontTableProvider` over the tables of a single TrueType font held in memory.
pub struct OffsetTableFontProvider<'a> {
    scope: ReadScope<'a>,
    offset_table: OffsetTable<'a>,
}

/// An entry in the Offset Table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Hash)]
pub struct TableRecord {
    pub table_tag: u32,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// `head` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/head>
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct HeadTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: Fixed,
    pub check_sum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub index_to_loc_format: IndexToLocFormat,
}

/// `hhea` horizontal header table
///
/// > This table contains information for horizontal layout.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/hhea>
///
/// This struct is also used for the `vhea` table, in which case `ascender`/`descender` are the
/// vertical typographic ascent/descent and `num_h_metrics` is `numOfLongVerMetrics`.
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct HheaTable {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub num_h_metrics: u16,
}

/// `hmtx` horizontal metrics table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx>
///
/// This struct is also used for `vmtx` table. The table owns its data so that a parsed font
/// can outlive the bytes it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct HmtxTable {
    pub h_metrics: Vec<LongHorMetric>,
    pub left_side_bearings: Vec<i16>,
}

/// A `longHorMetric` record in the `hmtx` table.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx>
///
/// This struct is also used for LongVerMetric `vmtx` table.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

/// maxp - Maximum profile
///
/// Only the glyph count is retained. Version 0.5 and 1.0 tables are accepted.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/maxp>
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct MaxpTable {
    pub version: u32,
    pub num_glyphs: u16,
}

/// `name` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/name>
pub struct NameTable<'a> {
    pub string_storage: ReadScope<'a>,
    pub name_records: ReadArray<'a, NameRecord>,
}

/// Record within the `name` table
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub length: u16,
    pub offset: u16,
}

impl<'a> OffsetTableFontProvider<'a> {
    /// Read the table directory at the start of `scope`.
    pub fn new(scope: ReadScope<'a>) -> Result<Self, ParseError> {
        let offset_table = scope.read::<OffsetTable<'_>>()?;
        Ok(OffsetTableFontProvider {
            scope,
            offset_table,
        })
    }

    pub fn offset_table(&self) -> &OffsetTable<'a> {
        &self.offset_table
    }

    /// Verify the checksum of every table, logging a warning for each mismatch.
    ///
    /// Returns the number of tables whose checksum did not match. Mismatches are common in
    /// fonts extracted from documents and are never treated as fatal.
    pub fn verify_checksums(&self) -> usize {
        let mut mismatches = 0;
        for record in &self.offset_table.table_records {
            match record.checksum_matches(&self.scope) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        "checksum mismatch in '{}' table",
                        DisplayTag(record.table_tag)
                    );
                    mismatches += 1;
                }
                Err(err) => {
                    warn!(
                        "unable to checksum '{}' table: {}",
                        DisplayTag(record.table_tag),
                        err
                    );
                    mismatches += 1;
                }
            }
        }
        mismatches
    }
}

impl ReadBinary for OffsetTable<'_> {
    type HostType<'a> = OffsetTable<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let font_scope = ctxt.scope();
        let sfnt_version = ctxt.read_u32be()?;
        match sfnt_version {
            TTF_MAGIC | TRUE_MAGIC => {
                let num_tables = ctxt.read_u16be()?;
                let search_range = ctxt.read_u16be()?;
                let entry_selector = ctxt.read_u16be()?;
                let range_shift = ctxt.read_u16be()?;
                let table_records = ctxt.read_array::<TableRecord>(usize::from(num_tables))?;
                for record in &table_records {
                    record.read_table(&font_scope)?;
                }
                Ok(OffsetTable {
                    sfnt_version,
                    search_range,
                    entry_selector,
                    range_shift,
                    table_records,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl<'a> FontTableProvider for OffsetTableFontProvider<'a> {
    fn table_data<'b>(&'b self, tag: u32) -> Result<Option<Cow<'b, [u8]>>, ParseError> {
        self.offset_table
            .read_table(&self.scope, tag)
            .map(|scope| scope.map(|scope| Cow::Borrowed(scope.data())))
    }

    fn has_table(&self, tag: u32) -> bool {
        self.offset_table.find_table_record(tag).is_some()
    }
}

impl ReadFrom for TableRecord {
    type ReadType = ((U32Be, U32Be), (U32Be, U32Be));

    fn read_from(((table_tag, checksum), (offset, length)): ((u32, u32), (u32, u32))) -> Self {
        TableRecord {
            table_tag,
            checksum,
            offset,
            length,
        }
    }
}

impl<'a> OffsetTable<'a> {
    pub fn find_table_record(&self, tag: u32) -> Option<TableRecord> {
        self.table_records
            .iter()
            .find(|table_record| table_record.table_tag == tag)
    }

    pub fn read_table(
        &self,
        scope: &ReadScope<'a>,
        tag: u32,
    ) -> Result<Option<ReadScope<'a>>, ParseError> {
        if let Some(table_record) = self.find_table_record(tag) {
            let table = table_record.read_table(scope)?;
            Ok(Some(table))
        } else {
            Ok(None)
        }
    }
}

impl TableRecord {
    pub const SIZE: usize = 4 * U32Be::SIZE;

    pub fn read_table<'a>(&self, scope: &ReadScope<'a>) -> Result<ReadScope<'a>, ParseError> {
        let offset = usize::try_from(self.offset)?;
        let length = usize::try_from(self.length)?;
        let end = offset.checked_add(length).ok_or(ParseError::BadOffset)?;
        if end > scope.data().len() {
            return Err(ParseError::BadOffset);
        }
        scope.offset_length(offset, length)
    }

    /// Compare the stored checksum with one calculated from the table data.
    ///
    /// The `checkSumAdjustment` field of the `head` table is excluded from its checksum.
    pub fn checksum_matches(&self, scope: &ReadScope<'_>) -> Result<bool, ParseError> {
        let table = self.read_table(scope)?;
        let mut sum = checksum::table_checksum(table.data())?;
        if self.table_tag == tag::HEAD {
            let adjustment = table.offset(8).ctxt().read_u32be()?;
            sum -= std::num::Wrapping(adjustment);
        }
        Ok(sum.0 == self.checksum)
    }
}

impl ReadBinary for HeadTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let major_version = ctxt.read::<U16Be>()?;
        let minor_version = ctxt.read::<U16Be>()?;
        ctxt.check_version(major_version == 1)?;
        let font_revision = ctxt.read::<Fixed>()?;
        let check_sum_adjustment = ctxt.read::<U32Be>()?;
        let magic_number = ctxt.read::<U32Be>()?;
        ctxt.check(magic_number == HEAD_MAGIC)?;
        let flags = ctxt.read::<U16Be>()?;
        let units_per_em = ctxt.read::<U16Be>()?;
        let _created = ctxt.read_i64be()?;
        let _modified = ctxt.read_i64be()?;
        let x_min = ctxt.read::<I16Be>()?;
        let y_min = ctxt.read::<I16Be>()?;
        let x_max = ctxt.read::<I16Be>()?;
        let y_max = ctxt.read::<I16Be>()?;
        let mac_style = ctxt.read::<U16Be>()?;
        let lowest_rec_ppem = ctxt.read::<U16Be>()?;
        let _font_direction_hint = ctxt.read::<I16Be>()?;
        let index_to_loc_format = ctxt.read::<IndexToLocFormat>()?;
        let _glyph_data_format = ctxt.read::<I16Be>()?;

        Ok(HeadTable {
            major_version,
            minor_version,
            font_revision,
            check_sum_adjustment,
            magic_number,
            flags,
            units_per_em,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            index_to_loc_format,
        })
    }
}

impl ReadBinary for HheaTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let major_version = ctxt.read_u16be()?;
        let _minor_version = ctxt.read_u16be()?;
        ctxt.check_version(major_version == 1)?;
        let ascender = ctxt.read_i16be()?;
        let descender = ctxt.read_i16be()?;
        let line_gap = ctxt.read_i16be()?;
        let advance_width_max = ctxt.read_u16be()?;
        let min_left_side_bearing = ctxt.read_i16be()?;
        let min_right_side_bearing = ctxt.read_i16be()?;
        let x_max_extent = ctxt.read_i16be()?;
        let caret_slope_rise = ctxt.read_i16be()?;
        let caret_slope_run = ctxt.read_i16be()?;
        let caret_offset = ctxt.read_i16be()?;
        let _reserved1 = ctxt.read_i16be()?;
        let _reserved2 = ctxt.read_i16be()?;
        let _reserved3 = ctxt.read_i16be()?;
        let _reserved4 = ctxt.read_i16be()?;
        let metric_data_format = ctxt.read_i16be()?;
        ctxt.check(metric_data_format == 0)?;
        let num_h_metrics = ctxt.read_u16be()?;

        Ok(HheaTable {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            num_h_metrics,
        })
    }
}

impl ReadBinaryDep for HmtxTable {
    type Args<'a> = (usize, usize); // num_glyphs, num_h_metrics
    type HostType<'a> = Self;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (num_glyphs, num_h_metrics): (usize, usize),
    ) -> Result<Self, ParseError> {
        // The trailing bearing count is `num_glyphs - num_h_metrics`, which can't be negative
        ctxt.check(num_h_metrics <= num_glyphs)?;
        ctxt.check(num_h_metrics > 0 || num_glyphs == 0)?;
        let h_metrics = ctxt.read_array::<LongHorMetric>(num_h_metrics)?;
        let num_bearings = num_glyphs - num_h_metrics;
        let left_side_bearings = ctxt.read_array_upto::<I16Be>(num_bearings)?;
        if left_side_bearings.len() < num_bearings {
            warn!(
                "metrics table truncated: {} of {} trailing side bearings present",
                left_side_bearings.len(),
                num_bearings
            );
        }
        Ok(HmtxTable {
            h_metrics: h_metrics.to_vec(),
            left_side_bearings: left_side_bearings.to_vec(),
        })
    }
}

impl HmtxTable {
    /// The number of glyphs this table has metrics for.
    pub fn len(&self) -> usize {
        self.h_metrics.len() + self.left_side_bearings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.h_metrics.is_empty()
    }

    /// Look up the advance and side bearing of `glyph_id`.
    ///
    /// Glyphs past the last long metric share its advance but have their own bearing in the
    /// trailing array. Returns `None` when the glyph isn't covered by the table.
    pub fn metric(&self, glyph_id: u16) -> Option<LongHorMetric> {
        let index = usize::from(glyph_id);
        if index >= self.len() {
            return None;
        }
        match self.h_metrics.get(index) {
            Some(metric) => Some(*metric),
            None => {
                let last = self.h_metrics.last()?;
                let lsb = *self.left_side_bearings.get(index - self.h_metrics.len())?;
                Some(LongHorMetric {
                    advance_width: last.advance_width,
                    lsb,
                })
            }
        }
    }

    pub fn horizontal_advance(&self, glyph_id: u16) -> Result<u16, ParseError> {
        self.metric(glyph_id)
            .map(|metric| metric.advance_width)
            .ok_or(ParseError::BadIndex)
    }
}

impl ReadFrom for LongHorMetric {
    type ReadType = (U16Be, I16Be);

    fn read_from((advance_width, lsb): (u16, i16)) -> Self {
        LongHorMetric { advance_width, lsb }
    }
}

impl ReadBinary for MaxpTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let version = ctxt.read_u32be()?;
        ctxt.check_version(version == 0x00005000 || version == 0x00010000)?;
        let num_glyphs = ctxt.read_u16be()?;
        Ok(MaxpTable {
            version,
            num_glyphs,
        })
    }
}

impl ReadBinary for NameTable<'_> {
    type HostType<'a> = NameTable<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let scope = ctxt.scope();

        let format = ctxt.read_u16be()?;
        ctxt.check(format <= 1)?;
        let count = usize::from(ctxt.read_u16be()?);
        let string_offset = usize::from(ctxt.read_u16be()?);
        let string_storage = scope.offset(string_offset);
        let name_records = ctxt.read_array::<NameRecord>(count)?;

        Ok(NameTable {
            string_storage,
            name_records,
        })
    }
}

impl ReadFrom for NameRecord {
    type ReadType = ((U16Be, U16Be, U16Be), (U16Be, U16Be, U16Be));

    fn read_from(
        ((platform_id, encoding_id, language_id), (name_id, length, offset)): (
            (u16, u16, u16),
            (u16, u16, u16),
        ),
    ) -> Self {
        NameRecord {
            platform_id,
            encoding_id,
            language_id,
            name_id,
            length,
            offset,
        }
    }
}

impl ReadBinary for IndexToLocFormat {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let index_to_loc_format = ctxt.read_i16be()?;

        match index_to_loc_format {
            0 => Ok(IndexToLocFormat::Short),
            1 => Ok(IndexToLocFormat::Long),
            _ => Err(ParseError::BadValue),
        }
    }
}

impl Fixed {
    pub fn new(value: i32) -> Fixed {
        Fixed(value)
    }

    pub fn raw_value(self) -> i32 {
        self.0
    }
}

impl ReadFrom for Fixed {
    type ReadType = I32Be;

    fn read_from(value: i32) -> Self {
        Fixed(value)
    }
}

impl From<Fixed> for f32 {
    fn from(value: Fixed) -> f32 {
        (f64::from(value.0) / 65536.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::{Fixed, FontTableProvider, HmtxTable, LongHorMetric, OffsetTableFontProvider};
    use crate::binary::read::ReadScope;
    use crate::error::ParseError;
    use crate::tag;
    use crate::tests::writer::{self, TtfType::*};

    fn hmtx(num_glyphs: usize, num_h_metrics: usize, data: &[u8]) -> Result<HmtxTable, ParseError> {
        ReadScope::new(data).read_dep::<HmtxTable>((num_glyphs, num_h_metrics))
    }

    #[test]
    fn test_hmtx_trailing_bearings() {
        let data = writer::convert(&[
            UInt16(500),
            Int16(10),
            UInt16(600),
            Int16(20),
            Int16(30),
            Int16(-5),
        ]);
        let table = hmtx(4, 2, &data).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(
            table.metric(1),
            Some(LongHorMetric {
                advance_width: 600,
                lsb: 20
            })
        );
        // First glyph past the long metrics takes the last advance and the first trailing bearing
        assert_eq!(
            table.metric(2),
            Some(LongHorMetric {
                advance_width: 600,
                lsb: 30
            })
        );
        assert_eq!(table.horizontal_advance(3), Ok(600));
        assert_eq!(table.metric(4), None);
    }

    #[test]
    fn test_hmtx_impossible_counts() {
        let data = writer::convert(&[UInt16(500), Int16(10), UInt16(600), Int16(20)]);

        assert_eq!(hmtx(1, 2, &data), Err(ParseError::BadValue));
        assert_eq!(hmtx(3, 0, &data), Err(ParseError::BadValue));
    }

    #[test]
    fn test_hmtx_truncated_bearings() {
        let data = writer::convert(&[UInt16(500), Int16(10), Int16(7)]);
        let table = hmtx(5, 1, &data).unwrap();

        assert_eq!(table.left_side_bearings, vec![7]);
        assert_eq!(table.metric(2), None);
    }

    #[test]
    fn test_directory_rejects_out_of_bounds_table() {
        let data = writer::convert(&[
            TrueTypeMagic,
            UInt16(1), // num tables
            UInt16(16),
            UInt16(0),
            UInt16(0),
            UInt32(tag::HEAD),
            UInt32(0),
            UInt32(28), // offset
            UInt32(54), // length, beyond the end of the data
            UInt32(0),
        ]);

        assert!(matches!(
            OffsetTableFontProvider::new(ReadScope::new(&data)),
            Err(ParseError::BadOffset)
        ));
    }

    #[test]
    fn test_directory_bad_version() {
        let data = writer::convert(&[OpenTypeMagic, UInt16(0), UInt16(0), UInt16(0), UInt16(0)]);

        assert!(matches!(
            OffsetTableFontProvider::new(ReadScope::new(&data)),
            Err(ParseError::BadVersion)
        ));
    }

    #[test]
    fn test_missing_table_reported_lazily() {
        let data = writer::convert(&[TrueTypeMagic, UInt16(0), UInt16(0), UInt16(0), UInt16(0)]);
        let provider = OffsetTableFontProvider::new(ReadScope::new(&data)).unwrap();

        assert!(!provider.has_table(tag::HMTX));
        assert_eq!(
            provider.read_table_data(tag::HMTX),
            Err(ParseError::MissingTable(tag::HMTX))
        );
    }

    #[test]
    fn test_checksums_of_synthetic_font() {
        let font = crate::tests::SyntheticFont::default().build();
        let provider = OffsetTableFontProvider::new(ReadScope::new(&font)).unwrap();

        assert_eq!(provider.verify_checksums(), 0);
    }

    #[test]
    fn f32_from_fixed() {
        assert_close(f32::from(Fixed(0x7fff_0000)), 32767.);
        assert_close(f32::from(Fixed(0x0001_0000)), 1.0);
        assert_close(f32::from(Fixed(0x0000_0000)), 0.0);
        assert_close(f32::from(Fixed(-0x000c_0000)), -12.0);
        assert_close(
            f32::from(Fixed(i32::from_be_bytes([0xff; 4]))),
            -0.000015259,
        );
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < std::f32::EPSILON,
            "{:?} != {:?} ± {}",
            actual,
            expected,
            std::f32::EPSILON
        );
    }
}
