//! Parsing of the `OS/2` table.

use crate::binary::read::{ReadBinaryDep, ReadCtxt};
use crate::error::ParseError;

/// `OS/2` table
///
/// Only the fields that feed font descriptors and vertical metrics are retained.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/os2>
#[derive(Debug, Clone, PartialEq)]
pub struct Os2 {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub s_family_class: i16,
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,

    // Note: Documentation for OS/2 version 0 in Apple’s TrueType Reference Manual stops at the
    // usLastCharIndex field and does not include the last five fields of the table as it was
    // defined by Microsoft. Some legacy TrueType fonts may have been built with a shortened
    // version 0 OS/2 table. Applications should check the table length for a version 0 OS/2 table
    // before reading these fields.
    pub s_typo_ascender: Option<i16>,
    pub s_typo_descender: Option<i16>,
    pub s_typo_line_gap: Option<i16>,
    pub us_win_ascent: Option<u16>,
    pub us_win_descent: Option<u16>,
    /// Present in version 2 and later.
    pub sx_height: Option<i16>,
    /// Present in version 2 and later.
    pub s_cap_height: Option<i16>,
}

const VERSION0_SHORT_LENGTH: usize = 68;
const VERSION0_LENGTH: usize = 78;
const VERSION2_LENGTH: usize = 96;

// The format of this table has changed over time. The original TrueType specification had this
// table at 68 bytes long. The first OpenType version had it at 78 bytes long, and the current
// OpenType version is even larger. To determine which kind of table your software is dealing with,
// it's best both to consider the table's version and its size.
impl ReadBinaryDep for Os2 {
    type Args<'a> = usize; // table length
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, table_length: usize) -> Result<Self, ParseError> {
        ctxt.check(table_length >= VERSION0_SHORT_LENGTH)?;
        let version = ctxt.read_u16be()?;
        let x_avg_char_width = ctxt.read_i16be()?;
        let us_weight_class = ctxt.read_u16be()?;
        let us_width_class = ctxt.read_u16be()?;
        let fs_type = ctxt.read_u16be()?;
        // subscript, superscript, and strikeout metrics
        let _ = ctxt.read_slice(10 * 2)?;
        let s_family_class = ctxt.read_i16be()?;
        let _panose = ctxt.read_slice(10)?;
        // unicode ranges and vendor id
        let _ = ctxt.read_slice(5 * 4)?;
        let fs_selection = ctxt.read_u16be()?;
        let us_first_char_index = ctxt.read_u16be()?;
        let us_last_char_index = ctxt.read_u16be()?;

        let has_typo_metrics = version > 0 || table_length >= VERSION0_LENGTH;
        let (s_typo_ascender, s_typo_descender, s_typo_line_gap, us_win_ascent, us_win_descent) =
            if has_typo_metrics {
                (
                    Some(ctxt.read_i16be()?),
                    Some(ctxt.read_i16be()?),
                    Some(ctxt.read_i16be()?),
                    Some(ctxt.read_u16be()?),
                    Some(ctxt.read_u16be()?),
                )
            } else {
                (None, None, None, None, None)
            };

        let (sx_height, s_cap_height) = if version >= 2 && table_length >= VERSION2_LENGTH {
            // ulCodePageRange1 and ulCodePageRange2 come before the heights
            let _ = ctxt.read_slice(2 * 4)?;
            (Some(ctxt.read_i16be()?), Some(ctxt.read_i16be()?))
        } else {
            (None, None)
        };

        Ok(Os2 {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            s_family_class,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            sx_height,
            s_cap_height,
        })
    }
}

impl Os2 {
    /// The IBM font class, the high byte of `sFamilyClass`.
    pub fn family_class_id(&self) -> u8 {
        (self.s_family_class >> 8) as u8
    }

    pub fn is_italic(&self) -> bool {
        self.fs_selection & 1 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::tests::writer::{self, TtfType::*};

    fn os2_data(version: u16, family_class: i16) -> Vec<writer::TtfType> {
        let mut values = vec![
            UInt16(version),
            Int16(500),
            UInt16(700),
            UInt16(3),
            UInt16(0),
        ];
        values.extend([Int16(0); 10]);
        values.push(Int16(family_class));
        values.extend([UInt8(0); 10]);
        values.extend([UInt32(0); 5]);
        values.extend([UInt16(0x0001), UInt16(0x20), UInt16(0x7E)]);
        values
    }

    #[test]
    fn short_version0() {
        let data = writer::convert(&os2_data(0, 0x0a02));
        assert_eq!(data.len(), VERSION0_SHORT_LENGTH);
        let os2 = ReadScope::new(&data).read_dep::<Os2>(data.len()).unwrap();

        assert_eq!(os2.us_weight_class, 700);
        assert_eq!(os2.us_width_class, 3);
        assert_eq!(os2.family_class_id(), 10);
        assert!(os2.is_italic());
        assert_eq!(os2.s_typo_ascender, None);
        assert_eq!(os2.s_cap_height, None);
    }

    #[test]
    fn version2_heights() {
        let mut values = os2_data(2, 0x0105);
        values.extend([Int16(800), Int16(-200), Int16(0), UInt16(900), UInt16(250)]);
        values.extend([UInt32(0), UInt32(0), Int16(480), Int16(690)]);
        values.extend([UInt16(0); 3]);
        let data = writer::convert(&values);
        assert_eq!(data.len(), VERSION2_LENGTH);
        let os2 = ReadScope::new(&data).read_dep::<Os2>(data.len()).unwrap();

        assert_eq!(os2.family_class_id(), 1);
        assert_eq!(os2.s_typo_descender, Some(-200));
        assert_eq!(os2.us_win_descent, Some(250));
        assert_eq!(os2.sx_height, Some(480));
        assert_eq!(os2.s_cap_height, Some(690));
    }

    #[test]
    fn truncated_table() {
        let data = writer::convert(&os2_data(0, 0));

        assert_eq!(
            ReadScope::new(&data[..40]).read_dep::<Os2>(VERSION0_SHORT_LENGTH),
            Err(ParseError::BadEof)
        );
    }
}
