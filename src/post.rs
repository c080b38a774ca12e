//! `post` table parsing.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/post>

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::U16Be;
use crate::error::ParseError;
use crate::tables::Fixed;
use log::warn;

/// `post` table
///
/// Glyph names are decoded up front so the table owns its data.
#[derive(Debug, Clone, PartialEq)]
pub struct PostTable {
    pub header: Header,
    /// Glyph names indexed by glyph id, empty for versions without names.
    pub glyph_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: i32,
    pub italic_angle: Fixed,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
}

impl ReadBinary for Header {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let version = ctxt.read_i32be()?;
        let italic_angle = ctxt.read::<Fixed>()?;
        let underline_position = ctxt.read_i16be()?;
        let underline_thickness = ctxt.read_i16be()?;
        let is_fixed_pitch = ctxt.read_u32be()?;
        let _min_mem_type_42 = ctxt.read_u32be()?;
        let _max_mem_type_42 = ctxt.read_u32be()?;
        let _min_mem_type_1 = ctxt.read_u32be()?;
        let _max_mem_type_1 = ctxt.read_u32be()?;

        Ok(Header {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
        })
    }
}

impl ReadBinary for PostTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let header = ctxt.read::<Header>()?;
        let glyph_names = match header.version {
            0x00010000 => FORMAT_1_NAMES.iter().map(|name| name.to_string()).collect(),
            0x00020000 => {
                // May include some Format 1 glyphs
                let num_glyphs = ctxt.read_u16be()?;
                let glyph_name_index = ctxt.read_array::<U16Be>(usize::from(num_glyphs))?;

                let num_names = glyph_name_index
                    .iter()
                    .map(usize::from)
                    .filter(|&index| index >= FORMAT_1_NAMES.len())
                    .map(|index| index - FORMAT_1_NAMES.len() + 1)
                    .max()
                    .unwrap_or(0);
                let mut names = Vec::with_capacity(num_names);
                for _ in 0..num_names {
                    let length = ctxt.read_u8()?;
                    let bytes = ctxt.read_slice(usize::from(length))?;
                    names.push(String::from_utf8_lossy(bytes).into_owned());
                }

                glyph_name_index
                    .iter()
                    .map(|name_index| {
                        let name_index = usize::from(name_index);
                        match FORMAT_1_NAMES.get(name_index) {
                            Some(name) => name.to_string(),
                            None => names[name_index - FORMAT_1_NAMES.len()].clone(),
                        }
                    })
                    .collect()
            }
            0x00025000 | 0x00030000 => Vec::new(),
            _ => return Err(ParseError::BadVersion),
        };

        Ok(PostTable {
            header,
            glyph_names,
        })
    }
}

impl PostTable {
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        self.glyph_names
            .get(usize::from(glyph_id))
            .map(String::as_str)
    }

    /// Find the first glyph with the name `name`.
    pub fn glyph_id_for_name(&self, name: &str) -> Option<u16> {
        let index = self.glyph_names.iter().position(|glyph_name| glyph_name == name)?;
        match u16::try_from(index) {
            Ok(glyph_id) => Some(glyph_id),
            Err(_) => {
                warn!("glyph name index {} out of range", index);
                None
            }
        }
    }

    pub fn is_fixed_pitch(&self) -> bool {
        self.header.is_fixed_pitch != 0
    }

    pub fn italic_angle(&self) -> f32 {
        f32::from(self.header.italic_angle)
    }
}

static FORMAT_1_NAMES: [&str; 258] = [
    ".notdef",
    ".null",
    "nonmarkingreturn",
    "space",
    "exclam",
    "quotedbl",
    "numbersign",
    "dollar",
    "percent",
    "ampersand",
    "quotesingle",
    "parenleft",
    "parenright",
    "asterisk",
    "plus",
    "comma",
    "hyphen",
    "period",
    "slash",
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "colon",
    "semicolon",
    "less",
    "equal",
    "greater",
    "question",
    "at",
    "A",
    "B",
    "C",
    "D",
    "E",
    "F",
    "G",
    "H",
    "I",
    "J",
    "K",
    "L",
    "M",
    "N",
    "O",
    "P",
    "Q",
    "R",
    "S",
    "T",
    "U",
    "V",
    "W",
    "X",
    "Y",
    "Z",
    "bracketleft",
    "backslash",
    "bracketright",
    "asciicircum",
    "underscore",
    "grave",
    "a",
    "b",
    "c",
    "d",
    "e",
    "f",
    "g",
    "h",
    "i",
    "j",
    "k",
    "l",
    "m",
    "n",
    "o",
    "p",
    "q",
    "r",
    "s",
    "t",
    "u",
    "v",
    "w",
    "x",
    "y",
    "z",
    "braceleft",
    "bar",
    "braceright",
    "asciitilde",
    "Adieresis",
    "Aring",
    "Ccedilla",
    "Eacute",
    "Ntilde",
    "Odieresis",
    "Udieresis",
    "aacute",
    "agrave",
    "acircumflex",
    "adieresis",
    "atilde",
    "aring",
    "ccedilla",
    "eacute",
    "egrave",
    "ecircumflex",
    "edieresis",
    "iacute",
    "igrave",
    "icircumflex",
    "idieresis",
    "ntilde",
    "oacute",
    "ograve",
    "ocircumflex",
    "odieresis",
    "otilde",
    "uacute",
    "ugrave",
    "ucircumflex",
    "udieresis",
    "dagger",
    "degree",
    "cent",
    "sterling",
    "section",
    "bullet",
    "paragraph",
    "germandbls",
    "registered",
    "copyright",
    "trademark",
    "acute",
    "dieresis",
    "notequal",
    "AE",
    "Oslash",
    "infinity",
    "plusminus",
    "lessequal",
    "greaterequal",
    "yen",
    "mu",
    "partialdiff",
    "summation",
    "product",
    "pi",
    "integral",
    "ordfeminine",
    "ordmasculine",
    "Omega",
    "ae",
    "oslash",
    "questiondown",
    "exclamdown",
    "logicalnot",
    "radical",
    "florin",
    "approxequal",
    "Delta",
    "guillemotleft",
    "guillemotright",
    "ellipsis",
    "nonbreakingspace",
    "Agrave",
    "Atilde",
    "Otilde",
    "OE",
    "oe",
    "endash",
    "emdash",
    "quotedblleft",
    "quotedblright",
    "quoteleft",
    "quoteright",
    "divide",
    "lozenge",
    "ydieresis",
    "Ydieresis",
    "fraction",
    "currency",
    "guilsinglleft",
    "guilsinglright",
    "fi",
    "fl",
    "daggerdbl",
    "periodcentered",
    "quotesinglbase",
    "quotedblbase",
    "perthousand",
    "Acircumflex",
    "Ecircumflex",
    "Aacute",
    "Edieresis",
    "Egrave",
    "Iacute",
    "Icircumflex",
    "Idieresis",
    "Igrave",
    "Oacute",
    "Ocircumflex",
    "apple",
    "Ograve",
    "Uacute",
    "Ucircumflex",
    "Ugrave",
    "dotlessi",
    "circumflex",
    "tilde",
    "macron",
    "breve",
    "dotaccent",
    "ring",
    "cedilla",
    "hungarumlaut",
    "ogonek",
    "caron",
    "Lslash",
    "lslash",
    "Scaron",
    "scaron",
    "Zcaron",
    "zcaron",
    "brokenbar",
    "Eth",
    "eth",
    "Yacute",
    "yacute",
    "Thorn",
    "thorn",
    "minus",
    "multiply",
    "onesuperior",
    "twosuperior",
    "threesuperior",
    "onehalf",
    "onequarter",
    "threequarters",
    "franc",
    "Gbreve",
    "gbreve",
    "Idotaccent",
    "Scedilla",
    "scedilla",
    "Cacute",
    "cacute",
    "Ccaron",
    "ccaron",
    "dcroat",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::tests::writer::{self, TtfType::*};

    fn header(version: i32) -> Vec<writer::TtfType> {
        vec![
            Int32(version),
            Int32(-0x000C_0000), // italic angle -12.0
            Int16(-100),
            Int16(50),
            UInt32(1), // fixed pitch
            UInt32(0),
            UInt32(0),
            UInt32(0),
            UInt32(0),
        ]
    }

    #[test]
    fn version_2_names() {
        let mut values = header(0x00020000);
        values.extend([
            UInt16(4),   // num glyphs
            UInt16(0),   // .notdef
            UInt16(43),  // H
            UInt16(259), // second custom name
            UInt16(258), // first custom name
            UInt8(3),
            Raw(b"uni"),
            UInt8(5),
            Raw(b"x.alt"),
        ]);
        let data = writer::convert(&values);
        let post = ReadScope::new(&data).read::<PostTable>().unwrap();

        assert_eq!(post.glyph_name(0), Some(".notdef"));
        assert_eq!(post.glyph_name(1), Some("H"));
        assert_eq!(post.glyph_name(2), Some("x.alt"));
        assert_eq!(post.glyph_name(3), Some("uni"));
        assert_eq!(post.glyph_name(4), None);
        assert_eq!(post.glyph_id_for_name("H"), Some(1));
        assert!(post.is_fixed_pitch());
        assert_eq!(post.italic_angle(), -12.0);
    }

    #[test]
    fn version_1_uses_standard_order() {
        let data = writer::convert(&header(0x00010000));
        let post = ReadScope::new(&data).read::<PostTable>().unwrap();

        assert_eq!(post.glyph_names.len(), 258);
        assert_eq!(post.glyph_id_for_name("x"), Some(91));
    }

    #[test]
    fn version_3_has_no_names() {
        let data = writer::convert(&header(0x00030000));
        let post = ReadScope::new(&data).read::<PostTable>().unwrap();

        assert_eq!(post.glyph_name(0), None);
        assert_eq!(post.header.underline_position, -100);
    }
}
