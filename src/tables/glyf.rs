//! Parsing of the `glyf` table.
//!
//! > This table contains information that describes the glyphs in the font in the TrueType outline
//! > format. Information regarding the rasterizer (scaler) refers to the TrueType rasterizer.
//!
//! — <https://docs.microsoft.com/en-us/typography/opentype/spec/glyf>
//!
//! Only the glyph header (contour count and bounding box) is decoded. Bounding boxes stay in font
//! units; scaling happens when metrics are resolved.

use std::convert::TryFrom;

use itertools::Itertools;
use log::warn;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadScope};
use crate::binary::I16Be;
use crate::error::ParseError;
use crate::tables::loca::LocaTable;

/// `glyf` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/glyf>
#[derive(Debug, PartialEq, Clone)]
pub struct GlyfTable {
    pub records: Vec<GlyfRecord>,
}

/// The header of one glyph, indexed by glyph id.
#[derive(Debug, PartialEq, Clone)]
pub enum GlyfRecord {
    /// A glyph without an outline, such as a space.
    Empty,
    Present {
        /// Negative for composite glyphs.
        number_of_contours: i16,
        bounding_box: BoundingBox,
    },
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct BoundingBox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl ReadBinaryDep for GlyfTable {
    type Args<'a> = &'a LocaTable<'a>;
    type HostType<'a> = Self;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        loca: Self::Args<'a>,
    ) -> Result<Self::HostType<'a>, ParseError> {
        if loca.offsets.len() < 2 {
            return Err(ParseError::BadIndex);
        }

        let glyf_scope = ctxt.scope();
        let glyph_records = loca
            .offsets
            .iter()
            .tuple_windows()
            .map(|(start, end)| match end.checked_sub(start) {
                Some(0) => Ok(GlyfRecord::Empty),
                Some(length) => {
                    let offset = usize::try_from(start)?;
                    match glyf_scope.offset_length(offset, usize::try_from(length)?) {
                        Ok(scope) => scope.read::<GlyfRecord>(),
                        Err(ParseError::BadEof) => {
                            // The length specified by `loca` runs past the end of the `glyf`
                            // table. Some fonts have a final offset that is slightly too large
                            // while the glyph itself is intact, so try the header on its own.
                            warn!("glyph length out of bounds, trying to parse");
                            glyf_scope.offset(offset).read::<GlyfRecord>()
                        }
                        Err(err) => Err(err),
                    }
                }
                None => Err(ParseError::BadOffset),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GlyfTable {
            records: glyph_records,
        })
    }
}

impl ReadBinary for GlyfRecord {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let number_of_contours = ctxt.read::<I16Be>()?;
        let bounding_box = ctxt.read::<BoundingBox>()?;
        Ok(GlyfRecord::Present {
            number_of_contours,
            bounding_box,
        })
    }
}

impl ReadBinary for BoundingBox {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let x_min = ctxt.read::<I16Be>()?;
        let y_min = ctxt.read::<I16Be>()?;
        let x_max = ctxt.read::<I16Be>()?;
        let y_max = ctxt.read::<I16Be>()?;

        Ok(BoundingBox {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }
}

impl GlyfTable {
    /// Number of glyphs in the table.
    pub fn num_glyphs(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, glyph_id: u16) -> Option<&GlyfRecord> {
        self.records.get(usize::from(glyph_id))
    }

    /// The bounding box of `glyph_id`, `None` if the glyph is empty or doesn't exist.
    pub fn bounding_box(&self, glyph_id: u16) -> Option<BoundingBox> {
        match self.record(glyph_id)? {
            GlyfRecord::Empty => None,
            GlyfRecord::Present { bounding_box, .. } => Some(*bounding_box),
        }
    }
}

impl GlyfRecord {
    pub fn is_composite(&self) -> bool {
        matches!(self, GlyfRecord::Present { number_of_contours, .. } if *number_of_contours < 0)
    }
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        i32::from(self.x_max) - i32::from(self.x_min)
    }

    pub fn height(&self) -> i32 {
        i32::from(self.y_max) - i32::from(self.y_min)
    }
}

/// Read the glyph headers for every glyph in `loca` from `glyf_data`.
pub fn read_glyf_table(glyf_data: &[u8], loca: &LocaTable<'_>) -> Result<GlyfTable, ParseError> {
    ReadScope::new(glyf_data).read_dep::<GlyfTable>(loca)
}
