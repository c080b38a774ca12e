//! Font descriptor metadata derived from a parsed font.
//!
//! Lengths are expressed in a 1000 unit em, the glyph space of document font descriptors.

use bitflags::bitflags;

use crate::font::FontTableSet;
use crate::glyph_metrics::ScaledBox;

bitflags! {
    /// Font descriptor flags.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct DescriptorFlags: u32 {
        const FIXED_PITCH = 1 << 0;
        const SERIF = 1 << 1;
        const SYMBOLIC = 1 << 2;
        const SCRIPT = 1 << 3;
        const NONSYMBOLIC = 1 << 5;
        const ITALIC = 1 << 6;
        const ALL_CAP = 1 << 16;
        const SMALL_CAP = 1 << 17;
        const FORCE_BOLD = 1 << 18;
    }
}

/// Width of the glyphs relative to the normal width of the family, from `usWidthClass`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FontStretch {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontDescriptor {
    pub font_name: Option<String>,
    pub font_family: Option<String>,
    pub flags: DescriptorFlags,
    pub font_stretch: Option<FontStretch>,
    pub font_weight: Option<u16>,
    pub font_bbox: ScaledBox,
    pub italic_angle: f32,
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: Option<f32>,
    pub x_height: Option<f32>,
    pub stem_v: f32,
}

// IBM font classes, the high byte of sFamilyClass
const CLASS_OLDSTYLE_SERIFS: u8 = 1;
const CLASS_TRANSITIONAL_SERIFS: u8 = 2;
const CLASS_MODERN_SERIFS: u8 = 3;
const CLASS_CLARENDON_SERIFS: u8 = 4;
const CLASS_SLAB_SERIFS: u8 = 5;
const CLASS_FREEFORM_SERIFS: u8 = 7;
const CLASS_SCRIPTS: u8 = 10;
const CLASS_SYMBOLIC: u8 = 12;

// TrueType fonts don't record a dominant stem width, approximate it from the bounding box
const STEM_V_RATIO: f32 = 0.13;

impl FontStretch {
    pub fn from_width_class(width_class: u16) -> Option<FontStretch> {
        match width_class {
            1 => Some(FontStretch::UltraCondensed),
            2 => Some(FontStretch::ExtraCondensed),
            3 => Some(FontStretch::Condensed),
            4 => Some(FontStretch::SemiCondensed),
            5 => Some(FontStretch::Normal),
            6 => Some(FontStretch::SemiExpanded),
            7 => Some(FontStretch::Expanded),
            8 => Some(FontStretch::ExtraExpanded),
            9 => Some(FontStretch::UltraExpanded),
            _ => None,
        }
    }

    /// The name used for this stretch in font descriptors.
    pub fn name(self) -> &'static str {
        match self {
            FontStretch::UltraCondensed => "UltraCondensed",
            FontStretch::ExtraCondensed => "ExtraCondensed",
            FontStretch::Condensed => "Condensed",
            FontStretch::SemiCondensed => "SemiCondensed",
            FontStretch::Normal => "Normal",
            FontStretch::SemiExpanded => "SemiExpanded",
            FontStretch::Expanded => "Expanded",
            FontStretch::ExtraExpanded => "ExtraExpanded",
            FontStretch::UltraExpanded => "UltraExpanded",
        }
    }
}

impl FontDescriptor {
    /// Derive a descriptor for `font`.
    pub fn from_font(font: &FontTableSet) -> FontDescriptor {
        let scale = 1000.0 / f32::from(font.units_per_em());
        let os2 = font.os2_table();
        let post = font.post_table();

        let mut flags = DescriptorFlags::empty();
        let family_class = os2.map(|os2| os2.family_class_id()).unwrap_or(0);
        match family_class {
            CLASS_OLDSTYLE_SERIFS
            | CLASS_TRANSITIONAL_SERIFS
            | CLASS_MODERN_SERIFS
            | CLASS_CLARENDON_SERIFS
            | CLASS_SLAB_SERIFS
            | CLASS_FREEFORM_SERIFS => flags |= DescriptorFlags::SERIF,
            CLASS_SCRIPTS => flags |= DescriptorFlags::SCRIPT,
            _ => {}
        }
        if family_class == CLASS_SYMBOLIC {
            flags |= DescriptorFlags::SYMBOLIC;
        } else {
            flags |= DescriptorFlags::NONSYMBOLIC;
        }
        if post.is_some_and(|post| post.is_fixed_pitch()) {
            flags |= DescriptorFlags::FIXED_PITCH;
        }
        let italic_angle = post.map(|post| post.italic_angle()).unwrap_or(0.0);
        if italic_angle != 0.0 {
            flags |= DescriptorFlags::ITALIC;
        }

        let font_bbox = ScaledBox::new(font.bounding_box(), scale);
        let cap_height = font
            .bounding_box_for_name("H")
            .map(|bbox| f32::from(bbox.y_max))
            .or_else(|| os2.and_then(|os2| os2.s_cap_height).map(f32::from))
            .map(|height| height * scale);
        let x_height = font
            .bounding_box_for_name("x")
            .map(|bbox| f32::from(bbox.y_max))
            .or_else(|| os2.and_then(|os2| os2.sx_height).map(f32::from))
            .map(|height| height * scale);

        FontDescriptor {
            font_name: font.names().postscript_name.clone(),
            font_family: font.names().family.clone(),
            flags,
            font_stretch: os2.and_then(|os2| FontStretch::from_width_class(os2.us_width_class)),
            font_weight: os2.map(|os2| os2.us_weight_class),
            font_bbox,
            italic_angle,
            ascent: f32::from(font.ascender()) * scale,
            descent: f32::from(font.descender()) * scale,
            cap_height,
            x_height,
            stem_v: font_bbox.width() * STEM_V_RATIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;
    use crate::tests::SyntheticFont;

    fn descriptor(font: SyntheticFont) -> FontDescriptor {
        FontDescriptor::from_font(&FontTableSet::parse(&font.build()).unwrap())
    }

    #[test]
    fn descriptor_from_synthetic_font() {
        let descriptor = descriptor(SyntheticFont::default());

        assert_eq!(descriptor.font_name.as_deref(), Some("Synthetic-Regular"));
        assert_eq!(descriptor.font_family.as_deref(), Some("Synthetic"));
        assert_eq!(
            descriptor.flags,
            DescriptorFlags::SERIF | DescriptorFlags::NONSYMBOLIC
        );
        assert_eq!(descriptor.font_stretch, Some(FontStretch::Normal));
        assert_eq!(descriptor.font_weight, Some(400));
        assert_eq!(descriptor.ascent, 800.0);
        assert_eq!(descriptor.descent, -200.0);
        assert_eq!(descriptor.cap_height, Some(700.0));
        assert_eq!(descriptor.x_height, Some(500.0));
        assert_eq!(descriptor.font_bbox.width(), 1050.0);
        assert!((descriptor.stem_v - 136.5).abs() < 1e-3);
    }

    #[test]
    fn lengths_scale_to_thousand_unit_em() {
        let descriptor = descriptor(SyntheticFont {
            units_per_em: 2000,
            ..SyntheticFont::default()
        });

        assert_eq!(descriptor.ascent, 400.0);
        assert_eq!(descriptor.font_bbox.llx, -25.0);
        assert_eq!(descriptor.cap_height, Some(350.0));
    }

    #[test]
    fn heights_fall_back_to_os2() {
        let descriptor = descriptor(SyntheticFont {
            omit_tables: vec![tag::POST],
            ..SyntheticFont::default()
        });

        assert_eq!(descriptor.cap_height, Some(690.0));
        assert_eq!(descriptor.x_height, Some(480.0));
    }

    #[test]
    fn symbolic_script_italic_fixed() {
        let symbolic = descriptor(SyntheticFont {
            family_class: 12 << 8,
            ..SyntheticFont::default()
        });
        assert_eq!(symbolic.flags, DescriptorFlags::SYMBOLIC);

        let script = descriptor(SyntheticFont {
            family_class: (10 << 8) | 3,
            italic_angle: -12 << 16,
            is_fixed_pitch: true,
            ..SyntheticFont::default()
        });
        assert_eq!(
            script.flags,
            DescriptorFlags::SCRIPT
                | DescriptorFlags::NONSYMBOLIC
                | DescriptorFlags::ITALIC
                | DescriptorFlags::FIXED_PITCH
        );
        assert_eq!(script.italic_angle, -12.0);
    }

    #[test]
    fn stretch_names() {
        assert_eq!(FontStretch::from_width_class(0), None);
        assert_eq!(
            FontStretch::from_width_class(9).map(FontStretch::name),
            Some("UltraExpanded")
        );
    }
}
