//! Scaled glyph metrics.
//!
//! Font units are normalised to a 1000 unit em and then scaled to the requested point size, so a
//! scaling factor of `1000 / unitsPerEm * size / 1000` applies to every value.

use log::warn;

use crate::charmap::NotdefPolicy;
use crate::error::FontError;
use crate::font::FontTableSet;
use crate::tables::glyf::BoundingBox;
use crate::tables::{HmtxTable, LongHorMetric};

/// Options for metric lookups by character code.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MetricsOptions {
    pub notdef: NotdefPolicy,
}

/// Metrics of one glyph at a particular point size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlyphMetrics {
    pub glyph_id: u16,
    /// The factor that converts font units to this point size.
    pub scaling: f32,
    pub advance_width: f32,
    pub advance_height: f32,
    pub left_side_bearing: f32,
    /// Present when the font has vertical metrics.
    pub top_side_bearing: Option<f32>,
    /// `None` for glyphs without an outline.
    pub bounding_box: Option<ScaledBox>,
}

/// A bounding box in scaled units, lower left to upper right.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaledBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

/// Compute the factor that converts font units to `point_size`.
pub fn scaling(units_per_em: u16, point_size: f32) -> f32 {
    1000.0 / f32::from(units_per_em) * point_size / 1000.0
}

impl ScaledBox {
    pub fn new(bbox: BoundingBox, scale: f32) -> ScaledBox {
        ScaledBox {
            llx: f32::from(bbox.x_min) * scale,
            lly: f32::from(bbox.y_min) * scale,
            urx: f32::from(bbox.x_max) * scale,
            ury: f32::from(bbox.y_max) * scale,
        }
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

impl GlyphMetrics {
    /// Metrics for a glyph with no advance and no outline.
    fn empty(glyph_id: u16, scaling: f32) -> GlyphMetrics {
        GlyphMetrics {
            glyph_id,
            scaling,
            advance_width: 0.0,
            advance_height: 0.0,
            left_side_bearing: 0.0,
            top_side_bearing: None,
            bounding_box: None,
        }
    }
}

impl FontTableSet {
    /// Look up the metrics of `glyph_id` at `point_size`.
    ///
    /// Returns `GlyphOutOfRange` when the font has no such glyph.
    pub fn try_metrics_for(
        &self,
        glyph_id: u16,
        point_size: f32,
    ) -> Result<GlyphMetrics, FontError> {
        let num_glyphs = self.num_glyphs();
        if glyph_id >= num_glyphs {
            return Err(FontError::GlyphOutOfRange {
                glyph_id,
                num_glyphs,
            });
        }

        let scale = scaling(self.units_per_em(), point_size);
        let bbox = self.glyf_table().bounding_box(glyph_id);
        let horizontal = advance_metric(self.hmtx_table(), glyph_id, bbox);
        let advance_width = f32::from(horizontal.advance_width) * scale;
        let (advance_height, top_side_bearing) = match self.vmtx_table() {
            Some(vmtx) => match vmtx.metric(glyph_id) {
                Some(vertical) => (
                    f32::from(vertical.advance_width) * scale,
                    Some(f32::from(vertical.lsb) * scale),
                ),
                None => (advance_width, None),
            },
            None => (advance_width, None),
        };

        Ok(GlyphMetrics {
            glyph_id,
            scaling: scale,
            advance_width,
            advance_height,
            left_side_bearing: f32::from(horizontal.lsb) * scale,
            top_side_bearing,
            bounding_box: bbox.map(|bbox| ScaledBox::new(bbox, scale)),
        })
    }

    /// Look up the metrics of `glyph_id` at `point_size`, substituting glyph 0 when the font has
    /// no such glyph.
    pub fn metrics_for(&self, glyph_id: u16, point_size: f32) -> GlyphMetrics {
        match self.try_metrics_for(glyph_id, point_size) {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!("{}, using glyph 0", err);
                self.try_metrics_for(0, point_size).unwrap_or_else(|_| {
                    GlyphMetrics::empty(0, scaling(self.units_per_em(), point_size))
                })
            }
        }
    }

    /// Resolve `code` through the character map and look up the metrics of its glyph.
    pub fn metrics_for_char(
        &self,
        code: u32,
        point_size: f32,
        options: MetricsOptions,
    ) -> Result<GlyphMetrics, FontError> {
        let glyph_id = self.char_map()?.resolve_with(code, options.notdef)?;
        Ok(self.metrics_for(glyph_id, point_size))
    }
}

/// The advance and side bearing of `glyph_id`.
///
/// When the table doesn't cover the glyph a synthetic advance of the side bearing plus the
/// outline width is used, with the side bearing taken from the outline.
fn advance_metric(hmtx: &HmtxTable, glyph_id: u16, bbox: Option<BoundingBox>) -> LongHorMetric {
    if let Some(metric) = hmtx.metric(glyph_id) {
        return metric;
    }
    warn!(
        "no advance for glyph {} in table of {} entries, using outline",
        glyph_id,
        hmtx.len()
    );
    match bbox {
        Some(bbox) => {
            let lsb = bbox.x_min;
            let advance = i32::from(lsb) + bbox.width();
            LongHorMetric {
                advance_width: u16::try_from(advance.max(0)).unwrap_or(u16::MAX),
                lsb,
            }
        }
        None => LongHorMetric {
            advance_width: 0,
            lsb: 0,
        },
    }
}
