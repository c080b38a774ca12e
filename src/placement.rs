//! Where a glyph's outline lands on the page.

use crate::error::FontError;
use crate::font::FontTableSet;
use crate::glyph_metrics::{GlyphMetrics, ScaledBox};
use crate::text::{TextRun, WritingMode};
use crate::writing_mode;

/// A rectangle on the page: its origin and size in page units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlyphBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// How a run is laid out, which decides how its glyph boxes are placed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Layout {
    Horizontal,
    /// Vertical text in a vertical font. Glyphs are centred on the run's x position.
    Vertical,
    /// Horizontal text turned on its side, so the outline's x and y axes are swapped.
    Rotated,
}

impl Layout {
    /// Classify `run`.
    pub fn of_run(run: &TextRun) -> Layout {
        if !writing_mode::run_is_vertical(run) {
            Layout::Horizontal
        } else {
            match run.wmode {
                WritingMode::Vertical => Layout::Vertical,
                WritingMode::Horizontal => Layout::Rotated,
            }
        }
    }
}

/// Place the outline of a glyph of `run`, whose metrics at the run's size are `metrics`.
///
/// Glyphs without an outline are placed as an empty box at the glyph origin.
pub fn place_glyph(
    run: &TextRun,
    metrics: &GlyphMetrics,
    font: &FontTableSet,
    layout: Layout,
) -> GlyphBox {
    let bbox = metrics.bounding_box.unwrap_or(ScaledBox {
        llx: 0.0,
        lly: 0.0,
        urx: 0.0,
        ury: 0.0,
    });
    let (width, height) = (bbox.width(), bbox.height());

    match layout {
        Layout::Horizontal => GlyphBox {
            x: run.x + bbox.llx,
            y: run.y + bbox.lly,
            width,
            height,
        },
        Layout::Vertical => {
            let descender = f32::from(font.descender()).abs() * metrics.scaling;
            let delta_y = (bbox.lly + descender).abs();
            GlyphBox {
                x: run.x - metrics.advance_width / 2.0 + bbox.llx,
                y: run.y.floor() - metrics.advance_height + delta_y,
                width,
                height,
            }
        }
        Layout::Rotated => GlyphBox {
            x: run.x + bbox.lly,
            y: run.y - bbox.llx - width,
            width: height,
            height: width,
        },
    }
}

/// Place the outline of the glyph for `code` in `run`, resolving it through the font's character
/// map and scaling it to the run's font size. Unmapped codes are placed as `.notdef`.
pub fn place_char(
    run: &TextRun,
    code: u32,
    font: &FontTableSet,
) -> Result<GlyphBox, FontError> {
    let glyph_id = font.char_map()?.resolve(code).unwrap_or(0);
    let metrics = font.metrics_for(glyph_id, run.font_size);
    Ok(place_glyph(run, &metrics, font, Layout::of_run(run)))
}
