//! Classify text runs as horizontal or vertical.

use log::debug;

use crate::text::{Angle, Page, TextRun, WritingMode};

/// Decide whether a run is laid out vertically on the page.
///
/// Page rotations and run directions are bucketed into upright (0, 180) and sideways (90, 270).
/// A horizontal font reads vertically when the run direction is in the other bucket from the page
/// rotation. A vertical font reads vertically only when the two are in the same bucket.
pub fn is_vertical(page_rotation: Angle, direction: Angle, wmode: WritingMode) -> bool {
    let same_bucket = page_rotation.is_quarter_turn() == direction.is_quarter_turn();
    match wmode {
        WritingMode::Horizontal => !same_bucket,
        WritingMode::Vertical => same_bucket,
    }
}

/// Decide whether `run` is laid out vertically on the page.
pub fn run_is_vertical(run: &TextRun) -> bool {
    is_vertical(run.page_rotation, run.direction, run.wmode)
}

/// The writing mode of the majority of `runs`. Ties are horizontal.
pub fn dominant_mode<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> WritingMode {
    let (vertical, horizontal) = runs.into_iter().fold((0usize, 0usize), |(v, h), run| {
        if run_is_vertical(run) {
            (v + 1, h)
        } else {
            (v, h + 1)
        }
    });
    let mode = if vertical > horizontal {
        WritingMode::Vertical
    } else {
        WritingMode::Horizontal
    };
    debug!(
        "{} vertical, {} horizontal runs: {:?}",
        vertical, horizontal, mode
    );
    mode
}

/// The writing mode of the majority of runs across every article of `page`.
pub fn page_mode(page: &Page) -> WritingMode {
    dominant_mode(page.runs())
}
