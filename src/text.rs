//! Positioned text runs and the interfaces they are obtained through.

use std::fmt;

use crate::error::FontError;
use crate::resource::FontKey;

/// A rotation in multiples of 90 degrees, clockwise.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Angle {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// The writing mode declared by a font's encoding.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum WritingMode {
    #[default]
    Horizontal,
    Vertical,
}

/// A run of glyphs positioned on a page.
///
/// Coordinates use an upper left origin: `y` grows down the page and is the baseline of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// The characters of the run. May hold several code points for a ligature.
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub direction: Angle,
    pub page_rotation: Angle,
    pub wmode: WritingMode,
    pub width: f32,
    pub height: f32,
    pub font: FontKey,
    pub font_size: f32,
}

/// A disjoint region of text on a page, such as a column or a text frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Article {
    pub runs: Vec<TextRun>,
}

/// The articles of one page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub articles: Vec<Article>,
}

/// Supplies the positioned runs of each page, grouped by article.
pub trait PageSource {
    fn num_pages(&self) -> usize;

    fn page(&self, index: usize) -> Option<Page>;
}

/// Supplies the raw bytes and declared writing mode of embedded fonts.
pub trait FontSource {
    fn font_data(&self, font: &FontKey) -> Result<Vec<u8>, FontError>;

    fn writing_mode(&self, font: &FontKey) -> WritingMode;
}

impl Angle {
    /// Normalise `degrees` to the nearest quarter turn.
    pub fn from_degrees(degrees: f32) -> Angle {
        let quarter_turns = (degrees / 90.0).round().rem_euclid(4.0);
        match quarter_turns as u8 {
            1 => Angle::Deg90,
            2 => Angle::Deg180,
            3 => Angle::Deg270,
            _ => Angle::Deg0,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Angle::Deg0 => 0,
            Angle::Deg90 => 90,
            Angle::Deg180 => 180,
            Angle::Deg270 => 270,
        }
    }

    /// `true` for 90 and 270 degrees.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Angle::Deg90 | Angle::Deg270)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl WritingMode {
    /// Interpret the `WMode` value of an encoding. Anything other than 1 is horizontal.
    pub fn from_wmode(wmode: i32) -> WritingMode {
        if wmode == 1 {
            WritingMode::Vertical
        } else {
            WritingMode::Horizontal
        }
    }
}

impl TextRun {
    /// A horizontal, unrotated run in `font`.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font: FontKey) -> TextRun {
        TextRun {
            text: text.into(),
            x,
            y,
            direction: Angle::Deg0,
            page_rotation: Angle::Deg0,
            wmode: WritingMode::Horizontal,
            width: 0.0,
            height: 0.0,
            font,
            font_size: 0.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> TextRun {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_direction(mut self, direction: Angle, page_rotation: Angle) -> TextRun {
        self.direction = direction;
        self.page_rotation = page_rotation;
        self
    }

    pub fn with_wmode(mut self, wmode: WritingMode) -> TextRun {
        self.wmode = wmode;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> TextRun {
        self.font_size = font_size;
        self
    }
}

impl Article {
    pub fn new(runs: Vec<TextRun>) -> Article {
        Article { runs }
    }

    pub fn first_run(&self) -> Option<&TextRun> {
        self.runs.first()
    }
}

impl Page {
    pub fn new(articles: Vec<Article>) -> Page {
        Page { articles }
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.articles.iter().flat_map(|article| article.runs.iter())
    }

    /// Give every run the writing mode that `fonts` declares for the run's font.
    pub fn apply_writing_modes(&mut self, fonts: &impl FontSource) {
        for run in self
            .articles
            .iter_mut()
            .flat_map(|article| article.runs.iter_mut())
        {
            run.wmode = fonts.writing_mode(&run.font);
        }
    }
}
