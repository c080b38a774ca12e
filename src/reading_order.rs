//! Sorting text runs and articles into reading order.
//!
//! Positions that are within [TOLERANCE] of each other, or whose extents overlap, compare as
//! equal and keep the order they were produced in. Such a comparison is not a total order, so
//! sorting is done with [stable_sort_by], an insertion sort that never reorders equal elements.

use std::cmp::Ordering;

use log::debug;

use crate::text::{Article, FontSource, Page, PageSource, TextRun, WritingMode};
use crate::writing_mode;

/// Positions closer than this, in page units, are treated as the same line.
pub const TOLERANCE: f32 = 0.1;

/// Compare runs in horizontal writing mode, top of the page first.
///
/// The baseline `y` is the bottom of a run and `y - height` its top.
pub fn compare_runs_horizontal(a: &TextRun, b: &TextRun) -> Ordering {
    let (a_bottom, b_bottom) = (a.y, b.y);
    let a_top = a_bottom - a.height;
    let b_top = b_bottom - b.height;

    let same_line = (a_bottom - b_bottom).abs() < TOLERANCE
        || (b_bottom >= a_top && b_bottom <= a_bottom)
        || (a_bottom >= b_top && a_bottom <= b_bottom);
    if same_line {
        Ordering::Equal
    } else {
        a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal)
    }
}

/// Compare runs in vertical writing mode, right of the page first.
///
/// Runs in a vertical font are positioned at their centre line so they're compared half their
/// height to the left of `x`.
pub fn compare_runs_vertical(a: &TextRun, b: &TextRun) -> Ordering {
    let a_left = vertical_position(a);
    let b_left = vertical_position(b);
    let a_right = a_left + a.height;
    let b_right = b_left + b.height;

    let same_line = (a_left - b_left).abs() < TOLERANCE
        || (b_left <= a_right && b_left >= a_left)
        || (a_left <= b_right && a_left >= b_left);
    if same_line {
        Ordering::Equal
    } else {
        b_left.partial_cmp(&a_left).unwrap_or(Ordering::Equal)
    }
}

fn vertical_position(run: &TextRun) -> f32 {
    match run.wmode {
        WritingMode::Vertical => run.x - run.height / 2.0,
        WritingMode::Horizontal => run.x,
    }
}

/// Compare articles by their first runs. Empty articles compare equal to everything.
pub fn compare_articles_horizontal(a: &Article, b: &Article) -> Ordering {
    compare_first_runs(a, b, compare_runs_horizontal)
}

/// Compare articles by their first runs. Empty articles compare equal to everything.
pub fn compare_articles_vertical(a: &Article, b: &Article) -> Ordering {
    compare_first_runs(a, b, compare_runs_vertical)
}

fn compare_first_runs(
    a: &Article,
    b: &Article,
    compare: fn(&TextRun, &TextRun) -> Ordering,
) -> Ordering {
    match (a.first_run(), b.first_run()) {
        (Some(a), Some(b)) => compare(a, b),
        _ => Ordering::Equal,
    }
}

/// Sort `items` by `compare`, keeping equal elements in their original order.
///
/// `compare` only has to be antisymmetric; it need not be transitive. The result is
/// deterministic and sorting it again leaves it unchanged.
///
/// This is an insertion sort: input that is already close to reading order, as extracted runs
/// usually are, costs O(n) comparisons, but input in reverse order costs O(n²). Articles with
/// one run per glyph are sorted one article at a time, which bounds `n` by the article's length.
pub fn stable_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Sort the runs of one article for `mode`.
pub fn sort_runs(runs: &mut [TextRun], mode: WritingMode) {
    match mode {
        WritingMode::Horizontal => stable_sort_by(runs, compare_runs_horizontal),
        WritingMode::Vertical => stable_sort_by(runs, compare_runs_vertical),
    }
}

/// Sort articles for `mode`. Runs are never moved between articles.
pub fn sort_articles(articles: &mut [Article], mode: WritingMode) {
    match mode {
        WritingMode::Horizontal => stable_sort_by(articles, compare_articles_horizontal),
        WritingMode::Vertical => stable_sort_by(articles, compare_articles_vertical),
    }
}

/// Sort the runs of every article and then the articles of `page` using the page's dominant
/// writing mode, which is returned.
pub fn sort_page(page: &mut Page) -> WritingMode {
    let mode = writing_mode::page_mode(page);
    for article in &mut page.articles {
        sort_runs(&mut article.runs, mode);
    }
    sort_articles(&mut page.articles, mode);
    debug!(
        "sorted {} articles in {:?} reading order",
        page.articles.len(),
        mode
    );
    mode
}

/// Consume `page` and return it in reading order.
pub fn order_page(mut page: Page) -> Page {
    sort_page(&mut page);
    page
}

/// Read every page of `source` and return them in reading order.
///
/// Each run takes the writing mode `fonts` declares for its font before the page is classified.
/// Pages are independent so callers with many pages may sort them in parallel instead.
pub fn order_pages(source: &impl PageSource, fonts: &impl FontSource) -> Vec<Page> {
    (0..source.num_pages())
        .filter_map(|index| source.page(index))
        .map(|mut page| {
            page.apply_writing_modes(fonts);
            order_page(page)
        })
        .collect()
}
