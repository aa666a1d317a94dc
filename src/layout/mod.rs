//! Adaptive text layout for small displays.
//!
//! Picks the largest font that lets every line of a short message fit
//! inside a rectangular region, and works out where the block has to start
//! so it sits vertically centered. When nothing fits, the smallest font is
//! used anyway with tightened line spacing so callers always get something
//! they can draw.

pub mod fonts;

pub use fonts::{default_candidates, MonoFontCandidate};

use log::debug;
use thiserror::Error;

/// Extra pixels added below every line on top of the font's own height
pub const DEFAULT_LINE_SPACING: i32 = 2;

// Used when a font cannot report its own line height
const COMPACT_LINE_HEIGHT: i32 = 8;
const REGULAR_LINE_HEIGHT: i32 = 10;

// Per-character width estimates used when a string cannot be measured
const COMPACT_CHAR_WIDTH: i32 = 6;
const REGULAR_CHAR_WIDTH: i32 = 8;

/// Failure reported by a font measurement probe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    #[error("font has no glyphs for {0:?}")]
    UnsupportedText(String),
    #[error("font metrics unavailable: {0}")]
    Unavailable(String),
}

/// Caller contract violations. Everything else is recovered internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("at least one font candidate is required")]
    NoCandidates,
    #[error("at least one line of text is required")]
    NoLines,
}

/// A font the resolver can try, along with the probes used to measure it
pub trait FontCandidate {
    /// Width in pixels of `text` rendered on a single line
    fn measure_width(&self, text: &str) -> Result<u32, MeasureError>;

    /// Height in pixels of one line, without any extra spacing
    fn line_height(&self) -> Result<u32, MeasureError>;

    /// Nominal point size, if the font knows it
    fn nominal_size(&self) -> Option<u32> {
        None
    }

    /// Whether this is one of the small/compact fonts
    fn is_compact(&self) -> bool;
}

/// Pixel area reserved for the text block, margins already removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRegion {
    pub width: u32,
    pub height: u32,
}

impl TargetRegion {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn width_px(&self) -> i32 {
        i32::try_from(self.width).unwrap_or(i32::MAX)
    }

    fn height_px(&self) -> i32 {
        i32::try_from(self.height).unwrap_or(i32::MAX)
    }
}

/// Outcome of a layout pass
#[derive(Debug)]
pub struct LayoutResult<'a, F> {
    /// The font the block should be drawn with
    pub candidate: &'a F,
    /// Position of `candidate` in the list that was passed in
    pub index: usize,
    /// Distance between the tops of two consecutive lines
    pub line_height: i32,
    /// `line_height` times the number of lines
    pub total_height: i32,
    /// Offset of the first line from the top of the region. Negative when
    /// the fallback layout overflows the region.
    pub start_offset: i32,
    /// False when no candidate fit and the fallback layout was used
    pub fits: bool,
}

impl<F> Clone for LayoutResult<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for LayoutResult<'_, F> {}

// Two results are equal when they point at the same candidate
impl<F> PartialEq for LayoutResult<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.candidate, other.candidate)
            && self.index == other.index
            && self.line_height == other.line_height
            && self.total_height == other.total_height
            && self.start_offset == other.start_offset
            && self.fits == other.fits
    }
}

impl<F> Eq for LayoutResult<'_, F> {}

impl<'a, F> LayoutResult<'a, F> {
    /// Top of line `index`, relative to the top of the region
    pub fn line_top(&self, index: usize) -> i32 {
        self.start_offset + self.line_height * index as i32
    }
}

/// Choose a font and vertical placement for `lines` inside `region`.
///
/// Candidates must be ordered from largest to smallest. The first one whose
/// every line fits the region width and whose stacked height fits the
/// region height wins. If none does, the last candidate is used with the
/// inter-line spacing squeezed out as far as needed.
pub fn resolve<'a, F, S>(
    region: TargetRegion,
    lines: &[S],
    candidates: &'a [F],
    inter_line_spacing: i32,
) -> Result<LayoutResult<'a, F>, LayoutError>
where
    F: FontCandidate,
    S: AsRef<str>,
{
    let last = candidates.len().checked_sub(1).ok_or(LayoutError::NoCandidates)?;
    if lines.is_empty() {
        return Err(LayoutError::NoLines);
    }

    let line_count = i32::try_from(lines.len()).unwrap_or(i32::MAX);
    let region_width = region.width_px();
    let region_height = region.height_px();

    for (index, candidate) in candidates.iter().enumerate() {
        let line_height = candidate_line_height(candidate, inter_line_spacing);

        if let Some(line) = first_overflowing_line(candidate, lines, region_width) {
            debug!(
                "Font candidate {} rejected: {:?} is wider than {}px",
                index, line, region_width
            );
            continue;
        }

        let total_height = line_height.saturating_mul(line_count);
        if total_height > region_height {
            debug!(
                "Font candidate {} rejected: {} lines need {}px, only {}px available",
                index, line_count, total_height, region_height
            );
            continue;
        }

        return Ok(LayoutResult {
            candidate,
            index,
            line_height,
            total_height,
            start_offset: centered_offset(region_height, total_height),
            fits: true,
        });
    }

    let candidate = &candidates[last];
    let mut line_height = candidate_line_height(candidate, inter_line_spacing);
    let mut total_height = line_height.saturating_mul(line_count);

    if total_height > region_height {
        line_height = (line_height - inter_line_spacing)
            .max(region_height / line_count)
            .max(1);
        total_height = line_height.saturating_mul(line_count);
    }

    debug!(
        "No font candidate fits {}x{}, falling back to candidate {} with line height {}",
        region_width, region_height, last, line_height
    );

    Ok(LayoutResult {
        candidate,
        index: last,
        line_height,
        total_height,
        start_offset: centered_offset(region_height, total_height),
        fits: false,
    })
}

fn centered_offset(region_height: i32, total_height: i32) -> i32 {
    (region_height - total_height).div_euclid(2)
}

fn candidate_line_height<F: FontCandidate>(candidate: &F, inter_line_spacing: i32) -> i32 {
    match candidate.line_height() {
        Ok(height) => i32::try_from(height)
            .unwrap_or(i32::MAX)
            .saturating_add(inter_line_spacing),
        Err(e) => {
            debug!("Line height probe failed ({}), estimating", e);
            match candidate.nominal_size() {
                Some(size) => i32::try_from(size)
                    .unwrap_or(i32::MAX)
                    .saturating_add(inter_line_spacing),
                None if candidate.is_compact() => COMPACT_LINE_HEIGHT,
                None => REGULAR_LINE_HEIGHT,
            }
        }
    }
}

fn line_width<F: FontCandidate>(candidate: &F, line: &str) -> i32 {
    match candidate.measure_width(line) {
        Ok(width) => i32::try_from(width).unwrap_or(i32::MAX),
        Err(e) => {
            debug!("Width probe failed ({}), estimating from character count", e);
            let per_char = if candidate.is_compact() {
                COMPACT_CHAR_WIDTH
            } else {
                REGULAR_CHAR_WIDTH
            };
            i32::try_from(line.chars().count())
                .unwrap_or(i32::MAX)
                .saturating_mul(per_char)
        }
    }
}

fn first_overflowing_line<'l, F, S>(candidate: &F, lines: &'l [S], max_width: i32) -> Option<&'l str>
where
    F: FontCandidate,
    S: AsRef<str>,
{
    lines
        .iter()
        .map(AsRef::as_ref)
        .find(|line| line_width(candidate, line) > max_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Font with canned measurements; unknown strings fall back to a fixed
    /// per-character width.
    #[derive(Debug)]
    struct FakeFont {
        line_height: Result<u32, MeasureError>,
        widths: HashMap<&'static str, u32>,
        char_width: u32,
        fail_widths: bool,
        nominal: Option<u32>,
        compact: bool,
        width_calls: Cell<usize>,
    }

    impl FakeFont {
        fn new(line_height: u32, char_width: u32) -> Self {
            Self {
                line_height: Ok(line_height),
                widths: HashMap::new(),
                char_width,
                fail_widths: false,
                nominal: None,
                compact: false,
                width_calls: Cell::new(0),
            }
        }

        fn with_width(mut self, text: &'static str, width: u32) -> Self {
            self.widths.insert(text, width);
            self
        }

        fn compact(mut self) -> Self {
            self.compact = true;
            self
        }

        fn failing_widths(mut self) -> Self {
            self.fail_widths = true;
            self
        }

        fn failing_height(mut self, nominal: Option<u32>) -> Self {
            self.line_height = Err(MeasureError::Unavailable("no metrics".into()));
            self.nominal = nominal;
            self
        }
    }

    impl FontCandidate for FakeFont {
        fn measure_width(&self, text: &str) -> Result<u32, MeasureError> {
            self.width_calls.set(self.width_calls.get() + 1);
            if self.fail_widths {
                return Err(MeasureError::UnsupportedText(text.to_string()));
            }
            Ok(self
                .widths
                .get(text)
                .copied()
                .unwrap_or(text.chars().count() as u32 * self.char_width))
        }

        fn line_height(&self) -> Result<u32, MeasureError> {
            self.line_height.clone()
        }

        fn nominal_size(&self) -> Option<u32> {
            self.nominal
        }

        fn is_compact(&self) -> bool {
            self.compact
        }
    }

    #[test]
    fn picks_first_candidate_that_fits() {
        let candidates = [
            FakeFont::new(12, 8).with_width("CHRISTMAS", 70),
            FakeFont::new(9, 5).with_width("CHRISTMAS", 48).compact(),
        ];
        let lines = ["MERRY", "CHRISTMAS"];

        let layout = resolve(TargetRegion::new(60, 32), &lines, &candidates, 0).unwrap();

        assert_eq!(layout.index, 1);
        assert_eq!(layout.line_height, 9);
        assert_eq!(layout.total_height, 18);
        assert_eq!(layout.start_offset, 7);
        assert!(layout.fits);
    }

    #[test]
    fn prefers_larger_font_when_several_fit() {
        let candidates = [FakeFont::new(10, 5), FakeFont::new(8, 4), FakeFont::new(6, 3)];
        let lines = ["MERRY", "CHRISTMAS"];

        let layout = resolve(TargetRegion::new(60, 32), &lines, &candidates, 2).unwrap();

        assert_eq!(layout.index, 0);
        assert_eq!(layout.line_height, 12);
        assert_eq!(layout.total_height, 24);
    }

    #[test]
    fn rejects_candidate_that_is_too_tall() {
        let candidates = [FakeFont::new(10, 2), FakeFont::new(6, 2)];
        let lines = ["1", "DAYS", "UNTIL", "XMAS"];

        // 4 * (10 + 2) = 48 > 30, 4 * (6 + 2) = 32 > 30, both fail...
        let layout = resolve(TargetRegion::new(30, 30), &lines, &candidates, 2).unwrap();
        assert!(!layout.fits);

        // ...while 4 * 8 = 32 fits in 32
        let layout = resolve(TargetRegion::new(30, 32), &lines, &candidates, 2).unwrap();
        assert!(layout.fits);
        assert_eq!(layout.index, 1);
        assert_eq!(layout.start_offset, 0);
    }

    #[test]
    fn width_exactly_equal_to_region_fits() {
        let candidates = [FakeFont::new(8, 10)];
        let layout = resolve(TargetRegion::new(40, 20), &["XMAS"], &candidates, 2).unwrap();
        assert!(layout.fits);
    }

    #[test]
    fn stops_measuring_after_first_overflowing_line() {
        let candidates = [FakeFont::new(8, 10), FakeFont::new(6, 1)];
        let lines = ["CHRISTMAS", "DAYS", "UNTIL"];

        resolve(TargetRegion::new(20, 40), &lines, &candidates, 2).unwrap();

        assert_eq!(candidates[0].width_calls.get(), 1);
        assert_eq!(candidates[1].width_calls.get(), 3);
    }

    #[test]
    fn centers_block_in_region() {
        let candidates = [FakeFont::new(6, 4)];
        let lines = ["A", "B", "C"];

        let layout = resolve(TargetRegion::new(28, 29), &lines, &candidates, 2).unwrap();

        assert_eq!(layout.total_height, 24);
        assert_eq!(layout.start_offset, (29 - 24) / 2);
        assert_eq!(layout.line_top(0), 2);
        assert_eq!(layout.line_top(2), 18);
    }

    #[test]
    fn fallback_compresses_spacing_down_to_font_height() {
        let candidates = [FakeFont::new(6, 1)];
        let lines = ["1", "DAYS", "UNTIL", "XMAS"];

        // Line height resolves to 6 + 2 = 8, 4 lines need 32px of 10
        let layout = resolve(TargetRegion::new(20, 10), &lines, &candidates, 2).unwrap();

        assert!(!layout.fits);
        assert_eq!(layout.line_height, 6);
        assert_eq!(layout.total_height, 24);
        assert_eq!(layout.start_offset, -7);
    }

    #[test]
    fn fallback_keeps_spacing_when_block_fits_height() {
        // Too wide everywhere, but the stacked height is fine
        let candidates = [FakeFont::new(1, 50)];
        let lines = ["AB", "CD"];

        let layout = resolve(TargetRegion::new(20, 40), &lines, &candidates, 4).unwrap();

        assert!(!layout.fits);
        assert_eq!(layout.line_height, 5);
        assert_eq!(layout.total_height, 10);
        assert_eq!(layout.start_offset, 15);
    }

    #[test]
    fn fallback_uses_even_split_when_larger_than_font_height() {
        // (3 + 4) * 2 = 14 > 12, even split 12 / 2 = 6 beats the bare 3
        let candidates = [FakeFont::new(3, 1)];
        let lines = ["A", "B"];

        let layout = resolve(TargetRegion::new(20, 12), &lines, &candidates, 4).unwrap();

        assert!(!layout.fits);
        assert_eq!(layout.line_height, 6);
        assert_eq!(layout.total_height, 12);
        assert_eq!(layout.start_offset, 0);
    }

    #[test]
    fn fallback_guarantees_usable_line_height_for_tiny_regions() {
        let candidates = [FakeFont::new(10, 6), FakeFont::new(6, 4).compact()];
        let lines = ["1", "DAYS", "UNTIL", "XMAS"];

        let layout = resolve(TargetRegion::new(64, 5), &lines, &candidates, 2).unwrap();

        assert!(!layout.fits);
        assert_eq!(layout.index, 1);
        assert!(layout.line_height >= 1);
        assert_eq!(layout.total_height, layout.line_height * 4);
    }

    #[test]
    fn fallback_never_returns_zero_line_height() {
        let candidates = [FakeFont::new(0, 1)];
        let lines = ["A", "B", "C", "D"];

        let layout = resolve(TargetRegion::new(10, 3), &lines, &candidates, 2).unwrap();

        assert_eq!(layout.line_height, 1);
        assert_eq!(layout.total_height, 4);
        assert_eq!(layout.start_offset, -1);
    }

    #[test]
    fn failing_width_probe_uses_character_estimate() {
        // Regular estimate: 9 * 8 = 72, compact estimate: 9 * 6 = 54
        let candidates = [
            FakeFont::new(10, 1).failing_widths(),
            FakeFont::new(8, 1).failing_widths().compact(),
        ];
        let lines = ["MERRY", "CHRISTMAS"];

        let layout = resolve(TargetRegion::new(60, 32), &lines, &candidates, 2).unwrap();
        assert_eq!(layout.index, 1);

        let layout = resolve(TargetRegion::new(72, 32), &lines, &candidates, 2).unwrap();
        assert_eq!(layout.index, 0);
    }

    #[test]
    fn failing_height_probe_uses_nominal_size_then_default() {
        let with_size = [FakeFont::new(0, 1).failing_height(Some(7))];
        let layout = resolve(TargetRegion::new(64, 64), &["A"], &with_size, 2).unwrap();
        assert_eq!(layout.line_height, 9);

        let regular = [FakeFont::new(0, 1).failing_height(None)];
        let layout = resolve(TargetRegion::new(64, 64), &["A"], &regular, 2).unwrap();
        assert_eq!(layout.line_height, 10);

        let compact = [FakeFont::new(0, 1).failing_height(None).compact()];
        let layout = resolve(TargetRegion::new(64, 64), &["A"], &compact, 2).unwrap();
        assert_eq!(layout.line_height, 8);
    }

    #[test]
    fn empty_lines_only_add_height() {
        let candidates = [FakeFont::new(6, 4)];
        let layout = resolve(TargetRegion::new(4, 20), &["", "A", ""], &candidates, 0).unwrap();

        assert!(layout.fits);
        assert_eq!(layout.total_height, 18);
    }

    #[test]
    fn same_inputs_give_same_layout() {
        let candidates = [FakeFont::new(10, 7), FakeFont::new(7, 5)];
        let lines = ["25", "DAYS", "UNTIL", "CHRISTMAS"];
        let region = TargetRegion::new(28, 28);

        let first = resolve(region, &lines, &candidates, 2).unwrap();
        let second = resolve(region, &lines, &candidates, 2).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_inputs_are_rejected() {
        let none: [FakeFont; 0] = [];
        assert_eq!(
            resolve(TargetRegion::new(10, 10), &["A"], &none, 2).unwrap_err(),
            LayoutError::NoCandidates
        );

        let candidates = [FakeFont::new(6, 4)];
        let no_lines: [&str; 0] = [];
        assert_eq!(
            resolve(TargetRegion::new(10, 10), &no_lines, &candidates, 2).unwrap_err(),
            LayoutError::NoLines
        );
    }
}
