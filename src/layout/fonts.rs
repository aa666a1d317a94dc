use super::{FontCandidate, MeasureError};
use embedded_graphics::geometry::Point;
use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::Baseline;
use std::fmt;

/// Monospaced bitmap font offered to the layout resolver
#[derive(Clone, Copy)]
pub struct MonoFontCandidate {
    name: &'static str,
    font: &'static MonoFont<'static>,
    compact: bool,
}

// MonoFont doesn't implement Debug
impl fmt::Debug for MonoFontCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonoFontCandidate")
            .field("name", &self.name)
            .field("character_size", &self.font.character_size)
            .field("compact", &self.compact)
            .finish()
    }
}

impl MonoFontCandidate {
    pub const fn new(name: &'static str, font: &'static MonoFont<'static>, compact: bool) -> Self {
        Self {
            name,
            font,
            compact,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Character style for drawing text in this font
    pub fn text_style(&self, color: Rgb888) -> MonoTextStyle<'static, Rgb888> {
        MonoTextStyle::new(self.font, color)
    }
}

impl FontCandidate for MonoFontCandidate {
    fn measure_width(&self, text: &str) -> Result<u32, MeasureError> {
        // The ASCII fonts silently substitute '?' for anything else
        if !text.is_ascii() {
            return Err(MeasureError::UnsupportedText(text.to_string()));
        }

        let metrics = self
            .text_style(Rgb888::WHITE)
            .measure_string(text, Point::zero(), Baseline::Top);
        Ok(metrics.bounding_box.size.width)
    }

    fn line_height(&self) -> Result<u32, MeasureError> {
        match self.font.character_size.height {
            0 => Err(MeasureError::Unavailable(format!(
                "font '{}' reports a zero line height",
                self.name
            ))),
            height => Ok(height),
        }
    }

    fn nominal_size(&self) -> Option<u32> {
        Some(self.font.character_size.height)
    }

    fn is_compact(&self) -> bool {
        self.compact
    }
}

/// Regular, small and extra-small fonts, largest first
pub fn default_candidates() -> [MonoFontCandidate; 3] {
    [
        MonoFontCandidate::new("regular", &FONT_6X10, false),
        MonoFontCandidate::new("small", &FONT_5X8, true),
        MonoFontCandidate::new("extra-small", &FONT_4X6, true),
    ]
}
