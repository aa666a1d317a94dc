use embedded_graphics::geometry::Point;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_graphics::Drawable;
use image::RgbaImage;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;

use super::image::{blit_rgba, find_tree_image, load_image, scale_to_fit};
use super::tree::{procedural_tree, DEFAULT_TREE_COLOR};
use super::{RenderContext, RenderError, Renderer};
use crate::config::CountdownConfig;
use crate::countdown::{use_short_name, Clock, CountdownMessage, CountdownState};
use crate::display::driver::LedCanvas;
use crate::display::graphics::EmbeddedGraphicsCanvas;
use crate::layout::{self, default_candidates, LayoutError, MonoFontCandidate, TargetRegion};
use crate::models::color::parse_rgb;

const DEFAULT_TEXT_COLOR: [u8; 3] = [255, 0, 0];

// Gap kept around both the tree and the text column
const MARGIN: i32 = 2;

/// Countdown state as reported over the web API
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CountdownInfo {
    pub days_until_christmas: Option<i64>,
    pub is_christmas: bool,
    pub message: Option<String>,
    pub text_color: [u8; 3],
    pub tree_color: [u8; 3],
    pub tree_size: Option<u32>,
    pub tree_image: Option<PathBuf>,
}

/// Tree on the left half of the display, the countdown stacked on the right
pub struct CountdownRenderer {
    config: CountdownConfig,
    text_color: [u8; 3],
    tree_color: [u8; 3],
    tree_size: Option<u32>,
    tree_image: Option<RgbaImage>,
    tree_image_path: Option<PathBuf>,
    candidates: [MonoFontCandidate; 3],
    state: CountdownState,
    clock: Box<dyn Clock>,
    ctx: RenderContext,
    last_displayed_message: Option<String>,
}

fn color_or_default(name: &str, value: &str, default: [u8; 3]) -> [u8; 3] {
    parse_rgb(value).unwrap_or_else(|e| {
        warn!("Invalid {} '{}' ({}), using {:?}", name, value, e, default);
        default
    })
}

impl CountdownRenderer {
    pub fn new(config: &CountdownConfig, ctx: RenderContext, clock: Box<dyn Clock>) -> Self {
        let tree_image_path = find_tree_image(&config.asset_dir);
        let tree_image = tree_image_path.as_deref().and_then(load_image);
        match &tree_image_path {
            Some(path) if tree_image.is_some() => info!("Using tree image {}", path.display()),
            Some(_) => warn!("Tree image could not be read, drawing the tree instead"),
            None => debug!(
                "No tree image in {}, drawing the tree instead",
                config.asset_dir.display()
            ),
        }

        Self {
            config: config.clone(),
            text_color: color_or_default("text_color", &config.text_color, DEFAULT_TEXT_COLOR),
            tree_color: color_or_default("tree_color", &config.tree_color, DEFAULT_TREE_COLOR),
            tree_size: config.tree_size.and_then(|size| u32::try_from(size).ok()),
            // Only report a path when the bitmap actually loaded
            tree_image_path: tree_image.as_ref().and(tree_image_path),
            tree_image,
            candidates: default_candidates(),
            state: CountdownState::default(),
            clock,
            ctx,
            last_displayed_message: None,
        }
    }

    pub fn countdown_info(&self) -> CountdownInfo {
        let calculated = self.state.is_calculated();
        CountdownInfo {
            days_until_christmas: calculated.then_some(self.state.days_until_christmas),
            is_christmas: self.state.is_christmas,
            message: self.last_displayed_message.clone(),
            text_color: self.text_color,
            tree_color: self.tree_color,
            tree_size: self.tree_size,
            tree_image: self.tree_image_path.clone(),
        }
    }

    /// Tree area inside the left half, shrunk to `tree_size` when configured
    fn tree_area(&self, left_half: i32, height: i32) -> Option<(u32, u32)> {
        let mut width = left_half - 2 * MARGIN;
        let mut height = height - 2 * MARGIN;
        if let Some(size) = self.tree_size {
            let size = i32::try_from(size).unwrap_or(i32::MAX);
            width = width.min(size);
            height = height.min(size);
        }
        if width <= 0 || height <= 0 {
            return None;
        }
        Some((width as u32, height as u32))
    }

    fn draw_tree(&self, canvas: &mut Box<dyn LedCanvas>, left_half: i32, height: i32) {
        let Some((width, height)) = self.tree_area(left_half, height) else {
            debug!("No room left for the tree");
            return;
        };

        let bitmap = match &self.tree_image {
            Some(image) => scale_to_fit(image, width, height),
            None => Some(procedural_tree(width, height, self.tree_color)),
        };

        if let Some(bitmap) = bitmap {
            blit_rgba(canvas, &bitmap, MARGIN, MARGIN, &self.ctx);
        }
    }
}

impl Renderer for CountdownRenderer {
    fn update(&mut self) {
        let today = self.clock.today();
        if self.state.refresh(today) {
            if self.state.is_christmas {
                info!("Merry Christmas!");
            } else {
                info!("Days until Christmas: {}", self.state.days_until_christmas);
            }
        }
    }

    fn display(
        &mut self,
        canvas: &mut Box<dyn LedCanvas>,
        force_clear: bool,
    ) -> Result<bool, RenderError> {
        if !self.state.is_calculated() {
            self.update();
        }

        let (width, height) = canvas.size();
        let left_half = width / 2;
        let right_half = width - left_half;
        let text_width = right_half - 2 * MARGIN;
        let text_height = height - 2 * MARGIN;

        let compact = self.candidates.last().ok_or(LayoutError::NoCandidates)?;
        let use_xmas = use_short_name(compact, text_width, width);
        let message = CountdownMessage::select(&self.state, use_xmas);

        if !force_clear && self.last_displayed_message.as_deref() == Some(message.text.as_str()) {
            return Ok(false);
        }

        if text_width <= 0 || text_height <= 0 {
            return Err(RenderError::DisplayTooSmall { width, height });
        }

        let region = TargetRegion::new(text_width as u32, text_height as u32);
        let layout = layout::resolve(
            region,
            &message.lines,
            &self.candidates,
            layout::DEFAULT_LINE_SPACING,
        )?;
        debug!(
            "Countdown layout: font {} line height {} start {}{}",
            layout.candidate.name(),
            layout.line_height,
            layout.start_offset,
            if layout.fits { "" } else { " (squeezed)" }
        );

        canvas.fill(0, 0, 0);
        self.draw_tree(canvas, left_half, height);

        let [r, g, b] = self.ctx.apply_brightness(self.text_color);
        let character_style = layout.candidate.text_style(Rgb888::new(r, g, b));
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();
        let center_x = left_half + right_half / 2;

        let mut eg_canvas = EmbeddedGraphicsCanvas::new(canvas);
        for (i, line) in message.lines.iter().enumerate() {
            // Offsets are relative to the text region, which starts below the margin
            let y = MARGIN + layout.line_top(i);
            // Drawing onto the LED canvas cannot fail
            let _ = Text::with_text_style(line, Point::new(center_x, y), character_style, text_style)
                .draw(&mut eg_canvas);
        }

        debug!("Displayed: {}", message.text);
        self.last_displayed_message = Some(message.text);
        Ok(true)
    }

    fn validate_config(&self) -> Result<(), Vec<String>> {
        self.config.validate()
    }

    fn info(&self) -> serde_json::Value {
        serde_json::to_value(self.countdown_info()).unwrap_or(serde_json::Value::Null)
    }

    fn update_context(&mut self, ctx: RenderContext) {
        if ctx != self.ctx {
            // Colors depend on brightness, so the next frame must be redrawn
            self.last_displayed_message = None;
        }
        self.ctx = ctx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::FixedClock;
    use crate::display::driver::MemoryCanvas;
    use crate::display::renderer::tree::{ORNAMENT_COLOR, STAR_COLOR, TRUNK_COLOR};
    use chrono::NaiveDate;

    fn renderer_on(year: i32, month: u32, day: u32, config: CountdownConfig) -> CountdownRenderer {
        let today = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        CountdownRenderer::new(
            &config,
            RenderContext::new(64, 32, 100),
            Box::new(FixedClock(today)),
        )
    }

    fn config() -> CountdownConfig {
        CountdownConfig {
            asset_dir: std::env::temp_dir().join("christmas-countdown-tests-no-assets"),
            ..CountdownConfig::default()
        }
    }

    fn canvas(width: i32, height: i32) -> Box<dyn LedCanvas> {
        Box::new(MemoryCanvas::new(width, height))
    }

    fn memory(canvas: &mut Box<dyn LedCanvas>) -> &MemoryCanvas {
        canvas.as_any_mut().downcast_mut::<MemoryCanvas>().unwrap()
    }

    fn pixels_in_columns(canvas: &MemoryCanvas, from: i32, to: i32) -> Vec<[u8; 3]> {
        let (_, height) = canvas.size();
        (from..to)
            .flat_map(|x| (0..height).map(move |y| (x, y)))
            .filter_map(|(x, y)| canvas.pixel(x, y))
            .filter(|p| *p != [0, 0, 0])
            .collect()
    }

    #[test]
    fn draws_tree_left_and_text_right() {
        let mut renderer = renderer_on(2024, 12, 1, config());
        let mut canvas = canvas(64, 32);

        assert!(renderer.display(&mut canvas, false).unwrap());

        let frame = memory(&mut canvas);
        let left = pixels_in_columns(frame, 0, 32);
        let right = pixels_in_columns(frame, 32, 64);

        assert!(left.contains(&TRUNK_COLOR));
        assert!(left.contains(&STAR_COLOR));
        assert!(left.contains(&ORNAMENT_COLOR));
        // Only text, in the text color, right of the split
        assert!(!right.is_empty());
        assert!(right.iter().all(|p| *p == [255, 0, 0]));
    }

    #[test]
    fn unchanged_message_is_not_redrawn() {
        let mut renderer = renderer_on(2024, 12, 1, config());
        let mut canvas = canvas(64, 32);

        assert!(renderer.display(&mut canvas, false).unwrap());
        canvas.fill(0, 0, 0);

        assert!(!renderer.display(&mut canvas, false).unwrap());
        assert_eq!(memory(&mut canvas).lit_pixels(), 0);

        assert!(renderer.display(&mut canvas, true).unwrap());
        assert!(memory(&mut canvas).lit_pixels() > 0);
    }

    #[test]
    fn new_day_changes_the_message() {
        let mut renderer = renderer_on(2024, 12, 23, config());
        let mut canvas = canvas(64, 32);
        renderer.display(&mut canvas, false).unwrap();
        assert_eq!(renderer.countdown_info().message.as_deref(), Some("2 DAYS UNTIL XMAS"));

        renderer.clock = Box::new(FixedClock(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        renderer.update();

        assert!(renderer.display(&mut canvas, false).unwrap());
        let info = renderer.countdown_info();
        assert_eq!(info.message.as_deref(), Some("MERRY CHRISTMAS"));
        assert_eq!(info.days_until_christmas, Some(0));
        assert!(info.is_christmas);
    }

    #[test]
    fn wide_displays_spell_out_christmas() {
        let mut renderer = renderer_on(2024, 12, 20, config());
        let mut canvas = canvas(128, 32);
        renderer.display(&mut canvas, false).unwrap();
        assert_eq!(
            renderer.countdown_info().message.as_deref(),
            Some("5 DAYS UNTIL CHRISTMAS")
        );
    }

    #[test]
    fn brightness_change_forces_redraw() {
        let mut renderer = renderer_on(2024, 12, 1, config());
        let mut canvas = canvas(64, 32);
        renderer.display(&mut canvas, false).unwrap();

        renderer.update_context(RenderContext::new(64, 32, 50));
        assert!(renderer.display(&mut canvas, false).unwrap());

        let frame = memory(&mut canvas);
        assert_eq!(frame.count_color([255, 0, 0]), 0);
        assert!(frame.count_color([127, 0, 0]) > 0);
    }

    #[test]
    fn tiny_display_is_an_error() {
        let mut renderer = renderer_on(2024, 12, 1, config());
        let mut canvas = canvas(8, 4);
        assert!(matches!(
            renderer.display(&mut canvas, false),
            Err(RenderError::DisplayTooSmall { width: 8, height: 4 })
        ));
    }

    #[test]
    fn tree_size_limits_the_tree() {
        let config = CountdownConfig {
            tree_size: Some(8),
            ..config()
        };
        let mut renderer = renderer_on(2024, 12, 1, config);
        let mut canvas = canvas(64, 32);
        renderer.display(&mut canvas, false).unwrap();

        let frame = memory(&mut canvas);
        assert!(pixels_in_columns(frame, 10, 32).is_empty());
        assert!(!pixels_in_columns(frame, 0, 10).is_empty());
    }

    #[test]
    fn invalid_colors_fall_back_but_fail_validation() {
        let config = CountdownConfig {
            text_color: "red".to_string(),
            ..config()
        };
        let renderer = renderer_on(2024, 12, 1, config);

        assert_eq!(renderer.countdown_info().text_color, DEFAULT_TEXT_COLOR);
        assert!(renderer.validate_config().is_err());
    }

    #[test]
    fn info_before_first_update_has_no_days() {
        let renderer = renderer_on(2024, 12, 1, config());
        let info = renderer.info();
        assert_eq!(info["days_until_christmas"], serde_json::Value::Null);
        assert_eq!(info["text_color"], serde_json::json!([255, 0, 0]));
        assert_eq!(info["tree_image"], serde_json::Value::Null);
    }
}
