use crate::config::DisplayConfig;
use crate::countdown::LocalClock;
use crate::display::driver::{LedCanvas, LedDriver};
use crate::display::graphics::EmbeddedGraphicsCanvas;
use crate::display::renderer::{CountdownRenderer, RenderContext, RenderError, Renderer};
use embedded_graphics::geometry::Point;
use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use log::{debug, error, info, warn};

const ERROR_TEXT: &str = "Countdown Error";
const ERROR_POSITION: Point = Point::new(5, 15);

/// Owns the LED driver and its canvas and feeds the renderer's frames to it
pub struct DisplayManager {
    driver: Box<dyn LedDriver>,
    canvas: Option<Box<dyn LedCanvas>>,
    pub display_width: i32,
    pub display_height: i32,
    brightness: u8,
    renderer: Box<dyn Renderer>,
    render_context: RenderContext,
    force_next_frame: bool,
    last_error: Option<String>,
}

impl DisplayManager {
    pub fn with_config_and_driver(config: &DisplayConfig, driver: Box<dyn LedDriver>) -> Self {
        let ctx = RenderContext::new(
            config.display_width(),
            config.display_height(),
            config.led_brightness,
        );
        let renderer = CountdownRenderer::new(&config.countdown, ctx, Box::new(LocalClock));
        Self::with_renderer(config, driver, Box::new(renderer))
    }

    pub fn with_renderer(
        config: &DisplayConfig,
        mut driver: Box<dyn LedDriver>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let display_width = config.display_width();
        let display_height = config.display_height();

        info!(
            "Initializing display: {}x{} (rows={}, cols={}, chain={}, parallel={})",
            display_width,
            display_height,
            config.rows,
            config.cols,
            config.chain_length,
            config.parallel
        );

        let canvas = driver.take_canvas();
        if canvas.is_none() {
            warn!("Driver did not hand out a canvas, nothing will be drawn");
        }

        Self {
            driver,
            canvas,
            display_width,
            display_height,
            brightness: config.led_brightness,
            renderer,
            render_context: RenderContext::new(
                display_width,
                display_height,
                config.led_brightness,
            ),
            force_next_frame: true,
            last_error: None,
        }
    }

    /// Let the renderer recalculate its state
    pub fn update_renderer(&mut self) {
        self.renderer.update();
    }

    /// Draw a frame if anything changed and push it to the panel.
    /// Returns whether a frame was presented.
    pub fn update_display(&mut self) -> bool {
        let Some(mut canvas) = self.canvas.take() else {
            return false;
        };

        let force_clear = std::mem::take(&mut self.force_next_frame);
        let presented = match self.renderer.display(&mut canvas, force_clear) {
            Ok(drawn) => {
                self.last_error = None;
                drawn
            }
            Err(e) => self.report_error(&mut canvas, e),
        };

        let canvas = if presented {
            self.driver.update_canvas(canvas)
        } else {
            canvas
        };
        self.canvas = Some(canvas);
        presented
    }

    // The error screen is only drawn when the error changes
    fn report_error(&mut self, canvas: &mut Box<dyn LedCanvas>, e: RenderError) -> bool {
        let message = e.to_string();
        // Keep forcing while the error screen is up so recovery redraws over it
        self.force_next_frame = true;
        if self.last_error.as_deref() == Some(message.as_str()) {
            debug!("Error displaying countdown: {}", message);
            return false;
        }
        error!("Error displaying countdown: {}", message);
        self.last_error = Some(message);
        show_error_screen(canvas);
        true
    }

    pub fn get_brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        let brightness = brightness.clamp(0, 100);
        debug!("Updating display brightness: {}", brightness);

        self.brightness = brightness;
        self.render_context = RenderContext::new(self.display_width, self.display_height, brightness);
        self.renderer.update_context(self.render_context.clone());
    }

    /// Redraw on the next tick even if nothing changed
    pub fn force_redraw(&mut self) {
        self.force_next_frame = true;
    }

    pub fn renderer_info(&self) -> serde_json::Value {
        self.renderer.info()
    }

    pub fn shutdown(&mut self) {
        info!("Shutting down display manager");

        if let Some(mut canvas) = self.canvas.take() {
            canvas.fill(0, 0, 0);
            self.canvas = Some(self.driver.update_canvas(canvas));
        }

        self.driver.shutdown();
    }
}

/// Last-resort screen, drawn when the renderer fails
fn show_error_screen(canvas: &mut Box<dyn LedCanvas>) {
    canvas.fill(0, 0, 0);
    let style = MonoTextStyle::new(&FONT_5X8, Rgb888::new(255, 0, 0));
    let mut eg_canvas = EmbeddedGraphicsCanvas::new(canvas);
    // Drawing onto the LED canvas cannot fail
    let _ = Text::with_baseline(ERROR_TEXT, ERROR_POSITION, style, Baseline::Top).draw(&mut eg_canvas);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::driver::{MemoryDriver, MemoryDriverState};
    use std::sync::{Arc, Mutex};

    /// Renderer whose frames and failures are scripted by the test
    struct ScriptedRenderer {
        results: Vec<Result<bool, RenderError>>,
        updates: Arc<Mutex<usize>>,
        last_brightness: Arc<Mutex<Option<u8>>>,
    }

    impl Renderer for ScriptedRenderer {
        fn update(&mut self) {
            *self.updates.lock().unwrap() += 1;
        }

        fn display(
            &mut self,
            canvas: &mut Box<dyn LedCanvas>,
            _force_clear: bool,
        ) -> Result<bool, RenderError> {
            let result = self.results.remove(0);
            if let Ok(true) = result {
                canvas.fill(0, 255, 0);
            }
            result
        }

        fn validate_config(&self) -> Result<(), Vec<String>> {
            Ok(())
        }

        fn info(&self) -> serde_json::Value {
            serde_json::json!({ "scripted": true })
        }

        fn update_context(&mut self, ctx: RenderContext) {
            *self.last_brightness.lock().unwrap() = Some(ctx.brightness);
        }
    }

    /// Draws green only when forced or on its first frame, like the countdown
    struct SuppressingRenderer {
        script: Vec<Option<RenderError>>,
        drawn_once: bool,
    }

    impl Renderer for SuppressingRenderer {
        fn update(&mut self) {}

        fn display(
            &mut self,
            canvas: &mut Box<dyn LedCanvas>,
            force_clear: bool,
        ) -> Result<bool, RenderError> {
            if let Some(e) = self.script.remove(0) {
                return Err(e);
            }
            if self.drawn_once && !force_clear {
                return Ok(false);
            }
            canvas.fill(0, 255, 0);
            self.drawn_once = true;
            Ok(true)
        }

        fn validate_config(&self) -> Result<(), Vec<String>> {
            Ok(())
        }

        fn info(&self) -> serde_json::Value {
            serde_json::Value::Null
        }

        fn update_context(&mut self, _ctx: RenderContext) {}
    }

    fn too_small() -> RenderError {
        RenderError::DisplayTooSmall {
            width: 4,
            height: 4,
        }
    }

    fn scripted(
        results: Vec<Result<bool, RenderError>>,
    ) -> (DisplayManager, Arc<Mutex<MemoryDriverState>>, Arc<Mutex<Option<u8>>>) {
        let config = DisplayConfig::default();
        let driver = MemoryDriver::new(config.display_width(), config.display_height());
        let state = driver.state();
        let brightness = Arc::new(Mutex::new(None));
        let renderer = ScriptedRenderer {
            results,
            updates: Arc::new(Mutex::new(0)),
            last_brightness: Arc::clone(&brightness),
        };
        let manager = DisplayManager::with_renderer(&config, Box::new(driver), Box::new(renderer));
        (manager, state, brightness)
    }

    #[test]
    fn only_drawn_frames_are_presented() {
        let (mut manager, state, _) = scripted(vec![Ok(true), Ok(false), Ok(true)]);

        assert!(manager.update_display());
        assert!(!manager.update_display());
        assert!(manager.update_display());

        assert_eq!(state.lock().unwrap().frames_presented, 2);
    }

    #[test]
    fn render_errors_show_the_error_screen_once() {
        let (mut manager, state, _) = scripted(vec![Err(too_small()), Err(too_small())]);

        assert!(manager.update_display());
        assert!(!manager.update_display());

        let state = state.lock().unwrap();
        assert_eq!(state.frames_presented, 1);
        let frame = state.last_frame.as_ref().unwrap();
        assert!(frame.count_color([255, 0, 0]) > 0);
        assert_eq!(frame.count_color([255, 0, 0]), frame.lit_pixels());
    }

    #[test]
    fn recovery_redraws_over_the_error_screen() {
        let config = DisplayConfig::default();
        let driver = MemoryDriver::new(config.display_width(), config.display_height());
        let state = driver.state();
        let renderer = SuppressingRenderer {
            script: vec![None, Some(too_small()), Some(too_small()), None, None],
            drawn_once: false,
        };
        let mut manager = DisplayManager::with_renderer(&config, Box::new(driver), Box::new(renderer));

        let presented: Vec<bool> = (0..5).map(|_| manager.update_display()).collect();
        assert_eq!(presented, vec![true, true, false, true, false]);

        let state = state.lock().unwrap();
        let frame = state.last_frame.as_ref().unwrap();
        assert_eq!(frame.count_color([255, 0, 0]), 0);
        assert_eq!(frame.count_color([0, 255, 0]), frame.lit_pixels());
        assert!(frame.lit_pixels() > 0);
    }

    #[test]
    fn brightness_reaches_the_renderer() {
        let (mut manager, _, brightness) = scripted(Vec::new());

        manager.set_brightness(40);

        assert_eq!(manager.get_brightness(), 40);
        assert_eq!(*brightness.lock().unwrap(), Some(40));
    }

    #[test]
    fn shutdown_blanks_the_panel() {
        let (mut manager, state, _) = scripted(vec![Ok(true)]);
        manager.update_display();

        manager.shutdown();

        let state = state.lock().unwrap();
        assert!(state.shut_down);
        assert_eq!(state.last_frame.as_ref().unwrap().lit_pixels(), 0);
    }

    #[test]
    fn countdown_renderer_draws_the_first_frame() {
        let config = DisplayConfig::default();
        let driver = MemoryDriver::new(config.display_width(), config.display_height());
        let state = driver.state();
        let mut manager = DisplayManager::with_config_and_driver(&config, Box::new(driver));

        manager.update_renderer();
        assert!(manager.update_display());
        assert!(!manager.update_display());

        manager.force_redraw();
        assert!(manager.update_display());

        assert_eq!(state.lock().unwrap().frames_presented, 2);
        assert!(manager.renderer_info()["days_until_christmas"].is_i64());
    }
}
