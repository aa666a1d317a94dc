mod context;
mod countdown;
pub mod image;
pub mod tree;

pub use context::RenderContext;
pub use countdown::{CountdownInfo, CountdownRenderer};

use crate::display::driver::LedCanvas;
use crate::layout::LayoutError;
use thiserror::Error;

/// Why a frame could not be drawn
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("text layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("a {width}x{height} display leaves no room for the countdown text")]
    DisplayTooSmall { width: i32, height: i32 },
}

/// Lifecycle of a display plugin driven by the `DisplayManager`
pub trait Renderer: Send {
    /// Recalculate state, called once per tick before `display`
    fn update(&mut self);

    /// Draw the current state onto `canvas`.
    ///
    /// Returns `Ok(false)` when nothing changed since the last frame and
    /// `force_clear` is not set, in which case the canvas is left untouched.
    fn display(
        &mut self,
        canvas: &mut Box<dyn LedCanvas>,
        force_clear: bool,
    ) -> Result<bool, RenderError>;

    /// Check the renderer's own settings, collecting every problem
    fn validate_config(&self) -> Result<(), Vec<String>>;

    /// State reported by the web API
    fn info(&self) -> serde_json::Value;

    /// Swap in a new context (e.g. after a brightness change)
    fn update_context(&mut self, ctx: RenderContext);
}
