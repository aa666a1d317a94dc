//! Headless driver that keeps frames in memory.
//!
//! Used for `--driver memory` on machines without a panel and by the tests,
//! which inspect presented frames through the shared [`MemoryDriverState`].

use log::info;
use std::any::Any;
use std::sync::{Arc, Mutex};

use super::{LedCanvas, LedDriver};
use crate::config::DisplayConfig;

/// Row-major RGB pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCanvas {
    width: i32,
    height: i32,
    pixels: Vec<[u8; 3]>,
}

impl MemoryCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0]; len],
        }
    }

    /// Color at (x, y), or `None` outside the canvas
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Number of pixels that are not black
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| **p != [0, 0, 0]).count()
    }

    /// Number of pixels with exactly this color
    pub fn count_color(&self, color: [u8; 3]) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl LedCanvas for MemoryCanvas {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
            return;
        };
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = [r, g, b];
        }
    }

    fn fill(&mut self, r: u8, g: u8, b: u8) {
        self.pixels.fill([r, g, b]);
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What the memory driver has been asked to do so far
#[derive(Debug, Default)]
pub struct MemoryDriverState {
    pub frames_presented: usize,
    pub last_frame: Option<MemoryCanvas>,
    pub shut_down: bool,
}

#[derive(Debug)]
pub struct MemoryDriver {
    canvas: Option<MemoryCanvas>,
    state: Arc<Mutex<MemoryDriverState>>,
}

impl MemoryDriver {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            canvas: Some(MemoryCanvas::new(width, height)),
            state: Arc::new(Mutex::new(MemoryDriverState::default())),
        }
    }

    /// Shared handle for inspecting presented frames
    pub fn state(&self) -> Arc<Mutex<MemoryDriverState>> {
        Arc::clone(&self.state)
    }
}

impl LedDriver for MemoryDriver {
    fn initialize(config: &DisplayConfig) -> Result<Self, String> {
        let (width, height) = (config.display_width(), config.display_height());
        if width <= 0 || height <= 0 {
            return Err(format!("Invalid memory canvas size {}x{}", width, height));
        }
        info!("Frames are kept in memory only ({}x{})", width, height);
        Ok(Self::new(width, height))
    }

    fn take_canvas(&mut self) -> Option<Box<dyn LedCanvas>> {
        self.canvas
            .take()
            .map(|canvas| Box::new(canvas) as Box<dyn LedCanvas>)
    }

    fn update_canvas(&mut self, mut canvas: Box<dyn LedCanvas>) -> Box<dyn LedCanvas> {
        let frame = canvas
            .as_any_mut()
            .downcast_mut::<MemoryCanvas>()
            .map(|frame| frame.clone());

        if let Ok(mut state) = self.state.lock() {
            state.frames_presented += 1;
            if frame.is_some() {
                state.last_frame = frame;
            }
        }
        canvas
    }

    fn shutdown(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(frame) = state.last_frame.as_mut() {
                frame.fill(0, 0, 0);
            }
            state.shut_down = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mut canvas = MemoryCanvas::new(4, 2);
        canvas.set_pixel(3, 1, 1, 2, 3);
        canvas.set_pixel(4, 0, 9, 9, 9);
        canvas.set_pixel(0, 2, 9, 9, 9);

        assert_eq!(canvas.pixel(3, 1), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.lit_pixels(), 1);
    }

    #[test]
    fn presented_frames_are_recorded() {
        let mut driver = MemoryDriver::new(2, 2);
        let state = driver.state();

        let mut canvas = driver.take_canvas().unwrap();
        assert!(driver.take_canvas().is_none());

        canvas.fill(0, 255, 0);
        let canvas = driver.update_canvas(canvas);
        assert_eq!(canvas.size(), (2, 2));

        let state = state.lock().unwrap();
        assert_eq!(state.frames_presented, 1);
        assert_eq!(state.last_frame.as_ref().unwrap().count_color([0, 255, 0]), 4);
    }

    #[test]
    fn shutdown_blanks_the_last_frame() {
        let mut driver = MemoryDriver::new(1, 1);
        let state = driver.state();
        let mut canvas = driver.take_canvas().unwrap();
        canvas.fill(255, 255, 255);
        driver.update_canvas(canvas);

        driver.shutdown();

        let state = state.lock().unwrap();
        assert!(state.shut_down);
        assert_eq!(state.last_frame.as_ref().unwrap().lit_pixels(), 0);
    }
}
