use crate::display::driver::LedCanvas;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
    Pixel,
};

/// Lets embedded-graphics primitives and text draw onto an `LedCanvas`.
///
/// Pixels outside the canvas are dropped, so callers can draw shapes that
/// straddle the edge of the panel.
pub struct EmbeddedGraphicsCanvas<'a> {
    canvas: &'a mut Box<dyn LedCanvas>,
    width: i32,
    height: i32,
}

impl<'a> EmbeddedGraphicsCanvas<'a> {
    pub fn new(canvas: &'a mut Box<dyn LedCanvas>) -> Self {
        let (width, height) = canvas.size();
        Self {
            canvas,
            width,
            height,
        }
    }

    /// Set a single pixel without going through a `Drawable`
    pub fn put(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.canvas
                .set_pixel(x as usize, y as usize, color[0], color[1], color[2]);
        }
    }
}

impl DrawTarget for EmbeddedGraphicsCanvas<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put(point.x, point.y, [color.r(), color.g(), color.b()]);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.canvas.fill(color.r(), color.g(), color.b());
        Ok(())
    }
}

impl OriginDimensions for EmbeddedGraphicsCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.width.max(0) as u32, self.height.max(0) as u32)
    }
}
