//! Christmas tree artwork drawn with embedded-graphics primitives.
//!
//! Trees are drawn into an RGBA bitmap whose background stays fully
//! transparent, so the result can be composited over whatever is already on
//! the panel.

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{Rgb888, RgbColor},
    primitives::{Circle, Primitive, PrimitiveStyle, Rectangle, Triangle},
    Drawable, Pixel,
};
use image::{Rgba, RgbaImage};

use crate::models::color::lighten;

pub const TRUNK_COLOR: [u8; 3] = [101, 67, 33];
pub const STAR_COLOR: [u8; 3] = [255, 255, 0];
pub const ORNAMENT_COLOR: [u8; 3] = [255, 0, 0];
pub const DEFAULT_TREE_COLOR: [u8; 3] = [0, 128, 0];

/// Draws opaque pixels into an `RgbaImage`, clipping at its edges
pub struct RgbaCanvas<'a> {
    image: &'a mut RgbaImage,
}

impl<'a> RgbaCanvas<'a> {
    pub fn new(image: &'a mut RgbaImage) -> Self {
        Self { image }
    }
}

impl DrawTarget for RgbaCanvas<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < width && y < height {
                self.image
                    .put_pixel(x, y, Rgba([color.r(), color.g(), color.b(), 255]));
            }
        }
        Ok(())
    }
}

impl OriginDimensions for RgbaCanvas<'_> {
    fn size(&self) -> Size {
        let (width, height) = self.image.dimensions();
        Size::new(width, height)
    }
}

fn rgb(color: [u8; 3]) -> Rgb888 {
    Rgb888::new(color[0], color[1], color[2])
}

fn fill(color: [u8; 3]) -> PrimitiveStyle<Rgb888> {
    PrimitiveStyle::with_fill(rgb(color))
}

// Floor division, matching how pixel grids round negative offsets
fn half_down(value: i32) -> i32 {
    value.div_euclid(2)
}

fn draw_disc<D>(target: &mut D, center: Point, radius: i32, color: [u8; 3]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let diameter = (2 * radius + 1).max(1) as u32;
    Circle::with_center(center, diameter)
        .into_styled(fill(color))
        .draw(target)
}

fn draw_layer<D>(
    target: &mut D,
    center_x: i32,
    layer_y: i32,
    layer_width: i32,
    color: [u8; 3],
) -> Result<i32, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let half = layer_width / 2;
    let top_y = layer_y - half;
    Triangle::new(
        Point::new(center_x, top_y),
        Point::new(center_x - half, layer_y),
        Point::new(center_x + half, layer_y),
    )
    .into_styled(fill(color))
    .draw(target)?;
    Ok(top_y)
}

fn draw_trunk<D>(
    target: &mut D,
    center_x: i32,
    height: i32,
    trunk_width: i32,
    trunk_height: i32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let trunk_x = center_x - trunk_width / 2;
    Rectangle::with_corners(
        Point::new(trunk_x, height - trunk_height),
        Point::new(trunk_x + trunk_width, height),
    )
    .into_styled(fill(TRUNK_COLOR))
    .draw(target)
}

/// Draw the detailed tree that fills a `width` x `height` area
pub fn draw_tree<D>(target: &mut D, width: i32, height: i32, color: [u8; 3]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let center_x = width / 2;
    let base_y = height - (height / 8).max(3);
    let layer_count = (height / 8).max(4);
    let highlight = lighten(color, 20);

    let layer_y = |i: i32| base_y - i * height / (layer_count + 2);
    let layer_width = |i: i32| (width - i * width / (layer_count + 3)).max(6);

    let mut top_y = base_y;
    for i in 0..layer_count {
        let (y, w) = (layer_y(i), layer_width(i));
        top_y = draw_layer(target, center_x, y, w, color)?;

        if i > 0 && w > 8 {
            let small = w / 4;
            for offset in [half_down(-small), small / 2] {
                if offset.abs() < w / 2 - 2 {
                    let x = center_x + offset;
                    Triangle::new(
                        Point::new(x, y - small),
                        Point::new(x - small / 2, y),
                        Point::new(x + small / 2, y),
                    )
                    .into_styled(fill(highlight))
                    .draw(target)?;
                }
            }
        }
    }

    draw_trunk(target, center_x, height, (width / 6).max(3), (height / 6).max(4))?;

    let star_size = (width / 8).min(height / 10).max(3);
    draw_disc(
        target,
        Point::new(center_x, top_y - star_size - 1),
        star_size,
        STAR_COLOR,
    )?;

    if width >= 16 && height >= 20 {
        let ornament_size = (width / 16).min(3).max(1);
        for layer in (1..=3).filter(|layer| *layer < layer_count) {
            // Ornaments hang on the unclamped layer width
            let w = width - layer * width / (layer_count + 3);
            if w <= 12 {
                continue;
            }
            let y = layer_y(layer);
            draw_disc(target, Point::new(center_x - w / 3, y), ornament_size, ORNAMENT_COLOR)?;
            if layer % 2 == 0 {
                draw_disc(target, Point::new(center_x + w / 3, y), ornament_size, ORNAMENT_COLOR)?;
            }
        }
    }

    Ok(())
}

/// Draw the simple three layer tree used for the bundled asset
pub fn draw_default_tree<D>(target: &mut D, size: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let center_x = size / 2;
    let base_y = size - size / 4;
    let layer_count = 3;

    let mut top_y = base_y;
    for i in 0..layer_count {
        let y = base_y - i * size / (layer_count + 1);
        let w = (size - i * size / (layer_count + 2)).max(4);
        top_y = draw_layer(target, center_x, y, w, DEFAULT_TREE_COLOR)?;
    }

    draw_trunk(target, center_x, size, (size / 8).max(2), size / 6)?;

    let star_size = (size / 12).max(2);
    draw_disc(
        target,
        Point::new(center_x, top_y - star_size),
        star_size,
        STAR_COLOR,
    )?;

    if size >= 24 {
        let ornament_size = (size / 16).max(1);
        let y = base_y - size / (layer_count + 1);
        let w = size - size / (layer_count + 2);
        for x in [center_x - w / 3, center_x + w / 3] {
            draw_disc(target, Point::new(x, y), ornament_size, ORNAMENT_COLOR)?;
        }
    }

    Ok(())
}

fn render(width: u32, height: u32, draw: impl FnOnce(&mut RgbaCanvas<'_>)) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    if width > 0 && height > 0 {
        draw(&mut RgbaCanvas::new(&mut image));
    }
    image
}

/// Render the detailed tree into a transparent bitmap
pub fn procedural_tree(width: u32, height: u32, color: [u8; 3]) -> RgbaImage {
    render(width, height, |canvas| {
        draw_tree(canvas, width as i32, height as i32, color).unwrap_or_else(|never| match never {})
    })
}

/// Render the bundled asset tree into a transparent `size` x `size` bitmap
pub fn default_tree(size: u32) -> RgbaImage {
    render(size, size, |canvas| {
        draw_default_tree(canvas, size as i32).unwrap_or_else(|never| match never {})
    })
}
