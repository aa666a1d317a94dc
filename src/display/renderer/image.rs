use image::imageops::FilterType;
use image::RgbaImage;
use log::{debug, error};
use std::path::{Path, PathBuf};

use crate::display::driver::LedCanvas;
use crate::display::renderer::RenderContext;

/// Places a tree bitmap is looked for, relative to the asset directory
pub const TREE_IMAGE_CANDIDATES: [&str; 2] = ["tree icon.png", "assets/christmas_tree.png"];

pub fn load_image(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(dynamic) => {
            let rgba = dynamic.to_rgba8();
            debug!(
                "Loaded image {} ({}x{})",
                path.display(),
                rgba.width(),
                rgba.height()
            );
            Some(rgba)
        }
        Err(err) => {
            error!("Failed to open image {}: {}", path.display(), err);
            None
        }
    }
}

/// First tree bitmap found in `asset_dir`
pub fn find_tree_image(asset_dir: &Path) -> Option<PathBuf> {
    TREE_IMAGE_CANDIDATES
        .iter()
        .map(|name| asset_dir.join(name))
        .find(|path| path.is_file())
}

/// Largest size with the same aspect ratio as `(width, height)` that fits the box
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return None;
    }
    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = (width as f64 * ratio) as u32;
    let new_height = (height as f64 * ratio) as u32;
    if new_width == 0 || new_height == 0 {
        return None;
    }
    Some((new_width.min(max_width), new_height.min(max_height)))
}

/// Resize with Lanczos filtering, keeping the aspect ratio
pub fn scale_to_fit(image: &RgbaImage, max_width: u32, max_height: u32) -> Option<RgbaImage> {
    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height)?;
    if (width, height) == image.dimensions() {
        return Some(image.clone());
    }
    Some(image::imageops::resize(image, width, height, FilterType::Lanczos3))
}

/// Composite `image` at (x, y) over a black canvas, honouring alpha
pub fn blit_rgba(
    canvas: &mut Box<dyn LedCanvas>,
    image: &RgbaImage,
    x: i32,
    y: i32,
    ctx: &RenderContext,
) {
    let (canvas_width, canvas_height) = canvas.size();

    for (px, py, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        let (dx, dy) = (x + px as i32, y + py as i32);
        if dx < 0 || dy < 0 || dx >= canvas_width || dy >= canvas_height {
            continue;
        }
        let blend = |channel: u8| ((channel as u16 * a as u16) / 255) as u8;
        let [r, g, b] = ctx.apply_brightness([blend(r), blend(g), blend(b)]);
        canvas.set_pixel(dx as usize, dy as usize, r, g, b);
    }
}
