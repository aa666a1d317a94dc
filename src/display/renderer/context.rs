/// Display size and brightness shared with the renderer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderContext {
    pub display_width: i32,
    pub display_height: i32,

    /// User brightness in percent (0-100)
    pub brightness: u8,
}

impl RenderContext {
    pub fn new(display_width: i32, display_height: i32, brightness: u8) -> Self {
        Self {
            display_width,
            display_height,
            brightness: brightness.min(100),
        }
    }

    /// Scale a color by the user brightness
    pub fn apply_brightness(&self, color: [u8; 3]) -> [u8; 3] {
        let scale = self.brightness as f32 / 100.0;
        color.map(|channel| (channel as f32 * scale) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_scales_every_channel() {
        let ctx = RenderContext::new(64, 32, 50);
        assert_eq!(ctx.apply_brightness([255, 128, 0]), [127, 64, 0]);
        assert_eq!(RenderContext::new(64, 32, 100).apply_brightness([9, 8, 7]), [9, 8, 7]);
    }

    #[test]
    fn brightness_is_capped() {
        assert_eq!(RenderContext::new(1, 1, 250).brightness, 100);
    }
}
