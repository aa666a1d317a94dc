use log::{error, warn};
use rpi_led_matrix::{
    LedCanvas as RpiCanvas, LedColor, LedMatrix, LedMatrixOptions, LedRuntimeOptions,
};
use std::any::Any;
use std::fmt::Debug;

use super::options::MatrixOptions;
use super::{LedCanvas, LedDriver};
use crate::config::DisplayConfig;

const BLACK: LedColor = LedColor {
    red: 0,
    green: 0,
    blue: 0,
};

pub struct RpiLedMatrixCanvas {
    canvas: Option<RpiCanvas>,
    width: i32,
    height: i32,
}

impl Debug for RpiLedMatrixCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiLedMatrixCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

unsafe impl Send for RpiLedMatrixCanvas {}

impl LedCanvas for RpiLedMatrixCanvas {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.set(
                x as i32,
                y as i32,
                &LedColor {
                    red: r,
                    green: g,
                    blue: b,
                },
            );
        }
    }

    fn fill(&mut self, r: u8, g: u8, b: u8) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.fill(&LedColor {
                red: r,
                green: g,
                blue: b,
            });
        }
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Driver for the C++ rpi-rgb-led-matrix library.
///
/// The library hands out exactly one offscreen canvas, which is then swapped
/// back and forth with the matrix. Asking for a second one breaks vsync.
pub struct RpiLedMatrixDriver {
    matrix: LedMatrix,
    width: i32,
    height: i32,
    canvas: Option<RpiCanvas>,
    canvas_lent: bool,
}

impl Debug for RpiLedMatrixDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiLedMatrixDriver")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("canvas_lent", &self.canvas_lent)
            .finish()
    }
}

unsafe impl Send for RpiLedMatrixDriver {}

impl RpiLedMatrixDriver {
    fn wrap(&self, canvas: RpiCanvas) -> Box<dyn LedCanvas> {
        Box::new(RpiLedMatrixCanvas {
            canvas: Some(canvas),
            width: self.width,
            height: self.height,
        })
    }
}

impl LedDriver for RpiLedMatrixDriver {
    fn initialize(config: &DisplayConfig) -> Result<Self, String> {
        let options = MatrixOptions::from_config(config);
        let (matrix_options, rt_options) = Self::create_matrix_options(&options)?;

        let matrix = LedMatrix::new(Some(matrix_options), Some(rt_options))
            .map_err(|e| format!("Failed to initialize rpi-led-matrix: {}", e))?;
        let (width, height) = options.dimensions();
        let canvas = Some(matrix.offscreen_canvas());

        Ok(Self {
            matrix,
            width,
            height,
            canvas,
            canvas_lent: false,
        })
    }

    fn take_canvas(&mut self) -> Option<Box<dyn LedCanvas>> {
        if self.canvas_lent {
            return None;
        }
        let canvas = self.canvas.take()?;
        self.canvas_lent = true;
        Some(self.wrap(canvas))
    }

    fn update_canvas(&mut self, mut canvas: Box<dyn LedCanvas>) -> Box<dyn LedCanvas> {
        let inner = canvas
            .as_any_mut()
            .downcast_mut::<RpiLedMatrixCanvas>()
            .and_then(|matrix_canvas| matrix_canvas.canvas.take());

        match inner {
            Some(inner) => {
                let next = self.matrix.swap(inner);
                self.wrap(next)
            }
            None => {
                error!("Canvas handed to rpi-led-matrix does not belong to it, frame dropped");
                canvas
            }
        }
    }

    fn shutdown(&mut self) {
        let mut canvas = self
            .canvas
            .take()
            .unwrap_or_else(|| self.matrix.offscreen_canvas());
        canvas.fill(&BLACK);
        let _ = self.matrix.swap(canvas);

        // Give the refresh thread time to push the black frame
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}

impl RpiLedMatrixDriver {
    fn create_matrix_options(
        options: &MatrixOptions,
    ) -> Result<(LedMatrixOptions, LedRuntimeOptions), String> {
        let mut matrix_options = LedMatrixOptions::new();
        let mut rt_options = LedRuntimeOptions::new();
        let mut unsupported = Vec::new();

        if options.parallel > 3 {
            return Err(format!(
                "C++ binding driver only supports 1-3 parallel chains, but {} was specified",
                options.parallel
            ));
        }

        matrix_options.set_rows(options.rows as u32);
        matrix_options.set_cols(options.cols as u32);
        matrix_options.set_chain_length(options.chain_length as u32);
        matrix_options.set_parallel(options.parallel as u32);

        matrix_options
            .set_brightness(options.brightness)
            .map_err(|e| format!("Failed to set brightness: {}", e))?;

        matrix_options.set_hardware_mapping(Self::map_hardware_mapping(&options.hardware_mapping));

        if let Some(slowdown) = options.gpio_slowdown {
            rt_options.set_gpio_slowdown(slowdown);
        }

        if let Err(e) = matrix_options.set_pwm_bits(options.pwm_bits) {
            error!("Failed to set PWM bits: {}", e);
            unsupported.push(format!("pwm_bits={}", options.pwm_bits));
        }

        matrix_options.set_pwm_lsb_nanoseconds(options.pwm_lsb_nanoseconds);
        matrix_options.set_scan_mode(u32::from(options.interlaced));
        matrix_options.set_pwm_dither_bits(options.dither_bits as u32);

        // Panel type and pixel mappers are passed through as strings
        if let Some(panel) = &options.panel_type {
            matrix_options.set_panel_type(panel);
        }
        if let Some(mapper) = &options.pixel_mapper {
            matrix_options.set_pixel_mapper_config(mapper);
        }

        if let Some(name) = &options.multiplexing {
            matrix_options.set_multiplexing(Self::map_multiplexing(name));
        }

        matrix_options.set_led_rgb_sequence(&options.led_sequence);
        matrix_options.set_row_addr_type(Self::map_row_setter(&options.row_setter));
        matrix_options.set_hardware_pulsing(options.hardware_pulsing);
        matrix_options.set_refresh_rate(options.show_refresh);
        matrix_options.set_inverse_colors(options.inverse_colors);

        if options.limit_refresh > 0 {
            matrix_options.set_limit_refresh(options.limit_refresh);
        }

        // The library drops to the daemon user right after opening GPIO
        rt_options.set_drop_privileges(true);

        if let Some(chip) = &options.pi_chip {
            unsupported.push(format!("pi_chip={}", chip));
        }

        MatrixOptions::reject_unsupported("binding", unsupported)?;
        Ok((matrix_options, rt_options))
    }

    fn map_multiplexing(name: &str) -> u32 {
        match name.to_lowercase().as_str() {
            "direct" => 0,
            "stripe" => 1,
            "checkered" | "checker" => 2,
            "spiral" => 3,
            "zstripe" | "zstripe08" => 4,
            "znmirrorzstripe" => 5,
            "coreman" => 6,
            "kaler2scan" => 7,
            "zstripeuneven" => 8,
            "p10-128x4-z" => 9,
            "qiangliq8" => 10,
            "inversedzstripe" => 11,
            "p10outdoor1r1g1-1" => 12,
            "p10outdoor1r1g1-2" => 13,
            "p10outdoor1r1g1-3" => 14,
            "p10coremanmapper" => 15,
            "p8outdoor1r1g1" => 16,
            _ => {
                warn!("Unknown multiplexing type '{}' for binding driver, using Stripe", name);
                1
            }
        }
    }

    fn map_row_setter(row_setter: &str) -> u32 {
        match row_setter.to_lowercase().as_str() {
            "direct" | "default" => 0,
            "shiftregister" | "ab-addressed" => 1,
            "directabcdline" | "direct-row-select" => 2,
            "abcshiftregister" | "abc-addressed" => 3,
            "sm5266" | "abc-shift-de" => 4,
            _ => {
                warn!("Unknown row address setter '{}' for binding driver, using Direct", row_setter);
                0
            }
        }
    }

    fn map_hardware_mapping(mapping: &str) -> &'static str {
        match mapping.to_lowercase().as_str() {
            "regular" => "regular",
            "adafruit-hat" | "adafruithat" => "adafruit-hat",
            "adafruit-hat-pwm" | "adafruithatpwm" => "adafruit-hat-pwm",
            "regular-pi1" | "regularpi1" => "regular-pi1",
            "classic" => "classic",
            "classic-pi1" | "classicpi1" => "classic-pi1",
            _ => {
                warn!("Unknown hardware mapping '{}', using 'regular'", mapping);
                "regular"
            }
        }
    }
}
