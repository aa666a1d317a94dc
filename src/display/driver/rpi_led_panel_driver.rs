use log::{debug, error, warn};
use rpi_led_panel::{
    Canvas, HardwareMapping, LedSequence, MultiplexMapperType, PanelType, PiChip, RGBMatrix,
    RGBMatrixConfig, RowAddressSetterType,
};
use std::any::Any;
use std::fmt::Debug;

use super::options::MatrixOptions;
use super::{LedCanvas, LedDriver};
use crate::config::DisplayConfig;

// Countdown frames change once a day, a modest refresh rate keeps CPU use low
const NATIVE_REFRESH_RATE: usize = 120;

pub struct RpiLedPanelCanvas {
    canvas: Option<Box<Canvas>>,
    width: i32,
    height: i32,
}

impl Debug for RpiLedPanelCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiLedPanelCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

// Canvas is a plain pixel buffer, it is only ever used by one thread at a time
unsafe impl Send for RpiLedPanelCanvas {}

impl LedCanvas for RpiLedPanelCanvas {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.set_pixel(x, y, r, g, b);
        }
    }

    fn fill(&mut self, r: u8, g: u8, b: u8) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.fill(r, g, b);
        }
    }

    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct RpiLedPanelDriver {
    matrix: RGBMatrix,
    canvas: Option<Box<Canvas>>,
    width: i32,
    height: i32,
}

impl Debug for RpiLedPanelDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpiLedPanelDriver")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("has_canvas", &self.canvas.is_some())
            .finish()
    }
}

unsafe impl Send for RpiLedPanelDriver {}

impl RpiLedPanelDriver {
    fn wrap(&self, canvas: Box<Canvas>) -> Box<dyn LedCanvas> {
        Box::new(RpiLedPanelCanvas {
            canvas: Some(canvas),
            width: self.width,
            height: self.height,
        })
    }
}

impl LedDriver for RpiLedPanelDriver {
    fn initialize(config: &DisplayConfig) -> Result<Self, String> {
        let options = MatrixOptions::from_config(config);
        let matrix_config = Self::create_matrix_config(&options)?;

        debug!("Initializing rpi-led-panel with options: {:?}", options);

        let (matrix, canvas) = RGBMatrix::new(matrix_config, 0)
            .map_err(|e| format!("Failed to initialize rpi-led-panel: {}", e))?;
        let (width, height) = options.dimensions();

        Ok(Self {
            matrix,
            canvas: Some(canvas),
            width,
            height,
        })
    }

    fn take_canvas(&mut self) -> Option<Box<dyn LedCanvas>> {
        let canvas = self.canvas.take()?;
        Some(self.wrap(canvas))
    }

    fn update_canvas(&mut self, mut canvas: Box<dyn LedCanvas>) -> Box<dyn LedCanvas> {
        let inner = canvas
            .as_any_mut()
            .downcast_mut::<RpiLedPanelCanvas>()
            .and_then(|panel_canvas| panel_canvas.canvas.take());

        match inner {
            Some(inner) => {
                let next = self.matrix.update_on_vsync(inner);
                self.wrap(next)
            }
            None => {
                error!("Canvas handed to rpi-led-panel does not belong to it, frame dropped");
                canvas
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut canvas) = self.canvas.take() {
            canvas.fill(0, 0, 0);
            let _ = self.matrix.update_on_vsync(canvas);
        }
    }
}

impl RpiLedPanelDriver {
    fn create_matrix_config(options: &MatrixOptions) -> Result<RGBMatrixConfig, String> {
        let mut unsupported = Vec::new();

        let mut config = RGBMatrixConfig {
            rows: options.rows,
            cols: options.cols,
            chain_length: options.chain_length,
            parallel: options.parallel,
            led_brightness: options.brightness,
            refresh_rate: NATIVE_REFRESH_RATE,
            pwm_bits: options.pwm_bits as usize,
            pwm_lsb_nanoseconds: options.pwm_lsb_nanoseconds,
            interlaced: options.interlaced,
            dither_bits: options.dither_bits,
            slowdown: options.gpio_slowdown,
            ..RGBMatrixConfig::default()
        };

        config.hardware_mapping = match options.hardware_mapping.to_lowercase().as_str() {
            "regular" => HardwareMapping::regular(),
            "adafruit-hat" | "adafruithat" => HardwareMapping::adafruit_hat(),
            "adafruit-hat-pwm" | "adafruithatpwm" => HardwareMapping::adafruit_hat_pwm(),
            "regular-pi1" => HardwareMapping::regular_pi1(),
            "classic" => HardwareMapping::classic(),
            "classic-pi1" => HardwareMapping::classic_pi1(),
            other => {
                unsupported.push(format!("hardware_mapping={}", other));
                HardwareMapping::regular()
            }
        };

        config.led_sequence = match options.led_sequence.to_uppercase().as_str() {
            "RGB" => LedSequence::Rgb,
            "RBG" => LedSequence::Rbg,
            "GRB" => LedSequence::Grb,
            "GBR" => LedSequence::Gbr,
            "BRG" => LedSequence::Brg,
            "BGR" => LedSequence::Bgr,
            other => {
                unsupported.push(format!("led_sequence={}", other));
                LedSequence::Rgb
            }
        };

        config.pi_chip = match options.pi_chip.as_deref().map(str::to_uppercase).as_deref() {
            None => None,
            Some("BCM2708") => Some(PiChip::BCM2708),
            Some("BCM2709") => Some(PiChip::BCM2709),
            Some("BCM2711") => Some(PiChip::BCM2711),
            Some(other) => {
                unsupported.push(format!("pi_chip={}", other));
                None
            }
        };

        config.panel_type = match options.panel_type.as_deref().map(str::to_uppercase).as_deref() {
            None => None,
            Some("FM6126" | "FM6126A") => Some(PanelType::FM6126),
            Some("FM6127") => Some(PanelType::FM6127),
            Some(other) => {
                unsupported.push(format!("panel_type={}", other));
                None
            }
        };

        if let Some(name) = &options.multiplexing {
            config.multiplexing = Self::map_multiplexing(name);
            if config.multiplexing.is_none() {
                unsupported.push(format!("multiplexing={}", name));
            }
        }

        config.row_setter = Self::map_row_setter(&options.row_setter);

        if let Some(mappers) = &options.pixel_mapper {
            unsupported.push(format!("pixel_mapper={}", mappers));
        }
        if !options.hardware_pulsing {
            unsupported.push("no-hardware-pulse".to_string());
        }
        if options.show_refresh {
            unsupported.push("show-refresh".to_string());
        }
        if options.inverse_colors {
            unsupported.push("inverse-colors".to_string());
        }
        if options.limit_refresh > 0 {
            unsupported.push(format!("limit-refresh={}", options.limit_refresh));
        }

        MatrixOptions::reject_unsupported("native", unsupported)?;
        Ok(config)
    }

    fn map_multiplexing(name: &str) -> Option<MultiplexMapperType> {
        let mapper = match name.to_lowercase().as_str() {
            "stripe" => MultiplexMapperType::Stripe,
            "checkered" | "checker" => MultiplexMapperType::Checkered,
            "spiral" => MultiplexMapperType::Spiral,
            "zstripe" | "zstripe08" => MultiplexMapperType::ZStripe08,
            "zstripe44" => MultiplexMapperType::ZStripe44,
            "zstripe80" => MultiplexMapperType::ZStripe80,
            "coreman" => MultiplexMapperType::Coreman,
            "kaler2scan" => MultiplexMapperType::Kaler2Scan,
            "p10z" => MultiplexMapperType::P10Z,
            "qiangliq8" => MultiplexMapperType::QiangLiQ8,
            "inversedzstripe" => MultiplexMapperType::InversedZStripe,
            "p10outdoor1r1g1b1" => MultiplexMapperType::P10Outdoor1R1G1B1,
            "p10outdoor1r1g1b2" => MultiplexMapperType::P10Outdoor1R1G1B2,
            "p10outdoor1r1g1b3" => MultiplexMapperType::P10Outdoor1R1G1B3,
            "p10coreman" => MultiplexMapperType::P10Coreman,
            "p8outdoor1r1g1b" => MultiplexMapperType::P8Outdoor1R1G1B,
            "flippedstripe" => MultiplexMapperType::FlippedStripe,
            "p10outdoor32x16halfscan" => MultiplexMapperType::P10Outdoor32x16HalfScan,
            _ => return None,
        };
        Some(mapper)
    }

    fn map_row_setter(row_setter: &str) -> RowAddressSetterType {
        match row_setter.to_lowercase().as_str() {
            "direct" | "default" => RowAddressSetterType::Direct,
            "shift-register" | "shiftregister" => RowAddressSetterType::ShiftRegister,
            "direct-abcd" | "directabcdline" => RowAddressSetterType::DirectABCDLine,
            "abc-shift-register" | "abcshiftregister" => RowAddressSetterType::ABCShiftRegister,
            "sm5266" => RowAddressSetterType::SM5266,
            other => {
                warn!("Unknown row address setter '{}', using direct", other);
                RowAddressSetterType::Direct
            }
        }
    }
}
