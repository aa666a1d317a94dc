//! Display configuration structure and methods

use super::{CliArgs, CountdownConfig, EnvVars};
use crate::display::driver::DriverType;
use log::info;

/// Configuration structure that stores all display settings
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub rows: usize,
    pub cols: usize,
    pub chain_length: usize,
    pub parallel: usize,
    pub led_brightness: u8,
    pub driver_type: DriverType,

    // Additional options
    pub hardware_mapping: String,
    pub pwm_bits: u8,
    pub pwm_lsb_nanoseconds: u32,
    pub gpio_slowdown: Option<u32>,
    pub interlaced: bool,
    pub dither_bits: usize,
    pub panel_type: Option<String>,
    pub multiplexing: Option<String>,
    pub pixel_mapper: Option<String>,
    pub row_setter: String,
    pub led_sequence: String,
    pub pi_chip: Option<String>,
    pub hardware_pulsing: bool,
    pub show_refresh: bool,
    pub inverse_colors: bool,
    pub limit_refresh: u32,

    // Web server configuration
    pub port: u16,
    pub interface: String,

    pub countdown: CountdownConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 64,
            chain_length: 1,
            parallel: 1,
            led_brightness: 100,
            driver_type: DriverType::Memory,
            hardware_mapping: "regular".to_string(),
            pwm_bits: 11,
            pwm_lsb_nanoseconds: 130,
            gpio_slowdown: None,
            interlaced: false,
            dither_bits: 0,
            panel_type: None,
            multiplexing: None,
            pixel_mapper: None,
            row_setter: "default".to_string(),
            led_sequence: "RGB".to_string(),
            pi_chip: None,
            hardware_pulsing: true,
            show_refresh: false,
            inverse_colors: false,
            limit_refresh: 0,
            port: 3000,
            interface: "127.0.0.1".to_string(),
            countdown: CountdownConfig::default(),
        }
    }
}

fn parse_driver_type(driver: Option<&str>) -> Result<DriverType, String> {
    match driver {
        Some("binding") => {
            info!("Selected driver: C++ binding for rpi-rgb-led-matrix (@https://github.com/hzeller/rpi-rgb-led-matrix)");
            Ok(DriverType::RpiLedMatrix)
        }
        Some("native") => {
            info!("Selected driver: Native library rpi_led_panel (@https://github.com/EmbersArc/rpi_led_panel)");
            Ok(DriverType::RpiLedPanel)
        }
        Some("memory") => {
            info!("Selected driver: in-memory canvas (nothing is shown on hardware)");
            Ok(DriverType::Memory)
        }
        None => Err(
            "You must specify a driver type (--driver native|binding|memory or LED_DRIVER=native|binding|memory)"
                .to_string(),
        ),
        Some(other) => Err(format!(
            "Invalid driver type: {:?}. Must be 'native', 'binding' or 'memory'",
            other
        )),
    }
}

impl DisplayConfig {
    /// Create a new configuration by combining CLI arguments and environment variables
    pub fn new(cli_args: CliArgs, env_vars: EnvVars) -> Result<Self, String> {
        // Environment wins over the command line
        let driver_arg = env_vars.driver.clone().or_else(|| cli_args.driver.clone());
        let driver_type = parse_driver_type(driver_arg.as_deref())?;

        let countdown = CountdownConfig::new(&cli_args, &env_vars);

        let led_brightness = env_vars
            .led_brightness
            .unwrap_or(cli_args.led_brightness)
            .clamp(0, 100);

        let pwm_bits = env_vars.pwm_bits.unwrap_or(cli_args.pwm_bits).clamp(1, 11);

        let interface = env_vars
            .interface
            .unwrap_or(cli_args.interface)
            .to_lowercase();

        let interface = if interface == "localhost" {
            "127.0.0.1".to_string()
        } else {
            interface
        };

        Ok(Self {
            rows: env_vars.rows.unwrap_or(cli_args.rows),
            cols: env_vars.cols.unwrap_or(cli_args.cols),
            chain_length: env_vars.chain_length.unwrap_or(cli_args.chain_length),
            parallel: env_vars.parallel.unwrap_or(cli_args.parallel),
            led_brightness,
            driver_type,

            hardware_mapping: env_vars
                .hardware_mapping
                .or(cli_args.hardware_mapping)
                .unwrap_or_else(|| "regular".to_string()),
            pwm_bits,
            pwm_lsb_nanoseconds: env_vars
                .pwm_lsb_nanoseconds
                .unwrap_or(cli_args.pwm_lsb_nanoseconds),
            gpio_slowdown: env_vars.gpio_slowdown.or(cli_args.gpio_slowdown),
            interlaced: env_vars.interlaced.unwrap_or(cli_args.interlaced),
            dither_bits: env_vars.dither_bits.unwrap_or(cli_args.dither_bits),
            panel_type: env_vars.panel_type.or(cli_args.panel_type),
            multiplexing: env_vars.multiplexing.or(cli_args.multiplexing),
            pixel_mapper: env_vars.pixel_mapper.or(cli_args.pixel_mapper),
            row_setter: env_vars.row_setter.unwrap_or(cli_args.row_setter),
            led_sequence: env_vars.led_sequence.unwrap_or(cli_args.led_sequence),
            pi_chip: env_vars.pi_chip.or(cli_args.pi_chip),
            hardware_pulsing: env_vars
                .hardware_pulsing
                .unwrap_or(!cli_args.no_hardware_pulse),
            show_refresh: env_vars.show_refresh.unwrap_or(cli_args.show_refresh),
            inverse_colors: env_vars.inverse_colors.unwrap_or(cli_args.inverse_colors),
            limit_refresh: env_vars.limit_refresh.unwrap_or(cli_args.limit_refresh),

            port: env_vars.port.unwrap_or(cli_args.port),
            interface,

            countdown,
        })
    }

    /// Calculate the total display width in pixels
    pub fn display_width(&self) -> i32 {
        (self.cols * self.chain_length) as i32
    }

    /// Calculate the total display height in pixels
    pub fn display_height(&self) -> i32 {
        (self.rows * self.parallel) as i32
    }

    /// Validate the hardware and web server settings
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.rows == 0 {
            errors.push("Rows must be greater than 0".to_string());
        }

        if self.cols == 0 {
            errors.push("Columns must be greater than 0".to_string());
        }

        if self.chain_length == 0 {
            errors.push("Chain length must be greater than 0".to_string());
        }

        if self.parallel == 0 {
            errors.push("Parallel chains must be greater than 0".to_string());
        }

        if self.parallel > 3 {
            errors.push("Parallel chains must be between 1 and 3 (limitation of both drivers)".to_string());
        }

        if self.pwm_bits < 1 || self.pwm_bits > 11 {
            errors.push("PWM bits must be between 1 and 11".to_string());
        }

        if self.led_brightness > 100 {
            errors.push("LED brightness must be between 0 and 100".to_string());
        }

        if let Some(slowdown) = self.gpio_slowdown {
            if slowdown > 4 {
                errors.push("GPIO slowdown must be between 0 and 4".to_string());
            }
        }

        if let Err(e) = self.interface.parse::<std::net::IpAddr>() {
            errors.push(format!(
                "Invalid network interface address '{}': {}. Use a valid IP address or 'localhost'",
                self.interface, e
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
