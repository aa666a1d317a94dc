use crate::config::DisplayConfig;

/// Panel options shared by both hardware drivers
#[derive(Debug, Clone)]
pub struct MatrixOptions {
    pub rows: usize,
    pub cols: usize,
    pub chain_length: usize,
    pub parallel: usize,
    pub brightness: u8,

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

    // Only the C++ binding understands these
    pub hardware_pulsing: bool,
    pub show_refresh: bool,
    pub inverse_colors: bool,
    pub limit_refresh: u32,

    // Only the native driver understands this
    pub pi_chip: Option<String>,
}

impl MatrixOptions {
    /// Environment overrides are already merged into `config`
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            chain_length: config.chain_length,
            parallel: config.parallel,
            brightness: config.led_brightness,
            hardware_mapping: config.hardware_mapping.clone(),
            pwm_bits: config.pwm_bits,
            pwm_lsb_nanoseconds: config.pwm_lsb_nanoseconds,
            gpio_slowdown: config.gpio_slowdown,
            interlaced: config.interlaced,
            dither_bits: config.dither_bits,
            panel_type: config.panel_type.clone(),
            multiplexing: config.multiplexing.clone(),
            pixel_mapper: config.pixel_mapper.clone(),
            row_setter: config.row_setter.clone(),
            led_sequence: config.led_sequence.clone(),
            hardware_pulsing: config.hardware_pulsing,
            show_refresh: config.show_refresh,
            inverse_colors: config.inverse_colors,
            limit_refresh: config.limit_refresh,
            pi_chip: config.pi_chip.clone(),
        }
    }

    /// Total pixel size of the chained panels as (width, height)
    pub fn dimensions(&self) -> (i32, i32) {
        (
            (self.cols * self.chain_length) as i32,
            (self.rows * self.parallel) as i32,
        )
    }

    /// Fail with a driver-specific message if anything was left unsupported
    pub fn reject_unsupported(driver: &str, unsupported: Vec<String>) -> Result<(), String> {
        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "The following options are not supported by the {} driver: {}",
                driver,
                unsupported.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_chain_and_parallel() {
        let config = DisplayConfig {
            rows: 16,
            cols: 32,
            chain_length: 3,
            parallel: 2,
            ..DisplayConfig::default()
        };
        let options = MatrixOptions::from_config(&config);
        assert_eq!(options.dimensions(), (96, 32));
    }

    #[test]
    fn unsupported_options_are_listed() {
        assert!(MatrixOptions::reject_unsupported("native", Vec::new()).is_ok());

        let err = MatrixOptions::reject_unsupported(
            "binding",
            vec!["pi_chip=BCM2711".to_string(), "pwm_bits=12".to_string()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            "The following options are not supported by the binding driver: pi_chip=BCM2711, pwm_bits=12"
        );
    }
}
