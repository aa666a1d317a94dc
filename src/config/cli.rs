//! Command-line flags. Environment variables can override any of them.

/// Christmas Countdown
///
/// Shows the days left until Christmas next to a festive tree on an LED matrix.
#[derive(argh::FromArgs, Debug, Clone)]
pub struct CliArgs {
    // Countdown

    #[argh(option, default = "String::from(\"255,0,0\")")]
    /// color of the countdown text, "r,g,b" or "#rrggbb" (default red)
    pub text_color: String,

    #[argh(option, default = "String::from(\"0,128,0\")")]
    /// color of the drawn tree, "r,g,b" or "#rrggbb" (default green)
    pub tree_color: String,

    #[argh(option)]
    /// edge of the square the tree is kept inside, in pixels
    /// (default: as large as the left half allows)
    pub tree_size: Option<i64>,

    #[argh(option)]
    /// where "tree icon.png" or "assets/christmas_tree.png" is looked up
    /// (default /usr/share/christmas-countdown)
    pub asset_dir: Option<String>,

    #[argh(option, default = "1000")]
    /// milliseconds between countdown refreshes (default 1000)
    pub update_interval_ms: u64,

    // Info server

    #[argh(option, default = "3000")]
    /// info server port (default 3000)
    pub port: u16,

    #[argh(option, default = "String::from(\"127.0.0.1\")")]
    /// info server listen address (default 127.0.0.1)
    pub interface: String,

    // Panel. The bracket after each flag lists the drivers that honour it.

    #[argh(option, short = 'd')]
    /// panel driver, required: "native" (rpi_led_panel, pure Rust),
    /// "binding" (hzeller's rpi-rgb-led-matrix) or "memory" (no panel)
    pub driver: Option<String>,

    #[argh(option, short = 'r', default = "32")]
    /// rows per panel (default 32) [native, binding]
    pub rows: usize,

    #[argh(option, short = 'c', default = "64")]
    /// columns per panel (default 64) [native, binding]
    pub cols: usize,

    #[argh(option, short = 'p', default = "1")]
    /// parallel chains (default 1, binding accepts 1-3) [native, binding]
    pub parallel: usize,

    #[argh(option, short = 'n', default = "1")]
    /// panels per chain (default 1) [native, binding]
    pub chain_length: usize,

    #[argh(option, short = 'b', default = "100")]
    /// initial brightness in percent (default 100) [native, binding]
    pub led_brightness: u8,

    #[argh(option)]
    /// GPIO wiring, e.g. "regular" or "adafruit-hat" [native, binding]
    pub hardware_mapping: Option<String>,

    #[argh(option)]
    /// chip model of the Pi, e.g. "BCM2711" (default: detected) [native]
    pub pi_chip: Option<String>,

    #[argh(option, default = "11")]
    /// PWM bits of color depth, 1-11 (default 11) [native, binding]
    pub pwm_bits: u8,

    #[argh(option, default = "130")]
    /// nanoseconds of the lowest PWM bit (default 130) [native, binding]
    pub pwm_lsb_nanoseconds: u32,

    #[argh(option)]
    /// GPIO slowdown, 0-4 (default: by Pi model) [native, binding]
    pub gpio_slowdown: Option<u32>,

    #[argh(switch)]
    /// interlaced scanning [native, binding]
    pub interlaced: bool,

    #[argh(option, default = "0")]
    /// time dithering bits (default 0) [native, binding]
    pub dither_bits: usize,

    #[argh(option)]
    /// panel chip needing special init, e.g. "FM6126A" [native, binding]
    pub panel_type: Option<String>,

    #[argh(option)]
    /// multiplexing scheme, e.g. "Stripe" or "Checkered" [native, binding]
    pub multiplexing: Option<String>,

    #[argh(option)]
    /// pixel mappers separated by ';', e.g. "U-mapper;Rotate:90" [binding]
    pub pixel_mapper: Option<String>,

    #[argh(option, default = "String::from(\"default\")")]
    /// row address setter (default "default") [native, binding]
    pub row_setter: String,

    #[argh(option, default = "String::from(\"RGB\")")]
    /// LED color order (default "RGB") [native, binding]
    pub led_sequence: String,

    #[argh(switch)]
    /// turn off hardware pin pulsing [binding]
    pub no_hardware_pulse: bool,

    #[argh(switch)]
    /// print refresh rate to the terminal [binding]
    pub show_refresh: bool,

    #[argh(switch)]
    /// invert colors [binding]
    pub inverse_colors: bool,

    #[argh(option, default = "0")]
    /// refresh rate cap in Hz, 0 for none (default 0) [binding]
    pub limit_refresh: u32,
}

impl CliArgs {
    pub fn parse() -> Self {
        argh::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::from_args(&["christmas-countdown"], args).unwrap()
    }

    #[test]
    fn countdown_defaults() {
        let args = parse(&["--driver", "memory"]);

        assert_eq!(args.driver.as_deref(), Some("memory"));
        assert_eq!(args.text_color, "255,0,0");
        assert_eq!(args.tree_color, "0,128,0");
        assert_eq!(args.tree_size, None);
        assert_eq!(args.asset_dir, None);
        assert_eq!(args.update_interval_ms, 1000);
        assert_eq!((args.rows, args.cols), (32, 64));
        assert_eq!(args.interface, "127.0.0.1");
    }

    #[test]
    fn countdown_flags() {
        let args = parse(&[
            "--text-color",
            "#00ff00",
            "--tree-size",
            "16",
            "--asset-dir",
            "/tmp/tree",
            "--update-interval-ms",
            "250",
            "-c",
            "128",
        ]);

        assert_eq!(args.text_color, "#00ff00");
        assert_eq!(args.tree_size, Some(16));
        assert_eq!(args.asset_dir.as_deref(), Some("/tmp/tree"));
        assert_eq!(args.update_interval_ms, 250);
        assert_eq!(args.cols, 128);
        assert_eq!(args.driver, None);
    }
}
