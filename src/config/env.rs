//! Environment variable handling

use std::str::FromStr;

/// Environment overrides for the LED matrix and the countdown
#[derive(Debug, Default, Clone)]
pub struct EnvVars {
    pub driver: Option<String>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub chain_length: Option<usize>,
    pub parallel: Option<usize>,
    pub led_brightness: Option<u8>,
    pub hardware_mapping: Option<String>,
    pub gpio_slowdown: Option<u32>,
    pub pwm_bits: Option<u8>,
    pub pwm_lsb_nanoseconds: Option<u32>,
    pub pixel_mapper: Option<String>,
    pub multiplexing: Option<String>,
    pub pi_chip: Option<String>,
    pub interlaced: Option<bool>,
    pub dither_bits: Option<usize>,
    pub panel_type: Option<String>,
    pub row_setter: Option<String>,
    pub led_sequence: Option<String>,
    pub hardware_pulsing: Option<bool>,
    pub show_refresh: Option<bool>,
    pub inverse_colors: Option<bool>,
    pub limit_refresh: Option<u32>,
    pub port: Option<u16>,
    pub interface: Option<String>,

    // Countdown settings
    pub text_color: Option<String>,
    pub tree_color: Option<String>,
    pub tree_size: Option<i64>,
    pub asset_dir: Option<String>,
    pub update_interval_ms: Option<u64>,
}

/// Load configuration from the process environment
pub fn load_env_vars() -> EnvVars {
    load_env_vars_from(|key| std::env::var(key).ok())
}

fn parsed<T, L>(lookup: &L, key: &str) -> Option<T>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|value| value.trim().parse().ok())
}

// Accepts true/false as well as 1/0
fn flag<L>(lookup: &L, key: &str) -> Option<bool>
where
    L: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    let value = value.trim();
    value
        .parse::<bool>()
        .ok()
        .or_else(|| value.parse::<u8>().ok().map(|v| v != 0))
}

/// Load configuration through `lookup`, which maps a variable name to its value
pub fn load_env_vars_from<L>(lookup: L) -> EnvVars
where
    L: Fn(&str) -> Option<String>,
{
    EnvVars {
        // Driver type
        driver: lookup("LED_DRIVER"),

        // Matrix dimensions
        rows: parsed(&lookup, "LED_ROWS"),
        cols: parsed(&lookup, "LED_COLS"),
        chain_length: parsed(&lookup, "LED_CHAIN_LENGTH"),
        parallel: parsed(&lookup, "LED_PARALLEL"),
        led_brightness: parsed::<u8, _>(&lookup, "LED_BRIGHTNESS")
            .map(|brightness| brightness.clamp(0, 100)),

        // Hardware configuration
        hardware_mapping: lookup("LED_HARDWARE_MAPPING"),
        gpio_slowdown: parsed(&lookup, "LED_GPIO_SLOWDOWN"),

        // PWM settings
        pwm_bits: parsed(&lookup, "LED_PWM_BITS"),
        pwm_lsb_nanoseconds: parsed(&lookup, "LED_PWM_LSB_NANOSECONDS"),

        // Panel configuration
        pixel_mapper: lookup("LED_PIXEL_MAPPER"),
        multiplexing: lookup("LED_MULTIPLEXING"),
        pi_chip: lookup("LED_PI_CHIP"),
        interlaced: flag(&lookup, "LED_INTERLACED"),
        dither_bits: parsed(&lookup, "LED_DITHER_BITS"),
        panel_type: lookup("LED_PANEL_TYPE"),
        row_setter: lookup("LED_ROW_SETTER"),
        led_sequence: lookup("LED_SEQUENCE"),
        hardware_pulsing: flag(&lookup, "LED_HARDWARE_PULSING"),
        show_refresh: flag(&lookup, "LED_SHOW_REFRESH"),
        inverse_colors: flag(&lookup, "LED_INVERSE_COLORS"),
        limit_refresh: parsed(&lookup, "LED_LIMIT_REFRESH_RATE"),

        // Web server settings
        port: parsed(&lookup, "LED_PORT"),
        interface: lookup("LED_INTERFACE"),

        // Countdown settings
        text_color: lookup("COUNTDOWN_TEXT_COLOR"),
        tree_color: lookup("COUNTDOWN_TREE_COLOR"),
        tree_size: parsed(&lookup, "COUNTDOWN_TREE_SIZE"),
        asset_dir: lookup("COUNTDOWN_ASSET_DIR"),
        update_interval_ms: parsed(&lookup, "COUNTDOWN_UPDATE_INTERVAL_MS"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> EnvVars {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_env_vars_from(|key| map.get(key).cloned())
    }

    #[test]
    fn reads_numbers_and_strings() {
        let env = load(&[
            ("LED_DRIVER", "native"),
            ("LED_ROWS", "16"),
            ("LED_COLS", " 32 "),
            ("COUNTDOWN_TEXT_COLOR", "#00ff00"),
            ("COUNTDOWN_TREE_SIZE", "20"),
        ]);

        assert_eq!(env.driver.as_deref(), Some("native"));
        assert_eq!(env.rows, Some(16));
        assert_eq!(env.cols, Some(32));
        assert_eq!(env.text_color.as_deref(), Some("#00ff00"));
        assert_eq!(env.tree_size, Some(20));
        assert_eq!(env.port, None);
    }

    #[test]
    fn ignores_unparsable_numbers() {
        let env = load(&[("LED_ROWS", "many"), ("LED_PORT", "70000")]);

        assert_eq!(env.rows, None);
        assert_eq!(env.port, None);
    }

    #[test]
    fn flags_accept_words_and_digits() {
        let env = load(&[
            ("LED_INTERLACED", "true"),
            ("LED_SHOW_REFRESH", "1"),
            ("LED_INVERSE_COLORS", "0"),
            ("LED_HARDWARE_PULSING", "maybe"),
        ]);

        assert_eq!(env.interlaced, Some(true));
        assert_eq!(env.show_refresh, Some(true));
        assert_eq!(env.inverse_colors, Some(false));
        assert_eq!(env.hardware_pulsing, None);
    }

    #[test]
    fn brightness_is_clamped() {
        let env = load(&[("LED_BRIGHTNESS", "250")]);
        assert_eq!(env.led_brightness, Some(100));
    }
}
