//! RGB color values as they come from the command line or environment

/// Parse an RGB color.
///
/// Accepts `"255,0,0"`, `"[255, 0, 0]"`, `"(255, 0, 0)"` and `"#ff0000"`.
pub fn parse_rgb(value: &str) -> Result<[u8; 3], String> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let inner = value
        .trim_start_matches(['[', '('])
        .trim_end_matches([']', ')']);

    let components: Vec<&str> = inner.split(',').map(str::trim).collect();
    if components.len() != 3 {
        return Err(format!("'{}' must be an RGB triple", value));
    }

    let mut rgb = [0u8; 3];
    for (slot, component) in rgb.iter_mut().zip(&components) {
        let number: i64 = component
            .parse()
            .map_err(|_| format!("'{}' has a non-numeric component '{}'", value, component))?;
        *slot = u8::try_from(number)
            .map_err(|_| format!("'{}' has component {} outside 0-255", value, number))?;
    }

    Ok(rgb)
}

fn parse_hex(hex: &str) -> Result<[u8; 3], String> {
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("'#{}' must have exactly six hex digits", hex));
    }

    let mut rgb = [0u8; 3];
    for (i, slot) in rgb.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| format!("'#{}' is not a valid hex color", hex))?;
    }
    Ok(rgb)
}

/// Brighten each channel by `amount`, saturating at 255
pub fn lighten(color: [u8; 3], amount: u8) -> [u8; 3] {
    color.map(|c| c.saturating_add(amount))
}
