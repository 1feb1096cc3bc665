#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { red: 0, green: 0, blue: 0 };

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Scales each channel by `scale / 256`.
pub fn scale(orginal: &Rgb, scale: u8) -> Rgb {
    Rgb {
        red: (orginal.red as usize * scale as usize / 256) as u8,
        green: (orginal.green as usize * scale as usize / 256) as u8,
        blue: (orginal.blue as usize * scale as usize / 256) as u8
    }
}

/// Maps a 0-100 brightness percentage onto the 0-255 range `scale` expects.
pub fn brightness_scale(percent: u8) -> u8 {
    (percent.min(100) as usize * 255 / 100) as u8
}

/// The panel driver only takes 1-100, so 0 becomes the dimmest setting.
pub fn panel_brightness(percent: u8) -> u8 {
    percent.clamp(1, 100)
}

/// Decodes `#RRGGBB` (the `#` is optional) by splitting the digits into three
/// equal parts, so `#RGB` and `#RRRGGGBBB` style strings are accepted too.
pub fn decode_hex(value: &str) -> Result<Rgb, String> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.is_empty() || digits.len() % 3 != 0 {
        return Err(format!("Hex color '{}' must have a multiple of 3 digits", value));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Hex color '{}' contains non-hex characters", value));
    }
    let width = digits.len() / 3;
    let mut channels = [0u8; 3];
    for i in 0..3 {
        let part = &digits[i * width..(i + 1) * width];
        let v = u32::from_str_radix(part, 16).map_err(|e| format!("Hex color '{}': {}", value, e))?;
        channels[i] = u8::try_from(v).map_err(|_| format!("Hex color '{}': channel '{}' exceeds 255", value, part))?;
    }
    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_six_digits() {
        assert_eq!(decode_hex("#EE2902"), Ok(Rgb::new(238, 41, 2)));
        assert_eq!(decode_hex("02c7ee"), Ok(Rgb::new(2, 199, 238)));
    }

    #[test]
    fn test_decode_short_form_keeps_digit_value() {
        // one digit per channel, not expanded to two
        assert_eq!(decode_hex("#F0A"), Ok(Rgb::new(15, 0, 10)));
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        assert!(decode_hex("#EE290").is_err());
        assert!(decode_hex("#").is_err());
        assert!(decode_hex("").is_err());
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(decode_hex("#GG0000").is_err());
        assert!(decode_hex("#ééé").is_err());
    }

    #[test]
    fn test_decode_rejects_wide_channel_over_255() {
        assert!(decode_hex("#100000000").is_err());
        assert_eq!(decode_hex("#0FF0010FF"), Ok(Rgb::new(255, 1, 255)));
    }

    #[test]
    fn test_scale() {
        let c = Rgb::new(200, 100, 0);
        assert_eq!(scale(&c, 128), Rgb::new(100, 50, 0));
        assert_eq!(scale(&c, 0), Rgb::BLACK);
    }

    #[test]
    fn test_brightness_scale() {
        assert_eq!(brightness_scale(100), 255);
        assert_eq!(brightness_scale(0), 0);
        assert_eq!(brightness_scale(150), 255);
    }

    #[test]
    fn test_panel_brightness_stays_in_driver_range() {
        assert_eq!(panel_brightness(0), 1);
        assert_eq!(panel_brightness(65), 65);
        assert_eq!(panel_brightness(100), 100);
        assert_eq!(panel_brightness(150), 100);
    }
}
