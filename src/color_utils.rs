// File: src/color_utils.rs
// Foreground selection for badge and band backgrounds

pub const DARK_TEXT: &str = "#000000";
pub const LIGHT_TEXT: &str = "#ffffff";

/// Parses `#rrggbb` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Perceived brightness (ITU-R BT.601 weights) scaled by 1000, 0..=255_000.
pub fn brightness_milli(r: u8, g: u8, b: u8) -> u32 {
    299 * r as u32 + 587 * g as u32 + 114 * b as u32
}

/// Black text on light backgrounds, white otherwise. Unparseable colors
/// count as black.
pub fn contrast_text_color(background: &str) -> &'static str {
    let level = parse_hex(background)
        .map(|(r, g, b)| brightness_milli(r, g, b))
        .unwrap_or(0);
    if level > 155_000 { DARK_TEXT } else { LIGHT_TEXT }
}

/// Wraps `label` in 24-bit ANSI colors: `background` behind, contrast text on
/// top. Falls back to the bare label when the color cannot be parsed.
pub fn ansi_badge(label: &str, background: &str) -> String {
    let Some((r, g, b)) = parse_hex(background) else {
        return format!("[{}]", label);
    };
    let (fr, fg, fb) = parse_hex(contrast_text_color(background)).unwrap_or((255, 255, 255));
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m {} \x1b[0m",
        r, g, b, fr, fg, fb, label
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_for_default_badges() {
        // #27ae60: (299*39 + 587*174 + 114*96) / 1000 = 124
        assert_eq!(contrast_text_color("#27ae60"), LIGHT_TEXT);
        // #e67e22: (299*230 + 587*126 + 114*34) / 1000 = 146
        assert_eq!(contrast_text_color("#e67e22"), LIGHT_TEXT);
    }

    #[test]
    fn test_light_backgrounds_get_dark_text() {
        assert_eq!(contrast_text_color("#ffffff"), DARK_TEXT);
        assert_eq!(contrast_text_color("f1c40f"), DARK_TEXT);
        assert_eq!(contrast_text_color("#000000"), LIGHT_TEXT);
    }

    #[test]
    fn test_threshold_is_strict() {
        // brightness exactly 155 stays white
        assert_eq!(brightness_milli(155, 155, 155), 155_000);
        assert_eq!(contrast_text_color("#9b9b9b"), LIGHT_TEXT);
        assert_eq!(contrast_text_color("#9c9c9c"), DARK_TEXT);
    }

    #[test]
    fn test_fractional_brightness_above_threshold() {
        // 155.299 is brighter than 155 even though it truncates to it
        assert_eq!(brightness_milli(156, 155, 155), 155_299);
        assert_eq!(contrast_text_color("#9c9b9b"), DARK_TEXT);
    }

    #[test]
    fn test_malformed_input_is_white_text() {
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex("#ééé"), None);
        assert_eq!(contrast_text_color("banana"), LIGHT_TEXT);
    }

    #[test]
    fn test_ansi_badge() {
        assert_eq!(
            ansi_badge("Hold", "#ffffff"),
            "\x1b[48;2;255;255;255m\x1b[38;2;0;0;0m Hold \x1b[0m"
        );
        assert_eq!(ansi_badge("Hold", "nope"), "[Hold]");
    }
}
