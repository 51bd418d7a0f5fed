//! RGBA colours and hex conversion for editor colour pickers

/// Normalized RGBA colour
pub type Color = [f32; 4];

pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];

/// Parses `#RRGGBB` or `#RRGGBBAA` (leading `#` optional) into a normalized colour.
/// Six-digit input is fully opaque.
pub fn hex_to_rgba(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some([
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
        alpha as f32 / 255.0,
    ])
}

/// Formats a colour as upper-case `#RRGGBBAA`
pub fn rgba_to_hex(color: Color) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02X}{:02X}{:02X}{:02X}",
        byte(color[0]),
        byte(color[1]),
        byte(color[2]),
        byte(color[3])
    )
}

/// Drops the alpha channel
pub fn rgb(color: Color) -> [f32; 3] {
    [color[0], color[1], color[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_six_digits_is_opaque() {
        assert_eq!(hex_to_rgba("#FF0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(hex_to_rgba("00ff00"), Some([0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_hex_with_alpha() {
        let c = hex_to_rgba("#0000FF80").unwrap();
        assert_eq!(&c[..3], &[0.0, 0.0, 1.0]);
        assert!((c[3] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert_eq!(hex_to_rgba("#FFF"), None);
        assert_eq!(hex_to_rgba("#GG0000"), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        for hex in ["#12AB9F40", "#000000FF", "#FFFFFF00"] {
            assert_eq!(rgba_to_hex(hex_to_rgba(hex).unwrap()), hex);
        }
    }
}
