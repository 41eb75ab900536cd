//! RGBA color values shared by the config, render, and GPU layers.

/// Normalized RGBA color, each channel in `[0, 1]`.
pub type Rgba = [f32; 4];

pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Parse a strict `#RRGGBB` hexadecimal color into an opaque [`Rgba`].
///
/// Returns `None` for anything that is not exactly seven characters of
/// `#` plus six hex digits; callers fall back to [`WHITE`].
#[must_use]
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };

    Some([channel(0)?, channel(2)?, channel(4)?, 1.0])
}

/// Resolved background and transparency-grid colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub grid0: Rgba,
    pub grid1: Rgba,
}

impl Palette {
    /// Build a palette from `#RRGGBB` strings.
    ///
    /// An unset `grid0` inherits the background and an unset `grid1`
    /// inherits `grid0`; unparsable colors fall back to white so rendering
    /// always has a usable palette.
    #[must_use]
    pub fn from_hex(background: &str, grid0: Option<&str>, grid1: Option<&str>) -> Self {
        let background = parse_hex(background).unwrap_or(WHITE);
        let grid0 = match grid0 {
            None => background,
            Some(hex) => parse_hex(hex).unwrap_or(WHITE),
        };
        let grid1 = match grid1 {
            None => grid0,
            Some(hex) => parse_hex(hex).unwrap_or(WHITE),
        };
        Self {
            background,
            grid0,
            grid1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(parse_hex("#FFFFFF"), Some(WHITE));
        assert_eq!(parse_hex("#000000"), Some(BLACK));

        let c = parse_hex("#FF8000").unwrap();
        assert!((c[0] - 1.0).abs() < f32::EPSILON);
        assert!((c[1] - 128.0 / 255.0).abs() < f32::EPSILON);
        assert!((c[2] - 0.0).abs() < f32::EPSILON);
        assert!((c[3] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn accepts_lowercase_digits() {
        assert!(parse_hex("#a1b2c3").is_some());
    }

    #[test]
    fn palette_inherits_down_the_chain() {
        let p = Palette::from_hex("#000000", None, None);
        assert_eq!(p.background, BLACK);
        assert_eq!(p.grid0, BLACK);
        assert_eq!(p.grid1, BLACK);

        let p = Palette::from_hex("#000000", Some("#FFFFFF"), None);
        assert_eq!(p.grid0, WHITE);
        assert_eq!(p.grid1, WHITE);
    }

    #[test]
    fn palette_falls_back_to_white() {
        let p = Palette::from_hex("transparent", None, Some("grey"));
        assert_eq!(p.background, WHITE);
        assert_eq!(p.grid1, WHITE);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_hex("FFFFFF"), None); // missing '#'
        assert_eq!(parse_hex("#FFF"), None); // short form not supported
        assert_eq!(parse_hex("#FFFFFFFF"), None); // no alpha channel
        assert_eq!(parse_hex("#GGGGGG"), None);
        assert_eq!(parse_hex(""), None);
    }
}
