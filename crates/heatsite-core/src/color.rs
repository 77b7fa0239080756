//! sRGB colors parsed from profile strings (`#rrggbb`, `#rgb`, CSS names)

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Empty color value")]
    Empty,
    #[error("Invalid hex color '{0}'")]
    InvalidHex(String),
    #[error("Unknown color name '{0}'")]
    UnknownName(String),
}

/// sRGB color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// CSS basic color keywords understood by [`Rgb::parse`]
const NAMED_COLORS: [(&str, [u8; 3]); 11] = [
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("gray", [128, 128, 128]),
];

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb`, `#rgb` or a CSS basic color name (case-insensitive)
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ColorError::Empty);
        }

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::InvalidHex(value.to_string()));
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value))
            .map(|(_, [r, g, b])| Rgb::from_u8(*r, *g, *b))
            .ok_or_else(|| ColorError::UnknownName(value.to_string()))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn is_black(self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::from_u8(r, g, b))
        }
        3 => {
            // #rgb expands each digit: #1f1 == #11ff11
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Rgb::from_u8(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_u8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c = Rgb::parse("#11ff11").unwrap();
        assert_eq!(c.to_u8(), [0x11, 0xff, 0x11]);

        let short = Rgb::parse("#1f1").unwrap();
        assert_eq!(short, c);

        assert_eq!(Rgb::parse("#000000").unwrap(), Rgb::BLACK);
    }

    #[test]
    fn test_parse_names() {
        // CSS green, not lime
        assert_eq!(Rgb::parse("green").unwrap().to_u8(), [0, 128, 0]);
        assert_eq!(Rgb::parse("Black").unwrap(), Rgb::BLACK);
        assert_eq!(Rgb::parse(" white ").unwrap(), Rgb::WHITE);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Rgb::parse(""), Err(ColorError::Empty));
        assert!(matches!(Rgb::parse("#12345"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Rgb::parse("#gg0000"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Rgb::parse("chartreuse"), Err(ColorError::UnknownName(_))));
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Rgb::parse("green").unwrap().to_string(), "#008000");
        assert_eq!(Rgb::BLACK.to_string(), "#000000");
    }
}
