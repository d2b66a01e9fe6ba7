use serde::{Deserialize, Serialize};

/// A colour, as carried by text styles and handed to the drawing surface
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Default for Colour {
    fn default() -> Self {
        colours::BLACK
    }
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub const fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string as used by template styles.
    /// An 8-digit `#RRGGBBAA` string is accepted and its alpha ignored.
    pub fn from_hex(hex: &str) -> Option<Colour> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Colour::new_rgb_bytes(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format the colour as a lowercase `#rrggbb` string
    pub fn to_hex(&self) -> String {
        let (r, g, b) = match *self {
            Colour::RGB { r, g, b } => (r, g, b),
            Colour::Grey { g } => (g, g, g),
        };
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
    }
}

impl TryFrom<String> for Colour {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Colour::from_hex(&value).ok_or_else(|| format!("`{value}` is not a #RRGGBB colour"))
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_hex()
    }
}

impl<T: Into<f32>> From<(T, T, T)> for Colour {
    fn from(c: (T, T, T)) -> Self {
        Colour::RGB {
            r: c.0.into(),
            g: c.1.into(),
            b: c.2.into(),
        }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };

    /// Background behind code blocks and inline code
    pub const CODE_BACKGROUND: Colour = Colour::new_rgb_bytes(0xf6, 0xf8, 0xfa);
    /// Rules around blockquotes and tables
    pub const RULE: Colour = Colour::new_rgb_bytes(0xd0, 0xd7, 0xde);
    /// Muted text inside blockquotes
    pub const QUOTE_TEXT: Colour = Colour::new_rgb_bytes(0x65, 0x6d, 0x76);
    /// Fill behind a table's header row
    pub const TABLE_HEADER: Colour = Colour::new_rgb_bytes(0xf6, 0xf8, 0xfa);
}
