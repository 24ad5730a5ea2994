//! RGB straw color with hex text form

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Straw color (sRGB, 8 bits per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrawColor(pub [u8; 3]);

impl StrawColor {
    pub const RED: StrawColor = StrawColor([0xFF, 0x00, 0x00]);

    /// Preset swatches shown next to the free color picker
    pub const PRESETS: [StrawColor; 8] = [
        StrawColor([0xFF, 0x00, 0x00]),
        StrawColor([0x00, 0x00, 0x00]),
        StrawColor([0xFF, 0xFF, 0xFF]),
        StrawColor([0x3B, 0x82, 0xF6]),
        StrawColor([0x22, 0xC5, 0x5E]),
        StrawColor([0xEA, 0xB3, 0x08]),
        StrawColor([0xEC, 0x48, 0x99]),
        StrawColor([0xF9, 0x73, 0x16]),
    ];

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    /// `#RRGGBB` form
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }

    /// Linear-light RGBA for shading
    pub fn to_linear_rgba(&self) -> [f32; 4] {
        let channel = |c: u8| {
            let c = f32::from(c) / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [channel(self.0[0]), channel(self.0[1]), channel(self.0[2]), 1.0]
    }
}

impl Default for StrawColor {
    fn default() -> Self {
        Self::RED
    }
}

impl fmt::Display for StrawColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Color text that is not `#RGB` or `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for StrawColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let digit = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(StrawColor([digit(0, 2)?, digit(2, 2)?, digit(4, 2)?])),
            // Short form: each digit is doubled
            3 => Ok(StrawColor([
                digit(0, 1)? * 17,
                digit(1, 1)? * 17,
                digit(2, 1)? * 17,
            ])),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for StrawColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrawColor> for String {
    fn from(color: StrawColor) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#FF0000".parse::<StrawColor>().unwrap(), StrawColor::RED);
        assert_eq!(
            "#3b82f6".parse::<StrawColor>().unwrap(),
            StrawColor([0x3B, 0x82, 0xF6])
        );
        assert_eq!(
            "#fff".parse::<StrawColor>().unwrap(),
            StrawColor([255, 255, 255])
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("FF0000".parse::<StrawColor>().is_err());
        assert!("#GG0000".parse::<StrawColor>().is_err());
        assert!("#FF00".parse::<StrawColor>().is_err());
        assert!("#ÿÿÿ".parse::<StrawColor>().is_err());
    }

    #[test]
    fn test_linear_endpoints() {
        let black = StrawColor([0, 0, 0]).to_linear_rgba();
        let white = StrawColor([255, 255, 255]).to_linear_rgba();
        assert_eq!(black, [0.0, 0.0, 0.0, 1.0]);
        assert!((white[0] - 1.0).abs() < 1e-5);
    }
}
