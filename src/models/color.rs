//! Room color value with hex parsing and serialization.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color of a room, stored and transmitted as `#rrggbb`.
///
/// Serializes as the lowercase hex string the color input produces, so
/// GeoJSON properties and remote columns carry plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomColor {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl RoomColor {
    /// Creates a new `RoomColor` from individual channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `RoomColor` from a hex string.
    ///
    /// Supports formats: "#RRGGBB", "RRGGBB", "#rrggbb", "rrggbb"
    ///
    /// # Examples
    ///
    /// ```
    /// use floorplan_editor::models::RoomColor;
    ///
    /// let color = RoomColor::from_hex("#FF0000").unwrap();
    /// assert_eq!(color, RoomColor::new(255, 0, 0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid hex color format.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 6 || !hex.is_ascii() {
            anyhow::bail!("Invalid hex color format '{hex}'. Expected 6 hex digits (RRGGBB)");
        }

        let r = u8::from_str_radix(&hex[0..2], 16)
            .context(format!("Invalid red channel in hex color '{hex}'"))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .context(format!("Invalid green channel in hex color '{hex}'"))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .context(format!("Invalid blue channel in hex color '{hex}'"))?;

        Ok(Self::new(r, g, b))
    }

    /// Converts the color to a lowercase hex string ("#rrggbb").
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RoomColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for RoomColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<RoomColor> for String {
    fn from(color: RoomColor) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_valid() {
        assert_eq!(RoomColor::from_hex("#FF0000").unwrap(), RoomColor::new(255, 0, 0));
        assert_eq!(RoomColor::from_hex("00ff00").unwrap(), RoomColor::new(0, 255, 0));
        assert_eq!(RoomColor::from_hex("  #0000ff ").unwrap(), RoomColor::new(0, 0, 255));
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(RoomColor::from_hex("#FFF").is_err());
        assert!(RoomColor::from_hex("#FFFFFFF").is_err());
        assert!(RoomColor::from_hex("GGGGGG").is_err());
        assert!(RoomColor::from_hex("").is_err());
        assert!(RoomColor::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_to_hex_is_lowercase() {
        assert_eq!(RoomColor::new(0xAB, 0x0C, 0xFF).to_hex(), "#ab0cff");
    }

    #[test]
    fn test_serde_as_string() {
        let color = RoomColor::new(18, 52, 86);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#123456\"");
        let back: RoomColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<RoomColor>("\"red\"").is_err());
    }
}
