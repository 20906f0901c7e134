use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// RGB color identifying a province on the map bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse an `rrggbb` hex literal, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, MapError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MapError::InvalidColor(hex.to_string()));
        }

        let channel =
            |s| u8::from_str_radix(s, 16).map_err(|_| MapError::InvalidColor(hex.to_string()));

        Ok(Self {
            r: channel(&digits[0..2])?,
            g: channel(&digits[2..4])?,
            b: channel(&digits[4..6])?,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
