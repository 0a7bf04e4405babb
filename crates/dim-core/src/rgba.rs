// ABOUTME: Display-ready RGBA color with float channels.
// ABOUTME: Input to the tint model and output of its display conversion.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("expected 6 or 8 hex digits, got {0}")]
    Length(usize),

    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Decode a `0xAARRGGBB` literal.
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: channel(24),
        }
    }

    pub fn to_argb(&self) -> u32 {
        let byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u32;
        (byte(self.a) << 24) | (byte(self.r) << 16) | (byte(self.g) << 8) | byte(self.b)
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`. The leading `#` is optional.
    pub fn parse_hex(text: &str) -> Result<Self, ParseColorError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ParseColorError::Length(digits.len()));
        }
        // from_str_radix tolerates a sign prefix
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::Digit(text.to_string()));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ParseColorError::Digit(text.to_string()))?;

        if digits.len() == 6 {
            Ok(Self::from_argb(0xFF00_0000 | value))
        } else {
            Ok(Self::from_argb(value))
        }
    }

    /// Brightest of the three color channels (HSV value).
    pub fn max_component(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}

impl std::str::FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}
