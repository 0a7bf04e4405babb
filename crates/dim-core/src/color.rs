// ABOUTME: Overlay tint model split into luminance, alpha and per-channel saturation.
// ABOUTME: Packs into a 40-bit integer for persistence and converts to display RGBA.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Rgba;

const LUMINANCE_SHIFT: u32 = 32;
const ALPHA_SHIFT: u32 = 24;
const RED_SHIFT: u32 = 16;
const GREEN_SHIFT: u32 = 8;
const BLUE_SHIFT: u32 = 0;

/// Decimal places kept for luminance and alpha.
const LEVEL_DECIMALS: u32 = 2;
/// Decimal places kept for saturation channels.
const CHANNEL_DECIMALS: u32 = 3;

/// Round `value` to `decimals` decimal places, ties to even.
pub fn round(value: f32, decimals: u32) -> f32 {
    let multiplier = 10f32.powi(decimals as i32);
    (value * multiplier).round_ties_even() / multiplier
}

/// Clamp into [0, 1], mapping NaN to 0.
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn quantize(value: f32) -> u64 {
    (value * 255.0).round().clamp(0.0, 255.0) as u64
}

/// Map a stored byte back to the shortest decimal (up to `max_decimals`
/// places) that quantizes to the same byte.
fn dequantize(byte: u64, max_decimals: u32) -> f32 {
    let exact = byte as f32 / 255.0;
    (0..=max_decimals)
        .map(|places| round(exact, places))
        .find(|candidate| quantize(*candidate) == byte)
        .unwrap_or(exact)
}

/// Per-channel chroma weights, independent of brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturation {
    red: f32,
    green: f32,
    blue: f32,
}

impl Saturation {
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        let channel = |v: f32| unit(round(v.abs(), CHANNEL_DECIMALS));
        Self {
            red: channel(red),
            green: channel(green),
            blue: channel(blue),
        }
    }

    pub fn red(&self) -> f32 {
        self.red
    }

    pub fn green(&self) -> f32 {
        self.green
    }

    pub fn blue(&self) -> f32 {
        self.blue
    }
}

impl fmt::Display for Saturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Saturation(red={}, green={}, blue={})",
            self.red, self.green, self.blue
        )
    }
}

/// Overlay tint and opacity.
///
/// All components are clamped on construction, so every value of this type
/// holds luminance, alpha and saturation in `[0, 1]`. The type is immutable;
/// use [`Color::with_luminance`] and [`Color::with_alpha`] to adjust it.
///
/// Serialized as its packed integer form (see [`Color::to_packed`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct Color {
    luminance: f32,
    alpha: f32,
    saturation: Saturation,
}

impl Color {
    pub fn new(luminance: f32, alpha: f32, saturation: Saturation) -> Self {
        Self {
            luminance: unit(round(luminance, LEVEL_DECIMALS).abs()),
            alpha: unit(round(alpha, LEVEL_DECIMALS)),
            saturation,
        }
    }

    /// Derive a tint from an arbitrary color, using its HSV value as luminance.
    pub fn from_rgba(source: Rgba) -> Self {
        Self::from_rgba_with_luminance(source.max_component(), source)
    }

    /// Derive a tint from `source` while keeping an externally chosen luminance.
    ///
    /// The source channels are scaled up by how far its brightest channel is
    /// from full intensity, so the saturation describes the hue at full
    /// brightness regardless of how dark `source` was.
    pub fn from_rgba_with_luminance(luminance: f32, source: Rgba) -> Self {
        let diff_scale = round(1.0 - source.max_component(), LEVEL_DECIMALS);
        let scale = |c: f32| (c + c * diff_scale).min(1.0);

        Self::new(
            luminance,
            source.a,
            Saturation::new(scale(source.r), scale(source.g), scale(source.b)),
        )
    }

    /// Unpack a value produced by [`Color::to_packed`]. Bits above 39 are ignored.
    pub fn from_packed(value: u64) -> Self {
        let byte = |shift: u32| (value >> shift) & 0xFF;

        Self::new(
            dequantize(byte(LUMINANCE_SHIFT), LEVEL_DECIMALS),
            dequantize(byte(ALPHA_SHIFT), LEVEL_DECIMALS),
            Saturation::new(
                dequantize(byte(RED_SHIFT), CHANNEL_DECIMALS),
                dequantize(byte(GREEN_SHIFT), CHANNEL_DECIMALS),
                dequantize(byte(BLUE_SHIFT), CHANNEL_DECIMALS),
            ),
        )
    }

    /// Pack into the persisted integer layout: luminance in bits 32-39,
    /// alpha 24-31, then saturation red, green and blue. Lossy at 8 bits
    /// per field.
    pub fn to_packed(&self) -> u64 {
        (quantize(self.luminance) << LUMINANCE_SHIFT)
            | (quantize(self.alpha) << ALPHA_SHIFT)
            | (quantize(self.saturation.red) << RED_SHIFT)
            | (quantize(self.saturation.green) << GREEN_SHIFT)
            | (quantize(self.saturation.blue) << BLUE_SHIFT)
    }

    pub fn luminance(&self) -> f32 {
        self.luminance
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    #[must_use]
    pub fn with_luminance(self, luminance: f32) -> Self {
        Self::new(luminance, self.alpha, self.saturation)
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self::new(self.luminance, alpha, self.saturation)
    }

    fn channel(&self, weight: f32) -> u8 {
        (weight * 255.0 * self.luminance).round().clamp(0.0, 255.0) as u8
    }

    pub fn red(&self) -> u8 {
        self.channel(self.saturation.red)
    }

    pub fn green(&self) -> u8 {
        self.channel(self.saturation.green)
    }

    pub fn blue(&self) -> u8 {
        self.channel(self.saturation.blue)
    }

    pub fn to_display(&self) -> Rgba {
        Rgba::rgba(
            self.red() as f32 / 255.0,
            self.green() as f32 / 255.0,
            self.blue() as f32 / 255.0,
            self.alpha,
        )
    }

    /// The same hue at full luminance, for drawing a brightness gradient.
    #[must_use]
    pub fn to_saturated(&self) -> Self {
        Self::new(1.0, self.alpha, self.saturation)
    }

    /// Display color of [`Color::to_saturated`] with the saturation triple
    /// taken as-is, skipping the 8-bit channel step.
    pub fn to_saturated_display(&self) -> Rgba {
        Rgba::rgba(
            self.saturation.red,
            self.saturation.green,
            self.saturation.blue,
            self.alpha,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgba(Rgba::BLACK)
    }
}

impl From<u64> for Color {
    fn from(value: u64) -> Self {
        Self::from_packed(value)
    }
}

impl From<Color> for u64 {
    fn from(color: Color) -> Self {
        color.to_packed()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color(luminance={}, alpha={}, red={}, green={}, blue={}, {})",
            self.luminance,
            self.alpha,
            self.red(),
            self.green(),
            self.blue(),
            self.saturation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(color: Color) -> Color {
        Color::from_packed(color.to_packed())
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round(1.2345, 0), 1.0);
        assert_eq!(round(1.2345, 1), 1.2);
        assert_eq!(round(1.2345, 2), 1.23);
        assert_eq!(round(1.2345, 3), 1.234);
    }

    #[test]
    fn extremes_roundtrip_exactly() {
        let max = Color::new(1.0, 1.0, Saturation::new(1.0, 1.0, 1.0));
        let min = Color::new(0.0, 0.0, Saturation::new(0.0, 0.0, 0.0));

        assert_eq!(max.to_packed(), 0xFF_FFFF_FFFF);
        assert_eq!(min.to_packed(), 0);
        assert_eq!(roundtrip(max), max);
        assert_eq!(roundtrip(min), min);
    }

    #[test]
    fn midpoint_roundtrips_exactly() {
        let mid = Color::new(0.5, 1.0, Saturation::new(0.5, 0.5, 0.5));

        // 0.5 * 255 = 127.5 rounds up to 128
        assert_eq!(mid.to_packed(), 0x80_FF80_8080);
        assert_eq!(roundtrip(mid), mid);
    }

    #[test]
    fn warm_tint_quantization() {
        let warm = Color::new(0.17, 1.0, Saturation::new(1.0, 0.996, 0.894));
        let packed = warm.to_packed();

        assert_eq!((packed >> 32) & 0xFF, 43);
        assert_eq!((packed >> 24) & 0xFF, 255);
        assert_eq!((packed >> 16) & 0xFF, 255);
        assert_eq!((packed >> 8) & 0xFF, 254);
        assert_eq!(packed & 0xFF, 228);
        assert_eq!(roundtrip(warm), warm);
    }

    #[test]
    fn unpacked_colors_are_fixed_points() {
        for byte in 0..=255u64 {
            let packed = (byte << 32)
                | ((255 - byte) << 24)
                | (byte << 16)
                | ((byte * 7 % 256) << 8)
                | (byte / 3);
            let color = Color::from_packed(packed);
            assert_eq!(roundtrip(color), color, "packed {packed:#x}");
        }
    }

    #[test]
    fn second_roundtrip_is_stable() {
        let colors = [
            Color::new(0.33, 0.77, Saturation::new(0.123, 0.456, 0.789)),
            Color::new(0.01, 0.99, Saturation::new(0.001, 0.999, 0.502)),
            Color::new(0.68, 0.05, Saturation::new(0.333, 0.667, 0.111)),
        ];

        for color in colors {
            let packed = color.to_packed();
            assert_eq!(roundtrip(color).to_packed(), packed, "{color}");
        }
    }

    #[test]
    fn quantization_is_lossy() {
        let a = Color::new(0.5, 1.0, Saturation::new(0.501, 0.0, 0.0));
        let b = Color::new(0.5, 1.0, Saturation::new(0.502, 0.0, 0.0));

        assert_ne!(a, b);
        assert_eq!(a.to_packed(), b.to_packed());
        assert_eq!(roundtrip(a), roundtrip(b));
    }

    #[test]
    fn high_bits_are_ignored() {
        let color = Color::from_packed(0xFFFF_FF80_FF80_8080);
        assert_eq!(color, Color::from_packed(0x80_FF80_8080));
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let color = Color::new(-0.5, 2.0, Saturation::new(-0.25, 1.5, f32::NAN));
        assert_eq!(color.luminance(), 0.5);
        assert_eq!(color.alpha(), 1.0);
        assert_eq!(color.saturation(), Saturation::new(0.25, 1.0, 0.0));

        let color = Color::new(f32::NAN, -3.0, Saturation::new(f32::INFINITY, -0.0, 0.0));
        assert_eq!(color.luminance(), 0.0);
        assert_eq!(color.alpha(), 0.0);
        assert_eq!(color.saturation().red(), 1.0);

        let color = Color::new(f32::INFINITY, f32::NEG_INFINITY, Saturation::new(7.0, 7.0, 7.0));
        assert_eq!(color.luminance(), 1.0);
        assert_eq!(color.alpha(), 0.0);
    }

    #[test]
    fn builders_reclamp() {
        let color = Color::new(0.5, 0.5, Saturation::new(1.0, 1.0, 1.0));
        assert_eq!(color.with_luminance(1.7).luminance(), 1.0);
        assert_eq!(color.with_luminance(0.456).luminance(), 0.46);
        assert_eq!(color.with_alpha(-1.0).alpha(), 0.0);
        assert_eq!(color.with_alpha(0.25).saturation(), color.saturation());
    }

    #[test]
    fn derived_channels_scale_by_luminance() {
        let color = Color::new(0.5, 0.8, Saturation::new(1.0, 0.5, 0.0));
        assert_eq!(color.red(), 128);
        assert_eq!(color.green(), 64);
        assert_eq!(color.blue(), 0);

        let display = color.to_display();
        assert_eq!(display, Rgba::rgba(128.0 / 255.0, 64.0 / 255.0, 0.0, 0.8));
    }

    #[test]
    fn from_rgba_uses_value_as_luminance() {
        let color = Color::from_rgba(Rgba::rgb(0.5, 0.25, 0.0));
        assert_eq!(color.luminance(), 0.5);
        assert_eq!(color.alpha(), 1.0);
        assert_eq!(color.saturation(), Saturation::new(0.75, 0.375, 0.0));

        assert_eq!(Color::from_rgba(Rgba::WHITE).saturation(), Saturation::new(1.0, 1.0, 1.0));
        assert_eq!(Color::from_rgba(Rgba::BLACK).luminance(), 0.0);
    }

    #[test]
    fn from_rgba_with_luminance_keeps_the_given_luminance() {
        let color = Color::from_rgba_with_luminance(0.3, Rgba::rgba(1.0, 0.5, 0.0, 0.4));
        assert_eq!(color.luminance(), 0.3);
        assert_eq!(color.alpha(), 0.4);
        assert_eq!(color.saturation(), Saturation::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn saturated_color_is_fully_lit() {
        let color = Color::new(0.2, 0.6, Saturation::new(1.0, 0.5, 0.25));
        let saturated = color.to_saturated();

        assert_eq!(saturated.luminance(), 1.0);
        assert_eq!(saturated.alpha(), 0.6);
        assert_eq!(saturated.saturation(), color.saturation());
        assert_eq!(saturated.red(), 255);
        assert_eq!(saturated.green(), 128);
    }

    #[test]
    fn saturated_display_keeps_exact_triple() {
        let color = Color::new(0.17, 1.0, Saturation::new(1.0, 0.996, 0.894));
        let display = color.to_saturated_display();

        assert_eq!(display, Rgba::rgba(1.0, 0.996, 0.894, 1.0));
        assert_ne!(color.to_saturated().to_display().b, 0.894);
    }

    #[test]
    fn serializes_as_packed_integer() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            color: Color,
        }

        let color = Color::new(0.5, 1.0, Saturation::new(0.5, 0.5, 0.5));
        let text = toml::to_string(&Wrapper { color }).unwrap();
        assert_eq!(text.trim(), format!("color = {}", 0x80_FF80_8080u64));

        let restored: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(restored.color, color);
    }
}
