// ABOUTME: Built-in overlay tints offered as quick picks.
// ABOUTME: Each preset maps a fixed ARGB literal through the tint model.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Color, Rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Beige,
    DarkGray,
    WarmTone,
    CoolTone,
    SoftGreen,
    PureBlack,
    PureWhite,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset {0:?}")]
pub struct UnknownPreset(pub String);

impl Preset {
    pub fn all() -> &'static [Preset] {
        &[
            Preset::Beige,
            Preset::DarkGray,
            Preset::WarmTone,
            Preset::CoolTone,
            Preset::SoftGreen,
            Preset::PureBlack,
            Preset::PureWhite,
        ]
    }

    /// Identifier accepted by [`Preset::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Beige => "beige",
            Preset::DarkGray => "dark_gray",
            Preset::WarmTone => "warm_tone",
            Preset::CoolTone => "cool_tone",
            Preset::SoftGreen => "soft_green",
            Preset::PureBlack => "pure_black",
            Preset::PureWhite => "pure_white",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Beige => "Beige",
            Preset::DarkGray => "Dark gray",
            Preset::WarmTone => "Warm tone",
            Preset::CoolTone => "Cool tone",
            Preset::SoftGreen => "Soft green",
            Preset::PureBlack => "Pure black",
            Preset::PureWhite => "Pure white",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Beige => "Soft paper-like tint, easy on the eyes for reading",
            Preset::DarkGray => "Neutral dimming without shifting colors much",
            Preset::WarmTone => "Filters blue light for evening use",
            Preset::CoolTone => "Light blue tint that keeps contrast crisp",
            Preset::SoftGreen => "Gentle green tint for long sessions",
            Preset::PureBlack => "Plain dimming, strongest darkening",
            Preset::PureWhite => "Washes the screen out instead of darkening it",
        }
    }

    pub fn argb(&self) -> u32 {
        match self {
            Preset::Beige => 0xFFF5F5DC,
            Preset::DarkGray => 0xFF2E2E2E,
            Preset::WarmTone => 0xFFFFE4B5,
            Preset::CoolTone => 0xFFB0E0E6,
            Preset::SoftGreen => 0xFF90EE90,
            Preset::PureBlack => 0xFF000000,
            Preset::PureWhite => 0xFFFFFFFF,
        }
    }

    pub fn rgba(&self) -> Rgba {
        Rgba::from_argb(self.argb())
    }

    pub fn color(&self) -> Color {
        Color::from_rgba(self.rgba())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Preset::all()
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}
