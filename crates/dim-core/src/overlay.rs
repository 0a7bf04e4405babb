// ABOUTME: State of the dimming overlay and the actions that drive it.
// ABOUTME: Computes the ARGB value the overlay window is painted with.

use serde::{Deserialize, Serialize};

use crate::Color;

pub const MIN_BRIGHTNESS: u8 = 0;
pub const MAX_BRIGHTNESS: u8 = 255;
pub const MIN_BRIGHTNESS_STEP: u8 = 1;
pub const MAX_BRIGHTNESS_STEP: u8 = 85;

/// Control actions accepted by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayAction {
    Start,
    Stop,
    Toggle,
    /// Set the overlay alpha; out of range values are clamped.
    AdjustBrightness(i32),
    AdjustBrightnessStep(i32),
    /// Dim the screen by one step (overlay gets more opaque).
    Reduce,
    /// Brighten the screen by one step.
    Increase,
    /// Replace the tint with a packed color.
    AdjustColor(u64),
}

/// Quick pick dimming levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrightnessLevel {
    Low,
    Recommended,
    Strong,
}

impl BrightnessLevel {
    pub fn label(&self) -> &'static str {
        match self {
            BrightnessLevel::Low => "Low",
            BrightnessLevel::Recommended => "Recommended",
            BrightnessLevel::Strong => "Strong",
        }
    }

    /// Overlay alpha for this level.
    pub fn alpha(&self) -> u8 {
        let fraction: f32 = match self {
            BrightnessLevel::Low => 0.1,
            BrightnessLevel::Recommended => 0.2,
            BrightnessLevel::Strong => 0.8,
        };
        (fraction * MAX_BRIGHTNESS as f32).round() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayState {
    /// Whether the overlay is currently shown
    pub enabled: bool,

    /// Overlay alpha (0 = invisible, 255 = opaque)
    pub brightness: u8,

    /// Amount added or removed by a single reduce/increase action
    pub brightness_step: u8,

    /// Tint, persisted in packed form
    pub color: Color,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            enabled: false,
            brightness: 150,
            brightness_step: 51,
            color: Color::default(),
        }
    }
}

fn clamp_to_u8(value: i32, lo: u8, hi: u8) -> u8 {
    value.clamp(lo as i32, hi as i32) as u8
}

impl OverlayState {
    /// Apply an action. Returns true when the state changed.
    pub fn apply(&mut self, action: OverlayAction) -> bool {
        let before = self.clone();

        match action {
            OverlayAction::Start => self.enabled = true,
            OverlayAction::Stop => self.enabled = false,
            OverlayAction::Toggle => self.enabled = !self.enabled,
            OverlayAction::AdjustBrightness(value) => {
                self.brightness = clamp_to_u8(value, MIN_BRIGHTNESS, MAX_BRIGHTNESS);
            }
            OverlayAction::AdjustBrightnessStep(value) => {
                self.brightness_step =
                    clamp_to_u8(value, MIN_BRIGHTNESS_STEP, MAX_BRIGHTNESS_STEP);
            }
            OverlayAction::Reduce => {
                let target = self.brightness as i32 + self.brightness_step as i32;
                self.brightness = clamp_to_u8(target, MIN_BRIGHTNESS, MAX_BRIGHTNESS);
            }
            OverlayAction::Increase => {
                let target = self.brightness as i32 - self.brightness_step as i32;
                self.brightness = clamp_to_u8(target, MIN_BRIGHTNESS, MAX_BRIGHTNESS);
            }
            OverlayAction::AdjustColor(packed) => self.color = Color::from_packed(packed),
        }

        let changed = *self != before;
        if changed {
            tracing::debug!(
                ?action,
                enabled = self.enabled,
                brightness = self.brightness,
                step = self.brightness_step,
                "overlay state changed"
            );
        }
        changed
    }

    /// Packed `0xAARRGGBB` the overlay is filled with.
    pub fn argb(&self) -> u32 {
        ((self.brightness as u32) << 24)
            | ((self.color.red() as u32) << 16)
            | ((self.color.green() as u32) << 8)
            | self.color.blue() as u32
    }

    /// How much the overlay darkens the screen, in percent.
    pub fn dim_percent(&self) -> u8 {
        ((self.brightness as f32 / MAX_BRIGHTNESS as f32) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rgba, Saturation};

    #[test]
    fn defaults_match_first_launch() {
        let state = OverlayState::default();
        assert!(!state.enabled);
        assert_eq!(state.brightness, 150);
        assert_eq!(state.brightness_step, 51);
        assert_eq!(state.color, Color::from_rgba(Rgba::BLACK));
        assert_eq!(state.argb(), 0x9600_0000);
    }

    #[test]
    fn toggle_start_stop() {
        let mut state = OverlayState::default();
        assert!(state.apply(OverlayAction::Toggle));
        assert!(state.enabled);
        assert!(!state.apply(OverlayAction::Start));
        assert!(state.apply(OverlayAction::Stop));
        assert!(!state.enabled);
    }

    #[test]
    fn reduce_makes_overlay_more_opaque() {
        let mut state = OverlayState::default();
        state.apply(OverlayAction::Reduce);
        assert_eq!(state.brightness, 201);
        state.apply(OverlayAction::Reduce);
        assert_eq!(state.brightness, 252);
        assert!(state.apply(OverlayAction::Reduce));
        assert_eq!(state.brightness, 255);
        assert!(!state.apply(OverlayAction::Reduce));

        state.apply(OverlayAction::AdjustBrightnessStep(200));
        assert_eq!(state.brightness_step, 85);
        for _ in 0..4 {
            state.apply(OverlayAction::Increase);
        }
        assert_eq!(state.brightness, 0);
    }

    #[test]
    fn brightness_and_step_are_clamped() {
        let mut state = OverlayState::default();
        state.apply(OverlayAction::AdjustBrightness(-10));
        assert_eq!(state.brightness, 0);
        state.apply(OverlayAction::AdjustBrightness(300));
        assert_eq!(state.brightness, 255);
        state.apply(OverlayAction::AdjustBrightnessStep(0));
        assert_eq!(state.brightness_step, 1);
    }

    #[test]
    fn adjust_color_updates_argb() {
        let mut state = OverlayState::default();
        let tint = Color::new(1.0, 1.0, Saturation::new(1.0, 0.5, 0.0));
        state.apply(OverlayAction::AdjustColor(tint.to_packed()));
        state.apply(OverlayAction::AdjustBrightness(0x40));

        assert_eq!(state.color, tint);
        assert_eq!(state.argb(), 0x40FF_8000);
    }

    #[test]
    fn levels_and_percent() {
        assert_eq!(BrightnessLevel::Low.alpha(), 26);
        assert_eq!(BrightnessLevel::Recommended.alpha(), 51);
        assert_eq!(BrightnessLevel::Strong.alpha(), 204);

        let mut state = OverlayState::default();
        state.apply(OverlayAction::AdjustBrightness(BrightnessLevel::Strong.alpha() as i32));
        assert_eq!(state.dim_percent(), 80);
    }
}
