// ABOUTME: Shared types and configuration for lower-brightness.
// ABOUTME: Defines the tint model, overlay state, weekly schedule and config file handling.

pub mod color;
pub mod config;
pub mod overlay;
pub mod presets;
pub mod rgba;
pub mod schedule;

pub use color::{Color, Saturation};
pub use config::{Config, ConfigError};
pub use overlay::{BrightnessLevel, OverlayAction, OverlayState};
pub use presets::Preset;
pub use rgba::{ParseColorError, Rgba};
pub use schedule::{Day, Schedule, ScheduleError, Transition, TransitionKind};
