// ABOUTME: Executes parsed commands against the persisted config.
// ABOUTME: Formats status reports as text or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use dim_core::{
    BrightnessLevel, Color, Config, Day, OverlayAction, Preset, Rgba, Schedule, TransitionKind,
};

use crate::{ColorCommand, Command, ScheduleCommand};

/// Config file plus the clock the schedule is evaluated against.
pub struct Session {
    path: PathBuf,
    config: Config,
    now: PrimitiveDateTime,
}

fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|e| {
        tracing::warn!("Could not determine local time offset ({}), using UTC", e);
        OffsetDateTime::now_utc()
    });
    PrimitiveDateTime::new(now.date(), now.time())
}

fn stamp(at: PrimitiveDateTime) -> String {
    let format = format_description!("[weekday repr:short] [year]-[month]-[day] [hour]:[minute]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}

fn clock(hour: u8, minute: u8) -> String {
    format!("{hour:02}:{minute:02}")
}

fn derive_color(hex: Rgba, luminance: Option<f32>) -> Color {
    match luminance {
        Some(luminance) => Color::from_rgba_with_luminance(luminance, hex),
        None => Color::from_rgba(hex),
    }
}

#[derive(Debug, Serialize)]
struct ColorReport {
    packed: u64,
    luminance: f32,
    alpha: f32,
    saturation: [f32; 3],
    rgb: [u8; 3],
    display: String,
}

impl From<&Color> for ColorReport {
    fn from(color: &Color) -> Self {
        let saturation = color.saturation();
        Self {
            packed: color.to_packed(),
            luminance: color.luminance(),
            alpha: color.alpha(),
            saturation: [saturation.red(), saturation.green(), saturation.blue()],
            rgb: [color.red(), color.green(), color.blue()],
            display: color.to_display().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScheduleReport {
    enabled: bool,
    start: String,
    stop: String,
    days: Vec<Day>,
    active_now: bool,
    next_start: Option<String>,
    next_stop: Option<String>,
}

impl ScheduleReport {
    fn new(schedule: &Schedule, now: PrimitiveDateTime) -> Self {
        let (stop_hour, stop_minute) = schedule.stop_time();
        Self {
            enabled: schedule.enabled,
            start: clock(schedule.hour, schedule.minute),
            stop: clock(stop_hour, stop_minute),
            days: schedule.days.iter().copied().collect(),
            active_now: schedule.is_active_at(now),
            next_start: schedule.next_start(now).map(stamp),
            next_stop: schedule.next_stop(now).map(stamp),
        }
    }

    fn lines(&self) -> Vec<String> {
        let days: Vec<&str> = self.days.iter().map(|d| d.label()).collect();
        let days = if days.is_empty() { "none".to_string() } else { days.join(", ") };
        let state = if self.enabled { "enabled" } else { "disabled" };

        let mut lines = vec![format!("schedule:   {state} {}-{} on {days}", self.start, self.stop)];
        if let Some(next) = &self.next_start {
            lines.push(format!("next start: {next}"));
        }
        if let Some(next) = &self.next_stop {
            lines.push(format!("next stop:  {next}"));
        }
        lines
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    enabled: bool,
    brightness: u8,
    dim_percent: u8,
    brightness_step: u8,
    argb: String,
    color: ColorReport,
    schedule: ScheduleReport,
}

impl Session {
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Config::default_path().context("Could not determine config directory")?,
        };
        let config = Config::load_or_default(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Ok(Self {
            path,
            config,
            now: local_now(),
        })
    }

    fn save(&self) -> Result<()> {
        self.config
            .save(&self.path)
            .with_context(|| format!("Failed to save config to {}", self.path.display()))
    }

    /// Apply an overlay action, saving when it changed anything.
    fn apply(&mut self, action: OverlayAction) -> Result<String> {
        if self.config.overlay.apply(action) {
            self.save()?;
        } else {
            tracing::debug!("{:?} left the overlay unchanged", action);
        }
        Ok(self.overlay_line())
    }

    fn overlay_line(&self) -> String {
        let overlay = &self.config.overlay;
        format!(
            "overlay {} at {}% (alpha {}, step {})",
            if overlay.enabled { "on" } else { "off" },
            overlay.dim_percent(),
            overlay.brightness,
            overlay.brightness_step
        )
    }

    pub fn execute(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Status { json } => self.status(json),
            Command::On => self.apply(OverlayAction::Start),
            Command::Off => self.apply(OverlayAction::Stop),
            Command::Toggle => self.apply(OverlayAction::Toggle),
            Command::Brightness { value } => self.apply(OverlayAction::AdjustBrightness(value)),
            Command::Level { level } => {
                let level = BrightnessLevel::from(level);
                let line = self.apply(OverlayAction::AdjustBrightness(level.alpha() as i32))?;
                Ok(format!("{}: {}", level.label(), line))
            }
            Command::Reduce => self.apply(OverlayAction::Reduce),
            Command::Increase => self.apply(OverlayAction::Increase),
            Command::Step { value } => self.apply(OverlayAction::AdjustBrightnessStep(value)),
            Command::Color { command } => self.color(command),
            Command::Schedule { command } => self.schedule(command),
        }
    }

    fn status(&self, json: bool) -> Result<String> {
        let overlay = &self.config.overlay;
        let report = StatusReport {
            enabled: overlay.enabled,
            brightness: overlay.brightness,
            dim_percent: overlay.dim_percent(),
            brightness_step: overlay.brightness_step,
            argb: format!("#{:08X}", overlay.argb()),
            color: ColorReport::from(&overlay.color),
            schedule: ScheduleReport::new(&self.config.schedule, self.now),
        };

        if json {
            return serde_json::to_string_pretty(&report).context("Failed to encode status");
        }

        let mut lines = vec![
            self.overlay_line(),
            format!("fill:       {}", report.argb),
            format!("tint:       {}", overlay.color),
        ];
        lines.extend(report.schedule.lines());
        Ok(lines.join("\n"))
    }

    fn color(&mut self, command: ColorCommand) -> Result<String> {
        match command {
            ColorCommand::Set { hex, luminance } => {
                let color = derive_color(hex, luminance);
                self.apply(OverlayAction::AdjustColor(color.to_packed()))?;
                Ok(format!("tint set to {color}"))
            }
            ColorCommand::Preset { name } => {
                let color = name.color();
                self.apply(OverlayAction::AdjustColor(color.to_packed()))?;
                Ok(format!("tint set to {} ({})", name.label(), name.rgba()))
            }
            ColorCommand::Presets => {
                let lines: Vec<String> = Preset::all()
                    .iter()
                    .map(|p| format!("{:<12} {}  {}", p.name(), p.rgba(), p.description()))
                    .collect();
                Ok(lines.join("\n"))
            }
            ColorCommand::Pack { hex, luminance } => {
                Ok(derive_color(hex, luminance).to_packed().to_string())
            }
            ColorCommand::Unpack { value } => {
                let color = Color::from_packed(value);
                Ok(format!("{color}\ndisplay {}", color.to_display()))
            }
        }
    }

    fn schedule(&mut self, command: ScheduleCommand) -> Result<String> {
        match command {
            ScheduleCommand::Show => {
                Ok(ScheduleReport::new(&self.config.schedule, self.now).lines().join("\n"))
            }
            ScheduleCommand::Set { at, days, duration } => {
                let previous = &self.config.schedule;
                let mut schedule = Schedule::new(at.hour, at.minute, days)?;
                schedule.enabled = previous.enabled;
                schedule.duration_minutes = duration.unwrap_or(previous.duration_minutes);
                schedule.validate()?;

                self.config.schedule = schedule;
                self.save()?;
                self.schedule(ScheduleCommand::Show)
            }
            ScheduleCommand::Enable | ScheduleCommand::Disable => {
                let enabled = command == ScheduleCommand::Enable;
                if self.config.schedule.enabled != enabled {
                    self.config.schedule.enabled = enabled;
                    self.save()?;
                }
                if enabled && self.config.schedule.days.is_empty() {
                    tracing::warn!("Schedule enabled but no days are selected");
                }
                self.schedule(ScheduleCommand::Show)
            }
            ScheduleCommand::Next => {
                let lines: Vec<String> = self
                    .config
                    .schedule
                    .upcoming(self.now)
                    .into_iter()
                    .map(|t| {
                        let kind = match t.kind {
                            TransitionKind::Start => "start",
                            TransitionKind::Stop => "stop",
                        };
                        format!("{:<5} {}", kind, stamp(t.at))
                    })
                    .collect();

                if lines.is_empty() {
                    Ok("no upcoming transitions".to_string())
                } else {
                    Ok(lines.join("\n"))
                }
            }
        }
    }
}
