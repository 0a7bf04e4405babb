// ABOUTME: Main application entry point.
// ABOUTME: Parses the command line and runs one overlay, color or schedule command.

mod commands;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use time::macros::format_description;
use time::Time;
use tracing_subscriber::EnvFilter;

use commands::Session;
use dim_core::{BrightnessLevel, Day, Preset, Rgba};

#[derive(Parser, Debug)]
#[command(name = "lower-brightness")]
#[command(about = "Dim the screen below its minimum brightness with a tinted overlay")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show overlay, color and schedule state
    Status {
        /// Print machine readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the overlay
    On,
    /// Hide the overlay
    Off,
    /// Show or hide the overlay
    Toggle,
    /// Set the overlay opacity (0 = invisible, 255 = opaque)
    Brightness {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Pick one of the preset dimming levels
    Level {
        #[arg(value_enum)]
        level: LevelArg,
    },
    /// Dim the screen by one step
    Reduce,
    /// Brighten the screen by one step
    Increase,
    /// Set the reduce/increase step (1-85)
    Step {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Change or inspect the overlay tint
    Color {
        #[command(subcommand)]
        command: ColorCommand,
    },
    /// Configure the weekly on/off schedule
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ColorCommand {
    /// Tint the overlay with a hex color (#RRGGBB or #AARRGGBB)
    Set {
        hex: Rgba,
        /// Keep this luminance instead of the color's own brightness
        #[arg(long)]
        luminance: Option<f32>,
    },
    /// Tint the overlay with a built-in preset
    Preset { name: Preset },
    /// List built-in presets
    Presets,
    /// Print the packed integer for a hex color
    Pack {
        hex: Rgba,
        #[arg(long)]
        luminance: Option<f32>,
    },
    /// Decode a packed integer
    Unpack { value: u64 },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ScheduleCommand {
    /// Show the schedule
    Show,
    /// Set start time and days
    Set {
        /// Start time as HH:MM
        #[arg(long)]
        at: ClockTime,
        /// Comma separated days, e.g. mon,tue,fri
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<Day>,
        /// Minutes the overlay stays on after each start
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Arm the schedule
    Enable,
    /// Disarm the schedule
    Disable,
    /// List upcoming start and stop times
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Low,
    Recommended,
    Strong,
}

impl From<LevelArg> for BrightnessLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Low => BrightnessLevel::Low,
            LevelArg::Recommended => BrightnessLevel::Recommended,
            LevelArg::Strong => BrightnessLevel::Strong,
        }
    }
}

/// Wall-clock `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl FromStr for ClockTime {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = Time::parse(s, format_description!("[hour padding:none]:[minute]"))?;
        Ok(Self {
            hour: time.hour(),
            minute: time.minute(),
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("Running {:?}", cli.command);

    let mut session = Session::open(cli.config)?;
    let output = session.execute(cli.command)?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
