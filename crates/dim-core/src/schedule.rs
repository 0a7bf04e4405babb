// ABOUTME: Weekly on/off schedule for the overlay.
// ABOUTME: Computes the wall-clock start and stop transitions around a given time.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Duration, PrimitiveDateTime, Time, Weekday};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid time {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },

    #[error("duration must be between 1 and 1440 minutes, got {0}")]
    InvalidDuration(u32),

    #[error("unknown day {0:?}")]
    UnknownDay(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub fn all() -> &'static [Day] {
        &[
            Day::Monday,
            Day::Tuesday,
            Day::Wednesday,
            Day::Thursday,
            Day::Friday,
            Day::Saturday,
            Day::Sunday,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            Day::Monday => Weekday::Monday,
            Day::Tuesday => Weekday::Tuesday,
            Day::Wednesday => Weekday::Wednesday,
            Day::Thursday => Weekday::Thursday,
            Day::Friday => Weekday::Friday,
            Day::Saturday => Weekday::Saturday,
            Day::Sunday => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = ScheduleError;

    /// Accepts the full English name or its three letter abbreviation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Day::all()
            .iter()
            .copied()
            .find(|day| {
                let label = day.label().to_ascii_lowercase();
                wanted == label || (wanted.len() == 3 && label.starts_with(&wanted))
            })
            .ok_or_else(|| ScheduleError::UnknownDay(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub at: PrimitiveDateTime,
    pub kind: TransitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Start hour (0-23)
    pub hour: u8,

    /// Start minute (0-59)
    pub minute: u8,

    /// Days on which the overlay starts
    pub days: BTreeSet<Day>,

    /// Whether the schedule is armed at all
    pub enabled: bool,

    /// How long the overlay stays on after each start
    pub duration_minutes: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            hour: 22,
            minute: 0,
            days: BTreeSet::new(),
            enabled: false,
            duration_minutes: 8 * 60,
        }
    }
}

/// Earliest occurrence of `day` at `at` that is not before `after`.
fn next_on(day: Day, at: Time, after: PrimitiveDateTime) -> PrimitiveDateTime {
    let today = after.weekday().number_days_from_monday() as i64;
    let target = day.weekday().number_days_from_monday() as i64;
    let ahead = (target - today).rem_euclid(7);

    let candidate = PrimitiveDateTime::new(after.date() + Duration::days(ahead), at);
    if candidate < after {
        candidate + Duration::weeks(1)
    } else {
        candidate
    }
}

impl Schedule {
    pub fn new(
        hour: u8,
        minute: u8,
        days: impl IntoIterator<Item = Day>,
    ) -> Result<Self, ScheduleError> {
        let schedule = Self {
            hour,
            minute,
            days: days.into_iter().collect(),
            ..Self::default()
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check fields that may have come from an edited config file.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        self.start_time()?;
        if self.duration_minutes == 0 || self.duration_minutes > MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidDuration(self.duration_minutes));
        }
        Ok(())
    }

    pub fn start_time(&self) -> Result<Time, ScheduleError> {
        Time::from_hms(self.hour, self.minute, 0).map_err(|_| ScheduleError::InvalidTime {
            hour: self.hour,
            minute: self.minute,
        })
    }

    /// Wall-clock time at which each window ends.
    pub fn stop_time(&self) -> (u8, u8) {
        let total = self.hour as u32 * 60 + self.minute as u32 + self.duration_minutes;
        let total = total % MINUTES_PER_DAY;
        ((total / 60) as u8, (total % 60) as u8)
    }

    fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }

    /// Starts of the windows that end at or after `now`, one per selected day.
    fn current_windows(&self, now: PrimitiveDateTime) -> Vec<PrimitiveDateTime> {
        if !self.enabled {
            return Vec::new();
        }
        let Ok(at) = self.start_time() else {
            return Vec::new();
        };
        let earliest = now - self.duration();
        self.days.iter().map(|day| next_on(*day, at, earliest)).collect()
    }

    /// Earliest start at or after `now`.
    pub fn next_start(&self, now: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
        if !self.enabled {
            return None;
        }
        let at = self.start_time().ok()?;
        self.days.iter().map(|day| next_on(*day, at, now)).min()
    }

    /// Earliest stop at or after `now`. A window that crosses midnight stops
    /// on the following day.
    pub fn next_stop(&self, now: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
        let duration = self.duration();
        self.current_windows(now)
            .into_iter()
            .map(|start| start + duration)
            .min()
    }

    /// The next start and stop for every selected day, in time order.
    pub fn upcoming(&self, now: PrimitiveDateTime) -> Vec<Transition> {
        let Ok(at) = self.start_time() else {
            return Vec::new();
        };
        if !self.enabled {
            return Vec::new();
        }

        let duration = self.duration();
        let mut transitions: Vec<Transition> = self
            .days
            .iter()
            .flat_map(|day| {
                let start = next_on(*day, at, now);
                let stop = next_on(*day, at, now - duration) + duration;
                [
                    Transition { at: start, kind: TransitionKind::Start },
                    Transition { at: stop, kind: TransitionKind::Stop },
                ]
            })
            .collect();

        transitions.sort_by_key(|t| t.at);
        transitions
    }

    /// Whether `now` falls inside a scheduled window.
    pub fn is_active_at(&self, now: PrimitiveDateTime) -> bool {
        let duration = self.duration();
        self.current_windows(now)
            .into_iter()
            .any(|start| start <= now && now < start + duration)
    }
}
