use crate::constants::{self, time};
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration, TimeZone};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeOfDayError {
    #[error("expected HH:MM, got {0:?}")]
    Malformed(String),
    #[error("hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),
    #[error("minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),
}

/// A wall-clock time on a 24 hour dial, stored as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeOfDayError> {
        if hour > 23 {
            return Err(TimeOfDayError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeOfDayError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minute)
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(self) -> i32 {
        i32::from(self.hour) * 60 + i32::from(self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeOfDayError::Malformed(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(malformed)?;

        let field = |part: &str| {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u32>().map_err(|_| malformed())
        };

        Self::new(field(h)?, field(m)?)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Signed minutes from `ideal` to `actual`, taking the shorter way around
/// the clock so the result lies in `[-720, 720]`.
pub fn compute_offset_minutes(actual: TimeOfDay, ideal: TimeOfDay) -> i32 {
    let mut diff = actual.minutes_of_day() - ideal.minutes_of_day();
    if diff > time::MAX_OFFSET_MINUTES {
        diff -= time::MINUTES_PER_DAY;
    }
    if diff < -time::MAX_OFFSET_MINUTES {
        diff += time::MINUTES_PER_DAY;
    }
    diff
}

/// `+4h 00m`, `-1h 30m`. Zero is rendered with a plus sign.
pub fn format_offset(minutes: i32) -> String {
    let sign = if minutes >= 0 { '+' } else { '-' };
    let abs = minutes.unsigned_abs();
    format!("{sign}{}h {:02}m", abs / 60, abs % 60)
}

/// The instant as it would read on the ideal schedule: a positive offset
/// (waking later than wanted) moves the clock back.
pub fn apply_shift<Tz: TimeZone>(instant: DateTime<Tz>, offset_minutes: i32) -> DateTime<Tz> {
    instant - Duration::minutes(i64::from(offset_minutes))
}

/// Live preview shown while the user is editing wake times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPreview {
    pub offset_minutes: i32,
    pub text: String,
    pub zero: bool,
}

impl ShiftPreview {
    pub fn new(actual: TimeOfDay, ideal: TimeOfDay) -> Self {
        let offset_minutes = compute_offset_minutes(actual, ideal);
        Self {
            offset_minutes,
            text: format_offset(offset_minutes),
            zero: offset_minutes == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftConfig {
    pub actual_wake: TimeOfDay,
    pub ideal_wake: TimeOfDay,
    pub offset_minutes: i32,
    pub enabled: bool,
}

impl ShiftConfig {
    pub fn new(actual_wake: TimeOfDay, ideal_wake: TimeOfDay, enabled: bool) -> Self {
        Self {
            actual_wake,
            ideal_wake,
            offset_minutes: compute_offset_minutes(actual_wake, ideal_wake),
            enabled,
        }
    }

    /// Fixed shift that cannot be switched off from the UI.
    pub fn pinned(actual_wake: TimeOfDay, ideal_wake: TimeOfDay) -> Self {
        Self::new(actual_wake, ideal_wake, true)
    }

    pub fn offset_in_range(&self) -> bool {
        self.offset_minutes.unsigned_abs() <= time::MAX_OFFSET_MINUTES.unsigned_abs()
    }

    pub fn apply<Tz: TimeZone>(&self, instant: DateTime<Tz>) -> DateTime<Tz> {
        apply_shift(instant, self.offset_minutes)
    }
}

/// The persisted shift record.
///
/// Nothing here returns an error: an unreadable, unwritable, or malformed
/// record behaves exactly like no record, and the shift simply shows as off.
#[derive(Debug, Clone)]
pub struct ShiftStore<S> {
    store: S,
}

impl<S: KeyValueStore> ShiftStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Option<ShiftConfig> {
        let raw = match self.store.get(constants::SHIFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Shift record unavailable: {e:#}");
                return None;
            }
        };

        let parsed = serde_json::from_str::<serde_json::Value>(&raw).and_then(|value| {
            if value.is_object() {
                serde_json::from_value::<ShiftConfig>(value)
            } else {
                Err(serde::de::Error::custom("shift record is not an object"))
            }
        });

        match parsed {
            Ok(config) if config.offset_in_range() => Some(config),
            Ok(config) => {
                warn!("Ignoring shift record with offset {}", config.offset_minutes);
                None
            }
            Err(e) => {
                warn!("Ignoring malformed shift record: {e}");
                None
            }
        }
    }

    /// Overwrites the whole record. Returns whether the write took effect.
    pub fn save(
        &self,
        actual_wake: TimeOfDay,
        ideal_wake: TimeOfDay,
        offset_minutes: i32,
        enabled: bool,
    ) -> bool {
        self.save_config(&ShiftConfig {
            actual_wake,
            ideal_wake,
            offset_minutes,
            enabled,
        })
    }

    pub fn save_config(&self, config: &ShiftConfig) -> bool {
        if !config.offset_in_range() {
            warn!("Refusing to save shift offset {}", config.offset_minutes);
            return false;
        }

        let json = match serde_json::to_string(config) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode shift record: {e}");
                return false;
            }
        };

        match self.store.set(constants::SHIFT_KEY, &json) {
            Ok(()) => {
                info!(
                    "Shift saved: {} ({})",
                    format_offset(config.offset_minutes),
                    if config.enabled { "on" } else { "off" }
                );
                true
            }
            Err(e) => {
                warn!("Failed to save shift record: {e:#}");
                false
            }
        }
    }

    /// Turns the shift off but keeps the wake times for next time.
    /// Does nothing when there is no record.
    pub fn disable(&self) -> Option<ShiftConfig> {
        let mut config = self.load()?;
        config.enabled = false;
        self.save_config(&config);
        Some(config)
    }

    pub fn is_active(&self) -> bool {
        self.load().is_some_and(|config| config.enabled)
    }
}
