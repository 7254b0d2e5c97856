use crate::constants;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Clock face text, `09:05 PM` or `21:05`.
pub fn format_time<Tz>(instant: &DateTime<Tz>, hour12: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if hour12 {
        instant.format("%I:%M %p").to_string()
    } else {
        instant.format("%H:%M").to_string()
    }
}

/// Menu bar text. The leading space keeps the title off the icon slot.
pub fn tray_title(display_percent: Option<u8>, show_percent_symbol: bool) -> String {
    match display_percent {
        Some(v) if show_percent_symbol => format!(" {v}%"),
        Some(v) => format!(" {v}"),
        None => constants::TRAY_TITLE_DEFAULT.to_string(),
    }
}
