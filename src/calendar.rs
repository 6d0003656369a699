//! Calendar and clock helpers.
//!
//! Days are plain `NaiveDate`s; clock values are minutes since midnight of the
//! day they belong to, so anything past 1440 lands on the following day.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("invalid clock value '{0}'")]
    Invalid(String),
}

/// Every date from `start` to `end`, both included. Empty when `start > end`.
pub fn trip_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current {
        if day > end {
            break;
        }
        days.push(day);
        current = day.succ_opt();
    }
    days
}

/// Day of week with 1 = Monday .. 7 = Sunday.
pub fn weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// Unique object token for a trip day, e.g. `jan052025`.
pub fn day_token(date: NaiveDate) -> String {
    format!(
        "{}{:02}{}",
        MONTHS[date.month0() as usize],
        date.day(),
        date.year()
    )
}

/// Whether the (0-based) month of `date` lies in `month_start..=month_end`.
///
/// A range whose end is lower than its start wraps over the new year.
pub fn month_in_range(date: NaiveDate, month_start: i32, month_end: i32) -> bool {
    let month = date.month0() as i32;
    if month_end < month_start {
        month >= month_start || month <= month_end
    } else {
        month_start <= month && month <= month_end
    }
}

/// Parse `HH:MM` or `HHMM` into minutes since midnight.
///
/// A leading `+` means the time belongs to the next calendar day.
pub fn parse_clock(raw: &str) -> Result<u32, ClockError> {
    let invalid = || ClockError::Invalid(raw.to_string());
    let trimmed = raw.trim();
    let (offset, time) = match trimmed.strip_prefix('+') {
        Some(rest) => (MINUTES_PER_DAY, rest),
        None => (0, trimmed),
    };

    let (hours, minutes) = match time.split_once(':') {
        Some(parts) => parts,
        None if time.len() >= 3 => time.split_at(time.len() - 2),
        None => return Err(invalid()),
    };
    if hours.is_empty() || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    Ok(offset + hours * 60 + minutes)
}

/// Render minutes since midnight as `HH:MM`.
///
/// Fractional minutes round up. Hours are not wrapped, so times past
/// midnight render as `24:30` and later.
pub fn format_clock(minutes: f64) -> String {
    // Travel legs accumulate float noise; trim it before rounding up.
    let total = ((minutes.max(0.0) * 1e6).round() / 1e6).ceil() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
