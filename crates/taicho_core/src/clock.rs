//! Time helpers shared by managers, view models and input parsing.
//!
//! # Invariants
//! - Instants are carried as `DateTime<Utc>`; zones only matter for calendar
//!   arithmetic and display.
//! - Quarter-hour rounding always rounds down.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;

const QUARTER_HOUR_SECS: i64 = 15 * 60;

const USER_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Rounds an instant down to the previous 15-minute boundary.
///
/// Sub-second precision is dropped. All offsets currently in use are multiples
/// of 15 minutes, so the boundary is also a quarter hour in local time.
pub fn round_down_to_quarter_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    let secs = instant.timestamp();
    let floored = secs - secs.rem_euclid(QUARTER_HOUR_SECS);
    DateTime::from_timestamp(floored, 0).unwrap_or(instant)
}

/// Current time rounded down to the quarter hour.
pub fn now_rounded() -> DateTime<Utc> {
    round_down_to_quarter_hour(Utc::now())
}

/// Returns the device timezone, falling back to UTC when it cannot be read.
pub fn current_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(err) => {
                warn!("event=timezone_detect module=clock status=fallback zone={name} error={err}");
                Tz::UTC
            }
        },
        Err(err) => {
            warn!("event=timezone_detect module=clock status=fallback error={err}");
            Tz::UTC
        }
    }
}

/// Parses an IANA identifier such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Returns `[start_of_day, start_of_next_day)` for `date` in `tz`.
///
/// Returns `None` when local midnight does not exist in `tz` (a DST gap at
/// midnight) or when the date is at the end of the supported range.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start_of_day(date, tz)?;
    let end = start_of_day(date.succ_opt()?, tz)?;
    Some((start, end))
}

fn start_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Parses user-entered time text.
///
/// Accepts RFC 3339 (offset taken from the text) or a local
/// `YYYY-MM-DD HH:MM[:SS]` wall time interpreted in `tz`.
pub fn parse_user_time(input: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    USER_TIME_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(trimmed, format).ok()?;
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    })
}

/// Medium date with short time, rendered in `tz`, e.g. `Oct 18, 2026 at 9:15 AM`.
pub fn display_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%b %-d, %Y at %-I:%M %p")
        .to_string()
}
