//! Tick time keys.
//!
//! Records are keyed by `i64` ticks: 100-nanosecond intervals elapsed since
//! 0001-01-01T00:00:00Z. The helpers here convert between ticks and
//! `chrono::DateTime<Utc>`.

use chrono::{DateTime, Utc};

/// Ticks per microsecond.
pub const TICKS_PER_MICROSECOND: i64 = 10;

/// Ticks per millisecond.
pub const TICKS_PER_MILLISECOND: i64 = 10_000;

/// Ticks per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks per minute.
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;

/// Ticks per hour.
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;

/// Ticks per day.
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

/// Ticks at the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Converts a UTC datetime to ticks.
///
/// Sub-tick precision (the last two nanosecond digits) is truncated.
#[must_use]
pub fn ticks_from_datetime(datetime: DateTime<Utc>) -> i64 {
    let nanos = i64::from(datetime.timestamp_subsec_nanos());
    UNIX_EPOCH_TICKS + datetime.timestamp() * TICKS_PER_SECOND + nanos / 100
}

/// Converts ticks to a UTC datetime.
///
/// Returns `None` when the value is outside the range chrono can represent.
#[must_use]
pub fn datetime_from_ticks(ticks: i64) -> Option<DateTime<Utc>> {
    let relative = ticks.checked_sub(UNIX_EPOCH_TICKS)?;
    let secs = relative.div_euclid(TICKS_PER_SECOND);
    let sub_ticks = relative.rem_euclid(TICKS_PER_SECOND);
    let nanos = u32::try_from(sub_ticks * 100).ok()?;
    DateTime::from_timestamp(secs, nanos)
}
