//! Civil calendar arithmetic in Korea Standard Time.
//!
//! The forecast feed is anchored to KST, which is a fixed UTC+09:00 offset
//! with no daylight saving. All conversions go through that constant offset
//! so results never depend on the host timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use std::fmt::Debug;

/// Offset of KST from UTC.
pub const KST_OFFSET_SECS: i64 = 9 * 60 * 60;

/// Convert an instant to KST wall-clock components.
pub fn to_kst(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc() + Duration::seconds(KST_OFFSET_SECS)
}

/// Convert KST wall-clock components back to an instant.
pub fn from_kst(civil: NaiveDateTime) -> DateTime<Utc> {
    (civil - Duration::seconds(KST_OFFSET_SECS)).and_utc()
}

/// Build a KST wall-clock value, `None` for out-of-range components.
pub fn civil(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

pub fn add_days(civil: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    civil.checked_add_signed(Duration::days(days))
}

pub fn add_hours(civil: NaiveDateTime, hours: i64) -> Option<NaiveDateTime> {
    civil.checked_add_signed(Duration::hours(hours))
}

/// `YYYYMMDD`, as used by `base_date` and `fcstDate`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a `YYYYMMDD` feed date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// `HH00` for a whole hour of the day.
pub fn format_time(hour: u32) -> String {
    format!("{hour:02}00")
}

/// Hour component of a `HHMM` feed time.
pub fn parse_hour(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = value[..2].parse().ok()?;
    (hour < 24).then_some(hour)
}

/// Hour-and-minute of a civil time packed as `HHMM`.
pub fn hhmm(civil: NaiveDateTime) -> u32 {
    civil.hour() * 100 + civil.minute()
}

/// Source of "now", injectable so cache expiry and slot selection can be
/// driven deterministically.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
