//! Selection of the publication slot a forecast query is based on, and of
//! the (date, hour) the caller actually wants to know about.

use chrono::{DateTime, Days, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::kst;

/// Daily publication slots of the village forecast, as `HHMM`.
pub const BASE_TIMES: [u32; 8] = [200, 500, 800, 1100, 1400, 1700, 2000, 2300];

/// A slot is only referenced once it has been published for this long.
pub const LOOKBACK_MINUTES: i64 = 45;

/// Representative hour for days other than today.
pub const FUTURE_DAY_HOUR: u32 = 12;

/// Logical day the caller asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastDay {
    #[default]
    Today,
    Tomorrow,
    DayAfter,
}

impl ForecastDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastDay::Today => "today",
            ForecastDay::Tomorrow => "tomorrow",
            ForecastDay::DayAfter => "day-after",
        }
    }

    /// Display label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ForecastDay::Today => "오늘",
            ForecastDay::Tomorrow => "내일",
            ForecastDay::DayAfter => "모레",
        }
    }

    pub fn offset_days(&self) -> u64 {
        match self {
            ForecastDay::Today => 0,
            ForecastDay::Tomorrow => 1,
            ForecastDay::DayAfter => 2,
        }
    }

    pub const fn all() -> &'static [ForecastDay] {
        &[ForecastDay::Today, ForecastDay::Tomorrow, ForecastDay::DayAfter]
    }
}

impl fmt::Display for ForecastDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown forecast day '{0}'. Supported values: today, tomorrow, day-after.")]
pub struct ParseForecastDayError(String);

impl FromStr for ForecastDay {
    type Err = ParseForecastDayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "today" => Ok(ForecastDay::Today),
            "tomorrow" => Ok(ForecastDay::Tomorrow),
            "day-after" | "dayafter" | "day_after" => Ok(ForecastDay::DayAfter),
            _ => Err(ParseForecastDayError(value.to_string())),
        }
    }
}

/// Basis of a forecast query: `base_date` and `base_time` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseDateTime {
    pub date: NaiveDate,
    /// Slot as `HHMM`.
    pub time: u32,
}

impl BaseDateTime {
    pub fn date_param(&self) -> String {
        kst::format_date(self.date)
    }

    pub fn time_param(&self) -> String {
        format!("{:04}", self.time)
    }
}

/// Forecast hour the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastTarget {
    pub date: NaiveDate,
    pub hour: u32,
}

/// Most recent slot that is safely published at `now`.
pub fn latest_base(now: DateTime<Utc>) -> BaseDateTime {
    let effective = kst::to_kst(now - Duration::minutes(LOOKBACK_MINUTES));
    let candidate = kst::hhmm(effective);
    let date = effective.date();

    match BASE_TIMES.iter().rev().find(|&&slot| slot <= candidate) {
        Some(&slot) => BaseDateTime { date, time: slot },
        None => BaseDateTime {
            date: date.pred_opt().unwrap_or(date),
            time: BASE_TIMES[BASE_TIMES.len() - 1],
        },
    }
}

/// Basis actually used for queries.
///
/// Only the earliest daily slot is ever queried: whenever the latest slot
/// is later than 02:00 the time is pulled down to 02:00 while the selected
/// date is kept.
pub fn query_base(now: DateTime<Utc>) -> BaseDateTime {
    let mut base = latest_base(now);
    if base.time > BASE_TIMES[0] {
        base.time = BASE_TIMES[0];
    }
    base
}

pub fn resolve_target(now: DateTime<Utc>, day: ForecastDay) -> ForecastTarget {
    let local = kst::to_kst(now);

    let hour = match day {
        ForecastDay::Today if local.minute() >= 30 => (local.hour() + 1).min(23),
        ForecastDay::Today => local.hour(),
        _ => FUTURE_DAY_HOUR,
    };

    ForecastTarget {
        date: local.date() + Days::new(day.offset_days()),
        hour,
    }
}
