// src/storage/window.rs

use crate::storage::Period;
use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc};

/// Inclusive lower bound of a counting window, computed from `now` in UTC.
///
/// today: midnight of `now`'s calendar date. week: midnight of the most
/// recent Monday on/before `now` (ISO week). month: midnight of day 1.
/// year: midnight of January 1. `now` itself is the implicit upper bound;
/// it is never persisted or compared explicitly.
pub fn window_start(period: Period, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let date = match period {
        Period::Today => today,
        Period::Week => today - Days::new(u64::from(today.weekday().num_days_from_monday())),
        Period::Month => today.with_day(1).unwrap_or(today),
        Period::Year => today.with_day(1).and_then(|d| d.with_month(1)).unwrap_or(today),
    };
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
