//! Calendar-day windows in epoch milliseconds.

use chrono::{Local, NaiveDate, NaiveTime, TimeZone};

/// Epoch milliseconds of the first valid instant of `day` in `tz`.
///
/// Ambiguous midnights (DST fall-back) resolve to the earlier instant. When
/// midnight does not exist (DST spring-forward) the day starts at 01:00.
fn start_of_day_millis<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> i64 {
    let midnight = day.and_time(NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.timestamp_millis();
    }
    let one_am = day.and_hms_opt(1, 0, 0).unwrap_or(midnight);
    tz.from_local_datetime(&one_am)
        .earliest()
        .map_or_else(|| midnight.and_utc().timestamp_millis(), |dt| dt.timestamp_millis())
}

/// Inclusive `[start, end]` bounds of `day` in `tz`.
///
/// `end` is the last millisecond before the next day starts.
pub fn day_window<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> (i64, i64) {
    let start = start_of_day_millis(day, tz);
    let end = day
        .succ_opt()
        .map_or(i64::MAX, |next| start_of_day_millis(next, tz) - 1);
    (start, end)
}

/// Inclusive bounds of `day` in the process-local time zone.
pub fn local_day_window(day: NaiveDate) -> (i64, i64) {
    day_window(day, &Local)
}

/// Inclusive bounds of the current local day.
pub fn today_window() -> (i64, i64) {
    local_day_window(Local::now().date_naive())
}
