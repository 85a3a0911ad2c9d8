//! Calendar-day and week arithmetic shared by the scheduler and trackers.
//!
//! All helpers operate on the canonical `Utc` timeline. Weekday numbering
//! follows the host-calendar convention used everywhere in this crate:
//! 1 = Sunday through 7 = Saturday. Weeks start on Sunday so the two
//! conventions can never disagree.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::practice::TimeOfDay;

/// Truncate a timestamp to the start of its calendar day.
pub fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Half-open 24-hour window `[start, end)` for the day containing `at`.
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day_start(at);
    (start, start + Duration::days(1))
}

/// Half-open 7-day window `[start, end)` for the Sunday-first week
/// containing `anchor`.
pub fn week_bounds(anchor: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day_start(anchor) - Duration::days(anchor.weekday().num_days_from_sunday() as i64);
    (start, start + Duration::days(7))
}

/// Weekday number of a timestamp's calendar day: 1 = Sunday ... 7 = Saturday.
pub fn weekday_number(at: DateTime<Utc>) -> u8 {
    at.weekday().number_from_sunday() as u8
}

/// Compose a concrete datetime from a day and an hour:minute of day.
pub fn at_time_of_day(day: DateTime<Utc>, time: TimeOfDay) -> DateTime<Utc> {
    day_start(day) + Duration::hours(time.hour as i64) + Duration::minutes(time.minute as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
    }

    #[test]
    fn test_day_start_truncates_time() {
        let at = utc_datetime(2024, 1, 10, 15, 42);
        assert_eq!(day_start(at), utc_datetime(2024, 1, 10, 0, 0));
    }

    #[test]
    fn test_day_bounds_are_half_open() {
        let (start, end) = day_bounds(utc_datetime(2024, 1, 10, 9, 0));
        assert_eq!(start, utc_datetime(2024, 1, 10, 0, 0));
        assert_eq!(end, utc_datetime(2024, 1, 11, 0, 0));
    }

    #[test]
    fn test_weekday_number_convention() {
        // 2024-01-07 is a Sunday, 2024-01-13 a Saturday.
        assert_eq!(weekday_number(utc_datetime(2024, 1, 7, 12, 0)), 1);
        assert_eq!(weekday_number(utc_datetime(2024, 1, 10, 12, 0)), 4); // Wednesday
        assert_eq!(weekday_number(utc_datetime(2024, 1, 13, 12, 0)), 7);
    }

    #[test]
    fn test_week_bounds_start_on_sunday() {
        // Anchor mid-week: Wednesday 2024-01-10.
        let (start, end) = week_bounds(utc_datetime(2024, 1, 10, 18, 30));
        assert_eq!(start, utc_datetime(2024, 1, 7, 0, 0));
        assert_eq!(end, utc_datetime(2024, 1, 14, 0, 0));

        // Anchoring on the Sunday itself yields the same week.
        let (start2, end2) = week_bounds(utc_datetime(2024, 1, 7, 0, 0));
        assert_eq!((start2, end2), (start, end));
    }

    #[test]
    fn test_at_time_of_day_composition() {
        let day = utc_datetime(2024, 1, 10, 23, 59);
        let at = at_time_of_day(day, TimeOfDay::new(9, 30));
        assert_eq!(at, utc_datetime(2024, 1, 10, 9, 30));
    }
}
