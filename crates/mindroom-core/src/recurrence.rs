//! Occurrence generation: expanding weekly recurrence rules into concrete
//! datetimes over a bounded horizon.
//!
//! Pure functions with no side effects. Absence of matches yields an empty
//! sequence; there are no error conditions here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{at_time_of_day, day_start, weekday_number};
use crate::practice::ScheduledPractice;

/// One concrete datetime instance where a practice is due.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub practice: ScheduledPractice,
    pub at: DateTime<Utc>,
}

/// Whether a practice fires on the calendar day containing `day`.
pub fn occurs_on(practice: &ScheduledPractice, day: DateTime<Utc>) -> bool {
    practice.active && practice.days_of_week.contains(&weekday_number(day))
}

/// Expand practices into upcoming occurrences.
///
/// Walks day offsets `0..horizon_days` from `from`'s start of day, composes
/// each matching day with the practice's time of day, and keeps only
/// occurrences at or after `now` -- a practice due at 09:00 today is no
/// longer "upcoming" at 10:00. The result is sorted ascending by datetime;
/// same-datetime ties keep the input order of `practices`.
pub fn upcoming_occurrences(
    practices: &[ScheduledPractice],
    from: DateTime<Utc>,
    horizon_days: u32,
    now: DateTime<Utc>,
) -> Vec<Occurrence> {
    let first_day = day_start(from);
    let mut occurrences = Vec::new();

    for offset in 0..horizon_days as i64 {
        let day = first_day + Duration::days(offset);
        for practice in practices {
            if !occurs_on(practice, day) {
                continue;
            }
            let at = at_time_of_day(day, practice.time_of_day);
            if at >= now {
                occurrences.push(Occurrence {
                    practice: practice.clone(),
                    at,
                });
            }
        }
    }

    // Stable sort: within one day the push order is the input order.
    occurrences.sort_by_key(|o| o.at);
    occurrences
}
