//! Weekly progress and streak computation.
//!
//! Both figures union manual marks with session records from all five
//! sources, applying the completed-only rule for exposure and behavioral
//! activation. The calculator never raises: a failing fetch contributes
//! zero records and the result is still produced.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{day_bounds, day_start, week_bounds};
use crate::session::SessionRecordSource;
use crate::storage::PracticeDb;

/// Rolling weekly summary, anchored to the week containing the anchor day
/// and to "today" for the streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekProgress {
    /// Manual marks plus counted sessions in the week. Additive: a day with
    /// both a mark and a session contributes two.
    pub completed_this_week: u32,
    /// Manual marks alone in the week.
    pub planned_done_this_week: u32,
    /// Consecutive days ending today with at least one completion signal.
    pub streak_days: u32,
}

/// Compute the weekly summary and streak.
///
/// The week is the Sunday-first 7-day window containing `anchor`. The
/// streak scans `lookback_days` calendar days backwards from `today`,
/// counting consecutive days with any signal; a day without one ends the
/// scan, and no signal today means a streak of zero.
pub fn week_progress(
    db: &PracticeDb,
    sources: &[Box<dyn SessionRecordSource>],
    anchor: DateTime<Utc>,
    today: DateTime<Utc>,
    lookback_days: u32,
) -> WeekProgress {
    let (week_start, week_end) = week_bounds(anchor);

    let planned_done_this_week = db.count_marks_between(week_start, week_end).unwrap_or(0);

    let mut completed_this_week = planned_done_this_week;
    for source in sources {
        let records = source.records_between(week_start, week_end).unwrap_or_default();
        completed_this_week += records.iter().filter(|r| r.is_complete()).count() as u32;
    }

    WeekProgress {
        completed_this_week,
        planned_done_this_week,
        streak_days: streak_days(db, sources, today, lookback_days),
    }
}

/// Consecutive days with at least one completion signal, ending today.
///
/// Signals from any practice count for the streak regardless of which
/// practices were due that day.
fn streak_days(
    db: &PracticeDb,
    sources: &[Box<dyn SessionRecordSource>],
    today: DateTime<Utc>,
    lookback_days: u32,
) -> u32 {
    if lookback_days == 0 {
        return 0;
    }

    let today_start = day_start(today);
    let (_, today_end) = day_bounds(today);
    let window_start = today_start - Duration::days(lookback_days as i64 - 1);

    let mut signal_days: HashSet<NaiveDate> = HashSet::new();
    for mark in db.marks_between(window_start, today_end).unwrap_or_default() {
        signal_days.insert(mark.day.date_naive());
    }
    for source in sources {
        let records = source
            .records_between(window_start, today_end)
            .unwrap_or_default();
        for record in records {
            if record.is_complete() {
                signal_days.insert(record.started_at.date_naive());
            }
        }
    }

    let mut streak = 0;
    for offset in 0..lookback_days {
        let day = (today_start - Duration::days(offset as i64)).date_naive();
        if signal_days.contains(&day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
