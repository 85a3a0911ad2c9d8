//! Adherence aggregation: the unified, time-ordered "completed today" list.
//!
//! Merges manual completion marks with the session records of all five
//! practice kinds for one calendar day. Aggregation is strictly best-effort:
//! a failing fetch (the mark store or any single source) contributes nothing
//! instead of aborting the whole view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::day_bounds;
use crate::completion::CompletionMark;
use crate::practice::{PracticeKind, ScheduledPractice, TargetRef, TargetResolver};
use crate::session::{SessionRecord, SessionRecordSource};
use crate::storage::PracticeDb;

/// Where a completed entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Manual "I did this" mark.
    Mark,
    /// Autonomously-recorded practice session.
    Session,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Mark => "mark",
            EntrySource::Session => "session",
        }
    }
}

/// One row of the "completed today" list; unifies a mark or a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedEntry {
    pub id: String,
    pub title: String,
    /// Ordering timestamp. Entries without one sort last, stably.
    pub timestamp: Option<DateTime<Utc>>,
    /// Optional display detail, e.g. a session duration.
    pub detail: Option<String>,
    pub source: EntrySource,
    /// Kind tag for icon and tint selection.
    pub kind: PracticeKind,
}

fn title_for(
    resolver: &dyn TargetResolver,
    kind: PracticeKind,
    target: Option<&TargetRef>,
) -> String {
    target
        .and_then(|t| resolver.resolve(kind, t))
        .unwrap_or_else(|| ScheduledPractice::fallback_title(kind))
}

fn duration_detail(record: &SessionRecord) -> Option<String> {
    record.duration_seconds().map(|secs| {
        let minutes = secs.max(0) / 60;
        if minutes > 0 {
            format!("{minutes} min")
        } else {
            "<1 min".to_string()
        }
    })
}

fn mark_to_entry(mark: &CompletionMark, resolver: &dyn TargetResolver) -> CompletedEntry {
    CompletedEntry {
        id: mark.id.clone(),
        title: title_for(resolver, mark.kind, Some(&mark.target)),
        timestamp: Some(mark.created_at),
        detail: None,
        source: EntrySource::Mark,
        kind: mark.kind,
    }
}

fn session_to_entry(record: &SessionRecord, resolver: &dyn TargetResolver) -> CompletedEntry {
    CompletedEntry {
        id: record.id.clone(),
        title: title_for(resolver, record.kind, record.target.as_ref()),
        timestamp: Some(record.started_at),
        detail: duration_detail(record),
        source: EntrySource::Session,
        kind: record.kind,
    }
}

/// All completion signals for the calendar day containing `day`, ascending
/// by timestamp.
///
/// Marks come first in source order, then each session source in turn;
/// the final stable sort therefore keeps that relative order for equal
/// timestamps. Exposure and behavioral-activation records without a finish
/// time are in-progress or abandoned and are excluded.
pub fn completed_entries_for(
    db: &PracticeDb,
    sources: &[Box<dyn SessionRecordSource>],
    resolver: &dyn TargetResolver,
    day: DateTime<Utc>,
) -> Vec<CompletedEntry> {
    let (day_start, day_end) = day_bounds(day);
    let mut entries = Vec::new();

    for mark in db.marks_for_day(day_start).unwrap_or_default() {
        entries.push(mark_to_entry(&mark, resolver));
    }

    for source in sources {
        let records = source.records_between(day_start, day_end).unwrap_or_default();
        for record in &records {
            if record.is_complete() {
                entries.push(session_to_entry(record, resolver));
            }
        }
    }

    entries.sort_by_key(|e| (e.timestamp.is_none(), e.timestamp));
    entries
}
