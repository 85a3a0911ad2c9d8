//! Session records produced by the five practice-delivery subsystems, and
//! the source seam the aggregator reads them through.
//!
//! This crate never writes a session on its own behalf; the delivery
//! subsystems record finished sessions via [`crate::storage::PracticeDb`]
//! and the core only queries by timestamp range.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::practice::{PracticeKind, TargetRef};
use crate::storage::PracticeDb;

/// One autonomously-produced record of practice activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub kind: PracticeKind,
    /// Primary timestamp: when the session started (or was performed).
    pub started_at: DateTime<Utc>,
    /// Absent means in-progress or abandoned.
    pub completed_at: Option<DateTime<Utc>>,
    /// Kind-specific display reference, if the subsystem recorded one.
    pub target: Option<TargetRef>,
}

impl SessionRecord {
    /// Whether this record counts toward adherence.
    ///
    /// Exposure and behavioral-activation sessions count only once
    /// finished; the other three kinds are written at end of session, so
    /// their existence is completion.
    pub fn is_complete(&self) -> bool {
        if self.kind.has_distinct_completion() {
            self.completed_at.is_some()
        } else {
            true
        }
    }

    /// Session length in seconds, when a finish time exists.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.started_at).num_seconds())
    }
}

/// Read seam over one practice kind's session records.
///
/// Each of the five delivery subsystems is represented by one source; the
/// aggregator iterates them uniformly. Fetches are fallible; readers treat
/// a failing source as contributing no records.
pub trait SessionRecordSource {
    /// The practice kind this source serves.
    fn kind(&self) -> PracticeKind;

    /// Records whose primary timestamp falls in `[start, end)`.
    fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>, Box<dyn std::error::Error>>;
}

/// Built-in source reading the shared `session_records` table for one kind.
pub struct DbSessionSource {
    db: Rc<PracticeDb>,
    kind: PracticeKind,
}

impl DbSessionSource {
    pub fn new(db: Rc<PracticeDb>, kind: PracticeKind) -> Self {
        Self { db, kind }
    }

    /// One source per practice kind over the same database.
    pub fn all(db: &Rc<PracticeDb>) -> Vec<Box<dyn SessionRecordSource>> {
        PracticeKind::ALL
            .into_iter()
            .map(|kind| {
                Box::new(DbSessionSource::new(Rc::clone(db), kind)) as Box<dyn SessionRecordSource>
            })
            .collect()
    }
}

impl SessionRecordSource for DbSessionSource {
    fn kind(&self) -> PracticeKind {
        self.kind
    }

    fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>, Box<dyn std::error::Error>> {
        Ok(self.db.sessions_between(self.kind, start, end)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
    }

    fn record(kind: PracticeKind, completed: bool) -> SessionRecord {
        let started_at = utc_datetime(2024, 1, 10, 9, 0);
        SessionRecord {
            id: "s-1".into(),
            kind,
            started_at,
            completed_at: completed.then(|| utc_datetime(2024, 1, 10, 9, 12)),
            target: None,
        }
    }

    #[test]
    fn test_completed_only_rule_per_kind() {
        assert!(!record(PracticeKind::Exposure, false).is_complete());
        assert!(record(PracticeKind::Exposure, true).is_complete());
        assert!(!record(PracticeKind::BehavioralActivation, false).is_complete());
        // Breathing/relaxation/grounding exist only once finished.
        assert!(record(PracticeKind::Breathing, false).is_complete());
        assert!(record(PracticeKind::Grounding, false).is_complete());
    }

    #[test]
    fn test_duration_derived_from_completion() {
        assert_eq!(
            record(PracticeKind::Exposure, true).duration_seconds(),
            Some(12 * 60)
        );
        assert_eq!(record(PracticeKind::Exposure, false).duration_seconds(), None);
    }
}
