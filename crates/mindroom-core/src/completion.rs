//! Manual completion marks: one "I did this" record per (practice, day).
//!
//! Marks snapshot the practice's kind and target at creation time so they
//! keep rendering after the practice is edited or deleted; they are never a
//! live join against the practice row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::day_start;
use crate::practice::{PracticeKind, ScheduledPractice, TargetRef};

/// Dedup key for a (practice, calendar day) pair: `"<practiceId>|<epoch>"`
/// where the epoch is the day start in seconds. This persisted layout is a
/// bit-exact contract; it is the sole de-duplication mechanism.
pub fn unique_key(practice_id: &str, day: DateTime<Utc>) -> String {
    format!("{}|{}", practice_id, day_start(day).timestamp())
}

/// A manual completion record for one practice on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMark {
    pub id: String,
    /// See [`unique_key`]. A UNIQUE index on this column enforces at most
    /// one mark per (practice, day).
    pub unique_key: String,
    /// Start of the calendar day the mark belongs to.
    pub day: DateTime<Utc>,
    /// Wall-clock time the mark was made; orders marks within a day.
    pub created_at: DateTime<Utc>,
    /// Back-reference to the owning practice. May dangle after deletion.
    pub assignment_id: String,
    /// Snapshot of the practice's kind at creation time.
    pub kind: PracticeKind,
    /// Snapshot of the practice's target at creation time.
    pub target: TargetRef,
}

impl CompletionMark {
    /// Build a mark for `practice` on the day containing `day`, copying the
    /// snapshot fields from the practice as it exists right now.
    pub fn snapshot_of(
        practice: &ScheduledPractice,
        day: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let day = day_start(day);
        Self {
            id: Uuid::new_v4().to_string(),
            unique_key: unique_key(&practice.id, day),
            day,
            created_at,
            assignment_id: practice.id.clone(),
            kind: practice.kind,
            target: practice.target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::TimeOfDay;
    use chrono::TimeZone;

    #[test]
    fn test_unique_key_layout() {
        let day = Utc.with_ymd_and_hms(2024, 1, 10, 15, 30, 0).unwrap();
        let start_epoch = Utc
            .with_ymd_and_hms(2024, 1, 10, 0, 0, 0)
            .unwrap()
            .timestamp();
        assert_eq!(unique_key("P", day), format!("P|{}", start_epoch));
    }

    #[test]
    fn test_snapshot_copies_practice_fields() {
        let practice = ScheduledPractice::new(
            PracticeKind::Exposure,
            TargetRef::Entity("hierarchy-3".into()),
            vec![2, 4, 6],
            TimeOfDay::new(18, 0),
        );
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 18, 5, 0).unwrap();
        let mark = CompletionMark::snapshot_of(&practice, at, at);

        assert_eq!(mark.assignment_id, practice.id);
        assert_eq!(mark.kind, PracticeKind::Exposure);
        assert_eq!(mark.target, TargetRef::Entity("hierarchy-3".into()));
        assert_eq!(mark.day, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        assert_eq!(mark.unique_key, unique_key(&practice.id, at));
    }
}
