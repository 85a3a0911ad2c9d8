//! SQLite-based storage for scheduled practices, completion marks, and
//! session records.
//!
//! Timestamps are stored as RFC3339 text. The `completion_marks.unique_key`
//! UNIQUE index is the authoritative de-duplication mechanism for manual
//! marks: a toggle is one DELETE or one INSERT, never observable half-done.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json;

use super::data_dir;
use crate::calendar::day_start;
use crate::completion::{unique_key, CompletionMark};
use crate::error::StoreError;
use crate::practice::{PracticeKind, ScheduledPractice, TargetRef, TimeOfDay};
use crate::session::SessionRecord;

// === Helper Functions ===

/// Parse a datetime from an RFC3339 column with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a practice kind column, rejecting unknown values
fn parse_kind_column(idx: usize, kind_str: &str) -> Result<PracticeKind, rusqlite::Error> {
    PracticeKind::parse(kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown practice kind '{kind_str}'").into(),
        )
    })
}

/// Parse a JSON-encoded TargetRef column
fn parse_target_column(idx: usize, target_json: &str) -> Result<TargetRef, rusqlite::Error> {
    serde_json::from_str(target_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Build a ScheduledPractice from a database row
fn row_to_practice(row: &rusqlite::Row) -> Result<ScheduledPractice, rusqlite::Error> {
    let kind_str: String = row.get(1)?;
    let target_json: String = row.get(2)?;
    let days_json: String = row.get(3)?;
    let time_str: String = row.get(4)?;
    let created_at_str: String = row.get(6)?;

    Ok(ScheduledPractice {
        id: row.get(0)?,
        kind: parse_kind_column(1, &kind_str)?,
        target: parse_target_column(2, &target_json)?,
        days_of_week: serde_json::from_str(&days_json).unwrap_or_default(),
        time_of_day: TimeOfDay::parse_hhmm(&time_str).unwrap_or(TimeOfDay { hour: 9, minute: 0 }),
        active: row.get(5)?,
        created_at: parse_datetime_fallback(&created_at_str),
        notification_handle: row.get(7)?,
    })
}

/// Build a CompletionMark from a database row
fn row_to_mark(row: &rusqlite::Row) -> Result<CompletionMark, rusqlite::Error> {
    let day_str: String = row.get(2)?;
    let created_at_str: String = row.get(3)?;
    let kind_str: String = row.get(5)?;
    let target_json: String = row.get(6)?;

    Ok(CompletionMark {
        id: row.get(0)?,
        unique_key: row.get(1)?,
        day: parse_datetime_fallback(&day_str),
        created_at: parse_datetime_fallback(&created_at_str),
        assignment_id: row.get(4)?,
        kind: parse_kind_column(5, &kind_str)?,
        target: parse_target_column(6, &target_json)?,
    })
}

/// Build a SessionRecord from a database row
fn row_to_session(row: &rusqlite::Row) -> Result<SessionRecord, rusqlite::Error> {
    let kind_str: String = row.get(1)?;
    let started_at_str: String = row.get(2)?;
    let completed_at_str: Option<String> = row.get(3)?;
    let target_json: Option<String> = row.get(4)?;

    let target = match target_json {
        Some(json) => Some(parse_target_column(4, &json)?),
        None => None,
    };

    Ok(SessionRecord {
        id: row.get(0)?,
        kind: parse_kind_column(1, &kind_str)?,
        started_at: parse_datetime_fallback(&started_at_str),
        completed_at: completed_at_str.as_deref().map(parse_datetime_fallback),
        target,
    })
}

/// Outcome of toggling a completion mark.
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    /// No mark existed for the (practice, day) key; one was created.
    Added(CompletionMark),
    /// A mark existed and was deleted.
    Removed { unique_key: String },
}

/// SQLite database for practice storage.
///
/// Stores scheduled practices, manual completion marks, and the session
/// records written by the five practice-delivery subsystems.
pub struct PracticeDb {
    conn: Connection,
}

impl PracticeDb {
    /// Open the database at `~/.config/mindroom/mindroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::MigrationFailed(format!("data dir unavailable: {e}")))?
            .join("mindroom.db");
        let conn = Connection::open(&path)
            .map_err(|source| StoreError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and previews).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS scheduled_practices (
                    id                  TEXT PRIMARY KEY,
                    kind                TEXT NOT NULL,
                    target              TEXT NOT NULL,
                    days_of_week        TEXT NOT NULL DEFAULT '[]',
                    time_of_day         TEXT NOT NULL,
                    active              INTEGER NOT NULL DEFAULT 1,
                    created_at          TEXT NOT NULL,
                    notification_handle TEXT
                );

                CREATE TABLE IF NOT EXISTS completion_marks (
                    id            TEXT PRIMARY KEY,
                    unique_key    TEXT NOT NULL,
                    day           TEXT NOT NULL,
                    created_at    TEXT NOT NULL,
                    assignment_id TEXT NOT NULL,
                    kind          TEXT NOT NULL,
                    target        TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS session_records (
                    id           TEXT PRIMARY KEY,
                    kind         TEXT NOT NULL,
                    started_at   TEXT NOT NULL,
                    completed_at TEXT,
                    target       TEXT
                );

                -- The dedup invariant lives here, not in application checks
                CREATE UNIQUE INDEX IF NOT EXISTS idx_marks_unique_key
                    ON completion_marks(unique_key);

                -- Indexes for the range-query paths
                CREATE INDEX IF NOT EXISTS idx_marks_day ON completion_marks(day);
                CREATE INDEX IF NOT EXISTS idx_sessions_kind_started
                    ON session_records(kind, started_at);",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))
    }

    // === Scheduled practices ===

    /// Insert a new practice.
    pub fn insert_practice(&self, practice: &ScheduledPractice) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO scheduled_practices
                (id, kind, target, days_of_week, time_of_day, active, created_at, notification_handle)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                practice.id,
                practice.kind.as_str(),
                serde_json::to_string(&practice.target).unwrap_or_default(),
                serde_json::to_string(&practice.days_of_week).unwrap_or_else(|_| "[]".into()),
                practice.time_of_day.to_hhmm(),
                practice.active,
                practice.created_at.to_rfc3339(),
                practice.notification_handle,
            ],
        )?;
        Ok(())
    }

    /// Update an existing practice's rule and target fields.
    ///
    /// Existing completion marks are untouched; they keep rendering from
    /// their snapshot, not from the edited row.
    pub fn update_practice(&self, practice: &ScheduledPractice) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE scheduled_practices
             SET kind = ?2, target = ?3, days_of_week = ?4, time_of_day = ?5,
                 active = ?6, notification_handle = ?7
             WHERE id = ?1",
            params![
                practice.id,
                practice.kind.as_str(),
                serde_json::to_string(&practice.target).unwrap_or_default(),
                serde_json::to_string(&practice.days_of_week).unwrap_or_else(|_| "[]".into()),
                practice.time_of_day.to_hhmm(),
                practice.active,
                practice.notification_handle,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "scheduled practice",
                id: practice.id.clone(),
            });
        }
        Ok(())
    }

    /// Delete a practice. Completion marks are deliberately retained; they
    /// carry their own snapshot of the practice.
    pub fn delete_practice(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM scheduled_practices WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Fetch one practice by id.
    pub fn get_practice(&self, id: &str) -> Result<Option<ScheduledPractice>, StoreError> {
        let practice = self
            .conn
            .query_row(
                "SELECT id, kind, target, days_of_week, time_of_day, active, created_at, notification_handle
                 FROM scheduled_practices WHERE id = ?1",
                params![id],
                row_to_practice,
            )
            .optional()?;
        Ok(practice)
    }

    /// All practices, oldest first. Inactive ones stay visible for editing.
    pub fn list_practices(&self) -> Result<Vec<ScheduledPractice>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, target, days_of_week, time_of_day, active, created_at, notification_handle
             FROM scheduled_practices ORDER BY created_at ASC",
        )?;
        let practices = stmt
            .query_map([], row_to_practice)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(practices)
    }

    /// Active practices only, oldest first.
    pub fn active_practices(&self) -> Result<Vec<ScheduledPractice>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, target, days_of_week, time_of_day, active, created_at, notification_handle
             FROM scheduled_practices WHERE active = 1 ORDER BY created_at ASC",
        )?;
        let practices = stmt
            .query_map([], row_to_practice)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(practices)
    }

    /// Flip a practice's active flag.
    pub fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE scheduled_practices SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "scheduled practice",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Store or clear the correlation token for installed reminders.
    pub fn set_notification_handle(
        &self,
        id: &str,
        handle: Option<&str>,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE scheduled_practices SET notification_handle = ?2 WHERE id = ?1",
            params![id, handle],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "scheduled practice",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // === Completion marks ===

    /// Toggle the manual completion mark for `practice` on the day
    /// containing `day`.
    ///
    /// Delete-if-present, otherwise insert a mark snapshotting the practice
    /// as it exists right now. Each arm is a single statement; the UNIQUE
    /// index on `unique_key` is the backstop against duplicates.
    ///
    /// # Errors
    /// Surfaces the store error so the caller can inform the user; prior
    /// state is unchanged on failure.
    pub fn toggle_completion(
        &self,
        practice: &ScheduledPractice,
        day: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome, StoreError> {
        let key = unique_key(&practice.id, day);
        let deleted = self.conn.execute(
            "DELETE FROM completion_marks WHERE unique_key = ?1",
            params![key],
        )?;
        if deleted > 0 {
            return Ok(ToggleOutcome::Removed { unique_key: key });
        }

        let mark = CompletionMark::snapshot_of(practice, day, now);
        self.conn.execute(
            "INSERT INTO completion_marks
                (id, unique_key, day, created_at, assignment_id, kind, target)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                mark.id,
                mark.unique_key,
                mark.day.to_rfc3339(),
                mark.created_at.to_rfc3339(),
                mark.assignment_id,
                mark.kind.as_str(),
                serde_json::to_string(&mark.target).unwrap_or_default(),
            ],
        )?;
        Ok(ToggleOutcome::Added(mark))
    }

    /// All marks for the calendar day containing `day`, ordered by creation
    /// time.
    pub fn marks_for_day(&self, day: DateTime<Utc>) -> Result<Vec<CompletionMark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, unique_key, day, created_at, assignment_id, kind, target
             FROM completion_marks WHERE day = ?1 ORDER BY created_at ASC",
        )?;
        let marks = stmt
            .query_map(params![day_start(day).to_rfc3339()], row_to_mark)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(marks)
    }

    /// Marks whose day falls in `[start, end)`.
    pub fn marks_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CompletionMark>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, unique_key, day, created_at, assignment_id, kind, target
             FROM completion_marks WHERE day >= ?1 AND day < ?2 ORDER BY day ASC, created_at ASC",
        )?;
        let marks = stmt
            .query_map(params![start.to_rfc3339(), end.to_rfc3339()], row_to_mark)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(marks)
    }

    /// Count of marks whose day falls in `[start, end)`.
    pub fn count_marks_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM completion_marks WHERE day >= ?1 AND day < ?2",
            params![start.to_rfc3339(), end.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Session records ===

    /// Record a session. Called by the five practice-delivery subsystems;
    /// the core itself never writes sessions.
    pub fn record_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO session_records (id, kind, started_at, completed_at, target)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.kind.as_str(),
                record.started_at.to_rfc3339(),
                record.completed_at.map(|dt| dt.to_rfc3339()),
                record
                    .target
                    .as_ref()
                    .map(|t| serde_json::to_string(t).unwrap_or_default()),
            ],
        )?;
        Ok(())
    }

    /// Session records of one kind whose primary timestamp falls in
    /// `[start, end)`.
    pub fn sessions_between(
        &self,
        kind: PracticeKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, started_at, completed_at, target
             FROM session_records
             WHERE kind = ?1 AND started_at >= ?2 AND started_at < ?3
             ORDER BY started_at ASC",
        )?;
        let records = stmt
            .query_map(
                params![kind.as_str(), start.to_rfc3339(), end.to_rfc3339()],
                row_to_session,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::{PracticeKind, TargetRef, TimeOfDay};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};

    fn utc_datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
    }

    fn sample_practice(id: &str, kind: PracticeKind) -> ScheduledPractice {
        let mut practice = ScheduledPractice::new(
            kind,
            match kind {
                PracticeKind::Exposure | PracticeKind::BehavioralActivation => {
                    TargetRef::Entity(format!("{id}-target"))
                }
                _ => TargetRef::Tag("Box breathing".into()),
            },
            vec![2, 3, 4, 5, 6],
            TimeOfDay::new(9, 0),
        );
        practice.id = id.to_string();
        practice
    }

    #[test]
    fn test_practice_round_trip() {
        let db = PracticeDb::open_memory().unwrap();
        let practice = sample_practice("p-1", PracticeKind::Exposure);
        db.insert_practice(&practice).unwrap();

        let loaded = db.get_practice("p-1").unwrap().unwrap();
        assert_eq!(loaded.kind, PracticeKind::Exposure);
        assert_eq!(loaded.target, TargetRef::Entity("p-1-target".into()));
        assert_eq!(
            loaded.days_of_week.iter().copied().collect::<Vec<_>>(),
            [2, 3, 4, 5, 6]
        );
        assert_eq!(loaded.time_of_day, TimeOfDay::new(9, 0));
        assert!(loaded.active);
    }

    #[test]
    fn test_update_and_set_active() {
        let db = PracticeDb::open_memory().unwrap();
        let mut practice = sample_practice("p-1", PracticeKind::Breathing);
        db.insert_practice(&practice).unwrap();

        practice.time_of_day = TimeOfDay::new(21, 15);
        practice.days_of_week = [1, 7].into_iter().collect();
        db.update_practice(&practice).unwrap();
        db.set_active("p-1", false).unwrap();

        let loaded = db.get_practice("p-1").unwrap().unwrap();
        assert_eq!(loaded.time_of_day, TimeOfDay::new(21, 15));
        assert!(!loaded.active);
        assert!(db.active_practices().unwrap().is_empty());
        assert_eq!(db.list_practices().unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_practice_is_not_found() {
        let db = PracticeDb::open_memory().unwrap();
        let practice = sample_practice("ghost", PracticeKind::Grounding);
        let err = db.update_practice(&practice).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_toggle_round_trip() {
        let db = PracticeDb::open_memory().unwrap();
        let practice = sample_practice("P", PracticeKind::Relaxation);
        db.insert_practice(&practice).unwrap();

        let day = utc_datetime(2024, 1, 10, 14, 30);
        let now = utc_datetime(2024, 1, 10, 14, 30);

        let outcome = db.toggle_completion(&practice, day, now).unwrap();
        let mark = match outcome {
            ToggleOutcome::Added(mark) => mark,
            ToggleOutcome::Removed { .. } => panic!("first toggle must add"),
        };
        let day_epoch = utc_datetime(2024, 1, 10, 0, 0).timestamp();
        assert_eq!(mark.unique_key, format!("P|{day_epoch}"));
        assert_eq!(db.marks_for_day(day).unwrap().len(), 1);

        // Second toggle removes; the pair is a no-op.
        let outcome = db.toggle_completion(&practice, day, now).unwrap();
        assert!(matches!(outcome, ToggleOutcome::Removed { .. }));
        assert!(db.marks_for_day(day).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_distinct_days_are_independent() {
        let db = PracticeDb::open_memory().unwrap();
        let practice = sample_practice("P", PracticeKind::Breathing);
        db.insert_practice(&practice).unwrap();

        let monday = utc_datetime(2024, 1, 8, 9, 0);
        let tuesday = utc_datetime(2024, 1, 9, 9, 0);
        db.toggle_completion(&practice, monday, monday).unwrap();
        db.toggle_completion(&practice, tuesday, tuesday).unwrap();

        assert_eq!(db.marks_for_day(monday).unwrap().len(), 1);
        assert_eq!(db.marks_for_day(tuesday).unwrap().len(), 1);
        assert_eq!(
            db.count_marks_between(
                utc_datetime(2024, 1, 7, 0, 0),
                utc_datetime(2024, 1, 14, 0, 0)
            )
            .unwrap(),
            2
        );
    }

    #[test]
    fn test_marks_ordered_by_created_at() {
        let db = PracticeDb::open_memory().unwrap();
        let first = sample_practice("a", PracticeKind::Breathing);
        let second = sample_practice("b", PracticeKind::Grounding);
        db.insert_practice(&first).unwrap();
        db.insert_practice(&second).unwrap();

        let day = utc_datetime(2024, 1, 10, 0, 0);
        // Later wall-clock toggle first, to prove ordering is by created_at.
        db.toggle_completion(&second, day, utc_datetime(2024, 1, 10, 20, 0))
            .unwrap();
        db.toggle_completion(&first, day, utc_datetime(2024, 1, 10, 8, 0))
            .unwrap();

        let marks = db.marks_for_day(day).unwrap();
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].assignment_id, "a");
        assert_eq!(marks[1].assignment_id, "b");
    }

    #[test]
    fn test_delete_practice_retains_marks() {
        let db = PracticeDb::open_memory().unwrap();
        let practice = sample_practice("gone", PracticeKind::Exposure);
        db.insert_practice(&practice).unwrap();

        let day = utc_datetime(2024, 1, 10, 19, 0);
        db.toggle_completion(&practice, day, day).unwrap();
        db.delete_practice("gone").unwrap();

        assert!(db.get_practice("gone").unwrap().is_none());
        let marks = db.marks_for_day(day).unwrap();
        assert_eq!(marks.len(), 1);
        // The snapshot survives the deletion.
        assert_eq!(marks[0].kind, PracticeKind::Exposure);
        assert_eq!(marks[0].target, TargetRef::Entity("gone-target".into()));
    }

    #[test]
    fn test_sessions_between_boundaries() {
        let db = PracticeDb::open_memory().unwrap();
        let write = |id: &str, at: DateTime<Utc>| {
            db.record_session(&SessionRecord {
                id: id.into(),
                kind: PracticeKind::Breathing,
                started_at: at,
                completed_at: Some(at + Duration::minutes(5)),
                target: Some(TargetRef::Tag("Paced breathing".into())),
            })
            .unwrap();
        };
        write("before", utc_datetime(2024, 1, 9, 23, 59));
        write("at-start", utc_datetime(2024, 1, 10, 0, 0));
        write("inside", utc_datetime(2024, 1, 10, 12, 0));
        write("at-end", utc_datetime(2024, 1, 11, 0, 0));

        let records = db
            .sessions_between(
                PracticeKind::Breathing,
                utc_datetime(2024, 1, 10, 0, 0),
                utc_datetime(2024, 1, 11, 0, 0),
            )
            .unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["at-start", "inside"]);
    }

    #[test]
    fn test_sessions_filtered_by_kind() {
        let db = PracticeDb::open_memory().unwrap();
        let at = utc_datetime(2024, 1, 10, 12, 0);
        db.record_session(&SessionRecord {
            id: "g-1".into(),
            kind: PracticeKind::Grounding,
            started_at: at,
            completed_at: None,
            target: None,
        })
        .unwrap();

        assert!(db
            .sessions_between(
                PracticeKind::Breathing,
                utc_datetime(2024, 1, 10, 0, 0),
                utc_datetime(2024, 1, 11, 0, 0)
            )
            .unwrap()
            .is_empty());
        assert_eq!(
            db.sessions_between(
                PracticeKind::Grounding,
                utc_datetime(2024, 1, 10, 0, 0),
                utc_datetime(2024, 1, 11, 0, 0)
            )
            .unwrap()
            .len(),
            1
        );
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindroom.db");
        let conn = Connection::open(&path).unwrap();
        let db = PracticeDb { conn };
        db.migrate().unwrap();

        let practice = sample_practice("disk", PracticeKind::Relaxation);
        db.insert_practice(&practice).unwrap();
        drop(db);

        let db = PracticeDb {
            conn: Connection::open(&path).unwrap(),
        };
        db.migrate().unwrap();
        assert!(db.get_practice("disk").unwrap().is_some());
    }

    proptest! {
        /// Dedup invariant: however toggles interleave across practices and
        /// days, no day ever holds two marks for the same (assignment, day)
        /// pair, and presence matches toggle parity.
        #[test]
        fn prop_toggle_never_duplicates(
            ops in proptest::collection::vec((0usize..3, 0i64..5), 1..40)
        ) {
            let db = PracticeDb::open_memory().unwrap();
            let practices: Vec<_> = ["p-0", "p-1", "p-2"]
                .iter()
                .map(|id| sample_practice(id, PracticeKind::Breathing))
                .collect();
            for practice in &practices {
                db.insert_practice(practice).unwrap();
            }

            let base = utc_datetime(2024, 1, 7, 0, 0);
            let mut toggles: HashMap<(usize, i64), u32> = HashMap::new();
            for &(practice_idx, day_offset) in &ops {
                let day = base + Duration::days(day_offset);
                db.toggle_completion(&practices[practice_idx], day, Utc::now())
                    .unwrap();
                *toggles.entry((practice_idx, day_offset)).or_insert(0) += 1;
            }

            for day_offset in 0..5 {
                let day = base + Duration::days(day_offset);
                let marks = db.marks_for_day(day).unwrap();

                let mut seen = HashSet::new();
                for mark in &marks {
                    prop_assert!(seen.insert((mark.assignment_id.clone(), mark.day)));
                }

                for (practice_idx, practice) in practices.iter().enumerate() {
                    let count = toggles
                        .get(&(practice_idx, day_offset))
                        .copied()
                        .unwrap_or(0);
                    let present = marks.iter().any(|m| m.assignment_id == practice.id);
                    prop_assert_eq!(present, count % 2 == 1);
                }
            }
        }
    }
}
