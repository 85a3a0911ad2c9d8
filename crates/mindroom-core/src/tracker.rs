//! The tracker facade: the surface the presentation layer consumes.
//!
//! Wires the store, the five session sources, the notification scheduler
//! and the target resolver together, and exposes the four read/write
//! operations plus practice lifecycle. Writes surface errors so the UI can
//! re-read and inform the user; read aggregations always return a result,
//! partial if need be.

use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::adherence::{self, CompletedEntry};
use crate::error::{Result, StoreError};
use crate::events::Event;
use crate::notify::{AuthorizationStatus, NotificationScheduler, ScheduleOutcome};
use crate::practice::{PracticeKind, ScheduledPractice, TargetRef, TargetResolver, TimeOfDay};
use crate::progress::{self, WeekProgress};
use crate::recurrence::{self, Occurrence};
use crate::session::{DbSessionSource, SessionRecordSource};
use crate::storage::{Config, PracticeDb, ToggleOutcome};

pub struct PracticeTracker {
    db: Rc<PracticeDb>,
    sources: Vec<Box<dyn SessionRecordSource>>,
    notifier: Box<dyn NotificationScheduler>,
    resolver: Box<dyn TargetResolver>,
    config: Config,
    pending_events: Vec<Event>,
}

impl PracticeTracker {
    /// Build a tracker over the shared database, with one built-in session
    /// source per practice kind.
    pub fn new(
        db: Rc<PracticeDb>,
        notifier: Box<dyn NotificationScheduler>,
        resolver: Box<dyn TargetResolver>,
        config: Config,
    ) -> Self {
        let sources = DbSessionSource::all(&db);
        Self::with_sources(db, sources, notifier, resolver, config)
    }

    /// Build a tracker with custom session sources (tests, previews).
    pub fn with_sources(
        db: Rc<PracticeDb>,
        sources: Vec<Box<dyn SessionRecordSource>>,
        notifier: Box<dyn NotificationScheduler>,
        resolver: Box<dyn TargetResolver>,
        config: Config,
    ) -> Self {
        Self {
            db,
            sources,
            notifier,
            resolver,
            config,
            pending_events: Vec::new(),
        }
    }

    /// The underlying store, for the delivery subsystems that share it.
    pub fn db(&self) -> &PracticeDb {
        &self.db
    }

    /// Take all events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending_events)
    }

    // === Practice lifecycle ===

    /// Create an active practice and install reminders best-effort.
    ///
    /// A denial or scheduler failure leaves the practice active and is
    /// reported through events; only store failures surface as errors.
    pub fn create_practice(
        &mut self,
        kind: PracticeKind,
        target: TargetRef,
        days_of_week: impl IntoIterator<Item = u8>,
        time_of_day: TimeOfDay,
    ) -> Result<ScheduledPractice> {
        let mut practice = ScheduledPractice::new(kind, target, days_of_week, time_of_day);
        self.db.insert_practice(&practice)?;
        self.pending_events.push(Event::PracticeCreated {
            practice_id: practice.id.clone(),
            at: Utc::now(),
        });
        self.install_reminders(&mut practice)?;
        Ok(practice)
    }

    /// Persist an edited practice and reinstall its reminders.
    pub fn update_practice(&mut self, practice: &ScheduledPractice) -> Result<ScheduledPractice> {
        self.db.update_practice(practice)?;
        self.pending_events.push(Event::PracticeUpdated {
            practice_id: practice.id.clone(),
            at: Utc::now(),
        });

        self.cancel_reminders_quietly(&practice.id);
        self.db.set_notification_handle(&practice.id, None)?;
        let mut updated = practice.clone();
        updated.notification_handle = None;
        if updated.active {
            self.install_reminders(&mut updated)?;
        }
        Ok(updated)
    }

    /// Delete a practice. Its completion marks are retained and keep
    /// rendering from their snapshots.
    pub fn delete_practice(&mut self, practice_id: &str) -> Result<()> {
        self.cancel_reminders_quietly(practice_id);
        self.db.delete_practice(practice_id)?;
        self.pending_events.push(Event::PracticeDeleted {
            practice_id: practice_id.to_string(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Activate or deactivate a practice, installing or removing reminders
    /// to match.
    pub fn set_active(&mut self, practice_id: &str, active: bool) -> Result<ScheduledPractice> {
        self.db.set_active(practice_id, active)?;
        self.pending_events.push(Event::PracticeActiveChanged {
            practice_id: practice_id.to_string(),
            active,
            at: Utc::now(),
        });

        let mut practice =
            self.db
                .get_practice(practice_id)?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "scheduled practice",
                    id: practice_id.to_string(),
                })?;
        if active {
            self.install_reminders(&mut practice)?;
        } else {
            self.cancel_reminders_quietly(practice_id);
            self.db.set_notification_handle(practice_id, None)?;
            practice.notification_handle = None;
        }
        Ok(practice)
    }

    /// Current notification-authorization state, without prompting.
    pub fn reminder_authorization(&self) -> AuthorizationStatus {
        self.notifier.check_authorization()
    }

    // === The four exposed operations ===

    /// Upcoming occurrences from `from`'s day over the configured horizon.
    /// Occurrences whose datetime has already passed are excluded.
    pub fn upcoming_occurrences(&self, from: DateTime<Utc>) -> Vec<Occurrence> {
        let practices = self.db.list_practices().unwrap_or_default();
        recurrence::upcoming_occurrences(
            &practices,
            from,
            self.config.tracking.upcoming_horizon_days,
            Utc::now(),
        )
    }

    /// Toggle the manual mark for `practice` on the day containing `day`.
    pub fn toggle_completion(
        &mut self,
        practice: &ScheduledPractice,
        day: DateTime<Utc>,
    ) -> Result<ToggleOutcome> {
        let outcome = self.db.toggle_completion(practice, day, Utc::now())?;
        let event = match &outcome {
            ToggleOutcome::Added(mark) => Event::MarkAdded {
                practice_id: practice.id.clone(),
                day: mark.day,
                at: Utc::now(),
            },
            ToggleOutcome::Removed { .. } => Event::MarkRemoved {
                practice_id: practice.id.clone(),
                day,
                at: Utc::now(),
            },
        };
        self.pending_events.push(event);
        Ok(outcome)
    }

    /// Unified, time-ordered completion signals for one calendar day.
    pub fn completed_entries_for(&self, day: DateTime<Utc>) -> Vec<CompletedEntry> {
        adherence::completed_entries_for(&self.db, &self.sources, self.resolver.as_ref(), day)
    }

    /// Weekly counts for the week containing `anchor`, and the streak
    /// ending today.
    pub fn week_progress(&self, anchor: DateTime<Utc>) -> WeekProgress {
        progress::week_progress(
            &self.db,
            &self.sources,
            anchor,
            Utc::now(),
            self.config.tracking.streak_lookback_days,
        )
    }

    // === Reminder plumbing ===

    fn install_reminders(&mut self, practice: &mut ScheduledPractice) -> Result<()> {
        if !self.config.reminders.enabled || !practice.active {
            return Ok(());
        }
        match self.notifier.schedule_reminders(practice) {
            Ok(ScheduleOutcome::Scheduled { handle }) => {
                self.db
                    .set_notification_handle(&practice.id, Some(handle.as_str()))?;
                practice.notification_handle = Some(handle.clone());
                self.pending_events.push(Event::RemindersScheduled {
                    practice_id: practice.id.clone(),
                    handle,
                    at: Utc::now(),
                });
            }
            Ok(ScheduleOutcome::Denied) => {
                self.pending_events.push(Event::RemindersDenied {
                    practice_id: practice.id.clone(),
                    at: Utc::now(),
                });
            }
            Err(e) => {
                // Treated like a denial: the practice stays active.
                self.pending_events.push(Event::RemindersFailed {
                    practice_id: practice.id.clone(),
                    message: e.to_string(),
                    at: Utc::now(),
                });
            }
        }
        Ok(())
    }

    fn cancel_reminders_quietly(&mut self, practice_id: &str) {
        if let Err(e) = self.notifier.cancel_reminders(practice_id) {
            self.pending_events.push(Event::RemindersFailed {
                practice_id: practice_id.to_string(),
                message: e.to_string(),
                at: Utc::now(),
            });
        }
    }
}
