//! # Mindroom Core Library
//!
//! Core business logic for Mindroom, a personal therapy-practice app:
//! recurring practice scheduling, manual completion marks, multi-source
//! adherence aggregation, and weekly progress/streak computation. The GUI
//! and the five practice-delivery subsystems (breathing, relaxation,
//! grounding, exposure, behavioral activation) are thin layers over this
//! library.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure expansion of weekly rules into concrete
//!   occurrences over a bounded horizon
//! - **Storage**: SQLite-based practice/mark/session storage and TOML-based
//!   configuration; a UNIQUE key enforces one mark per (practice, day)
//! - **Adherence**: best-effort merge of marks and session records into a
//!   unified per-day list
//! - **Progress**: weekly counts and a consecutive-day streak over a
//!   lookback window
//!
//! ## Key Components
//!
//! - [`PracticeTracker`]: facade the presentation layer consumes
//! - [`PracticeDb`]: practice, mark, and session persistence
//! - [`SessionRecordSource`]: read seam over one practice kind's sessions
//! - [`NotificationScheduler`]: injected local-reminder collaborator

pub mod adherence;
pub mod calendar;
pub mod completion;
pub mod error;
pub mod events;
pub mod notify;
pub mod practice;
pub mod progress;
pub mod recurrence;
pub mod session;
pub mod storage;
pub mod tracker;

pub use adherence::{completed_entries_for, CompletedEntry, EntrySource};
pub use completion::{unique_key, CompletionMark};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use notify::{AuthorizationStatus, DisabledScheduler, NotificationScheduler, ScheduleOutcome};
pub use practice::{
    PracticeKind, ScheduledPractice, TagOnlyResolver, TargetRef, TargetResolver, TimeOfDay,
};
pub use progress::{week_progress, WeekProgress};
pub use recurrence::{occurs_on, upcoming_occurrences, Occurrence};
pub use session::{DbSessionSource, SessionRecord, SessionRecordSource};
pub use storage::{Config, PracticeDb, ToggleOutcome};
pub use tracker::PracticeTracker;
