use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the tracker produces an Event.
/// The GUI drains them after each interaction; nothing in the core
/// interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PracticeCreated {
        practice_id: String,
        at: DateTime<Utc>,
    },
    PracticeUpdated {
        practice_id: String,
        at: DateTime<Utc>,
    },
    PracticeDeleted {
        practice_id: String,
        at: DateTime<Utc>,
    },
    PracticeActiveChanged {
        practice_id: String,
        active: bool,
        at: DateTime<Utc>,
    },
    MarkAdded {
        practice_id: String,
        day: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    MarkRemoved {
        practice_id: String,
        day: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    RemindersScheduled {
        practice_id: String,
        handle: String,
        at: DateTime<Utc>,
    },
    /// Authorization denied; the practice stays active without reminders.
    RemindersDenied {
        practice_id: String,
        at: DateTime<Utc>,
    },
    /// Scheduler error; treated like a denial.
    RemindersFailed {
        practice_id: String,
        message: String,
        at: DateTime<Utc>,
    },
}
