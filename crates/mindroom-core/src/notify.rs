//! Local-reminder scheduling seam.
//!
//! The OS notification machinery is an injected collaborator behind this
//! narrow interface, so the core carries no process-wide state and can be
//! tested with a fake. Scheduling is best-effort: adherence tracking never
//! depends on whether reminders were installed.

use crate::practice::ScheduledPractice;

/// Host notification-authorization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

/// Result of asking the scheduler to install per-weekday reminders.
#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    /// Reminders installed; `handle` correlates the installed set and is
    /// stored on the practice for later cancellation.
    Scheduled { handle: String },
    /// The user denied notification authorization. The practice stays
    /// active; only the reminders are missing.
    Denied,
}

/// Installs and removes per-weekday local reminders for active practices.
pub trait NotificationScheduler {
    /// Install reminders for every weekday/time of `practice`.
    fn schedule_reminders(
        &self,
        practice: &ScheduledPractice,
    ) -> Result<ScheduleOutcome, Box<dyn std::error::Error>>;

    /// Remove any reminders previously installed for the practice.
    fn cancel_reminders(&self, practice_id: &str) -> Result<(), Box<dyn std::error::Error>>;

    /// Current authorization state, without prompting.
    fn check_authorization(&self) -> AuthorizationStatus;
}

/// Scheduler for headless use: never installs anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledScheduler;

impl NotificationScheduler for DisabledScheduler {
    fn schedule_reminders(
        &self,
        _practice: &ScheduledPractice,
    ) -> Result<ScheduleOutcome, Box<dyn std::error::Error>> {
        Ok(ScheduleOutcome::Denied)
    }

    fn cancel_reminders(&self, _practice_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn check_authorization(&self) -> AuthorizationStatus {
        AuthorizationStatus::Denied
    }
}
