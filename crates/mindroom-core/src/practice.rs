//! Scheduled practice types: the recurrence rule plus its target.
//!
//! A [`ScheduledPractice`] ties one practice kind (and a kind-dependent
//! target reference) to a weekly recurrence rule: a set of weekdays and an
//! hour:minute of day. Weekday numbers use the host-calendar convention,
//! 1 = Sunday through 7 = Saturday.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five practice kinds delivered by the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeKind {
    Exposure,
    Breathing,
    Relaxation,
    Grounding,
    BehavioralActivation,
}

impl PracticeKind {
    /// All kinds, in the order the aggregator iterates them.
    pub const ALL: [PracticeKind; 5] = [
        PracticeKind::Exposure,
        PracticeKind::Breathing,
        PracticeKind::Relaxation,
        PracticeKind::Grounding,
        PracticeKind::BehavioralActivation,
    ];

    /// Stable identifier used in database columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeKind::Exposure => "exposure",
            PracticeKind::Breathing => "breathing",
            PracticeKind::Relaxation => "relaxation",
            PracticeKind::Grounding => "grounding",
            PracticeKind::BehavioralActivation => "behavioral_activation",
        }
    }

    /// Parse a database string back into a kind.
    pub fn parse(s: &str) -> Option<PracticeKind> {
        match s {
            "exposure" => Some(PracticeKind::Exposure),
            "breathing" => Some(PracticeKind::Breathing),
            "relaxation" => Some(PracticeKind::Relaxation),
            "grounding" => Some(PracticeKind::Grounding),
            "behavioral_activation" => Some(PracticeKind::BehavioralActivation),
            _ => None,
        }
    }

    /// Human-readable display name.
    pub fn label(&self) -> &'static str {
        match self {
            PracticeKind::Exposure => "Exposure",
            PracticeKind::Breathing => "Breathing",
            PracticeKind::Relaxation => "Relaxation",
            PracticeKind::Grounding => "Grounding",
            PracticeKind::BehavioralActivation => "Activity",
        }
    }

    /// Whether session records of this kind carry a distinct start/finish.
    ///
    /// Exposure and behavioral-activation sessions are started, then either
    /// finished or abandoned; the other three are written once, at the end
    /// of a session, by their owning subsystem.
    pub fn has_distinct_completion(&self) -> bool {
        matches!(
            self,
            PracticeKind::Exposure | PracticeKind::BehavioralActivation
        )
    }
}

/// Kind-dependent reference to what a practice targets.
///
/// Exposure and behavioral activation point at a live entity (an exposure
/// hierarchy entry, an activity list); breathing, relaxation and grounding
/// carry a closed-set technique tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TargetRef {
    /// Opaque id of a live entity owned by a delivery subsystem.
    Entity(String),
    /// Closed-set technique tag, display-ready (e.g. "Box breathing").
    Tag(String),
}

/// Hour and minute of day; seconds never matter for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Create a time of day, clamping into the valid 0-23 / 0-59 range.
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    /// Format as `HH:MM` for database storage.
    pub fn to_hhmm(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Parse an `HH:MM` database string.
    pub fn parse_hhmm(s: &str) -> Option<TimeOfDay> {
        let (h, m) = s.split_once(':')?;
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(TimeOfDay { hour, minute })
    }
}

/// A recurring practice: what to do, on which weekdays, at what time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPractice {
    pub id: String,
    pub kind: PracticeKind,
    pub target: TargetRef,
    /// Weekday numbers, 1 = Sunday ... 7 = Saturday. Set semantics; an
    /// empty set never occurs.
    pub days_of_week: BTreeSet<u8>,
    pub time_of_day: TimeOfDay,
    /// Inactive practices are excluded from occurrence generation and
    /// reminders but stay visible for editing.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// Correlation token for reminders installed by the external
    /// notification scheduler. Opaque to this crate.
    pub notification_handle: Option<String>,
}

impl ScheduledPractice {
    /// Create a new active practice with a fresh id.
    ///
    /// Out-of-range weekday numbers are dropped; duplicates collapse.
    pub fn new(
        kind: PracticeKind,
        target: TargetRef,
        days_of_week: impl IntoIterator<Item = u8>,
        time_of_day: TimeOfDay,
    ) -> Self {
        let days_of_week = days_of_week
            .into_iter()
            .filter(|d| (1..=7).contains(d))
            .collect();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            target,
            days_of_week,
            time_of_day,
            active: true,
            created_at: Utc::now(),
            notification_handle: None,
        }
    }

    /// Generic display label used when the target no longer resolves.
    pub fn fallback_title(kind: PracticeKind) -> String {
        format!("{} practice", kind.label())
    }
}

/// Resolves a target reference to a live display title.
///
/// Returning `None` means the reference is orphaned (the entity was deleted
/// after a mark or occurrence snapshotted it); callers fall back to
/// [`ScheduledPractice::fallback_title`] and never treat it as fatal.
pub trait TargetResolver {
    fn resolve(&self, kind: PracticeKind, target: &TargetRef) -> Option<String>;
}

/// Resolver that treats tag targets as display-ready and knows no entities.
///
/// Suitable for headless use and tests; the app wires a resolver backed by
/// the delivery subsystems' own stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagOnlyResolver;

impl TargetResolver for TagOnlyResolver {
    fn resolve(&self, _kind: PracticeKind, target: &TargetRef) -> Option<String> {
        match target {
            TargetRef::Tag(name) => Some(name.clone()),
            TargetRef::Entity(_) => None,
        }
    }
}
