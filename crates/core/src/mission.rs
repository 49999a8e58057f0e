//! Mission status, priority, and lifecycle transition rules.
//!
//! The lifecycle graph:
//!
//! ```text
//! pending --assign--> assigned --start--> in_progress --complete--> completed
//!    ^  |   (re-assign) |                     |---------fail------> failed
//!    |  +----cancel-----+--------cancel-------+--------cancel-----> cancelled
//! ```
//!
//! Handlers call [`plan_transition`] and persist whatever it returns, so the
//! graph lives in exactly one place.

use crate::error::CoreError;
use crate::types::Timestamp;

define_text_enum! {
    /// Mission execution status.
    MissionStatus {
        Pending = "pending",
        Assigned = "assigned",
        InProgress = "in_progress",
        Completed = "completed",
        Failed = "failed",
        Cancelled = "cancelled",
    }
}

define_text_enum! {
    /// Mission priority level.
    MissionPriority {
        Low = "low",
        Normal = "normal",
        High = "high",
        Critical = "critical",
    }
}

impl Default for MissionStatus {
    fn default() -> Self {
        MissionStatus::Pending
    }
}

impl Default for MissionPriority {
    fn default() -> Self {
        MissionPriority::Normal
    }
}

impl MissionStatus {
    /// Completed, failed and cancelled missions accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MissionStatus::Completed | MissionStatus::Failed | MissionStatus::Cancelled
        )
    }

    /// A robot may only be (re-)assigned before the mission starts.
    pub fn is_assignable(self) -> bool {
        matches!(self, MissionStatus::Pending | MissionStatus::Assigned)
    }
}

/// Maximum length of a mission name.
pub const MAX_NAME_LEN: usize = 200;

/// Progress value written when a mission completes.
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// A lifecycle operation requested through the API or the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Assign,
    Start,
    Complete,
    Fail,
    Cancel,
}

impl LifecycleAction {
    pub fn verb(self) -> &'static str {
        match self {
            LifecycleAction::Assign => "assign",
            LifecycleAction::Start => "start",
            LifecycleAction::Complete => "complete",
            LifecycleAction::Fail => "fail",
            LifecycleAction::Cancel => "cancel",
        }
    }
}

/// The column changes a transition requires. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub status: MissionStatus,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub progress: Option<f64>,
}

/// Plan a lifecycle transition for a mission currently in `current`.
///
/// `has_robot` is whether the mission has a robot attached *after* the
/// action (for `Assign` the caller has already verified the robot exists).
pub fn plan_transition(
    current: MissionStatus,
    action: LifecycleAction,
    has_robot: bool,
    started_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    let rejected = || {
        CoreError::InvalidState(format!(
            "Cannot {} mission with status {}",
            action.verb(),
            current
        ))
    };

    let next = match action {
        LifecycleAction::Assign if current.is_assignable() => MissionStatus::Assigned,
        LifecycleAction::Start if current == MissionStatus::Assigned => {
            if !has_robot {
                return Err(CoreError::InvalidState(
                    "Cannot start mission without an assigned robot".into(),
                ));
            }
            MissionStatus::InProgress
        }
        LifecycleAction::Complete if current == MissionStatus::InProgress => {
            MissionStatus::Completed
        }
        LifecycleAction::Fail if current == MissionStatus::InProgress => MissionStatus::Failed,
        LifecycleAction::Cancel if !current.is_terminal() => MissionStatus::Cancelled,
        _ => return Err(rejected()),
    };

    let mut transition = status_effects(next, started_at, now);
    match action {
        LifecycleAction::Start => transition.progress = Some(0.0),
        LifecycleAction::Complete => transition.progress = Some(PROGRESS_COMPLETE),
        _ => {}
    }
    Ok(transition)
}

/// Timestamp side effects of moving a mission into `new_status` without
/// enforcing the lifecycle graph (used by the generic update endpoint).
///
/// - `in_progress` sets `started_at` if it was never set.
/// - `completed` and `failed` set `completed_at`.
pub fn status_effects(
    new_status: MissionStatus,
    started_at: Option<Timestamp>,
    now: Timestamp,
) -> Transition {
    let started_at = match new_status {
        MissionStatus::InProgress if started_at.is_none() => Some(now),
        _ => None,
    };
    let completed_at = match new_status {
        MissionStatus::Completed | MissionStatus::Failed => Some(now),
        _ => None,
    };
    Transition {
        status: new_status,
        started_at,
        completed_at,
        progress: None,
    }
}

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Mission name must not be empty".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Mission name must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Progress is a percentage in `0.0..=100.0`.
pub fn validate_progress(progress: Option<f64>) -> Result<(), CoreError> {
    match progress {
        Some(p) if !(0.0..=PROGRESS_COMPLETE).contains(&p) => Err(CoreError::Validation(
            format!("Progress must be between 0 and 100, got {p}"),
        )),
        _ => Ok(()),
    }
}
